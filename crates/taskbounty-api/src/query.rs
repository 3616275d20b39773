//! # Bounty Query Engine
//!
//! Filtering, sorting, and pagination over a snapshot of the bounty
//! store. The pipeline is pure — it takes the snapshot the handler
//! read and never touches the store — so listing contends with writers
//! only for the duration of the snapshot.
//!
//! Order of operations: filter, then sort, then paginate. `total` and
//! `total_pages` count the filtered set, not the stored set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use taskbounty_state::{Bounty, BountyStatus};

/// Default page size when `limit` is absent.
pub const DEFAULT_LIMIT: usize = 20;
/// Hard cap on page size; larger requests are clamped, not rejected.
pub const MAX_LIMIT: usize = 100;

// ── Parameters ──────────────────────────────────────────────────────

/// Sort orders for bounty listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    Newest,
    /// Largest reward first.
    RewardHigh,
    /// Smallest reward first.
    RewardLow,
    /// Earliest deadline first.
    Deadline,
}

/// Query parameters for `GET /v1/bounties`.
///
/// All fields are optional; an empty query lists everything, newest
/// first, twenty per page.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BountyQuery {
    /// Case-insensitive substring match against title or description.
    pub q: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact status match.
    #[param(value_type = Option<String>)]
    pub status: Option<BountyStatus>,
    /// Inclusive lower bound on the reward amount.
    #[param(value_type = Option<String>)]
    pub min_reward: Option<Decimal>,
    /// Inclusive upper bound on the reward amount.
    #[param(value_type = Option<String>)]
    pub max_reward: Option<Decimal>,
    /// Sort order; defaults to `newest`.
    pub sort: Option<SortOrder>,
    /// 1-indexed page number; defaults to 1.
    pub page: Option<usize>,
    /// Page size; defaults to 20, capped at 100.
    pub limit: Option<usize>,
}

// ── Result Page ─────────────────────────────────────────────────────

/// One page of query results plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPage<T> {
    /// The records on this page, in sort order.
    pub items: Vec<T>,
    /// Number of records matching the filters, across all pages.
    pub total: usize,
    /// The 1-indexed page that was served.
    pub page: usize,
    /// The effective page size after defaulting and clamping.
    pub limit: usize,
    /// Ceiling of `total / limit`; zero when nothing matched.
    pub total_pages: usize,
}

impl<T> QueryPage<T> {
    /// Map the items while preserving the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryPage<U> {
        QueryPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

// ── Pipeline ────────────────────────────────────────────────────────

fn matches(bounty: &Bounty, query: &BountyQuery) -> bool {
    if let Some(q) = &query.q {
        let needle = q.to_lowercase();
        let in_title = bounty.title.to_lowercase().contains(&needle);
        let in_description = bounty.description.to_lowercase().contains(&needle);
        if !in_title && !in_description {
            return false;
        }
    }
    if let Some(category) = &query.category {
        if &bounty.category != category {
            return false;
        }
    }
    if let Some(status) = query.status {
        if bounty.status != status {
            return false;
        }
    }
    if let Some(min) = query.min_reward {
        if bounty.reward.amount < min {
            return false;
        }
    }
    if let Some(max) = query.max_reward {
        if bounty.reward.amount > max {
            return false;
        }
    }
    true
}

fn sort(bounties: &mut [Bounty], order: SortOrder) {
    match order {
        SortOrder::Newest => bounties.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::RewardHigh => bounties.sort_by(|a, b| b.reward.amount.cmp(&a.reward.amount)),
        SortOrder::RewardLow => bounties.sort_by(|a, b| a.reward.amount.cmp(&b.reward.amount)),
        SortOrder::Deadline => bounties.sort_by(|a, b| a.deadline.cmp(&b.deadline)),
    }
}

/// Run the full filter → sort → paginate pipeline over a snapshot.
///
/// A `page` beyond the last yields an empty `items` with the metadata
/// intact, so clients can detect the end of the result set without a
/// distinct error path.
pub fn run_query(snapshot: Vec<Bounty>, query: &BountyQuery) -> QueryPage<Bounty> {
    let mut filtered: Vec<Bounty> = snapshot.into_iter().filter(|b| matches(b, query)).collect();
    sort(&mut filtered, query.sort.unwrap_or_default());

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let page = query.page.unwrap_or(1).max(1);
    let total = filtered.len();
    let total_pages = total.div_ceil(limit);

    // Saturate: an absurd client-supplied page must not overflow the
    // offset arithmetic.
    let items = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    QueryPage {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}
