//! Query engine behavior through `GET /v1/bounties`.
//!
//! Seeds a small catalog over HTTP, then exercises text search,
//! filters, reward bounds, sort orders, and pagination metadata.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use taskbounty_api::state::{AppConfig, AppState};

const SECRET: &str = "test-secret";

fn authed_app() -> axum::Router {
    let state = AppState::with_config(AppConfig {
        port: 8080,
        auth_token: Some(SECRET.to_string()),
    });
    taskbounty_api::app(state)
}

async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed(app: &axum::Router, title: &str, category: &str, reward: &str, deadline: &str) {
    seed_as(app, Uuid::new_v4(), title, category, reward, deadline).await;
}

async fn seed_as(
    app: &axum::Router,
    creator: Uuid,
    title: &str,
    category: &str,
    reward: &str,
    deadline: &str,
) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/bounties")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer user:{creator}:{SECRET}"))
                .body(Body::from(
                    serde_json::to_string(&json!({
                        "title": title,
                        "description": format!("Detailed brief for the {title} work item"),
                        "category": category,
                        "requirements": "See the linked acceptance checklist",
                        "deliverables": "Everything the checklist names",
                        "reward": reward,
                        "deadline": deadline
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

async fn query(app: &axum::Router, params: &str) -> serde_json::Value {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/v1/bounties?{params}"))
                .header("authorization", format!("Bearer admin::{SECRET}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn seeded_app() -> axum::Router {
    let app = authed_app();
    seed(&app, "Fix login flow", "engineering", "100", "2027-03-01T00:00:00Z").await;
    seed(&app, "Design landing page", "design", "250", "2027-01-15T00:00:00Z").await;
    seed(&app, "Write deployment docs", "writing", "75", "2027-02-01T00:00:00Z").await;
    seed(&app, "Fix payment retries", "engineering", "500", "2027-01-05T00:00:00Z").await;
    app
}

fn titles(page: &serde_json::Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn unfiltered_query_reports_full_totals() {
    let app = seeded_app().await;
    let page = query(&app, "").await;
    assert_eq!(page["total"], 4);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 20);
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["items"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn text_search_is_case_insensitive() {
    let app = seeded_app().await;
    let page = query(&app, "q=FIX").await;
    assert_eq!(page["total"], 2);
    for title in titles(&page) {
        assert!(title.contains("Fix"));
    }
}

#[tokio::test]
async fn category_and_reward_filters_compose() {
    let app = seeded_app().await;
    let page = query(&app, "category=engineering&min_reward=200").await;
    assert_eq!(page["total"], 1);
    assert_eq!(titles(&page), vec!["Fix payment retries"]);

    // Bounds are inclusive.
    let page = query(&app, "min_reward=100&max_reward=250").await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn status_filter_tracks_lifecycle() {
    let app = seeded_app().await;
    assert_eq!(query(&app, "status=OPEN").await["total"], 4);
    assert_eq!(query(&app, "status=COMPLETED").await["total"], 0);
}

#[tokio::test]
async fn sort_orders_are_honored() {
    let app = seeded_app().await;

    let page = query(&app, "sort=reward_high").await;
    assert_eq!(
        titles(&page),
        vec![
            "Fix payment retries",
            "Design landing page",
            "Fix login flow",
            "Write deployment docs"
        ]
    );

    let page = query(&app, "sort=reward_low").await;
    assert_eq!(titles(&page)[0], "Write deployment docs");

    let page = query(&app, "sort=deadline").await;
    assert_eq!(titles(&page)[0], "Fix payment retries");
    assert_eq!(titles(&page)[3], "Fix login flow");
}

#[tokio::test]
async fn pagination_reports_metadata_and_slices() {
    let app = seeded_app().await;

    let page = query(&app, "sort=reward_high&page=2&limit=3").await;
    assert_eq!(page["total"], 4);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["limit"], 3);
    assert_eq!(titles(&page), vec!["Write deployment docs"]);

    // Past the end: empty items, metadata intact.
    let page = query(&app, "page=5&limit=3").await;
    assert_eq!(page["total"], 4);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn my_created_view_is_scoped_to_the_caller() {
    let app = authed_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    seed_as(&app, alice, "Fix login flow", "engineering", "100", "2027-03-01T00:00:00Z").await;
    seed_as(&app, alice, "Write deployment docs", "writing", "75", "2027-02-01T00:00:00Z").await;
    seed_as(&app, bob, "Design landing page", "design", "250", "2027-01-15T00:00:00Z").await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/bounties/my/created")
                .header("authorization", format!("Bearer user:{alice}:{SECRET}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let mine = body_json(resp).await;
    let titles: Vec<&str> = mine
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Fix login flow"));
    assert!(!titles.contains(&"Design landing page"));

    // No awards yet, so nobody is assigned anything.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/bounties/my/assigned")
                .header("authorization", format!("Bearer user:{alice}:{SECRET}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn listing_rows_are_summaries_not_full_records() {
    let app = seeded_app().await;
    let page = query(&app, "limit=1").await;
    let row = &page["items"][0];
    assert!(row["title"].is_string());
    assert!(row["reward"].is_string());
    assert_eq!(row["applications"], 0);
    // Full-record fields are not exposed in listings.
    assert!(row.get("description").is_none());
    assert!(row.get("transition_log").is_none());
}
