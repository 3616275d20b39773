//! # Authentication & Authorization Middleware
//!
//! Bearer token middleware with role-based access control.
//!
//! ## Token Format
//!
//! Bearer tokens encode role and user identity:
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}   — standard format
//! Bearer {secret}                     — legacy format (treated as admin)
//! ```
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into
//! the request extensions. Handlers extract it via the
//! `FromRequestParts` impl. Lifecycle handlers also need a concrete
//! user binding — [`require_user`] turns the identity into the
//! `UserId` the state machine treats as the actor.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

use taskbounty_core::UserId;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── Role ────────────────────────────────────────────────────────────

/// Roles in the marketplace, ordered by privilege level.
///
/// The `Ord` derivation respects variant declaration order:
/// `User < Arbiter < Admin`. This enables `>=` comparison for
/// role-based access checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A marketplace participant: posts bounties, applies, delivers.
    User,
    /// Can resolve disputed bounties in addition to participating.
    Arbiter,
    /// Full access, including wallet deposits.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Arbiter => "arbiter",
            Self::Admin => "admin",
        }
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────

/// Identity of the authenticated caller, extracted from the auth
/// context and available to all route handlers via Axum's
/// `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role in the system.
    pub role: Role,
    /// The caller's user ID. `None` for legacy admin tokens, which
    /// carry no user binding.
    pub user_id: Option<UserId>,
}

impl CallerIdentity {
    /// Check if the caller has at least the given minimum role.
    ///
    /// Since `Role` derives `Ord` with `User < Arbiter < Admin`, this
    /// is a single comparison.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }
}

/// Axum `FromRequestParts` implementation for `CallerIdentity`.
///
/// Extracts the identity that the auth middleware injected into
/// extensions. Returns 401 if no identity is present (middleware
/// didn't run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller has at least the required role.
/// Returns 403 Forbidden if the caller's role is insufficient.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

/// Return the caller's user binding, which lifecycle transitions need
/// to attribute the action to a concrete actor.
///
/// Legacy admin tokens authenticate without a user ID; they can manage
/// wallets but cannot act as a participant.
pub fn require_user(caller: &CallerIdentity) -> Result<UserId, AppError> {
    caller.user_id.ok_or_else(|| {
        AppError::Forbidden("this operation requires a token bound to a user id".into())
    })
}

// ── Token Validation ────────────────────────────────────────────────

/// Constant-time comparison of bearer tokens.
///
/// Prevents timing side-channels that could reveal token length or
/// prefix. When lengths differ, performs a dummy comparison to avoid
/// leaking length information through timing variance.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        // Dummy comparison to keep timing constant regardless of length match.
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse the bearer token in format `{role}:{user_id}:{secret}` or
/// `{secret}` (legacy).
///
/// Legacy tokens (without a role prefix) are treated as `admin` with
/// no user binding.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.len() {
        // Legacy format: just the secret.
        1 => {
            if constant_time_token_eq(provided, expected_secret) {
                Ok(CallerIdentity {
                    role: Role::Admin,
                    user_id: None,
                })
            } else {
                Err("invalid bearer token".into())
            }
        }
        // Standard format: role:user_id:secret (user_id may be empty).
        3 => {
            let role_str = parts[0];
            let user_str = parts[1];
            let secret = parts[2];

            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }

            let role = match role_str {
                "admin" => Role::Admin,
                "arbiter" => Role::Arbiter,
                "user" => Role::User,
                other => return Err(format!("unknown role: {other}")),
            };

            let user_id = if user_str.is_empty() {
                None
            } else {
                Some(UserId::from_uuid(
                    user_str
                        .parse::<Uuid>()
                        .map_err(|e| format!("invalid user_id: {e}"))?,
                ))
            };

            Ok(CallerIdentity { role, user_id })
        }
        _ => Err("invalid token format — expected {role}:{user_id}:{secret} or {secret}".into()),
    }
}

// ── Middleware ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value to prevent credential
/// leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Extract and validate the Bearer token from the Authorization header.
///
/// Parses the token to extract [`CallerIdentity`] (role + user
/// binding) and injects it into request extensions for downstream
/// handlers.
///
/// When `AuthConfig.token` is `None`, all requests are allowed with an
/// `Admin` identity (auth disabled / development mode).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            // Auth disabled — inject an Admin identity for full access.
            request.extensions_mut().insert(CallerIdentity {
                role: Role::Admin,
                user_id: None,
            });
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Build a minimal router with the auth middleware and a simple handler.
    fn test_app(token: Option<String>) -> Router {
        let auth_config = AuthConfig { token };
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth_config))
    }

    #[tokio::test]
    async fn valid_bearer_token_accepted() {
        let app = test_app(Some("my-secret".to_string()));

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer my-secret")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let app = test_app(Some("my-secret".to_string()));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        assert!(err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("missing"));
    }

    #[tokio::test]
    async fn invalid_token_rejected() {
        let app = test_app(Some("my-secret".to_string()));

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer wrong-token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let app = test_app(Some("my-secret".to_string()));

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn auth_disabled_allows_all_requests() {
        let app = test_app(None);

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn middleware_user_token_accepted() {
        let app = test_app(Some("my-secret".to_string()));

        let request = Request::builder()
            .uri("/test")
            .header(
                "Authorization",
                "Bearer user:550e8400-e29b-41d4-a716-446655440000:my-secret",
            )
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn middleware_unknown_role_rejected() {
        let app = test_app(Some("my-secret".to_string()));

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer superadmin::my-secret")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn constant_time_eq_identical_tokens() {
        assert!(constant_time_token_eq(
            "secret-token-123",
            "secret-token-123"
        ));
    }

    #[test]
    fn constant_time_eq_rejects_prefix() {
        assert!(!constant_time_token_eq("secret", "secret-token-123"));
    }

    #[test]
    fn constant_time_eq_rejects_empty() {
        assert!(!constant_time_token_eq("", "secret-token-123"));
    }

    #[test]
    fn role_ordering_is_correct() {
        assert!(Role::User < Role::Arbiter);
        assert!(Role::Arbiter < Role::Admin);
    }

    #[test]
    fn has_role_admin_has_everything() {
        let admin = CallerIdentity {
            role: Role::Admin,
            user_id: None,
        };
        assert!(admin.has_role(Role::User));
        assert!(admin.has_role(Role::Arbiter));
        assert!(admin.has_role(Role::Admin));
    }

    #[test]
    fn has_role_user_only_has_own_level() {
        let user = CallerIdentity {
            role: Role::User,
            user_id: Some(UserId::new()),
        };
        assert!(user.has_role(Role::User));
        assert!(!user.has_role(Role::Arbiter));
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn require_role_passes_for_sufficient_role() {
        let caller = CallerIdentity {
            role: Role::Arbiter,
            user_id: Some(UserId::new()),
        };
        assert!(require_role(&caller, Role::User).is_ok());
    }

    #[test]
    fn require_role_fails_for_insufficient_role() {
        let caller = CallerIdentity {
            role: Role::User,
            user_id: Some(UserId::new()),
        };
        assert!(require_role(&caller, Role::Arbiter).is_err());
    }

    #[test]
    fn require_user_passes_for_bound_identity() {
        let id = UserId::new();
        let caller = CallerIdentity {
            role: Role::User,
            user_id: Some(id),
        };
        assert_eq!(require_user(&caller).unwrap(), id);
    }

    #[test]
    fn require_user_fails_for_legacy_admin() {
        let caller = CallerIdentity {
            role: Role::Admin,
            user_id: None,
        };
        assert!(matches!(
            require_user(&caller),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn parse_bearer_token_legacy_format() {
        let identity = parse_bearer_token("my-secret", "my-secret").unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn parse_bearer_token_user_with_id() {
        let identity = parse_bearer_token(
            "user:550e8400-e29b-41d4-a716-446655440000:my-secret",
            "my-secret",
        )
        .unwrap();
        assert_eq!(identity.role, Role::User);
        assert_eq!(
            identity.user_id.unwrap().to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn parse_bearer_token_arbiter_without_id() {
        let identity = parse_bearer_token("arbiter::my-secret", "my-secret").unwrap();
        assert_eq!(identity.role, Role::Arbiter);
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn parse_bearer_token_wrong_secret() {
        assert!(parse_bearer_token("admin::wrong", "my-secret").is_err());
    }

    #[test]
    fn parse_bearer_token_unknown_role() {
        let result = parse_bearer_token("superadmin::my-secret", "my-secret");
        assert!(result.unwrap_err().contains("unknown role"));
    }

    #[test]
    fn parse_bearer_token_invalid_uuid() {
        let result = parse_bearer_token("user:not-a-uuid:my-secret", "my-secret");
        assert!(result.unwrap_err().contains("invalid user_id"));
    }

    #[test]
    fn parse_bearer_token_two_parts_rejected() {
        assert!(parse_bearer_token("role:secret", "secret").is_err());
    }
}
