/// Bearer-token authentication middleware for Axum
///
/// Extracts the token from `Authorization: Bearer <token>`, verifies it with
/// the injected [`TokenIssuer`] and stores the typed [`SessionClaim`] in the
/// request extensions. Handlers take it with `Extension<SessionClaim>` and
/// pass it on explicitly.
///
/// Every failure is a 401 with its own message.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use std::sync::Arc;
/// use taskvault_shared::auth::jwt::{SessionClaim, TokenConfig, TokenIssuer};
/// use taskvault_shared::auth::middleware::create_jwt_middleware;
///
/// async fn whoami(Extension(claim): Extension<SessionClaim>) -> String {
///     claim.email
/// }
///
/// let issuer = Arc::new(TokenIssuer::new(TokenConfig {
///     secret: "a-secret-that-is-at-least-32-bytes!!".to_string(),
///     ttl_minutes: 60,
/// }));
///
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn(create_jwt_middleware(issuer)));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{future::Future, pin::Pin, sync::Arc};
use tracing::debug;

use super::jwt::{SessionClaim, TokenError, TokenIssuer};
use crate::response::Response as Envelope;

/// Authentication failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Unauthorized: Missing Authorization header")]
    MissingHeader,

    /// Header present but not `Bearer <token>`
    #[error("Unauthorized: Invalid token format")]
    MalformedHeader,

    /// Signature does not match
    #[error("Unauthorized: Invalid token signature")]
    InvalidSignature,

    /// Token past its expiry
    #[error("Unauthorized: Token expired")]
    Expired,

    /// Unparsable token or missing/invalid claims
    #[error("Unauthorized: Invalid token claims")]
    InvalidClaims,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Expired => AuthError::Expired,
            TokenError::Malformed(_) | TokenError::Signing(_) => AuthError::InvalidClaims,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        Envelope::message(StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

/// Extracts the raw token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains("Bearer ") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Verifies the bearer token carried by `headers`
pub fn authenticate(issuer: &TokenIssuer, headers: &HeaderMap) -> Result<SessionClaim, AuthError> {
    let token = bearer_token(headers)?;
    let claim = issuer.verify(token)?;
    Ok(claim)
}

/// JWT authentication middleware
///
/// Adds the verified [`SessionClaim`] to the request extensions.
pub async fn jwt_auth_middleware(
    issuer: Arc<TokenIssuer>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claim = authenticate(&issuer, req.headers()).map_err(|e| {
        debug!(reason = %e, path = %req.uri().path(), "Rejected request");
        e
    })?;

    req.extensions_mut().insert(claim);

    Ok(next.run(req).await)
}

/// Boxed future returned by [`create_jwt_middleware`] closures
pub type AuthFuture = Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>>;

/// Creates a JWT middleware closure for `axum::middleware::from_fn`
pub fn create_jwt_middleware(issuer: Arc<TokenIssuer>) -> impl Fn(Request, Next) -> AuthFuture + Clone {
    move |req, next| {
        let issuer = issuer.clone();
        Box::pin(jwt_auth_middleware(issuer, req, next))
    }
}
