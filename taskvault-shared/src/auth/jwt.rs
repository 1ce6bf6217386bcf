/// Session token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying a [`SessionClaim`]. The issuer is
/// built once with a [`TokenConfig`] (secret + TTL) and shared; it never reads
/// the environment itself.
///
/// # Failure kinds
///
/// [`TokenIssuer::verify`] reports exactly three verification failures so the
/// transport layer can answer each one with its own message:
///
/// - [`TokenError::InvalidSignature`]: tampered token or wrong secret
/// - [`TokenError::Expired`]: valid signature, past `exp`
/// - [`TokenError::Malformed`]: unparsable structure or missing/invalid claims
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::jwt::{TokenConfig, TokenIssuer};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new(TokenConfig {
///     secret: "your-secret-key-at-least-32-bytes-long".to_string(),
///     ttl_minutes: 60,
/// });
///
/// let user_id = Uuid::new_v4();
/// let token = issuer.issue(user_id, "a@x.com")?;
/// let claim = issuer.verify(&token)?;
/// assert_eq!(claim.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every session token
pub const TOKEN_ISSUER: &str = "user";

/// Error type for token operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    Signing(String),

    /// Signature does not match the payload (tampered or wrong secret)
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token signature is valid but `exp` has passed
    #[error("Token has expired")]
    Expired,

    /// Token structure or claims could not be accepted
    #[error("Malformed token: {0}")]
    Malformed(String),
}

/// Longest accepted token lifetime (one year)
pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Token configuration injected at construction time
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret; should be at least 32 bytes
    pub secret: String,

    /// Token lifetime in minutes, clamped to `0..=MAX_TTL_MINUTES`
    pub ttl_minutes: i64,
}

/// Verified session claim
///
/// Reconstructed from the token on every authenticated request and passed
/// explicitly to the services that need it. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaim {
    /// Authenticated user
    #[serde(rename = "userID")]
    pub user_id: Uuid,

    /// Email at the time of login
    pub email: String,

    /// Unique claim id
    pub jti: Uuid,

    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaim {
    /// Builds a fresh claim valid from `now` for `ttl`
    pub fn new(user_id: Uuid, email: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id,
            email: email.into(),
            jti: Uuid::new_v4(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the claim has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Mints and validates signed session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer from its configuration
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::minutes(config.ttl_minutes.clamp(0, MAX_TTL_MINUTES)),
        }
    }

    /// Configured token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` valid from now
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claim = SessionClaim::new(user_id, email, now, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claim, &self.encoding_key)
            .map_err(|e| TokenError::Signing(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its claim
    ///
    /// Checks, in order: structure, signature, expiry, not-before and issuer.
    /// No leeway is applied to `exp`/`nbf`.
    pub fn verify(&self, token: &str) -> Result<SessionClaim, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss"]);

        let token_data =
            decode::<SessionClaim>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}
