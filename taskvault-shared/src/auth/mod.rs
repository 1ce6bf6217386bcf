/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: session token issuing and verification
/// - [`middleware`]: Axum bearer-token middleware producing a [`jwt::SessionClaim`]
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::jwt::{TokenConfig, TokenIssuer};
/// use taskvault_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let issuer = TokenIssuer::new(TokenConfig {
///     secret: "a-secret-that-is-at-least-32-bytes!!".to_string(),
///     ttl_minutes: 60,
/// });
/// let token = issuer.issue(Uuid::new_v4(), "a@x.com")?;
/// let claim = issuer.verify(&token)?;
/// assert_eq!(claim.email, "a@x.com");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
