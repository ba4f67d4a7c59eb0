//! Session token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. Only the
//! signature and expiry are checked; there is no server-side revocation, so a
//! token stays valid for its full lifetime even if the user record changes.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskflow_core::policy::Principal;
use taskflow_core::roles::Role;
use taskflow_core::types::DbId;
use uuid::Uuid;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub role: Role,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4), for audit.
    pub jti: String,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in minutes (default: 60).
    pub expiry_mins: i64,
}

/// Default token expiry in minutes.
const DEFAULT_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let expiry_mins: i64 = std::env::var("JWT_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            expiry_mins,
        }
    }
}

/// Issues and validates session tokens.
///
/// Built once at startup from [`JwtConfig`]; the keys are immutable afterwards.
pub struct CredentialService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry_secs: i64,
}

impl CredentialService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::default(); // HS256, validates exp
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry_secs: config.expiry_mins * 60,
        }
    }

    /// Token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.expiry_secs
    }

    /// Sign a token bound to `user_id` and `role`.
    pub fn issue(&self, user_id: DbId, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            exp: now + self.expiry_secs,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Check signature and expiry, returning the embedded [`Claims`].
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }

    /// Resolve a token to the principal it was issued for.
    pub fn validate(&self, token: &str) -> Result<Principal, jsonwebtoken::errors::Error> {
        let claims = self.decode(token)?;
        Ok(Principal {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 60,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn test_issue_and_validate() {
        let service = CredentialService::new(&test_config());
        let token = service.issue(42, Role::Manager).expect("issue should succeed");

        let principal = service.validate(&token).expect("validation should succeed");
        assert_eq!(principal.user_id, 42);
        assert_eq!(principal.role, Role::Manager);
    }

    #[test]
    fn test_claims_expire_after_configured_lifetime() {
        let service = CredentialService::new(&test_config());
        let token = service.issue(7, Role::User).unwrap();

        let claims = service.decode(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.jti.is_empty());
        assert_eq!(service.expires_in(), 3600);
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let service = CredentialService::new(&test_config());
        let a = service.decode(&service.issue(1, Role::User).unwrap()).unwrap();
        let b = service.decode(&service.issue(1, Role::User).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_fails_without_leeway() {
        let config = test_config();
        let service = CredentialService::new(&config);

        // Expired a few seconds ago: inside jsonwebtoken's default 60s leeway,
        // so this only fails because leeway is zero.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: Role::User,
            exp: now - 5,
            iat: now - 3605,
            jti: Uuid::new_v4().to_string(),
        };

        let token = sign(&claims, &config.secret);
        assert!(service.validate(&token).is_err(), "expired token must fail validation");
    }

    #[test]
    fn test_different_secrets_fail() {
        let service_a = CredentialService::new(&JwtConfig {
            secret: "secret-alpha".to_string(),
            expiry_mins: 60,
        });
        let service_b = CredentialService::new(&JwtConfig {
            secret: "secret-bravo".to_string(),
            expiry_mins: 60,
        });

        let token = service_a.issue(1, Role::Admin).unwrap();
        assert!(
            service_b.validate(&token).is_err(),
            "token signed with a different secret must fail"
        );
    }

    #[test]
    fn test_unknown_role_in_claims_is_rejected() {
        let config = test_config();
        let service = CredentialService::new(&config);
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": 1,
            "role": "superuser",
            "exp": now + 600,
            "iat": now,
            "jti": "x",
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_token_fails() {
        let service = CredentialService::new(&test_config());
        assert!(service.validate("not-a-jwt").is_err());
    }
}
