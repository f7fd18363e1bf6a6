//! JWT bearer token utilities.
//!
//! Tokens carry the caller's identity and role. Verification uses HS256 with
//! a shared secret; signing is exposed for tooling and tests, token issuance
//! itself lives outside this service.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric account id, as a string)
    pub sub: String,
    /// Role name as issued by the identity provider
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Configuration for JWT token signing and validation.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Access token expiration in seconds
    pub access_token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Default access token lifetime (2 hours).
pub const DEFAULT_ACCESS_TOKEN_EXPIRY_SECS: i64 = 7200;

impl JwtConfig {
    /// Creates a new JwtConfig from a shared secret.
    pub fn new(secret: &str, access_token_expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, access_token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a new JwtConfig from a shared secret with custom leeway.
    pub fn with_leeway(
        secret: &str,
        access_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("Secret must not be empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Signs a token for the given account id and role.
    pub fn generate_access_token(
        &self,
        account_id: i64,
        role: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<String, JwtError> {
        self.generate_token(account_id, role, email, name, self.access_token_expiry_secs)
    }

    fn generate_token(
        &self,
        account_id: i64,
        role: &str,
        email: Option<&str>,
        name: Option<&str>,
        expiry_secs: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            role: role.to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts the numeric account id from validated claims.
pub fn extract_account_id(claims: &Claims) -> Result<i64, JwtError> {
    claims
        .sub
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig::with_leeway("test_secret_key_for_jwt_testing_12345", 900, 0)
            .expect("valid secret")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = create_test_config();

        let token = config
            .generate_access_token(7, "technician", Some("tech@example.com"), Some("Tec"))
            .unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "technician");
        assert_eq!(claims.email.as_deref(), Some("tech@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Tec"));
    }

    #[test]
    fn test_expired_token() {
        let mut config = create_test_config();
        config.access_token_expiry_secs = -120;

        let token = config.generate_access_token(1, "client", None, None).unwrap();
        let result = config.validate_token(&token);

        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = create_test_config();
        let other = JwtConfig::new("a_completely_different_secret", 900).unwrap();

        let token = other.generate_access_token(1, "administrator", None, None).unwrap();

        assert!(matches!(
            config.validate_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_token("not_a_jwt").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(JwtConfig::new("", 60), Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_extract_account_id() {
        let config = create_test_config();
        let token = config.generate_access_token(42, "client", None, None).unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(extract_account_id(&claims).unwrap(), 42);
    }

    #[test]
    fn test_extract_account_id_rejects_non_numeric() {
        let claims = Claims {
            sub: "abc".to_string(),
            role: "client".to_string(),
            email: None,
            name: None,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(extract_account_id(&claims), Err(JwtError::InvalidToken)));

        let claims = Claims {
            sub: "0".to_string(),
            ..claims
        };
        assert!(extract_account_id(&claims).is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", create_test_config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test_secret"));
    }
}
