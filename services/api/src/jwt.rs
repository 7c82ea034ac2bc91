//! JWT service for token issuance, validation, and revocation
//!
//! Tokens are signed with HS256 using a process-wide secret and carry the
//! subject's identity plus an absolute expiry. Revocation goes through a
//! Redis-backed denylist whose entries expire together with the token they
//! block, so the set can never outgrow the population of live tokens.

use anyhow::Result;
use common::cache::RedisPool;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::user::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 30 minutes)
    pub token_ttl: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret (required)
    /// - `JWT_TOKEN_TTL`: token lifetime in seconds (default: 1800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let token_ttl = std::env::var("JWT_TOKEN_TTL")
            .unwrap_or_else(|_| "1800".to_string())
            .parse()
            .unwrap_or(1800);

        Ok(JwtConfig { secret, token_ttl })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the subject
    pub sub: String,
    /// Stable external identifier of the subject
    pub uid: Uuid,
    /// Role at issuance time; the live record is re-fetched on resolve
    pub role: String,
    /// Email of the subject
    pub email: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue a token for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = unix_now()?;

        let claims = Claims {
            sub: user.username.clone(),
            uid: user.uuid,
            role: user.role.as_str().to_string(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.config.token_ttl,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token signature and expiry and return the claims
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Check whether a token has been revoked
    ///
    /// The denylist is consulted before signature or expiry checks: a
    /// revoked token stays dead no matter what its claims say.
    pub async fn is_revoked(&self, redis: &RedisPool, token: &str) -> Result<bool> {
        let key = format!("revoked_token:{}", token);
        let result = redis.get(&key).await?;
        Ok(result.is_some())
    }

    /// Revoke a token (logout semantics)
    ///
    /// The denylist entry lives exactly as long as the token itself would
    /// have; a token past its expiry needs no entry at all.
    pub async fn revoke(&self, redis: &RedisPool, token: &str, claims: &Claims) -> Result<()> {
        let now = unix_now()?;
        let remaining = claims.exp.saturating_sub(now);
        if remaining == 0 {
            return Ok(());
        }

        let key = format!("revoked_token:{}", token);
        redis.set(&key, "1", Some(remaining)).await?;
        Ok(())
    }

    /// Get the configured token lifetime
    pub fn token_ttl(&self) -> u64 {
        self.config.token_ttl
    }
}

fn unix_now() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs();
    Ok(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, UserStatus};
    use chrono::Utc;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_ttl: 900,
        })
    }

    fn sample_user() -> User {
        User {
            id: 1,
            uuid: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_decode_round_trip() {
        let service = service();
        let user = sample_user();

        let token = service.issue(&user).unwrap();
        let claims = service.decode(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.uid, user.uuid);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp, claims.iat + 900);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service();
        let user = sample_user();
        let now = unix_now().unwrap();

        // Expired well past the validator's leeway window.
        let claims = Claims {
            sub: user.username.clone(),
            uid: user.uuid,
            role: "admin".to_string(),
            email: user.email.clone(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.decode(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = service();
        let token = service.issue(&sample_user()).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = parts[1].chars().rev().collect();
        let tampered = parts.join(".");

        assert!(service.decode(&tampered).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn config_from_env_reads_secret_and_ttl() {
        unsafe {
            std::env::set_var("JWT_SECRET", "env-secret");
            std::env::set_var("JWT_TOKEN_TTL", "60");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "env-secret");
        assert_eq!(config.token_ttl, 60);

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_TOKEN_TTL");
        }
    }

    #[test]
    #[serial_test::serial]
    fn config_from_env_requires_secret() {
        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
        assert!(JwtConfig::from_env().is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service().issue(&sample_user()).unwrap();
        let other = JwtService::new(JwtConfig {
            secret: "another-secret".to_string(),
            token_ttl: 900,
        });

        assert!(other.decode(&token).is_err());
    }
}
