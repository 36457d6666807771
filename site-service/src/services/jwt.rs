use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// HS256 token issuer/validator for the admin panel.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

/// Claims carried by an admin access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject (admin username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_hours: config.expiration_hours,
        }
    }

    pub fn generate_token(&self, username: &str) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiration_hours);

        let claims = AdminClaims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<AdminClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    pub fn expiration_seconds(&self) -> i64 {
        self.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn service(secret: &str, hours: i64) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: Secret::new(secret.to_string()),
            expiration_hours: hours,
        })
    }

    #[test]
    fn token_round_trips_subject() {
        let jwt = service("test-secret-with-enough-length-1234", 24);
        let token = jwt.generate_token("admin").unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = service("secret-a-secret-a-secret-a-secret", 24)
            .generate_token("admin")
            .unwrap();
        assert!(service("secret-b-secret-b-secret-b-secret", 24)
            .validate_token(&token)
            .is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = service("test-secret-with-enough-length-1234", -2);
        let token = jwt.generate_token("admin").unwrap();
        assert!(jwt.validate_token(&token).is_err());
    }
}
