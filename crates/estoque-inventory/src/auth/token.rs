//! Signed session tokens (HS256).

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

const ACCESS: &str = "access";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    pub token_type: String,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Issues and checks access tokens with a shared secret.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("access_lifetime_secs", &self.access_lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, access_lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            access_lifetime_secs,
        }
    }

    /// Returns the token and its expiry.
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: ACCESS.to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(format!("failed to sign token: {e}")))?;

        Ok((token, claims.expires_at()))
    }

    /// Checks signature, expiry and token type.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if token_data.claims.token_type != ACCESS {
            return Err(AuthError::InvalidToken("expected access token".to_string()));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_claims() {
        let jwt = JwtManager::new("secret", 3600);
        let (token, expires_at) = jwt.generate_access_token("u-1", "ana@empresa.com").unwrap();

        let claims = jwt.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "ana@empresa.com");
        assert_eq!(claims.expires_at(), expires_at);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = JwtManager::new("a", 3600)
            .generate_access_token("u-1", "ana@empresa.com")
            .unwrap();
        assert!(matches!(
            JwtManager::new("b", 3600).validate_access_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = JwtManager::new("secret", -10);
        let (token, _) = jwt.generate_access_token("u-1", "ana@empresa.com").unwrap();
        assert!(jwt.validate_access_token(&token).is_err());
    }
}
