use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use flow_core::employee::Employee;

use super::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Login email of the employee
    pub sub: String,
    pub role: String,
    pub id: i64,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.claims.exp)
            .ok()
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Signs and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl_seconds: i64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub fn issue(&self, employee: &Employee) -> Result<IssuedToken, AuthError> {
        let exp = (Utc::now() + Duration::seconds(self.ttl_seconds)).timestamp();
        let claims = TokenClaims {
            sub: employee.email.clone(),
            role: employee.access_level.as_str().to_string(),
            id: employee.id,
            exp: usize::try_from(exp).unwrap_or(0),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| AuthError::Storage(format!("Failed to sign token: {}", err)))?;

        Ok(IssuedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|decoded| decoded.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(err.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use flow_core::employee::AccessLevel;

    use super::*;

    fn employee() -> Employee {
        Employee {
            id: 7,
            name: "Ana".to_string(),
            title: "Dev".to_string(),
            email: "ana@x.com".to_string(),
            access_level: AccessLevel::Admin,
        }
    }

    #[test]
    fn issued_token_carries_employee_claims() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        let issued = issuer.issue(&employee()).unwrap();

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "ana@x.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.id, 7);
        assert!(issued.expires_at().unwrap() > Utc::now());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", -120);
        let issued = issuer.issue(&employee()).unwrap();
        assert!(matches!(issuer.verify(&issued.token), Err(AuthError::Expired)));
    }

    #[test]
    fn foreign_or_tampered_tokens_are_rejected() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        let issued = issuer.issue(&employee()).unwrap();

        let other = TokenIssuer::new("other-secret", 3600);
        assert!(matches!(
            other.verify(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));

        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert!(matches!(
            issuer.verify(&tampered),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer.verify("not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
