use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime when no override is configured.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;

/// Reset tokens are valid for one hour from issuance.
pub const RESET_TOKEN_TTL_SECONDS: i64 = 3_600;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// The verified caller of an authenticated request.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub email: String,
}

/// Issues and verifies signed, time-bound credentials. Holds the signing
/// secret injected from configuration at startup; no ambient state.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiration_seconds: u64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiration_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_seconds,
        }
    }

    pub fn issue_session(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.expiration_seconds as i64)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Returns the decoded identity iff the signature is valid and the
    /// token has not expired. Any malformed or tampered input yields
    /// `None`; callers treat that as "unauthenticated", never as a crash.
    pub fn verify_session(&self, token: &str) -> Option<SessionIdentity> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .ok()?;
        let user_id = Uuid::parse_str(&data.claims.sub).ok()?;
        Some(SessionIdentity {
            user_id,
            email: data.claims.email,
        })
    }

    /// 32 random bytes, hex-encoded: 256 bits of entropy per token.
    pub fn mint_reset_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn test_session_round_trip() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.issue_session(user_id, "alice@x.com").unwrap();

        let identity = svc.verify_session(&token).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "alice@x.com");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc.issue_session(Uuid::new_v4(), "alice@x.com").unwrap();

        // Flip one character in the payload segment.
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        assert!(svc.verify_session(&tampered).is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue_session(Uuid::new_v4(), "a@x.com").unwrap();
        let other = TokenService::new("another-secret", 3600);
        assert!(other.verify_session(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let now = Utc::now();
        // Expired two hours ago, well past the default validation leeway.
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            email: "alice@x.com".to_string(),
            iat: (now - Duration::hours(3)).timestamp() as usize,
            exp: (now - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(svc.verify_session(&token).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(service().verify_session("not-a-jwt").is_none());
        assert!(service().verify_session("").is_none());
    }

    #[test]
    fn test_reset_token_entropy_and_shape() {
        let svc = service();
        let a = svc.mint_reset_token();
        let b = svc.mint_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
