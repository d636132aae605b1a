use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::Role;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// The user the token was issued to.
    pub id: Uuid,
    /// Present on role-aware tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Why a token was rejected or could not be issued.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenError {
    /// Bad signature, bad encoding or missing claims.
    Invalid,
    /// Signature is fine but `exp` is in the past.
    Expired,
    /// Encoding failed on our side.
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "Invalid token"),
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::Signing(msg) => write!(f, "Failed to sign token: {}", msg),
        }
    }
}

/// How long tokens live, per issuing flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPolicy {
    pub register_ttl: Duration,
    pub login_ttl: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            register_ttl: Duration::hours(1),
            login_ttl: Duration::hours(23),
        }
    }
}

/// Issues and verifies HS256-signed tokens. Stateless apart from its keys.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    policy: TokenPolicy,
}

impl TokenService {
    pub fn new(secret: &str, policy: TokenPolicy) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            policy,
        }
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Signs a token for `user_id` that expires after `ttl`.
    pub fn issue(
        &self,
        user_id: Uuid,
        role: Option<Role>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            role,
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks signature and expiry and returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, TokenPolicy::default())
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service("test_secret_for_gen_verify");
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id, None, Duration::hours(1)).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, user_id);
        assert_eq!(claims.role, None);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_role_is_carried_in_claims() {
        let tokens = service("test_secret_for_roles");
        let token = tokens
            .issue(Uuid::new_v4(), Some(Role::Admin), Duration::minutes(5))
            .unwrap();
        assert_eq!(tokens.verify(&token).unwrap().role, Some(Role::Admin));
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service("test_secret_for_expiration");
        let expired = tokens
            .issue(Uuid::new_v4(), Some(Role::User), Duration::hours(-2))
            .unwrap();
        assert_eq!(tokens.verify(&expired), Err(TokenError::Expired));
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = service("one_secret")
            .issue(Uuid::new_v4(), None, Duration::hours(1))
            .unwrap();
        assert_eq!(
            service("a_completely_different_secret").verify(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_garbage_and_foreign_payloads_are_invalid() {
        let tokens = service("test_secret");
        assert_eq!(tokens.verify("not.a.token"), Err(TokenError::Invalid));
        assert_eq!(tokens.verify(""), Err(TokenError::Invalid));

        // Well-signed but without an `id` claim.
        #[derive(Serialize)]
        struct Foreign {
            sub: String,
            exp: usize,
        }
        let foreign = encode(
            &Header::default(),
            &Foreign {
                sub: "1234567890".into(),
                exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            },
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();
        assert_eq!(tokens.verify(&foreign), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tokens_for_same_user_differ_by_ttl() {
        let tokens = service("test_secret");
        let user_id = Uuid::new_v4();
        let policy = tokens.policy();
        let short = tokens.issue(user_id, Some(Role::User), policy.register_ttl).unwrap();
        let long = tokens.issue(user_id, Some(Role::User), policy.login_ttl).unwrap();
        assert_ne!(short, long);
        assert_eq!(tokens.verify(&short).unwrap().id, tokens.verify(&long).unwrap().id);
    }
}
