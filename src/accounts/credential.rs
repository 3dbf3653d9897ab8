use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;

/// Identity claims embedded in every issued credential. Tokens carry no
/// expiry; lifetime policy belongs to the signing service, not this core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub email: Option<String>,
    pub username: String,
    pub admin: bool,
}

/// Signs and verifies identity credentials with the secret injected at
/// startup. Built per request via `FromRef`, same as the rest of the state.
#[derive(Clone)]
pub struct CredentialIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl CredentialIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let token = encode(&Header::default(), claims, &self.encoding)?;
        debug!(username = %claims.username, "credential issued");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        // Tokens are time-unbound: no exp claim is embedded.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

impl FromRef<AppState> for CredentialIssuer {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            email: Some("ada@example.com".into()),
            username: "adalovelace".into(),
            admin: false,
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let issuer = CredentialIssuer::new("dev-secret");
        let token = issuer.issue(&claims()).expect("issue");
        let decoded = issuer.verify(&token).expect("verify");
        assert_eq!(decoded, claims());
    }

    #[test]
    fn token_carries_no_expiry_claim() {
        let issuer = CredentialIssuer::new("dev-secret");
        let token = issuer.issue(&claims()).expect("issue");
        let mut validation = Validation::default();
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let payload = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"dev-secret"),
            &validation,
        )
        .expect("decode raw payload")
        .claims;
        assert!(payload.get("exp").is_none());
        assert!(issuer.verify(&token).is_ok());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = CredentialIssuer::new("dev-secret");
        let other = CredentialIssuer::new("other-secret");
        let token = issuer.issue(&claims()).expect("issue");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn claims_may_omit_email() {
        let issuer = CredentialIssuer::new("dev-secret");
        let claims = Claims {
            email: None,
            username: "adalovelace".into(),
            admin: true,
        };
        let token = issuer.issue(&claims).expect("issue");
        let decoded = issuer.verify(&token).expect("verify");
        assert_eq!(decoded.email, None);
        assert!(decoded.admin);
    }
}
