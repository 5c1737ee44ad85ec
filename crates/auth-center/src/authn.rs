use crate::errors::AuthError;
use crate::token::TokenCodec;
use async_trait::async_trait;
use fintrack_core_types::prelude::{Id, Subject, SubjectKind, Validate};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum AuthnInput {
    Bearer(String),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, input: AuthnInput) -> Result<Subject, AuthError>;
}

/// Verifies a signed bearer token and maps its claims onto a Subject.
/// Verification is pure: the same credential always resolves to the same
/// Subject.
pub struct TokenAuthenticator {
    codec: Arc<TokenCodec>,
}

impl TokenAuthenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, input: AuthnInput) -> Result<Subject, AuthError> {
        let AuthnInput::Bearer(token) = input;
        let claims = self.codec.verify(&token)?;

        let mut claim_map = serde_json::Map::new();
        claim_map.insert("iat".to_string(), claims.iat.into());
        claim_map.insert("exp".to_string(), claims.exp.into());

        let subject = Subject {
            kind: SubjectKind::User,
            subject_id: Id(claims.sub),
            email: claims.email,
            display_name: claims.name,
            claims: claim_map,
        };
        // A signed token with hollow claims is still not an identity.
        subject
            .validate()
            .map_err(|e| crate::errors::unauthenticated(&e.to_string()))?;
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn authentication_is_idempotent_for_one_credential() {
        let codec = Arc::new(TokenCodec::new(b"unit-test-secret", Duration::seconds(3600)));
        let token = codec.issue("user-1", "ada@example.com", "Ada").unwrap();
        let authenticator = TokenAuthenticator::new(codec);

        let first = authenticator
            .authenticate(AuthnInput::Bearer(token.clone()))
            .await
            .unwrap();
        let second = authenticator
            .authenticate(AuthnInput::Bearer(token))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.subject_id, Id("user-1".into()));
    }

    #[tokio::test]
    async fn token_with_empty_subject_claim_is_unauthenticated() {
        let codec = Arc::new(TokenCodec::new(b"unit-test-secret", Duration::seconds(3600)));
        let token = codec.issue("", "ada@example.com", "Ada").unwrap();
        let authenticator = TokenAuthenticator::new(codec);
        let err = authenticator
            .authenticate(AuthnInput::Bearer(token))
            .await
            .unwrap_err();
        assert_eq!(err.0.http_status, 401);
    }

    #[tokio::test]
    async fn garbage_credential_is_unauthenticated() {
        let codec = Arc::new(TokenCodec::new(b"unit-test-secret", Duration::seconds(3600)));
        let authenticator = TokenAuthenticator::new(codec);
        let err = authenticator
            .authenticate(AuthnInput::Bearer("not-a-token".into()))
            .await
            .unwrap_err();
        assert_eq!(err.0.http_status, 401);
    }
}
