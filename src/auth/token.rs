use crate::error::AppError;
use crate::models::User;
use crate::store::UserStore;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only access level issued today. Stored alongside each token entry so
/// other levels (e.g. password-reset tokens) can be added without a schema
/// change.
pub const ACCESS_AUTH: &str = "auth";

/// Payload signed into every auth token.
///
/// Tokens carry no expiry: a token is valid for exactly as long as its entry
/// remains in the owner's active-token set.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The id of the user the token was issued to.
    pub sub: Uuid,
    /// Access level, always `"auth"` for session tokens.
    pub access: String,
    /// Issue timestamp in epoch seconds.
    pub iat: usize,
    /// Unique token id, so two logins by the same user yield distinct tokens.
    pub jti: Uuid,
}

/// Issues and verifies opaque signed tokens.
///
/// The signing secret is injected at construction rather than read from the
/// environment, so tests can run with isolated secrets. Verification is a
/// two-step pipeline: the pure signature check (`verify`) and the store-backed
/// live-membership check (`resolve_identity`). Only the combination makes
/// logout effective, since a revoked token still carries a valid signature.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a new token for `user_id`.
    ///
    /// The caller must persist the token onto the user (`UserStore::append_token`)
    /// before the session is usable; `issue` alone does not activate it.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            access: ACCESS_AUTH.to_string(),
            iat: chrono::Utc::now().timestamp() as usize,
            jti: Uuid::new_v4(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("failed to sign token: {}", e)))
    }

    /// Checks signature and payload shape only. A token that passes `verify`
    /// may still have been revoked; callers needing a live identity must go
    /// through `resolve_identity`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are revoked by set-membership, not by expiry.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Resolves a token to its owning user: signature must verify, the access
    /// level must match, and the exact token must still be a member of the
    /// user's active-token set. Every failure collapses to the same 401.
    pub async fn resolve_identity(
        &self,
        token: &str,
        users: &dyn UserStore,
    ) -> Result<User, AppError> {
        let claims = self.verify(token)?;
        if claims.access != ACCESS_AUTH {
            return Err(AppError::unauthenticated());
        }
        users
            .find_by_id_and_token(claims.sub, token)
            .await?
            .ok_or_else(AppError::unauthenticated)
    }

    /// Removes the exact token entry from the user's set. Revoking a token
    /// that is already absent is a no-op success.
    pub async fn revoke(
        &self,
        user_id: Uuid,
        token: &str,
        users: &dyn UserStore,
    ) -> Result<(), AppError> {
        users.remove_token(user_id, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = TokenService::new("test_secret_roundtrip");
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.access, ACCESS_AUTH);
    }

    #[test]
    fn test_issued_tokens_are_unique() {
        let service = TokenService::new("test_secret_unique");
        let user_id = Uuid::new_v4();
        let first = service.issue(user_id).unwrap();
        let second = service.issue(user_id).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let issuer = TokenService::new("secret_one");
        let verifier = TokenService::new("secret_two");
        let token = issuer.issue(Uuid::new_v4()).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let service = TokenService::new("test_secret");
        assert!(service.verify("not-a-token").is_err());
        assert!(service.verify("").is_err());
    }

    #[actix_rt::test]
    async fn test_resolve_requires_live_membership() {
        let service = TokenService::new("test_secret_membership");
        let store = MemoryStore::new();
        let user = store.create("darren@example.com", "digest").await.unwrap();

        let token = service.issue(user.id).unwrap();

        // Correctly signed but never persisted: must be rejected.
        let err = service.resolve_identity(&token, &store).await;
        assert!(err.is_err());

        store.append_token(user.id, &token).await.unwrap();
        let resolved = service.resolve_identity(&token, &store).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[actix_rt::test]
    async fn test_revoked_token_is_rejected() {
        let service = TokenService::new("test_secret_revoke");
        let store = MemoryStore::new();
        let user = store.create("darren@example.com", "digest").await.unwrap();

        let token = service.issue(user.id).unwrap();
        store.append_token(user.id, &token).await.unwrap();
        assert!(service.resolve_identity(&token, &store).await.is_ok());

        service.revoke(user.id, &token, &store).await.unwrap();
        assert!(service.resolve_identity(&token, &store).await.is_err());

        // Revoking again is a no-op success.
        assert!(service.revoke(user.id, &token, &store).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_revoke_leaves_other_sessions_active() {
        let service = TokenService::new("test_secret_devices");
        let store = MemoryStore::new();
        let user = store.create("darren@example.com", "digest").await.unwrap();

        let phone = service.issue(user.id).unwrap();
        let laptop = service.issue(user.id).unwrap();
        store.append_token(user.id, &phone).await.unwrap();
        store.append_token(user.id, &laptop).await.unwrap();

        service.revoke(user.id, &phone, &store).await.unwrap();
        assert!(service.resolve_identity(&phone, &store).await.is_err());
        assert!(service.resolve_identity(&laptop, &store).await.is_ok());
    }
}
