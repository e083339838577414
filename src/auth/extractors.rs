use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The identity `AuthMiddleware` resolves for a request.
///
/// Carries the raw token alongside the user so logout can revoke exactly the
/// session that made the call.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

/// Extracts the resolved identity from request extensions.
///
/// Intended for routes behind `AuthMiddleware`, which validates the `x-auth`
/// token and inserts the `Identity`. If the identity is missing (middleware
/// not applied, or an internal error after auth), this rejects with the
/// uniform 401.
#[derive(Debug)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError; // AppError converts via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().cloned() {
            Some(identity) => ready(Ok(AuthenticatedUser(identity))),
            None => ready(Err(AppError::unauthenticated().into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        let identity = Identity {
            user_id: Uuid::new_v4(),
            email: "darren@example.com".to_string(),
            token: "token".to_string(),
        };
        req.extensions_mut().insert(identity.clone());

        let mut payload = Payload::None;
        let extracted = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(extracted.0.user_id, identity.user_id);
        assert_eq!(extracted.0.email, identity.email);
        assert_eq!(extracted.0.token, identity.token);
    }

    #[actix_rt::test]
    async fn test_extractor_failure_without_identity() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let result = AuthenticatedUser::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let response = result.unwrap_err().error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
