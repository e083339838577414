use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::Method,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Per-request gate: resolves the `x-auth` token into a verified identity or
/// answers with a uniform 401 without ever reaching the inner service.
///
/// Resolution is delegated to `TokenService::resolve_identity`, so a missing
/// header, a bad signature, a malformed payload and a revoked token are all
/// indistinguishable to the client. On success the `Identity` is attached to
/// request extensions for the handlers; nothing persisted is ever mutated
/// here.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

/// Signup and login are the only routes inside the gate that must stay open.
fn is_public(req: &ServiceRequest) -> bool {
    let path = req.path();
    (path == "/users" && req.method() == Method::POST) || path == "/users/login"
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public(&req) {
                return service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body);
            }

            let token = req
                .headers()
                .get("x-auth")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            let Some(token) = token else {
                return Ok(reject(req, AppError::unauthenticated()));
            };

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                return Ok(reject(
                    req,
                    AppError::InternalServerError("application state not configured".into()),
                ));
            };

            match state
                .tokens
                .resolve_identity(&token, state.users.as_ref())
                .await
            {
                Ok(user) => {
                    req.extensions_mut().insert(Identity {
                        user_id: user.id,
                        email: user.email,
                        token,
                    });
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => Ok(reject(req, err)),
            }
        })
    }
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}
