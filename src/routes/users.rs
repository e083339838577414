use crate::{
    auth::{hash_password, AuthenticatedUser, CredentialsRequest},
    error::AppError,
    models::PublicUser,
    state::AppState,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new account.
///
/// Creates the user, opens a first session, and returns the session token in
/// the `x-auth` response header with `{id, email}` as the body.
///
/// ## Responses:
/// - `200 OK`: account created, `x-auth` header carries the session token.
/// - `400 Bad Request`: malformed email, password shorter than 6 characters,
///   or email already registered.
#[post("")]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let email = body.normalized_email();
    let password_hash = hash_password(&body.password)?;
    let user = state.users.create(&email, &password_hash).await?;

    // The session only becomes live once the token is persisted onto the
    // user; issuing alone is not enough.
    let token = state.tokens.issue(user.id)?;
    state.users.append_token(user.id, &token).await?;

    Ok(HttpResponse::Ok()
        .insert_header(("x-auth", token))
        .json(PublicUser::from(&user)))
}

/// Log in with email and password.
///
/// Opens a new session (one per device); existing sessions stay valid.
/// Unknown email and wrong password produce the same 400, so callers cannot
/// probe which addresses are registered.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let email = body.normalized_email();
    let user = state
        .users
        .find_by_credentials(&email, &body.password)
        .await?;

    let token = state.tokens.issue(user.id)?;
    state.users.append_token(user.id, &token).await?;

    Ok(HttpResponse::Ok()
        .insert_header(("x-auth", token))
        .json(PublicUser::from(&user)))
}

/// Return the authenticated caller's `{id, email}`.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    let identity = user.0;
    Ok(HttpResponse::Ok().json(PublicUser {
        id: identity.user_id,
        email: identity.email,
    }))
}

/// Log out the calling session.
///
/// Revokes exactly the token that authenticated this request; the user's
/// other sessions are untouched. Idempotent.
#[delete("/me/token")]
pub async fn logout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let identity = user.0;
    state
        .tokens
        .revoke(identity.user_id, &identity.token, state.users.as_ref())
        .await?;
    Ok(HttpResponse::Ok().finish())
}
