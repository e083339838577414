pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

/// Registers the authenticated API surface. Meant to be mounted inside a
/// scope wrapped with `AuthMiddleware`; the middleware leaves signup and
/// login open.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::signup)
            .service(users::login)
            .service(users::me)
            .service(users::logout),
    )
    .service(
        web::scope("/todos")
            .service(todos::create_todo)
            .service(todos::list_todos)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}
