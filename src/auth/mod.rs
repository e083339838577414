pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::{AuthenticatedUser, Identity};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService, ACCESS_AUTH};

/// Request payload shared by signup and login.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Must be a valid email address. Normalized (trimmed, lowercased)
    /// before any lookup or insert.
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

impl CredentialsRequest {
    /// Email comparison is case-insensitive: `A@x.com` and `a@x.com` are the
    /// same account.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
