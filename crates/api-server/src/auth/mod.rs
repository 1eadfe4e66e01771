//! Authorization layer: password hashing, bearer tokens and access checks.

mod extract;
mod jwt;
pub mod password;
mod policy;
mod service;

pub use jwt::TokenIssuer;
pub use policy::{ensure_access, Caller};
pub use service::{AuthError, AuthService, Registration};
