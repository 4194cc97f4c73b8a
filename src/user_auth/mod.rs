//! User registration, login and bearer-token verification.

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthResponse, LoginRequest, RegisterRequest, UserAuthService};
pub use token::{Claims, TokenIssuer};
