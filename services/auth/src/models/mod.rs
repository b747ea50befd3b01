//! Authentication service models

pub mod refresh_token;
pub mod user;

// Re-export for convenience
pub use refresh_token::{NewRefreshToken, RefreshToken, SessionResponse};
pub use user::{LoginRequest, NewUser, RegisterRequest, User, UserResponse};
