// Request extractors enforcing authentication

pub mod auth;

pub use auth::JwtAuth;
