/// Authentication utilities
///
/// This module provides the building blocks for user authentication:
///
/// - `jwt`: Token creation and validation (HS256)
/// - `password`: Argon2id password hashing
/// - `middleware`: Axum middleware that guards protected routes

pub mod jwt;
pub mod middleware;
pub mod password;
