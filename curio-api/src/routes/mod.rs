/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, me)
/// - `collections`: Collection management
/// - `items`: Item management and search
/// - `share`: Share code generation and public shared views

pub mod auth;
pub mod collections;
pub mod health;
pub mod items;
pub mod share;
