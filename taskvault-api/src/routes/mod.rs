/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and profile
/// - `setting`: Profile update
/// - `todo`: Todo CRUD

pub mod auth;
pub mod health;
pub mod setting;
pub mod todo;
