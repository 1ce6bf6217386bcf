//! # TaskVault Shared Library
//!
//! Domain core of the TaskVault account service: credentials and session
//! tokens, the soft-delete-aware repository, the upload pipeline and the
//! use-case services. The HTTP server in `taskvault-api` only wires these
//! together.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, session tokens, bearer middleware
//! - `models`: User, Todo and File entities with typed filters
//! - `repository`: generic persistence contract (Postgres + in-memory)
//! - `db`: connection pool and migrations
//! - `storage`: blob store abstraction (S3 + in-memory)
//! - `upload`: data-URI decode/validate/store pipeline
//! - `services`: Register, Login, Profile, Settings and Todo orchestrators
//! - `response`, `validation`, `pagination`: envelope and request helpers

pub mod auth;
pub mod db;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod response;
pub mod services;
pub mod storage;
pub mod upload;
pub mod validation;

/// Current version of the TaskVault shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
