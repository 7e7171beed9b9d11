//! Practice notes API client
//!
//! Thin, typed wrappers over the notes REST service used by the e2e suite:
//! - [`ApiClient`] merges request defaults, prefixes the API root and returns
//!   every status as a value unless the caller opts into failure
//! - [`AuthApi`] and [`NotesApi`] map domain operations onto endpoints
//! - validators turn unexpected response shapes into [`ApiError::Assertion`]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod notes;
pub mod response;
pub mod types;
pub mod validate;

pub use auth::AuthApi;
pub use client::{ApiClient, RequestBody, RequestOptions, AUTH_HEADER};
pub use config::{ApiConfig, Endpoints};
pub use error::{ApiError, ApiResult};
pub use notes::NotesApi;
pub use response::{ApiResponse, ResponseValue};
pub use types::*;
