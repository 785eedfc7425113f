//! HTTP client for the finscope backend.
//!
//! All endpoints go through one [`ApiClient`]: it owns the connection pool,
//! the base URL and the current bearer token. Authorized calls check token
//! expiry locally before sending anything; an expired, missing or rejected
//! token always surfaces as [`ApiError::Unauthorized`], which the caller
//! turns into a session wipe and a trip back to the login screen.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiClientConfig};
pub use error::{ApiError, Result};
