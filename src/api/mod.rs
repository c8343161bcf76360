//! REST API client module for the conference-catalog service.
//!
//! This module provides the `ApiClient` for talking to the catalog API:
//! authentication, the admin check, and conference/user CRUD.
//!
//! The API uses bearer-token authentication; the token is obtained from the
//! `/login` endpoint and attached to every subsequent request.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
