//! Data models for conference-catalog entities.
//!
//! This module contains the data structures exchanged with the catalog
//! service:
//!
//! - `Conference` and its nested pieces: `VenueMap`, `Speaker`,
//!   `Stakeholder`, `DesignTheme`
//! - `UserAccount`, `Role`: account rows for the admin user table

pub mod conference;
pub mod user;

pub use conference::{Conference, DesignTheme, Speaker, Stakeholder, VenueMap};
pub use user::{Role, UserAccount};
