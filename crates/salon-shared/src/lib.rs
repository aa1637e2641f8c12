//! # salon-shared
//!
//! Types, constants, form validation and error enums shared by every crate
//! in the Salon workspace.  This crate is deliberately free of I/O: the
//! remote store client lives in `salon-store`, the image pipeline in
//! `salon-media` and the application flows in `salon-client`.

pub mod constants;
pub mod error;
pub mod types;
pub mod validation;

pub use error::{AuthError, ValidationError};
pub use types::{Topic, Uid};
