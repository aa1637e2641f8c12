//! # salon-media
//!
//! The avatar image pipeline: file validation, interactive crop region
//! bookkeeping, and the commit step that renders a rotated sub-rectangle of
//! the source image onto an offscreen surface and re-encodes it.
//!
//! The pipeline is pure once invoked: no I/O beyond the in-memory decode and
//! encode, and `commit` is deterministic for identical inputs.

pub mod crop;
pub mod source;

mod error;

pub use crop::{commit, update_region, CropDelta, CropRegion};
pub use error::AvatarError;
pub use source::{AvatarFormat, AvatarImage, ImageSource};
