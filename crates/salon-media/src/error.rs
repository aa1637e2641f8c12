use thiserror::Error;

/// Errors produced by the avatar pipeline.
#[derive(Error, Debug)]
pub enum AvatarError {
    /// Selected file is larger than the 2 MiB limit.
    #[error("Image exceeds the size limit ({size} bytes)")]
    SizeExceeded { size: u64 },

    /// Selected file is not a PNG or JPEG.
    #[error("Unsupported image type: {mime}")]
    UnsupportedType { mime: String },

    /// The source bytes could not be decoded as a raster image.
    /// Terminal for the current crop attempt only.
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// A `data:` URL was syntactically invalid.
    #[error("Invalid data URL")]
    InvalidDataUrl,

    /// Base64 payload of a data URL failed to decode.
    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The crop region has a zero-pixel width or height.
    #[error("Crop region is empty")]
    EmptyRegion,
}
