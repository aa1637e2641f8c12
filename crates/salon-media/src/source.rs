//! Encoded image payloads and the selection gate.
//!
//! An [`ImageSource`] holds the *encoded* bytes of a user-selected file.
//! Validation happens before any pixel decode: an oversized or wrong-type
//! file is rejected without touching the image decoder.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use salon_shared::constants::MAX_AVATAR_BYTES;

use crate::error::AvatarError;

/// Accepted avatar container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarFormat {
    Png,
    Jpeg,
}

impl AvatarFormat {
    /// MIME type string for this format.
    pub fn mime(self) -> &'static str {
        match self {
            AvatarFormat::Png => "image/png",
            AvatarFormat::Jpeg => "image/jpeg",
        }
    }

    /// Parse a declared MIME type.  Only the two accepted types match.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(AvatarFormat::Png),
            "image/jpeg" => Some(AvatarFormat::Jpeg),
            _ => None,
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            AvatarFormat::Png => image::ImageFormat::Png,
            AvatarFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// An encoded image payload selected by the user, validated but not yet
/// pixel-decoded.  Discarded after crop commit or on re-selection.
#[derive(Debug, Clone)]
pub struct ImageSource {
    bytes: Vec<u8>,
    format: AvatarFormat,
}

impl ImageSource {
    /// Gate a selected file into the pipeline.
    ///
    /// Rejects `SizeExceeded` when the payload is over 2 MiB and
    /// `UnsupportedType` when the declared MIME type is not PNG or JPEG.
    /// Neither rejection decodes the bytes.
    pub fn validate_selection(bytes: Vec<u8>, declared_mime: &str) -> Result<Self, AvatarError> {
        let size = bytes.len() as u64;
        if size > MAX_AVATAR_BYTES {
            return Err(AvatarError::SizeExceeded { size });
        }
        let format = AvatarFormat::from_mime(declared_mime).ok_or_else(|| {
            AvatarError::UnsupportedType {
                mime: declared_mime.to_string(),
            }
        })?;
        Ok(Self { bytes, format })
    }

    /// Re-hydrate a source from a `data:` URL, applying the same selection
    /// checks as [`ImageSource::validate_selection`].
    pub fn from_data_url(url: &str) -> Result<Self, AvatarError> {
        let (mime, payload) = split_data_url(url)?;
        let bytes = STANDARD.decode(payload)?;
        Self::validate_selection(bytes, mime)
    }

    /// Encode as a self-contained `data:` URL.
    pub fn to_data_url(&self) -> String {
        encode_data_url(self.format, &self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> AvatarFormat {
        self.format
    }
}

/// The committed avatar: a square encoded image in the source's container
/// format.  Immutable once produced.
#[derive(Debug, Clone)]
pub struct AvatarImage {
    pub(crate) bytes: Vec<u8>,
    pub(crate) format: AvatarFormat,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl AvatarImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> AvatarFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encode as a `data:` URL, the representation stored in documents.
    pub fn to_data_url(&self) -> String {
        encode_data_url(self.format, &self.bytes)
    }
}

fn encode_data_url(format: AvatarFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes))
}

fn split_data_url(url: &str) -> Result<(&str, &str), AvatarError> {
    let rest = url.strip_prefix("data:").ok_or(AvatarError::InvalidDataUrl)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or(AvatarError::InvalidDataUrl)?;
    Ok((mime, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        use image::{ImageBuffer, Rgba};
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(4, 4, |_, _| Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn oversized_file_rejected_without_decode() {
        // A 3 MiB "PNG" of garbage bytes: the size gate fires before
        // anything looks at them.
        let bytes = vec![0u8; 3 * 1024 * 1024];
        match ImageSource::validate_selection(bytes, "image/png") {
            Err(AvatarError::SizeExceeded { size }) => {
                assert_eq!(size, 3 * 1024 * 1024);
            }
            other => panic!("expected SizeExceeded, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_type_rejected() {
        let err = ImageSource::validate_selection(tiny_png(), "image/gif").unwrap_err();
        assert!(matches!(err, AvatarError::UnsupportedType { .. }));
        let err = ImageSource::validate_selection(tiny_png(), "application/pdf").unwrap_err();
        assert!(matches!(err, AvatarError::UnsupportedType { .. }));
    }

    #[test]
    fn exactly_two_mib_is_accepted() {
        let bytes = vec![0u8; MAX_AVATAR_BYTES as usize];
        assert!(ImageSource::validate_selection(bytes, "image/jpeg").is_ok());
    }

    #[test]
    fn data_url_round_trip() {
        let source = ImageSource::validate_selection(tiny_png(), "image/png").unwrap();
        let url = source.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));

        let restored = ImageSource::from_data_url(&url).unwrap();
        assert_eq!(restored.bytes(), source.bytes());
        assert_eq!(restored.format(), AvatarFormat::Png);
    }

    #[test]
    fn malformed_data_urls_rejected() {
        assert!(matches!(
            ImageSource::from_data_url("image/png;base64,AAAA"),
            Err(AvatarError::InvalidDataUrl)
        ));
        assert!(matches!(
            ImageSource::from_data_url("data:image/png,AAAA"),
            Err(AvatarError::InvalidDataUrl)
        ));
        assert!(matches!(
            ImageSource::from_data_url("data:image/png;base64,not-base64!!!"),
            Err(AvatarError::Base64(_))
        ));
    }
}
