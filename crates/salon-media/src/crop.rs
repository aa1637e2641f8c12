//! Crop region geometry and the commit step.
//!
//! Coordinates are a frequent source of silent corruption here: the
//! interactive layer reports the crop rectangle in *display* pixels while
//! the commit step needs *natural* (source-resolution) pixels, and rotation
//! changes the surface the rectangle is expressed in.  The scale conversion
//! is therefore an explicit function with its own tests, and `commit`
//! expects the region already in rotated-surface pixel space.

use image::{ImageBuffer, Rgba, RgbaImage};
use tracing::debug;

use crate::error::AvatarError;
use crate::source::{AvatarFormat, AvatarImage, ImageSource};

/// Smallest accepted zoom factor.  The contract is only "greater than
/// zero"; anything below this floor clamps up to it.
pub const ZOOM_FLOOR: f64 = 1e-3;

/// The user's crop selection over a source image.
///
/// `x`, `y`, `width`, `height` are in source-image pixel space (after
/// rotation, they address the rotated working surface).  `rotation_degrees`
/// stays normalised into `[0, 360)` and `zoom_factor` is always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_degrees: f64,
    pub zoom_factor: f64,
}

impl Default for CropRegion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation_degrees: 0.0,
            zoom_factor: 1.0,
        }
    }
}

impl CropRegion {
    /// Convert a rectangle reported in on-screen display pixels into
    /// natural source pixels.  `scale` is `natural_width / display_width`.
    pub fn scale_to_natural(self, scale: f64) -> Self {
        Self {
            x: self.x * scale,
            y: self.y * scale,
            width: self.width * scale,
            height: self.height * scale,
            ..self
        }
    }
}

/// The scale factor between the natural image width and its on-screen
/// display width.
pub fn display_scale(natural_width: u32, display_width: f64) -> f64 {
    natural_width as f64 / display_width
}

/// One interactive input event applied to the crop region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropDelta {
    /// Pointer drag, in the region's own pixel space.
    Pan { dx: f64, dy: f64 },
    /// Rotation slider, absolute degrees (any value; normalised on apply).
    Rotate { degrees: f64 },
    /// Zoom slider, absolute factor (clamped to stay positive).
    Zoom { factor: f64 },
    /// Selection rectangle resize.
    Resize { width: f64, height: f64 },
}

/// Pure region update, applied on every pointer or slider event.
pub fn update_region(current: CropRegion, delta: CropDelta) -> CropRegion {
    match delta {
        CropDelta::Pan { dx, dy } => CropRegion {
            x: current.x + dx,
            y: current.y + dy,
            ..current
        },
        CropDelta::Rotate { degrees } => CropRegion {
            rotation_degrees: degrees.rem_euclid(360.0),
            ..current
        },
        CropDelta::Zoom { factor } => CropRegion {
            zoom_factor: factor.max(ZOOM_FLOOR),
            ..current
        },
        CropDelta::Resize { width, height } => CropRegion {
            width,
            height,
            ..current
        },
    }
}

/// Render the crop selection to a finished avatar.
///
/// Decodes the source at natural resolution, rotates it about its centre
/// onto a working surface sized to the rotated bounding box, extracts the
/// region sub-rectangle, and re-encodes in the source container format.
/// Zoom does not participate: the region is already expressed in zoomed
/// pixel coordinates by the interactive layer.
pub fn commit(source: &ImageSource, region: &CropRegion) -> Result<AvatarImage, AvatarError> {
    let decoded = image::load_from_memory(source.bytes())?;
    let pixels = decoded.to_rgba8();
    let (natural_w, natural_h) = pixels.dimensions();

    let surface = if region.rotation_degrees == 0.0 {
        pixels
    } else {
        rotate_about_center(&pixels, region.rotation_degrees)
    };

    let out = extract_region(&surface, region)?;
    let (out_w, out_h) = out.dimensions();

    debug!(
        natural_w,
        natural_h,
        rotation = region.rotation_degrees,
        out_w,
        out_h,
        "avatar committed"
    );

    encode(out, source.format())
}

/// Width and height of the axis-aligned bounding box of a `w`x`h`
/// rectangle rotated by `degrees`, so that no corner is clipped.
fn rotated_bounds(w: u32, h: u32, degrees: f64) -> (u32, u32) {
    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let bw = (w as f64 * cos + h as f64 * sin).round().max(1.0) as u32;
    let bh = (w as f64 * sin + h as f64 * cos).round().max(1.0) as u32;
    (bw, bh)
}

/// Rotate the source about its centre onto a surface sized to the rotated
/// bounding box.  The content stays centred: the surface centre maps back
/// onto the source centre (the half-size-delta translation of the canvas
/// formulation).  Pixels with no source coverage are transparent.
fn rotate_about_center(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (w, h) = src.dimensions();
    let (bw, bh) = rotated_bounds(w, h, degrees);

    let rad = degrees.to_radians();
    let (sin, cos) = (rad.sin(), rad.cos());
    let (dst_cx, dst_cy) = (bw as f64 / 2.0, bh as f64 / 2.0);
    let (src_cx, src_cy) = (w as f64 / 2.0, h as f64 / 2.0);

    let mut out: RgbaImage = ImageBuffer::new(bw, bh);
    for (dx, dy, px) in out.enumerate_pixels_mut() {
        // Inverse-map the destination pixel centre into source space.
        let vx = dx as f64 + 0.5 - dst_cx;
        let vy = dy as f64 + 0.5 - dst_cy;
        let sx = cos * vx + sin * vy + src_cx - 0.5;
        let sy = -sin * vx + cos * vy + src_cy - 0.5;
        *px = bilinear_sample(src, sx, sy);
    }
    out
}

/// Bilinear sample with transparent outside the source bounds.
fn bilinear_sample(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = src.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let fetch = |px: f64, py: f64| -> [f64; 4] {
        if px < 0.0 || py < 0.0 || px >= w as f64 || py >= h as f64 {
            return [0.0; 4];
        }
        let p = src.get_pixel(px as u32, py as u32).0;
        [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Copy the region sub-rectangle into an output surface of exactly the
/// region's (rounded) size.  Parts of the region outside the working
/// surface stay transparent, matching canvas `drawImage` with negative
/// offsets.
fn extract_region(surface: &RgbaImage, region: &CropRegion) -> Result<RgbaImage, AvatarError> {
    let out_w = region.width.round() as i64;
    let out_h = region.height.round() as i64;
    if out_w <= 0 || out_h <= 0 {
        return Err(AvatarError::EmptyRegion);
    }

    let (sw, sh) = surface.dimensions();
    let ox = region.x.round() as i64;
    let oy = region.y.round() as i64;

    let mut out: RgbaImage = ImageBuffer::new(out_w as u32, out_h as u32);
    for (dx, dy, px) in out.enumerate_pixels_mut() {
        let sx = ox + dx as i64;
        let sy = oy + dy as i64;
        if sx >= 0 && sy >= 0 && (sx as u32) < sw && (sy as u32) < sh {
            *px = *surface.get_pixel(sx as u32, sy as u32);
        }
    }
    Ok(out)
}

/// Re-encode the output surface in the source container format.  JPEG has
/// no alpha channel, so transparency composites onto black, the same as
/// canvas `toDataURL('image/jpeg')`.
fn encode(surface: RgbaImage, format: AvatarFormat) -> Result<AvatarImage, AvatarError> {
    let (width, height) = surface.dimensions();
    let mut bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut bytes);
    match format {
        AvatarFormat::Png => {
            surface.write_to(&mut cursor, format.to_image_format())?;
        }
        AvatarFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(surface).to_rgb8();
            rgb.write_to(&mut cursor, format.to_image_format())?;
        }
    }
    Ok(AvatarImage {
        bytes,
        format,
        width,
        height,
    })
}
