//! # Raw Screencap Codec
//!
//! Decodes the framebuffer dump a device shell prints for a raw
//! screenshot:
//!
//! ```text
//! ┌────────┬────────┬────────┬────────────┬──────────────────────────┐
//! │ width  │ height │ format │ colorspace │ width*height RGBA pixels │
//! │ u32 LE │ u32 LE │ u32 LE │ u32 LE opt │ 4 bytes each             │
//! └────────┴────────┴────────┴────────────┴──────────────────────────┘
//! ```
//!
//! Older devices omit the colorspace word. The header variant is picked
//! from the total length.

use bytemuck::{Pod, Zeroable};
use image::RgbImage;

use crate::error::{CaptureError, ScreencapError};
use crate::integration::traits::ScreenSource;

/// Header without the colorspace word.
pub const LEGACY_HEADER_LEN: usize = 12;

/// Header with the colorspace word.
pub const HEADER_LEN: usize = 16;

/// `PIXEL_FORMAT_RGBA_8888`.
pub const FORMAT_RGBA_8888: u32 = 1;

/// `PIXEL_FORMAT_RGBX_8888`.
pub const FORMAT_RGBX_8888: u32 = 2;

/// Leading words shared by both header variants.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct ScreencapHeader {
    width: u32,
    height: u32,
    format: u32,
}

impl ScreencapHeader {
    fn read(bytes: &[u8]) -> Self {
        let raw: Self = bytemuck::pod_read_unaligned(&bytes[..LEGACY_HEADER_LEN]);
        Self {
            width: u32::from_le(raw.width),
            height: u32::from_le(raw.height),
            format: u32::from_le(raw.format),
        }
    }
}

/// Decodes a raw screencap dump into an RGB image. Alpha is dropped.
///
/// # Errors
///
/// Returns `ScreencapError` for short buffers, zero dimensions, payloads
/// that do not match the header, and pixel formats other than RGBA/RGBX.
pub fn decode_screencap(bytes: &[u8]) -> Result<RgbImage, ScreencapError> {
    if bytes.len() < LEGACY_HEADER_LEN {
        return Err(ScreencapError::Truncated { len: bytes.len() });
    }
    let header = ScreencapHeader::read(bytes);
    let (width, height) = (header.width, header.height);
    if width == 0 || height == 0 {
        return Err(ScreencapError::Empty { width, height });
    }
    if header.format != FORMAT_RGBA_8888 && header.format != FORMAT_RGBX_8888 {
        return Err(ScreencapError::UnsupportedFormat(header.format));
    }

    let mismatch = |actual: usize| ScreencapError::PayloadMismatch {
        width,
        height,
        expected: (width as usize).saturating_mul(height as usize).saturating_mul(4),
        actual,
    };
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| mismatch(bytes.len() - LEGACY_HEADER_LEN))?;

    let header_len = if bytes.len() == HEADER_LEN + expected {
        HEADER_LEN
    } else if bytes.len() == LEGACY_HEADER_LEN + expected {
        LEGACY_HEADER_LEN
    } else {
        return Err(mismatch(bytes.len() - LEGACY_HEADER_LEN));
    };

    let pixels: &[[u8; 4]] = bytemuck::cast_slice(&bytes[header_len..]);
    let mut rgb = Vec::with_capacity(pixels.len() * 3);
    for [r, g, b, _] in pixels {
        rgb.extend_from_slice(&[*r, *g, *b]);
    }
    RgbImage::from_raw(width, height, rgb).ok_or_else(|| mismatch(expected))
}

/// Screenshot transport fed by raw dump bytes.
///
/// `fetch` returns one dump per call, for example the stdout of a device
/// shell's `screencap` command.
pub struct RawScreencap<F> {
    fetch: F,
}

impl<F> RawScreencap<F>
where
    F: FnMut() -> Result<Vec<u8>, CaptureError> + Send,
{
    /// Wraps a byte fetcher.
    #[must_use]
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> ScreenSource for RawScreencap<F>
where
    F: FnMut() -> Result<Vec<u8>, CaptureError> + Send,
{
    fn screenshot(&mut self) -> Result<RgbImage, CaptureError> {
        let bytes = (self.fetch)()?;
        Ok(decode_screencap(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(width: u32, height: u32, format: u32, colorspace: Option<u32>) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.extend_from_slice(&format.to_le_bytes());
        if let Some(cs) = colorspace {
            bytes.extend_from_slice(&cs.to_le_bytes());
        }
        for i in 0..width * height {
            bytes.extend_from_slice(&[i as u8, 10, 20, 255]);
        }
        bytes
    }

    #[test]
    fn test_decode_both_header_variants() {
        for colorspace in [None, Some(1)] {
            let image = decode_screencap(&dump(3, 2, FORMAT_RGBA_8888, colorspace)).unwrap();
            assert_eq!(image.dimensions(), (3, 2));
            assert_eq!(image.get_pixel(0, 0).0, [0, 10, 20]);
            // Row-major: pixel index 4 is (1, 1)
            assert_eq!(image.get_pixel(1, 1).0, [4, 10, 20]);
        }
    }

    #[test]
    fn test_rgbx_accepted() {
        assert!(decode_screencap(&dump(2, 2, FORMAT_RGBX_8888, Some(0))).is_ok());
    }

    #[test]
    fn test_truncated() {
        assert_eq!(
            decode_screencap(&[1, 0, 0]).unwrap_err(),
            ScreencapError::Truncated { len: 3 }
        );

        let mut short = dump(4, 4, FORMAT_RGBA_8888, Some(1));
        short.truncate(short.len() - 5);
        assert!(matches!(
            decode_screencap(&short).unwrap_err(),
            ScreencapError::PayloadMismatch { expected: 64, .. }
        ));
    }

    #[test]
    fn test_bad_header() {
        assert_eq!(
            decode_screencap(&dump(2, 2, 5, Some(1))).unwrap_err(),
            ScreencapError::UnsupportedFormat(5)
        );
        assert_eq!(
            decode_screencap(&dump(0, 2, FORMAT_RGBA_8888, None)).unwrap_err(),
            ScreencapError::Empty { width: 0, height: 2 }
        );
    }

    #[test]
    fn test_raw_source() {
        let mut source = RawScreencap::new(|| Ok(dump(2, 1, FORMAT_RGBA_8888, Some(1))));
        assert_eq!(source.screenshot().unwrap().dimensions(), (2, 1));

        let mut broken = RawScreencap::new(|| Ok(vec![0u8; 4]));
        assert!(matches!(
            broken.screenshot().unwrap_err(),
            CaptureError::Screencap(ScreencapError::Truncated { len: 4 })
        ));
    }
}
