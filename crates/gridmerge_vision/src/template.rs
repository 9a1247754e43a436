//! # Icon Templates
//!
//! Shape comparison used when color alone cannot tell references apart.
//! Both sides are reduced to `TEMPLATE_SIZE`² grayscale and compared with
//! zero-mean normalized cross-correlation:
//!
//! ```text
//! ncc = Σ (a - ā)(b - b̄) / sqrt(Σ (a - ā)² · Σ (b - b̄)²)      in [-1, 1]
//! ```

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

/// Side of the square both images are resized to before comparison.
pub const TEMPLATE_SIZE: u32 = 32;

/// Reduces an icon or a cell crop to the comparison format.
///
/// Returns `None` for a zero-sized image.
#[must_use]
pub fn prepare_template(image: &RgbImage) -> Option<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    let gray = imageops::grayscale(image);
    Some(imageops::resize(&gray, TEMPLATE_SIZE, TEMPLATE_SIZE, FilterType::Triangle))
}

/// Correlation between two prepared templates.
///
/// A flat image has no shape to correlate, so any pair involving one
/// scores 0. Mismatched sizes also score 0.
#[must_use]
pub fn correlation(a: &GrayImage, b: &GrayImage) -> f32 {
    if a.dimensions() != b.dimensions() || a.as_raw().is_empty() {
        return 0.0;
    }
    let mean = |img: &GrayImage| img.as_raw().iter().map(|&v| f64::from(v)).sum::<f64>() / img.as_raw().len() as f64;
    let (mean_a, mean_b) = (mean(a), mean(b));

    let (mut cross, mut var_a, mut var_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&va, &vb) in a.as_raw().iter().zip(b.as_raw()) {
        let da = f64::from(va) - mean_a;
        let db = f64::from(vb) - mean_b;
        cross += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (cross / denom) as f32
}
