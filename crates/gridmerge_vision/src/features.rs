//! # Rank Features
//!
//! Fixed 13-value description of a cell used by the rank model:
//!
//! | idx | feature |
//! |-----|---------|
//! | 0-4 | grayscale mean, std, median, min, max |
//! | 5   | Sobel edge density |
//! | 6-11| R mean, R std, G mean, G std, B mean, B std |
//! | 12  | Laplacian variance |
//!
//! Higher ranks draw more ornate borders, which shows up in edge density
//! and Laplacian variance.

use image::{imageops, GrayImage, RgbImage};

/// Length of the feature vector.
pub const FEATURE_COUNT: usize = 13;

const SOBEL_GX: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_GY: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_THRESHOLD: f32 = 100.0;

/// Feature vector of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankFeatures(pub [f32; FEATURE_COUNT]);

impl RankFeatures {
    /// Extracts features from a cell crop. `None` for an empty image.
    #[must_use]
    pub fn extract(cell: &RgbImage) -> Option<Self> {
        if cell.width() == 0 || cell.height() == 0 {
            return None;
        }
        let gray = imageops::grayscale(cell);
        let mut values: Vec<u8> = gray.as_raw().clone();

        let (mean, std) = mean_std(values.iter().map(|v| f32::from(*v)));
        values.sort_unstable();
        let median = median_sorted(&values);
        let min = f32::from(values[0]);
        let max = f32::from(values[values.len() - 1]);

        let mut out = [0.0; FEATURE_COUNT];
        out[0] = mean;
        out[1] = std;
        out[2] = median;
        out[3] = min;
        out[4] = max;
        out[5] = edge_density(&gray);
        for channel in 0..3 {
            let (m, s) = mean_std(cell.pixels().map(|p| f32::from(p[channel])));
            out[6 + channel * 2] = m;
            out[7 + channel * 2] = s;
        }
        out[12] = laplacian_variance(&gray);
        Some(Self(out))
    }

    /// The raw values.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Population mean and standard deviation.
fn mean_std(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let mut n = 0_u64;
    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;
    for v in values {
        let v = f64::from(v);
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    let mean = sum / n;
    let var = (sum_sq / n - mean * mean).max(0.0);
    (mean as f32, var.sqrt() as f32)
}

fn median_sorted(values: &[u8]) -> f32 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (f32::from(values[mid - 1]) + f32::from(values[mid])) / 2.0
    } else {
        f32::from(values[mid])
    }
}

/// Share of pixels whose Sobel magnitude exceeds the edge threshold.
fn edge_density(gray: &GrayImage) -> f32 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < 3 || h < 3 {
        return 0.0;
    }
    let raw = gray.as_raw();
    let mut edges = 0_usize;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut gx = 0_i32;
            let mut gy = 0_i32;
            for ky in 0..3 {
                for kx in 0..3 {
                    let v = i32::from(raw[(y + ky - 1) * w + (x + kx - 1)]);
                    gx += v * SOBEL_GX[ky][kx];
                    gy += v * SOBEL_GY[ky][kx];
                }
            }
            let magnitude = ((gx * gx + gy * gy) as f32).sqrt();
            if magnitude > EDGE_THRESHOLD {
                edges += 1;
            }
        }
    }
    edges as f32 / (w * h) as f32
}

/// Variance of the 4-neighbour Laplacian over interior pixels.
fn laplacian_variance(gray: &GrayImage) -> f32 {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < 3 || h < 3 {
        return 0.0;
    }
    let raw = gray.as_raw();
    let at = |x: usize, y: usize| f32::from(raw[y * w + x]);
    let responses = (1..h - 1).flat_map(|y| {
        (1..w - 1).map(move |x| at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y))
    });
    let (_, std) = mean_std(responses);
    std * std
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_flat_cell_has_no_texture() {
        let cell = RgbImage::from_pixel(16, 16, Rgb([100, 100, 100]));
        let f = RankFeatures::extract(&cell).unwrap();
        assert!((f.0[0] - 100.0).abs() < 1.0);
        assert!(f.0[1] < 1e-3);
        assert_eq!(f.0[3], f.0[4]);
        assert_eq!(f.0[5], 0.0);
        assert!(f.0[12] < 1e-3);
    }

    #[test]
    fn test_checkerboard_has_edges() {
        let cell = RgbImage::from_fn(16, 16, |x, y| {
            if (x / 2 + y / 2) % 2 == 0 {
                Rgb([250, 250, 250])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let f = RankFeatures::extract(&cell).unwrap();
        assert!(f.0[5] > 0.3, "edge density {}", f.0[5]);
        assert!(f.0[12] > 1000.0);
        assert_eq!(f.0[3], 0.0);
    }

    #[test]
    fn test_empty_image_has_no_features() {
        assert!(RankFeatures::extract(&RgbImage::new(0, 0)).is_none());
    }
}
