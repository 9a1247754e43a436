//! # Color Signatures
//!
//! A unit is identified by the few dominant colors of its icon. Both the
//! reference assets and the live cells go through `dominant_colors`, so the
//! two sides are always comparable.
//!
//! ```text
//! cell pixels ──► drop near-black ──► k-means (k=3) ──► [c0, c1, c2] by cluster size
//! ```
//!
//! Distances are mean squared channel differences on the 0-255 scale.

use image::RgbImage;

/// An RGB color with float channels in 0..=255.
pub type Rgb = [f32; 3];

/// Dominant colors kept per image.
pub const DOMINANT_COLORS: usize = 3;

/// Pixels whose channel sum is at or below this are background.
pub const DARK_PIXEL_SUM: u32 = 30;

/// Upper bound on k-means refinement rounds.
const KMEANS_ITERATIONS: usize = 12;

/// Pixels sampled per image; larger images are strided.
const MAX_SAMPLES: usize = 4096;

/// Mean over channels of the squared difference.
#[inline]
#[must_use]
pub fn color_distance(a: Rgb, b: Rgb) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db) / 3.0
}

/// Smallest distance between any color of `a` and any color of `b`.
///
/// `f32::INFINITY` when either side has no colors.
#[must_use]
pub fn min_pair_distance(a: &[Rgb], b: &[Rgb]) -> f32 {
    a.iter()
        .flat_map(|ca| b.iter().map(move |cb| color_distance(*ca, *cb)))
        .fold(f32::INFINITY, f32::min)
}

/// Non-background pixels of `image`, strided down to a bounded sample.
#[must_use]
pub fn bright_pixels(image: &RgbImage) -> Vec<Rgb> {
    let total = image.width() as usize * image.height() as usize;
    let stride = total / MAX_SAMPLES + 1;
    image
        .pixels()
        .step_by(stride)
        .filter(|p| u32::from(p[0]) + u32::from(p[1]) + u32::from(p[2]) > DARK_PIXEL_SUM)
        .map(|p| [f32::from(p[0]), f32::from(p[1]), f32::from(p[2])])
        .collect()
}

/// The `k` dominant colors of `image`, largest cluster first.
///
/// Fewer than `k` colors come back when the image has fewer distinct
/// bright colors; none when every pixel is background.
#[must_use]
pub fn dominant_colors(image: &RgbImage, k: usize) -> Vec<Rgb> {
    kmeans(&bright_pixels(image), k)
}

/// Deterministic k-means with farthest-point seeding.
fn kmeans(points: &[Rgb], k: usize) -> Vec<Rgb> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids = seed_centroids(points, k);
    let mut assignment = vec![0_usize; points.len()];

    for _ in 0..KMEANS_ITERATIONS {
        let mut moved = false;
        for (point, slot) in points.iter().zip(assignment.iter_mut()) {
            let nearest = nearest_centroid(&centroids, *point);
            if nearest != *slot {
                *slot = nearest;
                moved = true;
            }
        }

        let mut sums = vec![[0.0_f64; 3]; centroids.len()];
        let mut sizes = vec![0_usize; centroids.len()];
        for (point, &cluster) in points.iter().zip(&assignment) {
            for c in 0..3 {
                sums[cluster][c] += f64::from(point[c]);
            }
            sizes[cluster] += 1;
        }
        for (i, centroid) in centroids.iter_mut().enumerate() {
            // An emptied cluster keeps its previous center
            if sizes[i] > 0 {
                let n = sizes[i] as f64;
                *centroid = [
                    (sums[i][0] / n) as f32,
                    (sums[i][1] / n) as f32,
                    (sums[i][2] / n) as f32,
                ];
            }
        }

        if !moved {
            break;
        }
    }

    let mut sizes = vec![0_usize; centroids.len()];
    for &cluster in &assignment {
        sizes[cluster] += 1;
    }
    let mut ranked: Vec<(usize, Rgb)> = sizes.into_iter().zip(centroids).collect();
    // Stable sort keeps seeding order among equal sizes
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().filter(|(size, _)| *size > 0).map(|(_, c)| c).collect()
}

/// First center is the first sample, each next one the sample farthest from
/// all chosen centers. Stops early when every sample is already a center.
fn seed_centroids(points: &[Rgb], k: usize) -> Vec<Rgb> {
    let mut centroids = vec![points[0]];
    let mut nearest: Vec<f32> = points.iter().map(|p| color_distance(*p, points[0])).collect();

    while centroids.len() < k {
        let (index, &distance) = nearest
            .iter()
            .enumerate()
            .fold((0, &0.0_f32), |best, cur| if cur.1 > best.1 { cur } else { best });
        if distance <= 0.0 {
            break;
        }
        let center = points[index];
        centroids.push(center);
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(color_distance(*p, center));
        }
    }
    centroids
}

fn nearest_centroid(centroids: &[Rgb], point: Rgb) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = color_distance(*c, point);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}
