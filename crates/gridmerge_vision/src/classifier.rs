//! # Cell Classifier
//!
//! Maps one cropped cell to a unit id by comparing its dominant colors with
//! every reference in the catalog.
//!
//! ```text
//! cell ──► dominant colors ──► min pair distance per reference ──► best
//!                                                                   │
//!                         best <= threshold ? reference unit : "empty"
//! ```
//!
//! When other accepted references score within `TEMPLATE_TIE_BAND` of the
//! best, color cannot separate them and the icon shape decides: the
//! reference whose template correlates best with the cell wins. This
//! applies only when the color winner has a template itself.
//!
//! Never fails: a missing or zero-sized crop is `unknown` with an infinite
//! score, a crop with only background pixels is `empty` with score 0.

use std::sync::Arc;

use gridmerge_core::UnitId;
use image::RgbImage;
use tracing::trace;

use crate::catalog::{ReferenceCatalog, UnitReference};
use crate::color::{dominant_colors, min_pair_distance, DOMINANT_COLORS};
use crate::template::{correlation, prepare_template};

/// Default acceptance threshold on the mean squared color distance.
pub const DEFAULT_MSE_THRESHOLD: f32 = 2000.0;

/// Color distance from the best score within which references are tied.
pub const TEMPLATE_TIE_BAND: f32 = 100.0;

/// Result of classifying one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    /// Winning unit or a sentinel.
    pub unit: UnitId,
    /// Distance of the winning reference. Lower is better.
    pub score: f32,
    threshold: f32,
}

impl Classification {
    /// A cell that could not be read.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            unit: UnitId::unknown(),
            score: f32::INFINITY,
            threshold: DEFAULT_MSE_THRESHOLD,
        }
    }

    /// A cell recognized as `unit`.
    #[must_use]
    pub fn matched(unit: UnitId, score: f32, threshold: f32) -> Self {
        Self { unit, score, threshold }
    }

    /// A free cell.
    #[must_use]
    pub fn empty(score: f32, threshold: f32) -> Self {
        Self {
            unit: UnitId::empty(),
            score,
            threshold,
        }
    }

    /// Match quality in [0, 1]: `1 - score / threshold`, floored at 0.
    #[must_use]
    pub fn confidence(&self) -> f32 {
        if !self.score.is_finite() || self.threshold <= 0.0 {
            return 0.0;
        }
        (1.0 - self.score / self.threshold).max(0.0)
    }
}

/// Color-signature classifier over a shared catalog.
#[derive(Clone, Debug)]
pub struct CellClassifier {
    catalog: Arc<ReferenceCatalog>,
    threshold: f32,
}

impl CellClassifier {
    /// Creates a classifier with the given acceptance threshold.
    #[must_use]
    pub fn new(catalog: Arc<ReferenceCatalog>, threshold: f32) -> Self {
        Self { catalog, threshold }
    }

    /// Swaps in a reloaded catalog.
    pub fn set_catalog(&mut self, catalog: Arc<ReferenceCatalog>) {
        self.catalog = catalog;
    }

    /// The catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Acceptance threshold.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classifies one cell crop.
    #[must_use]
    pub fn classify(&self, cell: Option<&RgbImage>) -> Classification {
        let Some(cell) = cell.filter(|c| c.width() > 0 && c.height() > 0) else {
            return Classification::unknown();
        };

        let colors = dominant_colors(cell, DOMINANT_COLORS);
        if colors.is_empty() {
            return Classification::empty(0.0, self.threshold);
        }

        let scored: Vec<(&UnitReference, f32)> = self
            .catalog
            .references()
            .iter()
            .map(|reference| (reference, min_pair_distance(&colors, &reference.colors)))
            .collect();
        let best = scored.iter().copied().fold(None, |best: Option<(_, f32)>, cur| match best {
            Some(b) if b.1 <= cur.1 => Some(b),
            _ => Some(cur),
        });

        match best {
            Some(best) if best.1 <= self.threshold => {
                let (reference, score) = self.break_tie(cell, best, &scored);
                trace!(unit = %reference.unit, score, "cell matched");
                Classification::matched(reference.unit.clone(), score, self.threshold)
            }
            Some((_, score)) => {
                trace!(score, "no reference under threshold");
                Classification::empty(score, self.threshold)
            }
            None => Classification::empty(f32::INFINITY, self.threshold),
        }
    }

    /// Lets icon shape pick among references color scored nearly equal.
    fn break_tie<'a>(
        &self,
        cell: &RgbImage,
        best: (&'a UnitReference, f32),
        scored: &[(&'a UnitReference, f32)],
    ) -> (&'a UnitReference, f32) {
        if best.0.template.is_none() {
            return best;
        }
        let limit = (best.1 + TEMPLATE_TIE_BAND).min(self.threshold);
        let contenders: Vec<_> = scored
            .iter()
            .filter_map(|&(reference, score)| {
                let template = reference.template.as_ref()?;
                (score <= limit).then_some((reference, score, template))
            })
            .collect();
        if contenders.len() < 2 {
            return best;
        }
        let Some(shape) = prepare_template(cell) else {
            return best;
        };

        let mut winner = best;
        let mut winner_ncc = f32::NEG_INFINITY;
        for (reference, score, template) in contenders {
            let ncc = correlation(&shape, template);
            if ncc > winner_ncc {
                winner = (reference, score);
                winner_ncc = ncc;
            }
        }
        trace!(unit = %winner.0.unit, ncc = winner_ncc, "color tie broken by template");
        winner
    }
}
