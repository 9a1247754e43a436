//! # Perception Pipeline
//!
//! Classifier + rank estimator + grid builder behind one call per cycle.
//!
//! ```text
//! 15 crops ──par_iter──► [classify ─► estimate rank] ×15 ──► build_grid(prev)
//! ```
//!
//! Cells share nothing mutable, so they are processed on the rayon pool.

use std::sync::Arc;

use gridmerge_core::GridState;
use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::builder::{build_grid, CellResult};
use crate::catalog::ReferenceCatalog;
use crate::classifier::CellClassifier;
use crate::config::RecognitionConfig;
use crate::error::VisionResult;
use crate::rank::{RankEstimator, RankModel};

/// Everything needed to turn cell crops into a `GridState`.
#[derive(Clone, Debug)]
pub struct Perception {
    classifier: CellClassifier,
    estimator: RankEstimator,
}

impl Perception {
    /// Wraps an existing classifier and estimator.
    #[must_use]
    pub fn new(classifier: CellClassifier, estimator: RankEstimator) -> Self {
        Self { classifier, estimator }
    }

    /// Loads the catalog and rank model named by `config`.
    ///
    /// A rank model that fails to load is logged and skipped; perception
    /// then falls back to rank 1 for every unit.
    ///
    /// # Errors
    ///
    /// Fails if the reference catalog cannot be loaded.
    pub fn load(config: &RecognitionConfig) -> VisionResult<Self> {
        let catalog = ReferenceCatalog::load_dir(&config.active_deck_dir)?;
        let model = match &config.rank_model_path {
            Some(path) => match RankModel::load(path) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    warn!(error = %e, "rank model unavailable, defaulting to rank 1");
                    None
                }
            },
            None => None,
        };
        let perception = Self::new(
            CellClassifier::new(Arc::new(catalog), config.mse_threshold),
            RankEstimator::new(model, config.rank_confidence_threshold),
        );
        info!(
            units = perception.classifier.catalog().len(),
            rank_model = perception.estimator.has_model(),
            "perception ready"
        );
        Ok(perception)
    }

    /// Re-reads the catalog directory after a deck change.
    ///
    /// # Errors
    ///
    /// Fails if the reload fails; the old catalog stays in use.
    pub fn reload_catalog(&mut self) -> VisionResult<()> {
        let mut catalog = self.classifier.catalog().clone();
        catalog.reload()?;
        self.classifier.set_catalog(Arc::new(catalog));
        Ok(())
    }

    /// The classifier.
    #[must_use]
    pub fn classifier(&self) -> &CellClassifier {
        &self.classifier
    }

    /// The rank estimator.
    #[must_use]
    pub fn estimator(&self) -> &RankEstimator {
        &self.estimator
    }

    /// Classifies and ranks one cell.
    #[must_use]
    pub fn analyze_cell(&self, cell: Option<&RgbImage>) -> CellResult {
        let classification = self.classifier.classify(cell);
        let rank = self.estimator.estimate(cell, &classification.unit);
        CellResult { classification, rank }
    }

    /// Analyzes all crops in parallel, preserving order.
    #[must_use]
    pub fn analyze_cells(&self, cells: &[RgbImage]) -> Vec<CellResult> {
        cells.par_iter().map(|cell| self.analyze_cell(Some(cell))).collect()
    }

    /// Builds this cycle's grid.
    ///
    /// `cells` is `None` when the grid was not visible, which gives an
    /// all-empty grid.
    #[must_use]
    pub fn perceive(&self, cycle: u64, cells: Option<&[RgbImage]>, previous: Option<&GridState>) -> GridState {
        let results = cells.map(|c| self.analyze_cells(c)).unwrap_or_default();
        let grid = build_grid(cycle, &results, previous);
        debug!(
            cycle,
            empty = grid.empty_count(),
            mean_age = grid.mean_age(),
            "grid perceived"
        );
        grid
    }
}
