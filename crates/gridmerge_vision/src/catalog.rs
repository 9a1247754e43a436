//! # Reference Catalog
//!
//! One `UnitReference` per PNG in the active asset directory. The unit id is
//! the file stem, so `active/dryad.png` becomes `dryad`.
//!
//! Loaded once at startup. A deck change rewrites the directory and calls
//! `reload`; nothing else mutates the catalog.

use std::fs;
use std::path::{Path, PathBuf};

use gridmerge_core::constants::ASSET_EXTENSION;
use gridmerge_core::UnitId;
use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};

use crate::color::{dominant_colors, Rgb, DOMINANT_COLORS};
use crate::error::{VisionError, VisionResult};
use crate::template::prepare_template;

/// Static signature of one unit type.
#[derive(Clone, Debug)]
pub struct UnitReference {
    /// Unit the asset depicts.
    pub unit: UnitId,
    /// Dominant colors, largest cluster first.
    pub colors: Vec<Rgb>,
    /// Icon shape for telling same-colored units apart. `None` without an icon.
    pub template: Option<GrayImage>,
}

impl UnitReference {
    /// Builds a reference from an already decoded icon.
    #[must_use]
    pub fn from_image(unit: UnitId, icon: &RgbImage) -> Self {
        Self {
            unit,
            colors: dominant_colors(icon, DOMINANT_COLORS),
            template: prepare_template(icon),
        }
    }

    /// Reference with explicit colors and no icon.
    #[must_use]
    pub fn from_colors(unit: impl Into<UnitId>, colors: Vec<Rgb>) -> Self {
        Self {
            unit: unit.into(),
            colors,
            template: None,
        }
    }
}

/// All unit references of the active deck, sorted by unit id.
#[derive(Clone, Debug, Default)]
pub struct ReferenceCatalog {
    dir: Option<PathBuf>,
    references: Vec<UnitReference>,
}

impl ReferenceCatalog {
    /// Builds a catalog from in-memory references.
    #[must_use]
    pub fn from_references(mut references: Vec<UnitReference>) -> Self {
        references.sort_by(|a, b| a.unit.cmp(&b.unit));
        Self { dir: None, references }
    }

    /// Loads every `*.png` in `dir`.
    ///
    /// Files that fail to decode are skipped with a warning. Fails only when
    /// the directory cannot be read or nothing usable was found.
    ///
    /// # Errors
    ///
    /// `VisionError::Io` if `dir` cannot be listed, `VisionError::EmptyCatalog`
    /// if no asset loaded.
    pub fn load_dir(dir: impl AsRef<Path>) -> VisionResult<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| VisionError::io(dir, &e))?;

        let mut references = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !is_asset(&path) {
                continue;
            }
            match load_reference(&path) {
                Ok(reference) => {
                    debug!(unit = %reference.unit, colors = reference.colors.len(), "loaded reference");
                    references.push(reference);
                }
                Err(e) => warn!(error = %e, "skipping reference asset"),
            }
        }

        if references.is_empty() {
            return Err(VisionError::EmptyCatalog(dir.display().to_string()));
        }

        let mut catalog = Self::from_references(references);
        catalog.dir = Some(dir.to_path_buf());
        info!(dir = %dir.display(), units = catalog.len(), "reference catalog loaded");
        Ok(catalog)
    }

    /// Re-reads the directory this catalog was loaded from.
    ///
    /// In-memory catalogs are left as they are.
    ///
    /// # Errors
    ///
    /// Same as `load_dir`. On error the current references are kept.
    pub fn reload(&mut self) -> VisionResult<()> {
        let Some(dir) = self.dir.clone() else {
            return Ok(());
        };
        *self = Self::load_dir(dir)?;
        Ok(())
    }

    /// Directory the catalog was loaded from.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Reference for `unit`.
    #[must_use]
    pub fn get(&self, unit: &str) -> Option<&UnitReference> {
        self.references.iter().find(|r| r.unit == unit)
    }

    /// All references in unit id order.
    #[inline]
    #[must_use]
    pub fn references(&self) -> &[UnitReference] {
        &self.references
    }

    /// Number of references.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// True if the catalog holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

pub(crate) fn is_asset(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ASSET_EXTENSION))
}

fn load_reference(path: &Path) -> VisionResult<UnitReference> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| VisionError::Decode {
            path: path.display().to_string(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;
    let icon = image::open(path).map_err(|e| VisionError::decode(path, &e))?.to_rgb8();
    Ok(UnitReference::from_image(UnitId::new(stem), &icon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Pixel;

    #[test]
    fn test_load_dir_keys_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(16, 16, Pixel([220, 30, 30]))
            .save(dir.path().join("dryad.png"))
            .unwrap();
        RgbImage::from_pixel(16, 16, Pixel([30, 30, 220]))
            .save(dir.path().join("chemist.png"))
            .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("broken.png"), "not a png").unwrap();

        let catalog = ReferenceCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2, "broken.png and notes.txt are skipped");
        assert_eq!(catalog.references()[0].unit, "chemist");
        assert_eq!(catalog.references()[1].unit, "dryad");
        assert_eq!(catalog.get("dryad").unwrap().colors.len(), 1);
        assert!(catalog.get("dryad").unwrap().template.is_some());
    }

    #[test]
    fn test_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ReferenceCatalog::load_dir(dir.path()),
            Err(VisionError::EmptyCatalog(_))
        ));
        assert!(matches!(
            ReferenceCatalog::load_dir(dir.path().join("missing")),
            Err(VisionError::Io { .. })
        ));
    }

    #[test]
    fn test_reload_picks_up_new_assets() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 8, Pixel([200, 200, 40]))
            .save(dir.path().join("summoner.png"))
            .unwrap();
        let mut catalog = ReferenceCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);

        RgbImage::from_pixel(8, 8, Pixel([40, 200, 200]))
            .save(dir.path().join("harlequin.png"))
            .unwrap();
        catalog.reload().unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("harlequin").is_some());
    }
}
