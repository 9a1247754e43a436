//! Deck activation: copy the selected unit assets into the active directory
//! the catalog is loaded from.

use std::fs;
use std::path::Path;

use gridmerge_core::UnitId;
use tracing::{info, warn};

use crate::catalog::is_asset;
use crate::error::{VisionError, VisionResult};

/// Fewest assets an active deck may hold.
pub const MIN_DECK_SIZE: usize = 4;

/// Replaces the assets in `active` with `<unit>.png` from `source` for each
/// requested unit. The `.png` suffix on unit names is optional.
///
/// Units with no asset in `source` are skipped with a warning. Returns the
/// number of assets copied. The catalog must be reloaded afterwards.
///
/// # Errors
///
/// `VisionError::Io` on filesystem failures, `VisionError::DeckTooSmall`
/// when fewer than `MIN_DECK_SIZE` assets were copied.
pub fn activate_deck<U: AsRef<str>>(source: &Path, active: &Path, units: &[U]) -> VisionResult<usize> {
    fs::create_dir_all(active).map_err(|e| VisionError::io(active, &e))?;

    for entry in fs::read_dir(active).map_err(|e| VisionError::io(active, &e))? {
        let path = entry.map_err(|e| VisionError::io(active, &e))?.path();
        if is_asset(&path) {
            fs::remove_file(&path).map_err(|e| VisionError::io(&path, &e))?;
        }
    }

    let mut copied = 0;
    for unit in units {
        let unit = UnitId::new(unit.as_ref());
        let file = format!("{unit}.png");
        let from = source.join(&file);
        if !from.is_file() {
            warn!(unit = %unit, source = %source.display(), "no asset for deck unit");
            continue;
        }
        fs::copy(&from, active.join(&file)).map_err(|e| VisionError::io(&from, &e))?;
        copied += 1;
    }

    if copied < MIN_DECK_SIZE {
        return Err(VisionError::DeckTooSmall {
            copied,
            required: MIN_DECK_SIZE,
        });
    }
    info!(active = %active.display(), copied, "deck activated");
    Ok(copied)
}
