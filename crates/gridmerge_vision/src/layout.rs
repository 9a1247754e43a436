//! Screen geometry of the battle grid.

use gridmerge_core::{GridPos, GRID_COLS, GRID_ROWS};
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

/// Pixel geometry of the 3x5 grid on a screenshot.
///
/// Cells are laid out row-major from `origin`, each `cell_width` x
/// `cell_height`, separated by `gap` pixels.
///
/// A layout whose far corner does not fit in `u32` has no `extent` and
/// never fits a screen; cell coordinates saturate instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Left edge of cell (0,0).
    pub origin_x: u32,
    /// Top edge of cell (0,0).
    pub origin_y: u32,
    /// Cell width in pixels.
    pub cell_width: u32,
    /// Cell height in pixels.
    pub cell_height: u32,
    /// Spacing between neighbouring cells.
    pub gap: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            origin_x: 153,
            origin_y: 945,
            cell_width: 120,
            cell_height: 120,
            gap: 0,
        }
    }
}

impl GridLayout {
    /// Top-left corner and size of the cell at `pos`.
    #[must_use]
    pub fn cell_rect(&self, pos: GridPos) -> (u32, u32, u32, u32) {
        let offset = |origin: u32, index: u8, size: u32| {
            origin.saturating_add(u32::from(index).saturating_mul(size.saturating_add(self.gap)))
        };
        (
            offset(self.origin_x, pos.col(), self.cell_width),
            offset(self.origin_y, pos.row(), self.cell_height),
            self.cell_width,
            self.cell_height,
        )
    }

    /// Center of the cell at `pos`, where swipes start and end.
    #[must_use]
    pub fn cell_center(&self, pos: GridPos) -> (u32, u32) {
        let (x, y, w, h) = self.cell_rect(pos);
        (x.saturating_add(w / 2), y.saturating_add(h / 2))
    }

    /// Bottom-right corner (exclusive) of the whole grid.
    ///
    /// `None` when the corner is past `u32::MAX`.
    #[must_use]
    pub fn extent(&self) -> Option<(u32, u32)> {
        let span = |origin: u32, count: u8, size: u32| {
            let count = u32::from(count);
            count
                .checked_mul(size)?
                .checked_add((count - 1).checked_mul(self.gap)?)?
                .checked_add(origin)
        };
        Some((
            span(self.origin_x, GRID_COLS, self.cell_width)?,
            span(self.origin_y, GRID_ROWS, self.cell_height)?,
        ))
    }

    /// True if `screen` contains the full grid rectangle.
    #[must_use]
    pub fn fits(&self, screen: &RgbImage) -> bool {
        let Some((right, bottom)) = self.extent() else {
            return false;
        };
        self.cell_width > 0 && self.cell_height > 0 && right <= screen.width() && bottom <= screen.height()
    }

    /// Crops the 15 cells in row-major order.
    ///
    /// `None` when the grid is not on screen.
    #[must_use]
    pub fn crop_cells(&self, screen: &RgbImage) -> Option<Vec<RgbImage>> {
        if !self.fits(screen) {
            return None;
        }
        Some(
            GridPos::all()
                .map(|pos| {
                    let (x, y, w, h) = self.cell_rect(pos);
                    imageops::crop_imm(screen, x, y, w, h).to_image()
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmerge_core::GRID_SLOTS;
    use image::Rgb;

    #[test]
    fn test_default_geometry() {
        let layout = GridLayout::default();
        assert_eq!(layout.cell_center(GridPos::new(0, 0).unwrap()), (213, 1005));
        assert_eq!(layout.cell_center(GridPos::new(2, 4).unwrap()), (693, 1245));
        assert_eq!(layout.extent(), Some((753, 1305)));
    }

    #[test]
    fn test_oversized_layout_never_fits() {
        let layout = GridLayout {
            origin_x: u32::MAX - 100,
            cell_width: 60,
            ..GridLayout::default()
        };
        assert_eq!(layout.extent(), None);
        assert!(!layout.fits(&RgbImage::new(8, 8)));
        assert!(layout.crop_cells(&RgbImage::new(8, 8)).is_none());

        let far = GridPos::new(2, 4).unwrap();
        assert_eq!(layout.cell_rect(far).0, u32::MAX);
        assert_eq!(layout.cell_center(far).0, u32::MAX);

        let huge_gap = GridLayout {
            gap: u32::MAX / 2,
            ..GridLayout::default()
        };
        assert_eq!(huge_gap.extent(), None);
    }

    #[test]
    fn test_crop_cells_row_major() {
        let layout = GridLayout {
            origin_x: 2,
            origin_y: 3,
            cell_width: 4,
            cell_height: 4,
            gap: 1,
        };
        // Encode the cell index in the red channel
        let screen = RgbImage::from_fn(40, 30, |x, y| {
            if x < 2 || y < 3 {
                return Rgb([255, 255, 255]);
            }
            let col = (x - 2) / 5;
            let row = (y - 3) / 5;
            Rgb([(row * 5 + col) as u8, 0, 0])
        });

        let cells = layout.crop_cells(&screen).unwrap();
        assert_eq!(cells.len(), GRID_SLOTS);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.dimensions(), (4, 4));
            assert_eq!(cell.get_pixel(0, 0)[0] as usize, i);
        }
    }

    #[test]
    fn test_grid_off_screen() {
        let small = RgbImage::new(200, 200);
        assert!(GridLayout::default().crop_cells(&small).is_none());
    }
}
