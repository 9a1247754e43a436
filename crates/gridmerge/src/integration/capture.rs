//! Grid capture on top of any screenshot transport.

use gridmerge_vision::GridLayout;
use image::RgbImage;
use tracing::{debug, trace};

use crate::error::CaptureError;
use crate::integration::traits::{Capture, ScreenSource};

/// Turns full screenshots into the 15 grid cells.
pub struct ScreenCapture<S> {
    source: S,
    layout: GridLayout,
}

impl<S: ScreenSource> ScreenCapture<S> {
    /// Crops screenshots from `source` with `layout`.
    #[must_use]
    pub fn new(source: S, layout: GridLayout) -> Self {
        Self { source, layout }
    }

    /// The cell geometry in use.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The underlying transport.
    #[must_use]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwraps the transport.
    #[must_use]
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: ScreenSource> Capture for ScreenCapture<S> {
    fn capture_cells(&mut self) -> Result<Option<Vec<RgbImage>>, CaptureError> {
        let screen = self.source.screenshot()?;
        let cells = self.layout.crop_cells(&screen);
        if cells.is_none() {
            debug!(
                width = screen.width(),
                height = screen.height(),
                "grid not visible on screenshot"
            );
        } else {
            trace!("cropped grid cells");
        }
        Ok(cells)
    }

    fn capture_screen(&mut self) -> Result<RgbImage, CaptureError> {
        self.source.screenshot()
    }
}
