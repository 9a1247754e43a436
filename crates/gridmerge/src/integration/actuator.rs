//! Grid swipes on top of any touch transport.

use std::time::Duration;

use gridmerge_core::GridPos;
use gridmerge_vision::GridLayout;
use tracing::trace;

use crate::error::ActuatorError;
use crate::integration::traits::{Actuator, TouchInput};

/// Maps grid positions to cell centers and forwards the swipe.
pub struct TouchActuator<T> {
    input: T,
    layout: GridLayout,
    duration: Duration,
}

impl<T: TouchInput> TouchActuator<T> {
    /// Swipes through `input`, each gesture lasting `duration`.
    #[must_use]
    pub fn new(input: T, layout: GridLayout, duration: Duration) -> Self {
        Self { input, layout, duration }
    }

    /// Gesture duration.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The underlying transport.
    #[must_use]
    pub fn input_mut(&mut self) -> &mut T {
        &mut self.input
    }

    /// Unwraps the transport.
    #[must_use]
    pub fn into_input(self) -> T {
        self.input
    }
}

impl<T: TouchInput> Actuator for TouchActuator<T> {
    fn swipe(&mut self, from: GridPos, to: GridPos) -> Result<(), ActuatorError> {
        let start = self.layout.cell_center(from);
        let end = self.layout.cell_center(to);
        trace!(%from, %to, ?start, ?end, "swipe");
        self.input.swipe(start, end, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingInput {
        gestures: Vec<((u32, u32), (u32, u32), Duration)>,
    }

    impl TouchInput for RecordingInput {
        fn swipe(&mut self, from: (u32, u32), to: (u32, u32), duration: Duration) -> Result<(), ActuatorError> {
            self.gestures.push((from, to, duration));
            Ok(())
        }
    }

    #[test]
    fn test_swipe_uses_cell_centers() {
        let mut actuator = TouchActuator::new(
            RecordingInput::default(),
            GridLayout::default(),
            Duration::from_millis(1000),
        );
        actuator
            .swipe(GridPos::new(0, 0).unwrap(), GridPos::new(2, 4).unwrap())
            .unwrap();

        let input = actuator.into_input();
        assert_eq!(
            input.gestures,
            vec![((213, 1005), (693, 1245), Duration::from_millis(1000))]
        );
    }
}
