//! Integration tests for the full capture -> decide -> swipe cycle.

use std::sync::Arc;
use std::time::Duration;

use gridmerge::grid::{GridPos, GRID_SLOTS};
use gridmerge::policy::{MergePolicy, MergeReason, NoAction, PolicyConfig};
use gridmerge::vision::{
    CellClassifier, GridLayout, Perception, RankEstimator, ReferenceCatalog, UnitReference, DEFAULT_MSE_THRESHOLD,
    DEFAULT_RANK_CONFIDENCE,
};
use gridmerge::{
    events, Actuator, ActuatorError, BotConfig, BotError, BotEvent, CaptureError, CycleOutcome, DecisionCycle,
    recognition_warnings, EventSubscriber, RecognitionWarning, ScreenCapture, ScreenSource,
};
use image::{Rgb, RgbImage};

const DEMON_HUNTER: [u8; 3] = [200, 40, 200];
const CHEMIST: [u8; 3] = [60, 60, 220];

fn layout() -> GridLayout {
    GridLayout {
        origin_x: 5,
        origin_y: 5,
        cell_width: 20,
        cell_height: 20,
        gap: 2,
    }
}

fn paint_screen(colors: &[Option<[u8; 3]>]) -> RgbImage {
    let layout = layout();
    let (w, h) = layout.extent().unwrap();
    let mut screen = RgbImage::new(w + 10, h + 10);
    for (i, color) in colors.iter().enumerate() {
        let Some(color) = color else { continue };
        let (x0, y0, cw, ch) = layout.cell_rect(GridPos::from_index(i).unwrap());
        for y in y0 + 2..y0 + ch - 2 {
            for x in x0 + 2..x0 + cw - 2 {
                screen.put_pixel(x, y, Rgb(*color));
            }
        }
    }
    screen
}

fn board(units: &[(usize, [u8; 3])]) -> RgbImage {
    let mut colors = vec![None; GRID_SLOTS];
    for (index, color) in units {
        colors[*index] = Some(*color);
    }
    paint_screen(&colors)
}

/// Serves one screenshot, or fails while `failing` is set.
struct ScriptedScreen {
    screen: RgbImage,
    failing: bool,
}

impl ScreenSource for ScriptedScreen {
    fn screenshot(&mut self) -> Result<RgbImage, CaptureError> {
        if self.failing {
            Err(CaptureError::Disconnected("device offline".to_string()))
        } else {
            Ok(self.screen.clone())
        }
    }
}

#[derive(Default)]
struct RecordingActuator {
    swipes: Vec<(GridPos, GridPos)>,
    failing: bool,
}

impl Actuator for RecordingActuator {
    fn swipe(&mut self, from: GridPos, to: GridPos) -> Result<(), ActuatorError> {
        if self.failing {
            return Err(ActuatorError::Transport("input closed".to_string()));
        }
        self.swipes.push((from, to));
        Ok(())
    }
}

type TestCycle = DecisionCycle<ScreenCapture<ScriptedScreen>, RecordingActuator>;

fn cycle_for(screen: RgbImage) -> (TestCycle, EventSubscriber) {
    cycle_with_capacity(screen, 64)
}

fn cycle_with_capacity(screen: RgbImage, capacity: usize) -> (TestCycle, EventSubscriber) {
    let catalog = ReferenceCatalog::from_references(vec![
        UnitReference::from_colors("demon_hunter", vec![[200.0, 40.0, 200.0]]),
        UnitReference::from_colors("chemist", vec![[60.0, 60.0, 220.0]]),
    ]);
    let perception = Perception::new(
        CellClassifier::new(Arc::new(catalog), DEFAULT_MSE_THRESHOLD),
        RankEstimator::new(None, DEFAULT_RANK_CONFIDENCE),
    );
    let policy = MergePolicy::new(PolicyConfig::default()).unwrap();
    let capture = ScreenCapture::new(ScriptedScreen { screen, failing: false }, layout());
    let (publisher, subscriber) = events::channel(capacity);
    let cycle = DecisionCycle::new(capture, RecordingActuator::default(), perception, policy, publisher);
    (cycle, subscriber)
}

#[test]
fn test_pair_is_merged_and_published() {
    let (mut cycle, events) = cycle_for(board(&[(0, DEMON_HUNTER), (1, DEMON_HUNTER), (7, CHEMIST)]));
    let mut reader = cycle.reader();
    assert!(!reader.changed());

    let report = cycle.run_once();
    let action = report.merge().expect("a demon hunter pair on an open board is merged");
    assert_eq!(action.unit_a, "demon_hunter");
    assert_eq!(action.rank, 1);
    assert_eq!(action.reason, MergeReason::Priority);

    let mut merged = [action.position_a.index(), action.position_b.index()];
    merged.sort_unstable();
    assert_eq!(merged, [0, 1]);

    let (_, actuator) = cycle.transports_mut();
    assert_eq!(actuator.swipes, vec![(action.position_a, action.position_b)]);

    assert!(reader.changed(), "the cycle publishes a new snapshot");
    let snapshot = reader.latest();
    assert_eq!(snapshot.grid.unit_count("demon_hunter"), 2);
    assert_eq!(snapshot.census.unit_count("chemist"), 1);
    assert_eq!(snapshot.decision.as_ref().and_then(|d| d.merge()), Some(action));

    assert_eq!(report.grid_stats.total_units, 3);
    assert_eq!(report.grid_stats.empty_slots, 12);
    assert_eq!(report.grid_stats.low_confidence, 3, "no rank model means zero confidence");

    let issued = events.drain();
    assert_eq!(issued.len(), 1);
    assert!(matches!(&issued[0], BotEvent::MergeIssued { cycle: 0, .. }));
    assert_eq!(cycle.stats().merges_for(MergeReason::Priority), 1);
}

#[test]
fn test_ages_carry_across_cycles() {
    let (mut cycle, _events) = cycle_for(board(&[(3, CHEMIST)]));
    for _ in 0..3 {
        cycle.run_once();
    }
    let snapshot = cycle.latest().load();
    assert_eq!(snapshot.grid.cycle(), 2);
    assert!(snapshot.grid.iter().all(|s| s.age == 2), "an unchanged board ages every slot");
}

#[test]
fn test_saturated_board_waits() {
    let units: Vec<(usize, [u8; 3])> = (0..13).map(|i| (i, DEMON_HUNTER)).collect();
    let (mut cycle, events) = cycle_for(board(&units));

    let report = cycle.run_once();
    assert_eq!(report.outcome, CycleOutcome::Waiting);
    let (_, actuator) = cycle.transports_mut();
    assert!(actuator.swipes.is_empty(), "no swipe while waiting");
    assert_eq!(events.try_next(), Some(BotEvent::Waiting { cycle: 0 }));
    assert_eq!(cycle.stats().waits, 1);
}

#[test]
fn test_hidden_grid_is_an_empty_board() {
    let (mut cycle, events) = cycle_for(RgbImage::new(40, 40));

    let report = cycle.run_once();
    assert_eq!(report.outcome, CycleOutcome::Idle(NoAction::NeedMoreUnits));
    assert!(!report.is_failure());
    assert_eq!(report.grid_stats.empty_slots, GRID_SLOTS as u32);
    assert!(matches!(events.try_next(), Some(BotEvent::Idle { .. })));
}

#[test]
fn test_capture_failure_is_reported_and_loop_continues() {
    let (mut cycle, events) = cycle_for(board(&[(0, DEMON_HUNTER), (1, DEMON_HUNTER)]));
    cycle.transports_mut().0.source_mut().failing = true;

    let report = cycle.run_once();
    assert!(matches!(report.outcome, CycleOutcome::CaptureFailed(CaptureError::Disconnected(_))));
    assert!(report.is_failure());
    let snapshot = cycle.latest().load();
    assert_eq!(snapshot.grid.empty_count(), GRID_SLOTS, "failed capture publishes an empty grid");
    assert!(snapshot.decision.is_none());
    assert!(matches!(events.try_next(), Some(BotEvent::CaptureFailed { cycle: 0, .. })));

    cycle.transports_mut().0.source_mut().failing = false;
    let report = cycle.run_once();
    assert_eq!(report.cycle, 1);
    assert!(report.merge().is_some(), "the next cycle recovers from a fresh capture");
    assert_eq!(cycle.stats().capture_failures, 1);
    assert_eq!(cycle.stats().total_merges(), 1);
}

#[test]
fn test_actuator_failure_is_reported() {
    let (mut cycle, events) = cycle_for(board(&[(0, DEMON_HUNTER), (1, DEMON_HUNTER)]));
    cycle.transports_mut().1.failing = true;

    let report = cycle.run_once();
    match &report.outcome {
        CycleOutcome::ActuatorFailed { action, error } => {
            assert_eq!(action.unit_a, "demon_hunter");
            assert_eq!(error, &ActuatorError::Transport("input closed".to_string()));
        }
        other => panic!("expected an actuator failure, got {other:?}"),
    }
    // The decision itself is still published
    assert!(cycle.latest().load().decision.as_ref().and_then(|d| d.merge()).is_some());
    assert!(matches!(events.try_next(), Some(BotEvent::ActuatorFailed { rank: 1, .. })));
    assert_eq!(cycle.stats().actuator_failures, 1);
}

#[test]
fn test_run_many_cycles() {
    let (mut cycle, events) = cycle_for(board(&[(2, CHEMIST)]));
    let reports = cycle.run(4, Duration::ZERO);
    assert_eq!(reports.len(), 4);
    assert_eq!(cycle.cycle_count(), 4);
    assert_eq!(events.pending(), 4);
    assert_eq!(cycle.stats().cycles, 4);
    assert_eq!(cycle.stats().idles, 4);
    assert_eq!(cycle.stats().events_dropped, 0);
}

#[test]
fn test_slow_observer_never_stalls_the_cycle() {
    let (mut cycle, events) = cycle_with_capacity(board(&[(2, CHEMIST)]), 2);
    let reports = cycle.run(5, Duration::ZERO);
    assert_eq!(reports.len(), 5);
    assert_eq!(events.pending(), 2);
    assert_eq!(cycle.stats().events_dropped, 3);

    let kept: Vec<u64> = events.drain().iter().map(BotEvent::cycle).collect();
    assert_eq!(kept, vec![0, 1], "the oldest events are kept");
}

#[test]
fn test_unrecognized_board_is_flagged() {
    // Twelve cells of a color no reference is close to
    let units: Vec<(usize, [u8; 3])> = (0..12).map(|i| (i, [20, 220, 20])).collect();
    let (mut cycle, _events) = cycle_for(board(&units));

    let report = cycle.run_once();
    assert_eq!(report.grid_stats.total_units, 0, "unmatched colors read as empty cells");
    assert!(recognition_warnings(&report.grid_stats).contains(&RecognitionWarning::SparseBoard(0)));
}

#[test]
fn test_snapshot_visible_from_another_thread() {
    let (mut cycle, _events) = cycle_for(board(&[(0, DEMON_HUNTER), (1, DEMON_HUNTER)]));
    let latest = cycle.latest();
    cycle.run_once();

    let handle = std::thread::spawn(move || {
        let snapshot = latest.load();
        (latest.generation(), snapshot.grid.unit_count("demon_hunter"))
    });
    assert_eq!(handle.join().unwrap(), (1, 2));
}

#[test]
fn test_from_config_loads_assets() {
    let dir = tempfile::tempdir().unwrap();
    for (unit, color) in [("demon_hunter", DEMON_HUNTER), ("chemist", CHEMIST)] {
        let icon = RgbImage::from_pixel(16, 16, Rgb(color));
        icon.save(dir.path().join(format!("{unit}.png"))).unwrap();
    }

    let mut config = BotConfig::default();
    config.recognition.active_deck_dir = dir.path().to_path_buf();
    let screen = ScriptedScreen {
        screen: RgbImage::new(10, 10),
        failing: false,
    };
    let capture = ScreenCapture::new(screen, config.layout.grid());
    let (mut cycle, events) = DecisionCycle::from_config(&config, capture, RecordingActuator::default()).unwrap();
    cycle.run_once();
    assert!(events.pending() > 0);

    config.recognition.active_deck_dir = dir.path().join("missing");
    let capture = ScreenCapture::new(
        ScriptedScreen {
            screen: RgbImage::new(10, 10),
            failing: false,
        },
        config.layout.grid(),
    );
    let err = DecisionCycle::from_config(&config, capture, RecordingActuator::default())
        .err()
        .expect("missing deck directory must fail startup");
    assert!(matches!(err, BotError::Vision(_)));
}
