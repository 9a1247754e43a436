//! Integration tests for grid state building and the perception pipeline.

use std::sync::Arc;

use gridmerge_core::{Census, GridPos, UnitId, GRID_SLOTS};
use gridmerge_vision::{
    build_grid, CellClassifier, CellResult, Classification, GridLayout, Perception, RankEstimate,
    RankEstimator, ReferenceCatalog, UnitReference, DEFAULT_MSE_THRESHOLD, DEFAULT_RANK_CONFIDENCE,
};
use image::{Rgb, RgbImage};

fn cell(unit: &str, rank: u8) -> CellResult {
    CellResult {
        classification: Classification::matched(UnitId::new(unit), 12.0, DEFAULT_MSE_THRESHOLD),
        rank: RankEstimate::new(rank, 0.8, DEFAULT_RANK_CONFIDENCE),
    }
}

fn board(units: &[(&str, u8)]) -> Vec<CellResult> {
    (0..GRID_SLOTS)
        .map(|i| units.get(i).map_or_else(CellResult::empty, |(u, r)| cell(u, *r)))
        .collect()
}

#[test]
fn test_first_cycle_has_zero_age() {
    let grid = build_grid(0, &board(&[("dryad", 1), ("chemist", 2), ("harlequin", 1)]), None);
    assert!(grid.iter().all(|s| s.age == 0), "no previous state means age 0 everywhere");
}

#[test]
fn test_age_increments_only_when_unchanged() {
    let first = build_grid(0, &board(&[("dryad", 1), ("chemist", 2), ("harlequin", 1)]), None);
    let second = build_grid(1, &board(&[("dryad", 1), ("chemist", 3), ("zealot", 1)]), Some(&first));
    let third = build_grid(2, &board(&[("dryad", 1), ("chemist", 3), ("zealot", 1)]), Some(&second));

    for (prev, curr) in second.iter().zip(third.iter()) {
        if prev.same_occupant(curr) {
            assert_eq!(curr.age, prev.age + 1, "slot {} kept its unit", curr.pos);
        } else {
            assert_eq!(curr.age, 0, "slot {} changed", curr.pos);
        }
    }

    let p = |i| GridPos::from_index(i).unwrap();
    assert_eq!(second.slot(p(0)).age, 1, "dryad unchanged");
    assert_eq!(second.slot(p(1)).age, 0, "chemist rank changed");
    assert_eq!(second.slot(p(2)).age, 0, "unit changed");
    assert_eq!(third.slot(p(0)).age, 2);
    assert_eq!(third.slot(p(1)).age, 1);
    // Empty slots age too
    assert_eq!(third.slot(p(14)).age, 2);
}

#[test]
fn test_single_frame_flicker_resets_age() {
    let mut grid = build_grid(0, &board(&[("dryad", 2)]), None);
    for cycle in 1..5 {
        grid = build_grid(cycle, &board(&[("dryad", 2)]), Some(&grid));
    }
    assert_eq!(grid.slots()[0].age, 4);

    let flicker = build_grid(5, &board(&[("bruser", 2)]), Some(&grid));
    assert_eq!(flicker.slots()[0].age, 0);
    let back = build_grid(6, &board(&[("dryad", 2)]), Some(&flicker));
    assert_eq!(back.slots()[0].age, 0, "age restarts after the flicker");

    let census = Census::aggregate_with_min_age(&back, 1);
    assert_eq!(census.series().get("dryad", 2), 0, "young slot left out of the series");
    assert_eq!(census.unit_count("dryad"), 1);
}

fn paint_screen(layout: &GridLayout, colors: &[Option<[u8; 3]>]) -> RgbImage {
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

#[test]
fn test_pipeline_end_to_end() {
    let catalog = ReferenceCatalog::from_references(vec![
        UnitReference::from_colors("dryad", vec![[40.0, 180.0, 60.0]]),
        UnitReference::from_colors("harlequin", vec![[220.0, 40.0, 40.0]]),
        UnitReference::from_colors("chemist", vec![[60.0, 60.0, 220.0]]),
    ]);
    let perception = Perception::new(
        CellClassifier::new(Arc::new(catalog), DEFAULT_MSE_THRESHOLD),
        RankEstimator::new(None, DEFAULT_RANK_CONFIDENCE),
    );

    let layout = GridLayout {
        origin_x: 5,
        origin_y: 5,
        cell_width: 20,
        cell_height: 20,
        gap: 2,
    };
    let mut colors = vec![None; GRID_SLOTS];
    colors[0] = Some([42, 178, 62]);
    colors[6] = Some([218, 44, 38]);
    colors[14] = Some([60, 60, 220]);
    let screen = paint_screen(&layout, &colors);

    let cells = layout.crop_cells(&screen).unwrap();
    let first = perception.perceive(0, Some(cells.as_slice()), None);
    assert_eq!(first.slots()[0].unit, "dryad");
    assert_eq!(first.slots()[6].unit, "harlequin");
    assert_eq!(first.slots()[14].unit, "chemist");
    assert_eq!(first.empty_count(), 12);
    assert_eq!(first.slots()[0].rank, 1, "no model means rank 1");
    assert_eq!(first.slots()[1].rank, 0);

    let second = perception.perceive(1, Some(cells.as_slice()), Some(&first));
    assert!(second.iter().all(|s| s.age == 1));

    // Grid not visible: all empty, not an error
    let hidden = perception.perceive(2, None, Some(&second));
    assert_eq!(hidden.empty_count(), GRID_SLOTS);
    assert_eq!(hidden.slots()[0].age, 0);
    assert_eq!(hidden.slots()[1].age, 2);
}
