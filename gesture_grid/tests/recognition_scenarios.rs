// tests/recognition_scenarios.rs: end-to-end runs through the public pipeline API.

use gesture_grid::core_modules::gesture::Catalog;
use gesture_grid::core_modules::grid::{Grid, RegionLookup};
use gesture_grid::pipeline::{
    CatalogBound, Detection, GesturePattern, GesturePipeline, MatchState, Pattern, Point,
    RecognizerConfig, Report, TrackerPhase,
};

fn pipeline_2x2() -> GesturePipeline {
    GesturePipeline::new(RecognizerConfig::new(100, 100)).unwrap()
}

// ===== Geometry & locator =====

#[test]
fn scenario_a_two_by_two_grid_over_square_frame() {
    let grid = Grid::new(2, 2, 100, 100).unwrap();
    assert_eq!(grid.len(), 4);
    for region in grid.regions() {
        assert_eq!((region.width(), region.height()), (50, 50));
    }

    let detection = Detection::new(10, 10, 20, 20);
    assert_eq!(detection.center(), Point::new(20, 20));
    assert_eq!(grid.locate(&[detection]), Ok(vec![0]));
}

#[test]
fn region_boundaries_are_inclusive() {
    let grid = Grid::new(2, 2, 100, 100).unwrap();
    assert_eq!(grid.region_of(Point::new(49, 49)), Ok(0));
    assert_eq!(grid.region_of(Point::new(50, 49)), Ok(1));
    assert_eq!(grid.region_of(Point::new(49, 50)), Ok(2));
    assert_eq!(grid.region_of(Point::new(99, 99)), Ok(3));
}

// ===== Catalog =====

#[test]
fn exact_catalog_pins_the_region_bound() {
    let catalog = Catalog::generate_all(2, 2, CatalogBound::Exact);
    assert_eq!(catalog.len(), 6);
    assert!(catalog.iter().all(|p| p.fields().iter().all(|&i| i < 4)));
    assert!(catalog.iter().all(|p| p.fields()[0] != p.fields()[1]));
}

#[test]
fn legacy_catalog_includes_the_phantom_region() {
    let catalog = Catalog::generate_all(2, 2, CatalogBound::Legacy);
    assert_eq!(catalog.len(), 10);
    assert!(catalog.iter().any(|p| p.fields().contains(&4)));
}

#[test]
fn nine_region_catalog() {
    let config = RecognizerConfig {
        n_fields: 9,
        ..RecognizerConfig::new(300, 300)
    };
    let pipeline = GesturePipeline::new(config).unwrap();
    assert_eq!(pipeline.grid().len(), 9);
    assert_eq!(pipeline.catalog().len(), 45);
}

// ===== Tracker scenarios =====

#[test]
fn scenario_b_move_completes_gesture_and_resets() {
    let mut pipeline = pipeline_2x2();

    let first = pipeline.process_frame(&[Detection::new(10, 10, 20, 20)]).unwrap();
    assert_eq!(
        first,
        Report::Tracking {
            region: 0,
            state: MatchState::Partial
        }
    );

    let second = pipeline.process_frame(&[Detection::new(60, 60, 20, 20)]).unwrap();
    let Report::GestureCompleted(gesture) = second else {
        panic!("expected a completed gesture, got {second:?}");
    };
    assert_eq!(gesture.pattern, GesturePattern::two_region(0, 3));
    assert_eq!(gesture.path, vec![Point::new(10, 10), Point::new(60, 60)]);

    assert_eq!(pipeline.phase(), TrackerPhase::Idle);
    assert!(pipeline.history().is_empty());
    assert!(pipeline.path().is_empty());
    assert_eq!(pipeline.completed_gestures(), 1);
}

#[test]
fn scenario_c_staying_put_truncates_history_and_restarts_path() {
    let mut pipeline = pipeline_2x2();

    pipeline.process_frame(&[Detection::new(10, 10, 20, 20)]).unwrap();
    let report = pipeline.process_frame(&[Detection::new(12, 14, 20, 20)]).unwrap();

    assert_eq!(
        report,
        Report::Tracking {
            region: 0,
            state: MatchState::Partial
        }
    );
    assert_eq!(pipeline.history(), &[0]);
    assert_eq!(pipeline.path(), &[Point::new(12, 14)]);
}

#[test]
fn opening_in_the_last_region_still_allows_a_swipe() {
    let mut pipeline = pipeline_2x2();

    let report = pipeline.process_frame(&[Detection::new(60, 60, 20, 20)]).unwrap();
    assert_eq!(
        report,
        Report::Tracking {
            region: 3,
            state: MatchState::Partial
        }
    );

    pipeline.process_frame(&[Detection::new(10, 10, 20, 20)]).unwrap();
    assert_eq!(pipeline.history(), &[0]);

    let report = pipeline.process_frame(&[Detection::new(60, 60, 20, 20)]).unwrap();
    let Report::GestureCompleted(gesture) = report else {
        panic!("expected the 0 -> 3 swipe to complete, got {report:?}");
    };
    assert_eq!(gesture.pattern, GesturePattern::two_region(0, 3));
    assert!(gesture.path.iter().all(|&p| pipeline.grid().in_bounds(p)));
}

#[test]
fn gaps_between_detections_do_not_break_a_gesture() {
    let mut pipeline = pipeline_2x2();

    pipeline.process_frame(&[Detection::new(10, 60, 20, 20)]).unwrap();
    assert_eq!(pipeline.process_frame(&[]), Ok(Report::NoDetection));
    assert_eq!(pipeline.process_frame(&[]), Ok(Report::NoDetection));
    let report = pipeline.process_frame(&[Detection::new(60, 60, 20, 20)]).unwrap();

    let Report::GestureCompleted(gesture) = report else {
        panic!("expected completion, got {report:?}");
    };
    assert_eq!(gesture.pattern.fields(), &[2, 3]);
}

#[test]
fn three_region_gesture_needs_an_unbroken_prefix() {
    let config = RecognizerConfig {
        gestures: Some(vec![GesturePattern::new(vec![0, 1, 3]).unwrap()]),
        ..RecognizerConfig::new(100, 100)
    };
    let mut pipeline = GesturePipeline::new(config).unwrap();

    // [0] then [0, 1]: both partial, and the second collapses history to [1].
    pipeline.process_frame(&[Detection::new(10, 10, 20, 20)]).unwrap();
    pipeline.process_frame(&[Detection::new(60, 10, 20, 20)]).unwrap();
    assert_eq!(pipeline.history(), &[1]);

    // [1, 3] does not start like [0, 1, 3], so nothing completes.
    let report = pipeline.process_frame(&[Detection::new(60, 60, 20, 20)]).unwrap();
    assert_eq!(
        report,
        Report::Tracking {
            region: 3,
            state: MatchState::None
        }
    );
    assert_eq!(pipeline.history(), &[1, 3]);
}

#[test]
fn overlay_marks_the_winning_detection() {
    let mut pipeline = pipeline_2x2();
    pipeline
        .process_frame(&[Detection::new(10, 10, 20, 20), Detection::new(60, 60, 10, 10)])
        .unwrap();

    let surface = pipeline.grid().surface();
    assert_eq!(surface.get_pixel(20, 20).0[0], 255);
    assert_eq!(surface.get_pixel(65, 65).0[0], 0);

    pipeline.grid_mut().clear_surface();
    assert_eq!(pipeline.grid().surface().get_pixel(20, 20).0[0], 0);
}
