// THEORY:
// The `pipeline` module is the top-level API of the recognition engine. It wires
// the grid, the gesture catalog and the tracker into a single per-frame call so
// a frame loop only has to hand over the detector's boxes and read back a
// `Report`.

use crate::core_modules::detection::select_winning;
use crate::core_modules::grid::{Grid, RegionLookup, square_side};
use crate::core_modules::tracker::{RecognitionTracker, StepOutcome};
use crate::error::{ConfigError, LocateError};
use tracing::{debug, info};

// Re-export key data structures for the public API.
pub use crate::core_modules::detection::Detection;
pub use crate::core_modules::geometry::{Point, Region};
pub use crate::core_modules::gesture::{Catalog, CatalogBound, GesturePattern, MatchState, Pattern};
pub use crate::core_modules::tracker::{CompletedGesture, TrackerPhase};

const DEFAULT_N_FIELDS: usize = 4;

/// Configuration for the GesturePipeline.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Total number of grid regions. Must be a perfect square.
    pub n_fields: usize,
    /// Explicit catalog. `None` or an empty list means every two-region gesture.
    pub gestures: Option<Vec<GesturePattern>>,
    /// Index bound for the generated catalog.
    pub catalog_bound: CatalogBound,
}

impl RecognizerConfig {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            ..Self::default()
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            n_fields: DEFAULT_N_FIELDS,
            gestures: None,
            catalog_bound: CatalogBound::default(),
        }
    }
}

/// The output of the pipeline for a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The detector found nothing; tracker state is untouched.
    NoDetection,
    /// The winning detection landed in `region` and no gesture completed yet.
    Tracking { region: usize, state: MatchState },
    GestureCompleted(CompletedGesture),
}

/// The main, top-level struct for the recognition engine.
#[derive(Debug, Clone)]
pub struct GesturePipeline {
    grid: Grid,
    catalog: Catalog,
    tracker: RecognitionTracker,
    config: RecognizerConfig,
}

impl GesturePipeline {
    pub fn new(config: RecognizerConfig) -> Result<Self, ConfigError> {
        let side = square_side(config.n_fields)?;
        let grid = Grid::new(side, side, config.frame_width, config.frame_height)?;

        let catalog = match config.gestures.as_deref() {
            Some(patterns) if !patterns.is_empty() => {
                Catalog::from_patterns(patterns.to_vec(), grid.len())?
            }
            _ => Catalog::generate_all(side as usize, side as usize, config.catalog_bound),
        };

        info!(
            width = config.frame_width,
            height = config.frame_height,
            regions = grid.len(),
            gestures = catalog.len(),
            "gesture pipeline ready"
        );

        Ok(Self {
            grid,
            catalog,
            tracker: RecognitionTracker::new(),
            config,
        })
    }

    /// Processes the detector output for one frame.
    pub fn process_frame(&mut self, detections: &[Detection]) -> Result<Report, LocateError> {
        let Some(winner) = select_winning(detections) else {
            debug!("no detection this frame");
            return Ok(Report::NoDetection);
        };

        let region = self.grid.region_of(winner.center())?;
        self.grid.render(&[winner]);

        let report = match self.tracker.step(&self.grid, &self.catalog, region, &winner) {
            StepOutcome::Accumulating { best } => Report::Tracking {
                region,
                state: best,
            },
            StepOutcome::Completed(gesture) => Report::GestureCompleted(gesture),
        };
        Ok(report)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn history(&self) -> &[usize] {
        self.tracker.history()
    }

    pub fn path(&self) -> &[Point] {
        self.tracker.path()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.tracker.phase()
    }

    pub fn completed_gestures(&self) -> u64 {
        self.tracker.completed()
    }

    /// Forgets any partially walked gesture.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}
