// THEORY:
// The `tracker` module gives the recognition system its memory. A single frame
// only says "the hand is in region 3"; a gesture only exists across frames. The
// `RecognitionTracker` accumulates region visits and the matching path points
// until the catalog reports that a whole gesture has been walked.
//
// Key architectural principles:
// 1.  **Explicit Ownership**: All cross-frame state lives in this one value. The
//     frame-loop driver owns it and threads it through every call; nothing is
//     global and nothing is shared between threads.
// 2.  **Two Sequences, One Lifecycle**: `history` holds visited region indices and
//     `path` holds the anchor points recorded alongside them. Both are cleared
//     together when a gesture completes.
// 3.  **Bounded History**: While a gesture is only partially matched, the history
//     collapses to its most recent visit once it grows past one entry. The tracker
//     therefore only ever reasons about the latest one or two regions.
// 4.  **Path Restart**: If the path still begins inside the region the history now
//     starts from, the hand came back to (or never left) its starting region, so
//     the path restarts at the current anchor.
// 5.  **First Declared Wins**: All patterns are checked against the updated
//     history first. If any completes, the earliest one in the catalog is emitted.

use crate::core_modules::detection::Detection;
use crate::core_modules::geometry::Point;
use crate::core_modules::gesture::{Catalog, GesturePattern, MatchState};
use crate::core_modules::grid::RegionLookup;
use tracing::{debug, info};

/// A fully walked gesture together with the path that walked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedGesture {
    pub pattern: GesturePattern,
    /// Position of the pattern in the catalog.
    pub catalog_index: usize,
    pub path: Vec<Point>,
}

/// What a single tracker step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No pattern completed; `best` is the strongest match any pattern reported.
    Accumulating { best: MatchState },
    /// A pattern completed and the tracker is idle again.
    Completed(CompletedGesture),
}

/// The coarse tracker state, for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    Idle,
    Accumulating,
}

/// Cross-frame recognition state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionTracker {
    history: Vec<usize>,
    path: Vec<Point>,
    frames_seen: u64,
    completed: u64,
}

impl RecognitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TrackerPhase {
        if self.history.is_empty() {
            TrackerPhase::Idle
        } else {
            TrackerPhase::Accumulating
        }
    }

    /// Visited region indices, oldest first.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Anchor points recorded since the last reset.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Frames that advanced the tracker.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Gestures completed so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Drops all accumulated history and path points.
    pub fn reset(&mut self) {
        self.history.clear();
        self.path.clear();
    }

    /// Advances the tracker by one frame in which `detection` was seen inside
    /// region `region` of `grid`.
    pub fn step<L: RegionLookup + ?Sized>(
        &mut self,
        grid: &L,
        catalog: &Catalog,
        region: usize,
        detection: &Detection,
    ) -> StepOutcome {
        self.frames_seen += 1;
        self.history.push(region);
        let anchor = detection.anchor();

        let states = catalog.evaluate(&self.history);
        let completed = states
            .iter()
            .position(|state| *state == MatchState::Complete)
            .and_then(|index| catalog.get(index).map(|pattern| (index, pattern.clone())));

        if let Some((catalog_index, pattern)) = completed {
            let mut path = std::mem::take(&mut self.path);
            path.push(anchor);
            self.history.clear();
            self.completed += 1;

            info!(%pattern, points = path.len(), "gesture completed");
            return StepOutcome::Completed(CompletedGesture {
                pattern,
                catalog_index,
                path,
            });
        }

        let best = states.iter().copied().max().unwrap_or(MatchState::None);
        if best == MatchState::Partial && self.history.len() > 1 {
            let last = self.history.len() - 1;
            self.history.drain(..last);
        }
        self.record_anchor(grid, anchor);

        debug!(
            region,
            ?best,
            history = ?self.history,
            path_len = self.path.len(),
            "tracker advanced"
        );
        StepOutcome::Accumulating { best }
    }

    fn record_anchor<L: RegionLookup + ?Sized>(&mut self, grid: &L, anchor: Point) {
        let start_region = self
            .history
            .first()
            .and_then(|&index| grid.regions().get(index));

        let restarts = match (self.path.first(), start_region) {
            (Some(&first), Some(region)) => region.contains(first),
            _ => false,
        };

        if restarts {
            self.path.clear();
        }
        self.path.push(anchor);
    }
}
