// THEORY:
// A `Detection` is the raw bounding box an external object detector reports for a
// single frame. Like `Chunk` and `SmartBlob`, it is a "dumb" data container: it
// only knows how to derive the handful of reference points the rest of the
// system needs.
//
// - The **center** (floor division) decides which grid region was visited.
// - The **anchor** (top-left corner) is what gets stored in a gesture path.
// - The **marker** is where the grid surface draws its dot.
//
// The detector may return several candidates for the same hand. Picking one of
// them is policy rather than core logic; `select_winning` provides the default
// "largest box wins" policy so a frame loop can be wired up without writing one.

use crate::core_modules::geometry::Point;

/// A bounding box in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Detection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Detection {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The box center, rounded down on both axes. Boxes reaching past the
    /// coordinate range saturate at `u32::MAX`, which no frame covers.
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// The reference corner recorded in gesture paths.
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Where the overlay marker is drawn. Rounds up where `center` rounds down.
    pub fn marker(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width - self.width / 2),
            self.y.saturating_add(self.height - self.height / 2),
        )
    }

    /// The larger of the two box dimensions.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl From<(u32, u32, u32, u32)> for Detection {
    fn from((x, y, width, height): (u32, u32, u32, u32)) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<[u32; 4]> for Detection {
    fn from([x, y, width, height]: [u32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

/// Keeps only the boxes that reach the largest dimension seen in the batch (by
/// width or by height) and returns the first of them.
pub fn select_winning(detections: &[Detection]) -> Option<Detection> {
    let largest = detections.iter().map(Detection::max_dimension).max()?;
    detections
        .iter()
        .find(|d| d.width == largest || d.height == largest)
        .copied()
}
