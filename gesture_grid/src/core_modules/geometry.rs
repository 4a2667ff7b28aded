// THEORY:
// The `geometry` module holds the two value types every other layer speaks in:
// a `Point` in frame pixel coordinates and a `Region`, one axis-aligned cell of
// the partitioned frame.
//
// Key architectural principles:
// 1.  **Value Semantics**: Both types are small `Copy` data containers. Once built
//     they never change, so they can be handed to the renderer or stored in a
//     path without any ownership ceremony.
// 2.  **Inclusive Bounds**: A `Region` remembers its top-left corner and derives
//     its bottom-right corner as the last pixel it still owns. Containment is
//     inclusive on both ends and is checked per axis. Points deliberately have no
//     ordering: "less than" between two points is not meaningful on its own.
// 3.  **Validated Construction**: A region with a zero width or height would
//     contain nothing and silently break the tiling guarantees of the grid, so the
//     constructor rejects it instead.

use crate::error::ConfigError;

/// A pixel position in the frame. The origin is the top-left corner, `x` grows to
/// the right and `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One rectangular cell of the frame grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    top_left: Point,
    bottom_right: Point,
    width: u32,
    height: u32,
}

impl Region {
    /// Creates a region from its top-left corner and size. Both dimensions must be
    /// at least one pixel.
    pub fn new(top_left: Point, width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyRegion { width, height });
        }

        let overflow = || ConfigError::RegionOverflow {
            top_left,
            width,
            height,
        };
        let right = top_left.x.checked_add(width - 1).ok_or_else(overflow)?;
        let bottom = top_left.y.checked_add(height - 1).ok_or_else(overflow)?;

        Ok(Self {
            top_left,
            bottom_right: Point::new(right, bottom),
            width,
            height,
        })
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    /// The last pixel that still belongs to this region.
    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels covered by the region.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Inclusive containment test, evaluated independently on each axis.
    pub fn contains(&self, point: Point) -> bool {
        (self.top_left.x..=self.bottom_right.x).contains(&point.x)
            && (self.top_left.y..=self.bottom_right.y).contains(&point.y)
    }

    /// Returns `true` if the two regions share at least one pixel.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.top_left.x <= other.bottom_right.x
            && other.top_left.x <= self.bottom_right.x
            && self.top_left.y <= other.bottom_right.y
            && other.top_left.y <= self.bottom_right.y
    }
}
