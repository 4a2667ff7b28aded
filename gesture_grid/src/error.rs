//! Error types for the recognition core.
//!
//! Configuration problems are fatal at setup time. A detection that cannot be
//! placed on the grid is a broken tiling invariant, reported per frame.

use crate::core_modules::geometry::Point;

/// Invalid setup: grid shape, frame size or gesture catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("region count must be positive")]
    NoRegions,
    #[error("region count {0} has no integer square root")]
    NotPerfectSquare(usize),
    #[error("grid needs at least one row and one field per row (got {rows}x{fields_in_row})")]
    EmptyGrid { rows: u32, fields_in_row: u32 },
    #[error("a {rows}x{fields_in_row} grid has more regions than can be addressed")]
    GridTooLarge { rows: u32, fields_in_row: u32 },
    #[error("frame size must be positive (got {width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("region size must be positive (got {width}x{height})")]
    EmptyRegion { width: u32, height: u32 },
    #[error("region at ({}, {}) of size {width}x{height} runs past the coordinate range", .top_left.x, .top_left.y)]
    RegionOverflow {
        top_left: Point,
        width: u32,
        height: u32,
    },
    #[error("frame {width}x{height} is too small for a {rows}x{fields_in_row} grid")]
    FrameTooSmall {
        width: u32,
        height: u32,
        rows: u32,
        fields_in_row: u32,
    },
    #[error("gesture pattern needs at least two regions (got {0})")]
    PatternTooShort(usize),
    #[error("gesture pattern refers to region {index} but the grid has {region_count} regions")]
    PatternOutOfRange { index: usize, region_count: usize },
}

/// A detection center that the grid could not place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("point ({}, {}) is not covered by any grid region", .0.x, .0.y)]
    Uncovered(Point),
}

/// Failure talking to a running recognition session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("recognition session has shut down")]
    Closed,
    #[error(transparent)]
    Locate(#[from] LocateError),
}
