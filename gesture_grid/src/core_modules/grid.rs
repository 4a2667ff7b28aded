// THEORY:
// The `Grid` is the spatial backbone of the recognition system. It cuts the video
// frame into `rows x fields_in_row` disjoint regions, and every later layer talks
// about "where the hand is" purely in terms of region indices.
//
// Key architectural principles:
// 1.  **Exact Tiling**: Every pixel of the frame belongs to exactly one region.
//     Nominal cell sizes are the ceiling of `frame / cells`; the last column and
//     the last row absorb whatever is left, so the right and bottom edges land on
//     `frame_width - 1` and `frame_height - 1` no matter how the division rounds.
// 2.  **Stable Indexing**: Regions are stored row-major and never change for the
//     lifetime of the grid, so an index observed in one frame means the same
//     rectangle in every later frame.
// 3.  **Region Lookup**: Mapping a batch of detections to regions is a stateless
//     scan. Because regions never overlap, at most one region can match; seeing
//     more than one is a broken invariant and is reported loudly.
// 4.  **Render Hook**: The grid owns an opaque grayscale surface sized to the
//     frame. The core only ever marks detection positions on it; turning it into
//     pixels on a screen is somebody else's job.

use crate::core_modules::detection::Detection;
use crate::core_modules::geometry::{Point, Region};
use crate::error::{ConfigError, LocateError};
use image::{GrayImage, Luma};
use tracing::error;

const MARKER_RADIUS: i64 = 2;
const MARKER_COLOR: Luma<u8> = Luma([255]);

/// Capability shared by every partitioned surface: find the region holding a
/// point, and draw detections for the overlay.
pub trait RegionLookup {
    /// All regions in index order.
    fn regions(&self) -> &[Region];

    /// Marks the given detections on the lookup's render surface.
    fn render(&mut self, detections: &[Detection]);

    /// Returns the index of the region containing `point`.
    ///
    /// The first matching region wins. More than one match means the regions
    /// overlap, which is logged as an invariant violation.
    fn region_of(&self, point: Point) -> Result<usize, LocateError> {
        let mut hits = self
            .regions()
            .iter()
            .enumerate()
            .filter(|(_, region)| region.contains(point))
            .map(|(index, _)| index);

        let first = hits.next().ok_or(LocateError::Uncovered(point))?;
        let extra: Vec<usize> = hits.collect();
        if !extra.is_empty() {
            error!(
                x = point.x,
                y = point.y,
                first,
                ?extra,
                "point matched more than one region, grid regions overlap"
            );
        }
        Ok(first)
    }

    /// Region index of each detection's center, in input order.
    fn locate(&self, detections: &[Detection]) -> Result<Vec<usize>, LocateError> {
        detections
            .iter()
            .map(|detection| self.region_of(detection.center()))
            .collect()
    }
}

/// A frame partitioned into a row-major grid of regions.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: u32,
    fields_in_row: u32,
    frame_width: u32,
    frame_height: u32,
    regions: Vec<Region>,
    surface: GrayImage,
}

impl Grid {
    /// Partitions a `frame_width x frame_height` frame into `rows x fields_in_row`
    /// regions.
    pub fn new(
        rows: u32,
        fields_in_row: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || fields_in_row == 0 {
            return Err(ConfigError::EmptyGrid {
                rows,
                fields_in_row,
            });
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(ConfigError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            });
        }

        let region_count = rows
            .checked_mul(fields_in_row)
            .and_then(|count| usize::try_from(count).ok())
            .ok_or(ConfigError::GridTooLarge {
                rows,
                fields_in_row,
            })?;

        let too_small = || ConfigError::FrameTooSmall {
            width: frame_width,
            height: frame_height,
            rows,
            fields_in_row,
        };
        let columns = axis_spans(frame_width, fields_in_row).ok_or_else(too_small)?;
        let row_spans = axis_spans(frame_height, rows).ok_or_else(too_small)?;

        let mut regions = Vec::with_capacity(region_count);
        for &(y_top, field_height) in &row_spans {
            for &(x_left, field_width) in &columns {
                regions.push(Region::new(
                    Point::new(x_left, y_top),
                    field_width,
                    field_height,
                )?);
            }
        }

        Ok(Self {
            rows,
            fields_in_row,
            frame_width,
            frame_height,
            regions,
            surface: GrayImage::new(frame_width, frame_height),
        })
    }

    /// Builds a square grid holding `n_fields` regions. `n_fields` must have an
    /// integer square root, which becomes both the row and the column count.
    pub fn square(n_fields: usize, frame_width: u32, frame_height: u32) -> Result<Self, ConfigError> {
        let side = square_side(n_fields)?;
        Self::new(side, side, frame_width, frame_height)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn fields_in_row(&self) -> u32 {
        self.fields_in_row
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// Returns `true` if the point lies inside the frame.
    pub fn in_bounds(&self, point: Point) -> bool {
        point.x < self.frame_width && point.y < self.frame_height
    }

    /// The overlay surface, black except for marked detections.
    pub fn surface(&self) -> &GrayImage {
        &self.surface
    }

    pub fn clear_surface(&mut self) {
        self.surface.pixels_mut().for_each(|pixel| *pixel = Luma([0]));
    }

    /// Draws a small filled disc at each detection's marker point, clipped to
    /// the frame.
    pub fn mark_detections(&mut self, detections: &[Detection]) {
        for detection in detections {
            let marker = detection.marker();
            let (cx, cy) = (marker.x as i64, marker.y as i64);
            for dy in -MARKER_RADIUS..=MARKER_RADIUS {
                for dx in -MARKER_RADIUS..=MARKER_RADIUS {
                    if dx * dx + dy * dy > MARKER_RADIUS * MARKER_RADIUS {
                        continue;
                    }
                    let (px, py) = (cx + dx, cy + dy);
                    if px >= 0
                        && py >= 0
                        && px < self.frame_width as i64
                        && py < self.frame_height as i64
                    {
                        self.surface.put_pixel(px as u32, py as u32, MARKER_COLOR);
                    }
                }
            }
        }
    }
}

impl RegionLookup for Grid {
    fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn render(&mut self, detections: &[Detection]) {
        self.mark_detections(detections);
    }
}

/// Integer square root of a region count, rejecting counts that are not perfect
/// squares.
pub fn square_side(n_fields: usize) -> Result<u32, ConfigError> {
    if n_fields == 0 {
        return Err(ConfigError::NoRegions);
    }
    let side = n_fields.isqrt();
    if side * side != n_fields {
        return Err(ConfigError::NotPerfectSquare(n_fields));
    }
    u32::try_from(side).map_err(|_| ConfigError::NotPerfectSquare(n_fields))
}

/// Splits `total` pixels into `count` consecutive `(start, length)` spans.
/// All spans but the last use the rounded-up nominal length; the last one takes
/// the remainder. Returns `None` when the remainder would be empty.
fn axis_spans(total: u32, count: u32) -> Option<Vec<(u32, u32)>> {
    let nominal = total.div_ceil(count);
    let last_start = (count - 1).checked_mul(nominal)?;
    if last_start >= total {
        return None;
    }

    let mut spans: Vec<(u32, u32)> = (0..count - 1).map(|i| (i * nominal, nominal)).collect();
    spans.push((last_start, total - last_start));
    Some(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split_gives_equal_regions() {
        let grid = Grid::new(2, 2, 100, 100).unwrap();
        assert_eq!(grid.len(), 4);
        for region in grid.regions() {
            assert_eq!((region.width(), region.height()), (50, 50));
        }
        assert_eq!(grid.region(3).unwrap().top_left(), Point::new(50, 50));
        assert_eq!(grid.region(3).unwrap().bottom_right(), Point::new(99, 99));
    }

    #[test]
    fn last_column_and_row_absorb_the_remainder() {
        let grid = Grid::new(2, 2, 101, 75).unwrap();
        let left = grid.region(0).unwrap();
        let right = grid.region(1).unwrap();
        assert_eq!((left.width(), right.width()), (51, 50));
        assert_eq!(right.top_left().x, 51);
        assert_eq!(right.bottom_right().x, 100);

        let bottom = grid.region(2).unwrap();
        assert_eq!(grid.region(0).unwrap().height(), 38);
        assert_eq!(bottom.height(), 37);
        assert_eq!(bottom.bottom_right().y, 74);
    }

    #[test]
    fn regions_are_row_major() {
        let grid = Grid::new(3, 3, 90, 60).unwrap();
        let origins: Vec<Point> = grid.regions().iter().map(Region::top_left).collect();
        assert_eq!(
            origins,
            vec![
                Point::new(0, 0),
                Point::new(30, 0),
                Point::new(60, 0),
                Point::new(0, 20),
                Point::new(30, 20),
                Point::new(60, 20),
                Point::new(0, 40),
                Point::new(30, 40),
                Point::new(60, 40),
            ]
        );
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert!(matches!(Grid::new(0, 2, 100, 100), Err(ConfigError::EmptyGrid { .. })));
        assert!(matches!(Grid::new(2, 0, 100, 100), Err(ConfigError::EmptyGrid { .. })));
        assert!(matches!(Grid::new(2, 2, 0, 100), Err(ConfigError::EmptyFrame { .. })));
        assert!(matches!(Grid::new(2, 2, 100, 0), Err(ConfigError::EmptyFrame { .. })));
        // ceil(9 / 4) = 3, so three nominal columns already consume the frame.
        assert!(matches!(Grid::new(1, 4, 9, 10), Err(ConfigError::FrameTooSmall { .. })));
    }

    #[test]
    fn region_counts_past_u32_are_rejected() {
        assert_eq!(
            Grid::new(70_000, 70_000, 100, 100).unwrap_err(),
            ConfigError::GridTooLarge {
                rows: 70_000,
                fields_in_row: 70_000
            }
        );
        assert!(matches!(
            Grid::new(u32::MAX, 2, 100, 100),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    /// Two hand-placed regions sharing a strip of pixels.
    struct OverlappingCells {
        regions: Vec<Region>,
        rendered: usize,
    }

    impl RegionLookup for OverlappingCells {
        fn regions(&self) -> &[Region] {
            &self.regions
        }

        fn render(&mut self, detections: &[Detection]) {
            self.rendered += detections.len();
        }
    }

    #[test]
    fn overlapping_regions_resolve_to_the_first_match() {
        let cells = OverlappingCells {
            regions: vec![
                Region::new(Point::new(0, 0), 60, 50).unwrap(),
                Region::new(Point::new(40, 0), 60, 50).unwrap(),
            ],
            rendered: 0,
        };
        assert_eq!(cells.region_of(Point::new(50, 10)), Ok(0));
        assert_eq!(cells.region_of(Point::new(70, 10)), Ok(1));
        assert_eq!(cells.region_of(Point::new(20, 10)), Ok(0));
        assert_eq!(
            cells.locate(&[Detection::new(45, 0, 10, 10), Detection::new(80, 0, 10, 10)]),
            Ok(vec![0, 1])
        );
        assert_eq!(cells.rendered, 0);
    }

    #[test]
    fn in_bounds_matches_the_frame_size() {
        let grid = Grid::new(2, 2, 100, 80).unwrap();
        assert!(grid.in_bounds(Point::new(0, 0)));
        assert!(grid.in_bounds(Point::new(99, 79)));
        assert!(!grid.in_bounds(Point::new(100, 0)));
        assert!(!grid.in_bounds(Point::new(0, 80)));
    }

    #[test]
    fn square_grids_need_perfect_square_counts() {
        assert_eq!(square_side(4), Ok(2));
        assert_eq!(square_side(9), Ok(3));
        assert_eq!(square_side(1), Ok(1));
        assert_eq!(square_side(0), Err(ConfigError::NoRegions));
        assert_eq!(square_side(6), Err(ConfigError::NotPerfectSquare(6)));

        let grid = Grid::square(9, 300, 300).unwrap();
        assert_eq!((grid.rows(), grid.fields_in_row()), (3, 3));
    }

    #[test]
    fn locate_preserves_input_order() {
        let grid = Grid::new(2, 2, 100, 100).unwrap();
        let detections = [
            Detection::new(60, 60, 20, 20),
            Detection::new(10, 10, 20, 20),
            Detection::new(60, 0, 10, 10),
        ];
        assert_eq!(grid.locate(&detections), Ok(vec![3, 0, 1]));
        assert_eq!(grid.locate(&[]), Ok(vec![]));
    }

    #[test]
    fn centers_outside_the_frame_are_reported() {
        let grid = Grid::new(2, 2, 100, 100).unwrap();
        let outside = Detection::new(95, 10, 20, 20);
        assert_eq!(
            grid.locate(&[outside]),
            Err(LocateError::Uncovered(Point::new(105, 20)))
        );
    }

    #[test]
    fn markers_are_clipped_to_the_surface() {
        let mut grid = Grid::new(2, 2, 100, 100).unwrap();
        grid.render(&[Detection::new(96, 96, 6, 6)]);
        assert_eq!(grid.surface().get_pixel(99, 99), &Luma([255]));
        assert_eq!(grid.surface().get_pixel(97, 99), &Luma([255]));
        assert_eq!(grid.surface().get_pixel(0, 0), &Luma([0]));

        grid.clear_surface();
        assert!(grid.surface().pixels().all(|pixel| pixel.0[0] == 0));
    }
}
