pub mod detection;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod tracker;
