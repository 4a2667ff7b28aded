// THEORY:
// This file is the main entry point for the `gesture_grid` library crate.
//
// The public API is the `GesturePipeline` (synchronous, owned by the frame loop)
// and the `RecognitionSession` (the same pipeline behind an actor task), plus
// the data structures they report with. The algorithmic pieces live in
// `core_modules`: grid geometry, region lookup, gesture patterns and the
// recognition tracker.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod session;
