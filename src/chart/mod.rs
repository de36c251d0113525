//! Figure model and the per-sheet renderers that fill it.

pub mod figure;
pub mod render;
