//! Types shared across the window components

pub mod geometry;

pub use geometry::{Point, Rect, Size, WindowGeometry};
