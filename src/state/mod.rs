pub mod grid;
pub mod touch;

pub use grid::{Cell, GridState, SpecialBlock, TrailSquare, Vec2};
pub use touch::{TapAction, TouchGate};
