//! Pointer input: raw window events mapped to normalized drag events.

pub mod pointer;

pub use pointer::{PointerEvent, PointerState};
