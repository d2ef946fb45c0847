//! Platform abstraction layer
//!
//! Translates raw platform input into simulation intents. The simulation
//! itself never sees a key code.

pub mod input;

pub use input::{Action, InputMapper, KeyBindings, KeyCode};
