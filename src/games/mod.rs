//! Games shipped with the engine.

pub mod pig;

pub use pig::PigGame;
