//! Terminal front end: input drains, gamepad polling, the
//! double-buffered renderer, and the sound engine.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
