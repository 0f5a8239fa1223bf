//! Pure game-rule building blocks: geometry, entity taxonomy, and the
//! support/blocking queries built on them. Nothing in here touches the
//! terminal, the clock, or any global state.

pub mod entity;
pub mod geom;
pub mod rules;
