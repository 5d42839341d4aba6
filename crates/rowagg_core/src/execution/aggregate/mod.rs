//! Phases shared by every aggregate pipeline shape.
//!
//! Validation binds each call to its strategy. The layout concatenates the
//! state slots of every bound call, and the initializer, updater and
//! projector each interpret that layout for one part of a group's lifetime.

pub mod initializer;
pub mod layout;
pub mod projector;
pub mod updater;
pub mod validate;
