//! Repository layer — appointment-scoped database operations.

mod appointment;

pub use appointment::*;
