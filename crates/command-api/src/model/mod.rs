//! Pure data structures: the [`Command`] entity and its wire shapes.

pub mod command;

pub use command::*;
