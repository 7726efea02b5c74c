//! Domain clients that hide message passing behind typed methods.

pub mod command_client;

pub use command_client::*;
