//! A line editor in the style of POSIX `ed`, built on a piece table.
//!
//! [`parser`] turns command text into [`command::Command`] records,
//! [`editor::Editor`] executes them against one open document, and
//! [`session::Session`] wires the two together over a reader and a writer.

pub mod address;
pub mod command;
pub mod editor;
pub mod error;
pub mod parser;
pub mod session;

pub use editor::Editor;
pub use error::{EdError, ParseError};
pub use session::Session;
