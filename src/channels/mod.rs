//! Messaging-platform I/O.

pub mod line;

pub use line::LineChannel;
