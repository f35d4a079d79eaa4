//! Splitting the token list into stages and wiring their descriptors.

pub mod command;
pub mod link;
pub mod segment;

pub use command::{classify, CommandKind};
pub use link::{Link, StageFds};
pub use segment::{Delimiter, Segment, Segments};
