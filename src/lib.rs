//! Flat-argument pipeline executor.
//!
//! Takes the token list a program was started with, splits it on `|` and `;`,
//! and runs each command as a child process with its standard streams wired
//! through pipes. `cd` runs in the calling process.

pub mod builtin;
pub mod config;
pub mod error;
pub mod executor;
pub mod meta;
pub mod pipeline;
pub mod shell;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
