//! Shell command construction.
//!
//! This module provides:
//! - `quote`, the POSIX single-quote escaper
//! - `CommandLine`, a typed argument list rendered into one shell string

mod command;
mod quote;

pub use command::{Arg, CommandLine, Value};
pub use quote::quote;
