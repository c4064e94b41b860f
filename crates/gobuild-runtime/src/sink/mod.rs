//! Output sinks and presentation surfaces.
//!
//! # Structure
//!
//! - `OutputSink` - Per-target write queue and printer admission lock
//! - `MemorySurface` - In-memory `PresentationSurface`
//! - `parse_result_line` - Navigation parsing for `file.go:line:col: msg` output

mod memory;
mod output;

pub use memory::{MemorySurface, RESULT_LINE_PATTERN, ResultLocation, parse_result_line};
pub use output::{OutputSink, PrinterPermit};
