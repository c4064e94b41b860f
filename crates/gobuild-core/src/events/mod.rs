//! Events published by the supervisor.
//!
//! # Wire Format
//!
//! Completion records serialize with snake_case fields and a lowercase
//! `result`:
//!
//! ```json
//! { "target": 1, "task": "build", "args": ["go", "build", "-v"], "result": "success", ... }
//! ```

mod build;

pub use build::BuildCompleteEvent;
