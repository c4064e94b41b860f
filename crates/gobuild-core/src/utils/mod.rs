//! Small text helpers shared by adapters.

pub mod cmdline;
pub mod message;

pub use cmdline::join_command_line;
pub use message::format_message;
