//! Interactive prompt port.

use crate::error::{CONFIG_DOCS_URL, ConfigError};

/// Label of the confirmation button offered with configuration failures.
pub const OPEN_DOCS_LABEL: &str = "Open Documentation";

/// User-facing dialogs.
///
/// Every method blocks until the user answers and is only ever invoked from
/// the coordinating context.
#[cfg_attr(test, mockall::automock)]
pub trait PromptSurface: Send + Sync {
    /// Yes/no confirmation. Returns `true` when `ok_label` was chosen.
    fn confirm(&self, message: &str, ok_label: &str) -> bool;

    /// Single-line text input. `None` when dismissed.
    fn input(&self, caption: &str, initial: &str) -> Option<String>;

    /// List selection. Returns the chosen index, `None` when dismissed.
    fn quick_panel(&self, items: &[String]) -> Option<usize>;

    fn open_url(&self, url: &str);

    fn error_message(&self, message: &str);
}

/// Show a configuration failure and offer the configuration docs.
///
/// Returns whether the docs were opened.
pub fn report_config_error(prompt: &dyn PromptSurface, err: &ConfigError) -> bool {
    if prompt.confirm(&err.prompt_message(), OPEN_DOCS_LABEL) {
        prompt.open_url(CONFIG_DOCS_URL);
        true
    } else {
        false
    }
}
