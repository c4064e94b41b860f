//! Interactive prompts on the controlling terminal.

use console::{Term, style};
use gobuild_core::PromptSurface;
use tracing::warn;

/// Dialogs rendered on stderr, answered on stdin.
///
/// With `assume_yes` every confirmation is accepted without asking.
#[derive(Debug, Clone)]
pub struct ConsolePrompt {
    term: Term,
    assume_yes: bool,
}

impl ConsolePrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            term: Term::stderr(),
            assume_yes,
        }
    }

    fn read_line(&self) -> Option<String> {
        match self.term.read_line() {
            Ok(line) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read user input");
                None
            }
        }
    }

    fn say(&self, text: &str) {
        if let Err(e) = self.term.write_line(text) {
            warn!(error = %e, "Failed to write prompt");
        }
    }
}

impl PromptSurface for ConsolePrompt {
    fn confirm(&self, message: &str, ok_label: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.say(message);
        self.say(&format!("{} [y/N]", style(ok_label).bold()));
        self.read_line().is_some_and(|answer| is_yes(&answer))
    }

    fn input(&self, caption: &str, initial: &str) -> Option<String> {
        if initial.is_empty() {
            self.say(&format!("{caption}:"));
        } else {
            self.say(&format!("{caption} [{initial}]:"));
        }
        let answer = self.read_line()?;
        if answer.is_empty() {
            (!initial.is_empty()).then(|| initial.to_string())
        } else {
            Some(answer)
        }
    }

    fn quick_panel(&self, items: &[String]) -> Option<usize> {
        for (index, item) in items.iter().enumerate() {
            self.say(&format!("{:>3}. {item}", index + 1));
        }
        self.say("Select a number (empty to cancel):");
        parse_choice(&self.read_line()?, items.len())
    }

    fn open_url(&self, url: &str) {
        self.say(&format!("See {}", style(url).underlined()));
    }

    fn error_message(&self, message: &str) {
        self.say(&style(message).red().to_string());
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

/// One-based selection to index.
fn parse_choice(answer: &str, len: usize) -> Option<usize> {
    let choice: usize = answer.trim().parse().ok()?;
    (1..=len).contains(&choice).then(|| choice - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_parse_choice_bounds() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice(" 3 ", 3), Some(2));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("linux", 3), None);
    }

    #[test]
    fn test_assume_yes_skips_input() {
        let prompt = ConsolePrompt::new(true);
        assert!(prompt.confirm("Stop it?", "Stop Running Build"));
    }
}
