//! Prompt text normalization.

/// Normalize a multi-line prompt literal for display.
///
/// - removes the common leading indentation
/// - joins soft-wrapped lines (a newline with text on both sides) with a space,
///   except before indentation, digits, `*`, `-` or `=` so lists and
///   underlines survive
/// - trims surrounding whitespace
pub fn format_message(text: &str) -> String {
    unwrap_lines(&dedent(text)).trim().to_string()
}

fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim().is_empty() {
            continue;
        }
        // Margin is measured in bytes of leading whitespace, which is ASCII here
        out.push_str(line.get(margin..).unwrap_or_else(|| line.trim_start()));
    }
    out
}

fn unwrap_lines(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            let prev_is_text = i > 0 && !chars[i - 1].is_whitespace();
            let next_continues = chars.get(i + 1).is_some_and(|&n| {
                !matches!(n, ' ' | '\n' | '\t' | '*' | '-' | '=') && !n.is_ascii_digit()
            });
            if prev_is_text && next_continues {
                out.push(' ');
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_unwraps_paragraphs() {
        let msg = format_message(
            "
            Golang Build

            There is already a build running. Would you like to
            stop it?
            ",
        );
        assert_eq!(
            msg,
            "Golang Build\n\nThere is already a build running. Would you like to stop it?"
        );
    }

    #[test]
    fn test_format_message_keeps_lists() {
        let msg = format_message(
            "
            Steps:
            - first
            - second
            1. numbered
            ",
        );
        assert_eq!(msg, "Steps:\n- first\n- second\n1. numbered");
    }

    #[test]
    fn test_format_message_keeps_underlines_and_indentation() {
        let msg = format_message("Title\n=====\n\nbody\n  indented");
        assert_eq!(msg, "Title\n=====\n\nbody\n  indented");
    }

    #[test]
    fn test_dedent_ignores_blank_lines() {
        assert_eq!(dedent("    a\n\n      b\n"), "a\n\n  b\n");
    }
}
