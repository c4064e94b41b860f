//! Command line rendering for output headers.

/// Join an argument vector into a single quoted command line.
///
/// Uses the Microsoft C runtime quoting rules so the rendering is identical on
/// every platform: arguments containing spaces or tabs (or empty arguments)
/// are wrapped in double quotes, embedded quotes are backslash-escaped and
/// backslashes are only doubled when they precede a quote.
pub fn join_command_line<S: AsRef<str>>(args: &[S]) -> String {
    let mut out = String::new();

    for arg in args {
        let arg = arg.as_ref();
        if !out.is_empty() {
            out.push(' ');
        }

        let needs_quotes = arg.is_empty() || arg.contains([' ', '\t']);
        if needs_quotes {
            out.push('"');
        }

        let mut backslashes = 0usize;
        for c in arg.chars() {
            match c {
                '\\' => backslashes += 1,
                '"' => {
                    out.extend(std::iter::repeat_n('\\', backslashes * 2 + 1));
                    out.push('"');
                    backslashes = 0;
                }
                _ => {
                    out.extend(std::iter::repeat_n('\\', backslashes));
                    backslashes = 0;
                    out.push(c);
                }
            }
        }

        if needs_quotes {
            // Trailing backslashes are doubled so the closing quote stays a quote
            out.extend(std::iter::repeat_n('\\', backslashes * 2));
            out.push('"');
        } else {
            out.extend(std::iter::repeat_n('\\', backslashes));
        }
    }

    out
}
