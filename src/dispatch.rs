//! Command dispatch: built-ins versus remote command lines.

/// Fixed listing written by the `help` built-in.
pub const HELP_TEXT: &str = "\
Built-in commands:
  help    Show this help
  clear   Clear the terminal screen
  exit    Close this terminal session

Any other command runs on the session's shell.
Keys: Up/Down recall history, Ctrl+C cancels the current line.
";

/// A submitted line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Exit,
    Remote { program: String, args: Vec<String> },
}

impl Command {
    /// Classify a submitted line. Blank lines yield `None`.
    ///
    /// Built-ins match the whole trimmed line exactly, case-sensitively;
    /// anything else is split on whitespace into program and arguments.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        match trimmed {
            "" => None,
            "help" => Some(Command::Help),
            "clear" => Some(Command::Clear),
            "exit" => Some(Command::Exit),
            _ => {
                let mut parts = trimmed.split_whitespace().map(str::to_string);
                let program = parts.next()?;
                Some(Command::Remote {
                    program,
                    args: parts.collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_not_commands() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   \t "), None);
    }

    #[test]
    fn test_builtins_match_trimmed_line_exactly() {
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("  clear "), Some(Command::Clear));
        assert_eq!(Command::parse("exit"), Some(Command::Exit));
    }

    #[test]
    fn test_builtins_are_case_sensitive() {
        assert!(matches!(Command::parse("HELP"), Some(Command::Remote { .. })));
        assert!(matches!(Command::parse("Exit"), Some(Command::Remote { .. })));
    }

    #[test]
    fn test_builtin_with_arguments_is_remote() {
        assert_eq!(
            Command::parse("help me"),
            Some(Command::Remote {
                program: "help".to_string(),
                args: vec!["me".to_string()],
            })
        );
    }

    #[test]
    fn test_remote_splits_on_whitespace() {
        assert_eq!(
            Command::parse(" ls   -la\t/tmp "),
            Some(Command::Remote {
                program: "ls".to_string(),
                args: vec!["-la".to_string(), "/tmp".to_string()],
            })
        );
    }
}
