pub mod error;

pub use error::ChatError;

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 50000;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_BUFFER_CAPACITY: usize = 10;
pub const DEFAULT_SEQUENCE_PERIOD: u32 = 100;
pub const DEFAULT_BACKLOG: u32 = 3;
pub const MAX_LINE_LENGTH: usize = 4096;

pub const NICK_COMMAND: &str = "/nick";
pub const QUIT_COMMAND: &str = "/quit";
pub const SERVER_FULL: &str = "Server full";

/// One line of client input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/nick <name>`. The name is trimmed and may be empty, in which case
    /// the rename is ignored.
    Nick(String),
    /// `/quit[reason]`. The reason is whatever follows the command, trimmed.
    Quit(Option<String>),
    /// Anything else is a chat message.
    Say(String),
    /// Whitespace-only input.
    Empty,
}

impl Command {
    /// Classifies a raw inbound line. Surrounding whitespace is trimmed before
    /// matching. `/nick` has to be followed by whitespace or the end of the
    /// line, while anything starting with `/quit` quits.
    pub fn parse(line: &str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            return Command::Empty;
        }

        if let Some(rest) = strip_command(text, NICK_COMMAND) {
            return Command::Nick(rest.to_string());
        }

        if let Some(rest) = text.strip_prefix(QUIT_COMMAND) {
            let rest = rest.trim();
            let reason = (!rest.is_empty()).then(|| rest.to_string());
            return Command::Quit(reason);
        }

        Command::Say(text.to_string())
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Command::Quit(_))
    }
}

fn strip_command<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(command)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_message() {
        assert_eq!(Command::parse("hello"), Command::Say("hello".to_string()));
        assert_eq!(
            Command::parse("  hello there \r\n"),
            Command::Say("hello there".to_string())
        );
    }

    #[test]
    fn test_parse_nick() {
        assert_eq!(Command::parse("/nick Bob"), Command::Nick("Bob".to_string()));
        assert_eq!(
            Command::parse("  /nick   Bob Smith  "),
            Command::Nick("Bob Smith".to_string())
        );
    }

    #[test]
    fn test_parse_nick_without_name() {
        assert_eq!(Command::parse("/nick"), Command::Nick(String::new()));
        assert_eq!(Command::parse("/nick    "), Command::Nick(String::new()));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(Command::parse("/quit"), Command::Quit(None));
        assert_eq!(
            Command::parse("/quit see ya"),
            Command::Quit(Some("see ya".to_string()))
        );
        assert_eq!(Command::parse("/quit   \t"), Command::Quit(None));
        assert!(Command::parse("/quit now").is_quit());
    }

    #[test]
    fn test_nick_matches_whole_word() {
        assert_eq!(
            Command::parse("/nickname Bob"),
            Command::Say("/nickname Bob".to_string())
        );
        assert_eq!(
            Command::parse("say /quit"),
            Command::Say("say /quit".to_string())
        );
    }

    #[test]
    fn test_quit_matches_as_prefix() {
        assert_eq!(
            Command::parse("/quitter"),
            Command::Quit(Some("ter".to_string()))
        );
        assert_eq!(
            Command::parse("/quit,bye all "),
            Command::Quit(Some(",bye all".to_string()))
        );
        assert!(Command::parse("/quitting").is_quit());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse(" \t \r"), Command::Empty);
    }

    #[test]
    fn test_unknown_slash_command_is_a_message() {
        assert_eq!(
            Command::parse("/execute ls"),
            Command::Say("/execute ls".to_string())
        );
    }
}
