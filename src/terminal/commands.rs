// Line commands accepted by the portal prompt.

use std::str::FromStr;

use thiserror::Error;

use crate::core::portal::ViewMode;

pub const HELP_TEXT: &str = "\
Commands:
  grid        show files as cards
  list        show files as rows
  open <n>    open the details of file number n
  close       close the details view
  share       print a link that opens this portal
  reload      list the folder again
  config      back to configuration
  help        show this help
  quit        exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalCommand {
    View(ViewMode),
    /// 1-based position in the listing as rendered.
    Open(usize),
    Close,
    Share,
    Reload,
    Config,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Type a command, or `help` for the list.")]
    Empty,
    #[error("Unknown command `{0}`.")]
    Unknown(String),
    #[error("Which file? Use `open <n>`.")]
    MissingIndex,
    #[error("`{0}` is not a file number.")]
    BadIndex(String),
}

impl FromStr for PortalCommand {
    type Err = CommandParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandParseError::Empty);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "grid" | "g" => PortalCommand::View(ViewMode::Grid),
            "list" | "l" => PortalCommand::View(ViewMode::List),
            "open" | "o" => {
                let arg = words.next().ok_or(CommandParseError::MissingIndex)?;
                match arg.parse::<usize>() {
                    Ok(n) if n > 0 => PortalCommand::Open(n),
                    _ => return Err(CommandParseError::BadIndex(arg.to_string())),
                }
            }
            "close" | "c" | "back" => PortalCommand::Close,
            "share" | "link" => PortalCommand::Share,
            "reload" | "refresh" => PortalCommand::Reload,
            "config" | "configure" => PortalCommand::Config,
            "help" | "h" | "?" => PortalCommand::Help,
            "quit" | "q" | "exit" => PortalCommand::Quit,
            // A bare number opens that file.
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => PortalCommand::Open(n),
                _ => return Err(CommandParseError::Unknown(verb.to_string())),
            },
        };

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_commands() {
        assert_eq!("grid".parse::<PortalCommand>(), Ok(PortalCommand::View(ViewMode::Grid)));
        assert_eq!("  LIST ".parse::<PortalCommand>(), Ok(PortalCommand::View(ViewMode::List)));
    }

    #[test]
    fn test_open_takes_one_based_index() {
        assert_eq!("open 3".parse::<PortalCommand>(), Ok(PortalCommand::Open(3)));
        assert_eq!("2".parse::<PortalCommand>(), Ok(PortalCommand::Open(2)));
        assert_eq!(
            "open 0".parse::<PortalCommand>(),
            Err(CommandParseError::BadIndex("0".to_string()))
        );
        assert_eq!(
            "open".parse::<PortalCommand>(),
            Err(CommandParseError::MissingIndex)
        );
        assert_eq!(
            "open first".parse::<PortalCommand>(),
            Err(CommandParseError::BadIndex("first".to_string()))
        );
    }

    #[test]
    fn test_unknown_and_empty_input() {
        assert_eq!(
            "delete everything".parse::<PortalCommand>(),
            Err(CommandParseError::Unknown("delete".to_string()))
        );
        assert_eq!("   ".parse::<PortalCommand>(), Err(CommandParseError::Empty));
    }

    #[test]
    fn test_aliases() {
        assert_eq!("q".parse::<PortalCommand>(), Ok(PortalCommand::Quit));
        assert_eq!("exit".parse::<PortalCommand>(), Ok(PortalCommand::Quit));
        assert_eq!("?".parse::<PortalCommand>(), Ok(PortalCommand::Help));
        assert_eq!("back".parse::<PortalCommand>(), Ok(PortalCommand::Close));
        assert_eq!("configure".parse::<PortalCommand>(), Ok(PortalCommand::Config));
    }
}
