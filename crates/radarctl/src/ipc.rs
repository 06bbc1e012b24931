//! Line protocol spoken over the widget's control socket. One command per line:
//! `show`, `hide` or `target <path>`.

use crate::target::TargetPath;
use std::fmt;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub const SOCKET_PATH: &str = "/tmp/radar.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum Verb {
    Show,
    Hide,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Hide,
    Target(TargetPath),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("'target' requires a path")]
    MissingPath,
    #[error("Target path contains a control character")]
    ControlCharacter,
}

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("Failed to connect to radar at {path}: {source}. Is radar running?")]
    Connect {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Command {
    /// Builds a `target` command. The path must fit on one protocol line.
    pub fn target(path: &str) -> Result<Self, CommandError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(CommandError::MissingPath);
        }
        if path.chars().any(char::is_control) {
            return Err(CommandError::ControlCharacter);
        }
        Ok(Self::Target(TargetPath::new(path)))
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(h, r)| (h, r.trim()))
            .unwrap_or((line, ""));

        if head.is_empty() {
            return Err(CommandError::Empty);
        }

        let verb = Verb::from_str(head).map_err(|_| CommandError::Unknown(head.to_string()))?;
        match verb {
            Verb::Show => Ok(Self::Show),
            Verb::Hide => Ok(Self::Hide),
            Verb::Target => Self::target(rest),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "{}", Verb::Show),
            Self::Hide => write!(f, "{}", Verb::Hide),
            Self::Target(path) => write!(f, "{} {}", Verb::Target, path),
        }
    }
}

pub fn send(command: &Command) -> Result<(), IpcError> {
    send_to(SOCKET_PATH, command)
}

pub fn send_to(socket: &str, command: &Command) -> Result<(), IpcError> {
    let mut stream = UnixStream::connect(socket).map_err(|source| IpcError::Connect {
        path: socket.to_string(),
        source,
    })?;
    writeln!(stream, "{}", command)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::os::unix::net::UnixListener;

    #[test]
    fn test_command_parsing() {
        let cases = vec![
            ("show", Ok(Command::Show)),
            ("  HIDE \n", Ok(Command::Hide)),
            ("Show", Ok(Command::Show)),
            (
                "target /wanted.png",
                Ok(Command::Target(TargetPath::from("/wanted.png"))),
            ),
            (
                "target   /my images/x.png  ",
                Ok(Command::Target(TargetPath::from("/my images/x.png"))),
            ),
            ("target", Err(CommandError::MissingPath)),
            ("target a\nhide", Err(CommandError::ControlCharacter)),
            ("target /x\u{1b}[2J.png", Err(CommandError::ControlCharacter)),
            ("", Err(CommandError::Empty)),
            ("scan", Err(CommandError::Unknown("scan".to_string()))),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>(), expected, "{line:?}");
        }
    }

    #[test]
    fn test_display_is_parseable() {
        let command = Command::Target(TargetPath::from("/tmp/a b.png"));
        assert_eq!(command.to_string(), "target /tmp/a b.png");
        assert_eq!(command.to_string().parse::<Command>(), Ok(command));
        assert_eq!(Command::Hide.to_string(), "hide");
    }

    #[test]
    fn test_send_writes_one_line() {
        let socket = std::env::temp_dir().join(format!("radarctl-test-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket);
        let listener = UnixListener::bind(&socket).unwrap();

        let socket_str = socket.to_str().unwrap().to_string();
        send_to(&socket_str, &Command::Show).unwrap();

        let (stream, _) = listener.accept().unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).unwrap();
        assert_eq!(line, "show\n");

        let _ = std::fs::remove_file(&socket);
    }

    #[test]
    fn test_send_without_listener_fails() {
        let err = send_to("/nonexistent/radar.sock", &Command::Hide).unwrap_err();
        assert!(matches!(err, IpcError::Connect { .. }));
    }
}
