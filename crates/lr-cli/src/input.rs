//! Line commands typed while a session runs.

use std::io::BufRead;
use std::str::FromStr;

use tokio::sync::mpsc::{self, UnboundedReceiver};

/// A command typed on stdin during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Stop,
    Play,
    Pause,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop" | "s" | "q" => Ok(Self::Stop),
            "play" | "resume" | "r" => Ok(Self::Play),
            "pause" | "p" => Ok(Self::Pause),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Reads stdin lines on a dedicated thread.
///
/// A blocking thread is used instead of `tokio::io::stdin` so a pending read
/// never holds up runtime shutdown. The receiver yields `None` once stdin
/// closes.
pub fn spawn_line_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!("stop".parse::<SessionCommand>(), Ok(SessionCommand::Stop));
        assert_eq!(" S \n".parse::<SessionCommand>(), Ok(SessionCommand::Stop));
        assert_eq!("Pause".parse::<SessionCommand>(), Ok(SessionCommand::Pause));
        assert_eq!("resume".parse::<SessionCommand>(), Ok(SessionCommand::Play));
        assert!("dance".parse::<SessionCommand>().is_err());
    }
}
