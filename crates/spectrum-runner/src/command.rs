//! Operator commands read from stdin, one per line.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    /// One-shot status poll.
    Update,
    /// Start applying pushed frames.
    Stream,
    /// Stop applying pushed frames.
    Stop,
    /// Acknowledge the action prompt.
    Ack,
    /// Write all samples as CSV.
    Export(PathBuf),
    /// Print the dashboard now.
    Status,
    Quit,
}

pub const HELP: &str = "commands: update | stream | stop | ack | export <path> | status | quit";

impl OperatorCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(None);
        };
        let cmd = match word.to_ascii_lowercase().as_str() {
            "update" | "poll" => Self::Update,
            "stream" | "start" => Self::Stream,
            "stop" => Self::Stop,
            "ack" => Self::Ack,
            "export" => {
                let path = parts.next().unwrap_or("telemetry.csv");
                Self::Export(PathBuf::from(path))
            }
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(Some(cmd))
    }
}
