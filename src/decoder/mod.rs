use serde_json::Value;
use thiserror::Error;

mod builtin;

pub use builtin::BuiltinDecoder;

/// Command output formats the shell normalizer hands off for structured
/// decoding instead of parsing inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Free,
    ProcMeminfo,
    ProcCpuinfo,
    Df,
    Ifconfig,
    Netstat,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Free => "free",
            CommandKind::ProcMeminfo => "proc-meminfo",
            CommandKind::ProcCpuinfo => "proc-cpuinfo",
            CommandKind::Df => "df",
            CommandKind::Ifconfig => "ifconfig",
            CommandKind::Netstat => "netstat",
        }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unrecognized {command} output: {reason}")]
    Malformed {
        command: &'static str,
        reason: String,
    },
}

impl DecodeError {
    pub fn malformed(command: CommandKind, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            command: command.as_str(),
            reason: reason.into(),
        }
    }
}

/// Turns raw command output into structured JSON. The shell normalizer
/// only depends on this trait, so tests can stub the decoding and the
/// builtin table-format parsers stay swappable.
///
/// Decoders return row lists for tabular commands (`free`, `df`,
/// `ifconfig`, `netstat`, `proc-cpuinfo`) and a flat map for
/// `proc-meminfo`.
pub trait CommandDecoder: Send + Sync {
    fn decode(&self, command: CommandKind, text: &str) -> Result<Value, DecodeError>;
}
