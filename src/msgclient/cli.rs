// CLI for the message client wrapper

use crate::msgclient::command::Operation;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Environment variable naming the message client executable
pub const EXECUTABLE_ENV: &str = "KEYRELAY_EXE";

/// Fallback executable path, relative to the current directory
pub const DEFAULT_EXECUTABLE: &str = "MessageClient";

/// Exchange keyed messages and files through the external message client
#[derive(Debug, Parser)]
#[command(name = "keyrelay")]
#[command(about = "Retrying front-end for the external message client")]
pub struct KeyRelayCli {
    /// Message server host
    pub host: String,

    /// Message server port
    pub port: String,

    /// Function to run
    #[arg(value_enum)]
    pub function: Function,

    /// Message or file key
    #[arg(short, long)]
    pub key: Option<String>,

    /// File path (sendfile, getfile) or message text (sendmessage)
    #[arg(short, long)]
    pub arg: Option<String>,

    /// Timestamp mode: publish dt#<key> on send, check it on get
    #[arg(short = 't', long)]
    pub use_timestamp: bool,

    /// Maximum age in seconds of dt#<key> in timestamp mode (getfile, getmessage)
    #[arg(short, long)]
    pub gap: Option<i64>,

    /// Seconds to wait per attempt (default: 5, minimum: 1)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Maximum number of attempts (default: 5, minimum: 1)
    #[arg(long)]
    pub max_try: Option<String>,

    /// Path to the message client executable
    #[arg(long)]
    pub exe: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Functions exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Function {
    #[value(name = "getfile")]
    GetFile,
    #[value(name = "getmessage")]
    GetMessage,
    #[value(name = "sendfile")]
    SendFile,
    #[value(name = "sendmessage")]
    SendMessage,
    #[value(name = "status")]
    Status,
    #[value(name = "clear")]
    Clear,
}

impl From<Function> for Operation {
    fn from(function: Function) -> Self {
        match function {
            Function::GetFile => Operation::GetFile,
            Function::GetMessage => Operation::GetMessage,
            Function::SendFile => Operation::SendFile,
            Function::SendMessage => Operation::SendMessage,
            Function::Status => Operation::Status,
            Function::Clear => Operation::Clear,
        }
    }
}

impl KeyRelayCli {
    /// Parse from command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Executable path: --exe, then $KEYRELAY_EXE, then ./MessageClient
    pub fn executable_path(&self) -> PathBuf {
        self.exe
            .clone()
            .or_else(|| std::env::var_os(EXECUTABLE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = vec![
            "keyrelay",
            "10.0.0.1",
            "9000",
            "getfile",
            "-k",
            "report",
            "-a",
            "/tmp/report.csv",
            "-t",
            "-g",
            "30",
            "--timeout",
            "3",
            "--max-try",
            "2",
        ];

        let cli = KeyRelayCli::try_parse_from(args).unwrap();
        assert_eq!(cli.host, "10.0.0.1");
        assert_eq!(cli.port, "9000");
        assert_eq!(cli.function, Function::GetFile);
        assert_eq!(cli.key.as_deref(), Some("report"));
        assert_eq!(cli.arg.as_deref(), Some("/tmp/report.csv"));
        assert!(cli.use_timestamp);
        assert_eq!(cli.gap, Some(30));
        assert_eq!(cli.timeout.as_deref(), Some("3"));
        assert_eq!(cli.max_try.as_deref(), Some("2"));
        assert!(!cli.json);
    }

    #[test]
    fn test_status_needs_no_key() {
        let cli = KeyRelayCli::try_parse_from(["keyrelay", "h", "1", "status"]).unwrap();
        assert_eq!(Operation::from(cli.function), Operation::Status);
        assert!(cli.key.is_none());
    }

    #[test]
    fn test_unknown_function_rejected() {
        assert!(KeyRelayCli::try_parse_from(["keyrelay", "h", "1", "upload"]).is_err());
        assert!(KeyRelayCli::try_parse_from(["keyrelay", "h", "1", "send-file"]).is_err());
    }

    #[test]
    fn test_explicit_executable_wins() {
        let cli =
            KeyRelayCli::try_parse_from(["keyrelay", "h", "1", "status", "--exe", "/opt/mc/client"])
                .unwrap();
        assert_eq!(cli.executable_path(), PathBuf::from("/opt/mc/client"));
    }
}
