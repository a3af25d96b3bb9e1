// Operations and command lines understood by the message client

use crate::msgclient::client::Endpoint;
use std::fmt;

/// Operation supported by the message client executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SendFile,
    SendMessage,
    GetFile,
    GetMessage,
    Status,
    Clear,
}

impl Operation {
    /// Command-line verb for this operation
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::SendFile => "sendfile",
            Operation::SendMessage => "sendmessage",
            Operation::GetFile => "getfile",
            Operation::GetMessage => "getmessage",
            Operation::Status => "status",
            Operation::Clear => "clear",
        }
    }

    /// Parse a verb, ignoring case
    pub fn from_verb(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sendfile" => Some(Operation::SendFile),
            "sendmessage" => Some(Operation::SendMessage),
            "getfile" => Some(Operation::GetFile),
            "getmessage" => Some(Operation::GetMessage),
            "status" => Some(Operation::Status),
            "clear" => Some(Operation::Clear),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// An operation together with its positional arguments
///
/// Only the constructors below can build one, so the argument count always
/// matches the verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    operation: Operation,
    args: Vec<String>,
}

impl CommandLine {
    pub fn send_file(key: &str, path: &str) -> Self {
        Self::with_args(Operation::SendFile, &[key, path])
    }

    pub fn send_message(key: &str, message: &str) -> Self {
        Self::with_args(Operation::SendMessage, &[key, message])
    }

    pub fn get_file(key: &str, path: &str) -> Self {
        Self::with_args(Operation::GetFile, &[key, path])
    }

    pub fn get_message(key: &str) -> Self {
        Self::with_args(Operation::GetMessage, &[key])
    }

    pub fn status() -> Self {
        Self::with_args(Operation::Status, &[])
    }

    pub fn clear(key: &str) -> Self {
        Self::with_args(Operation::Clear, &[key])
    }

    fn with_args(operation: Operation, args: &[&str]) -> Self {
        Self {
            operation,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Positional arguments following the verb
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Full argument vector for the executable: host, port, verb, then args
    pub fn argv(&self, endpoint: &Endpoint) -> Vec<String> {
        let mut argv = Vec::with_capacity(3 + self.args.len());
        argv.push(endpoint.host().to_string());
        argv.push(endpoint.port().to_string());
        argv.push(self.operation.verb().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Renders `verb "arg1" "arg2"`, each argument individually quoted
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation.verb())?;
        for arg in &self.args {
            write!(f, " \"{}\"", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_round_trip() {
        for op in [
            Operation::SendFile,
            Operation::SendMessage,
            Operation::GetFile,
            Operation::GetMessage,
            Operation::Status,
            Operation::Clear,
        ] {
            assert_eq!(Operation::from_verb(op.verb()), Some(op));
        }
        assert_eq!(Operation::from_verb("GetFile"), Some(Operation::GetFile));
        assert_eq!(Operation::from_verb("upload"), None);
    }

    #[test]
    fn test_display_quotes_each_argument() {
        let cmd = CommandLine::send_message("px", "100.5");
        assert_eq!(cmd.to_string(), r#"sendmessage "px" "100.5""#);

        let cmd = CommandLine::get_file("report", "/tmp/out dir/report.csv");
        assert_eq!(cmd.to_string(), r#"getfile "report" "/tmp/out dir/report.csv""#);

        assert_eq!(CommandLine::status().to_string(), "status");
        assert_eq!(CommandLine::clear("px").to_string(), r#"clear "px""#);
    }

    #[test]
    fn test_argv_layout() {
        let endpoint = Endpoint::new("10.0.0.1", "9000");
        let argv = CommandLine::send_file("k", "/data/file.bin").argv(&endpoint);

        assert_eq!(argv, vec!["10.0.0.1", "9000", "sendfile", "k", "/data/file.bin"]);
        assert_eq!(CommandLine::status().argv(&endpoint), vec!["10.0.0.1", "9000", "status"]);
    }
}
