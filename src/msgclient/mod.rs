// Remote message client module
//
// This module wraps the external message client executable: command
// construction, bounded waits with retries, response parsing and the
// dt#<key> timestamp convention used to judge whether published data is
// still fresh.

pub mod command;
pub mod policy;
pub mod result;
pub mod timestamp;
pub mod client;
pub mod cli;
pub mod commands;

pub use command::{CommandLine, Operation};
pub use policy::RetryPolicy;
pub use result::{InvocationResult, Outcome};
pub use client::{ClientConfig, ClientError, Endpoint, RemoteMessageClient};
pub use cli::{Function, KeyRelayCli};
pub use commands::execute_command;
