//! keyrelay - Retrying wrapper around an external keyed message/file client
//!
//! This library drives an external request/response executable that moves
//! keyed messages and files between peers. It adds bounded waits, retries,
//! response parsing and the `dt#<key>` freshness convention on top of it,
//! plus a small daily-window scheduler for jobs built on the client.

pub mod process;
pub mod msgclient;
pub mod scheduler;

pub use process::{MessageProcess, ProcessConfig, WaitOutcome};
pub use msgclient::{
    ClientConfig, ClientError, CommandLine, Endpoint, InvocationResult, Operation, Outcome,
    RemoteMessageClient, RetryPolicy,
};
pub use scheduler::{IntervalHandler, RunWindow, ScheduleRunner, Transition};
