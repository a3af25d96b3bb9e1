// Command handler for the keyrelay CLI

use crate::msgclient::*;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Execute the command described by the parsed CLI
///
/// Returns `None` when timestamp mode found `dt#<key>` missing or stale and
/// the transfer was skipped.
pub async fn execute_command(cli: &KeyRelayCli) -> Result<Option<InvocationResult>> {
    let executable = cli.executable_path();
    let policy =
        RetryPolicy::default().with_overrides(cli.timeout.as_deref(), cli.max_try.as_deref());

    let client = RemoteMessageClient::new(
        Endpoint::new(&cli.host, &cli.port),
        ClientConfig::new(&executable).with_retry(policy),
    )
    .with_context(|| format!("Cannot use message client at {}", executable.display()))?;

    match cli.function {
        Function::GetFile => {
            let key = require(&cli.key, "--key", cli.function)?;
            let path = require(&cli.arg, "--arg", cli.function)?;
            let gap = gate(cli)?;
            client
                .get_file(key, Path::new(path), None, gap)
                .await
                .context("Failed to prepare download")
        }
        Function::GetMessage => {
            let key = require(&cli.key, "--key", cli.function)?;
            let gap = gate(cli)?;
            Ok(client.get_message(key, None, gap).await)
        }
        Function::SendFile => {
            let key = require(&cli.key, "--key", cli.function)?;
            let path = require(&cli.arg, "--arg", cli.function)?;
            Ok(Some(
                client
                    .send_file(key, Path::new(path), None, cli.use_timestamp)
                    .await,
            ))
        }
        Function::SendMessage => {
            let key = require(&cli.key, "--key", cli.function)?;
            let message = cli.arg.as_deref().unwrap_or_default();
            Ok(Some(
                client
                    .send_message(key, message, None, cli.use_timestamp)
                    .await,
            ))
        }
        Function::Status => Ok(Some(client.status(None).await)),
        Function::Clear => {
            let key = require(&cli.key, "--key", cli.function)?;
            Ok(Some(client.clear(key, None).await))
        }
    }
}

/// Print the outcome; returns whether the call counts as a success
pub fn report(cli: &KeyRelayCli, result: Option<&InvocationResult>) -> Result<bool> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to encode result")?
        );
        return Ok(result.map(InvocationResult::is_success).unwrap_or(false));
    }

    match result.map(InvocationResult::outcome) {
        Some(Outcome::Success(payload)) => {
            println!("{}", payload);
            Ok(true)
        }
        Some(Outcome::TimedOut) => {
            eprintln!("Timed out");
            Ok(false)
        }
        Some(Outcome::Failed(detail)) if detail.is_empty() => {
            eprintln!("Failed after all attempts");
            Ok(false)
        }
        Some(Outcome::Failed(detail)) => {
            eprintln!("Failed: {}", detail.trim_end());
            Ok(false)
        }
        None => {
            eprintln!(
                "Skipped: timestamp for {} missing or stale",
                cli.key.as_deref().unwrap_or("")
            );
            Ok(false)
        }
    }
}

fn require<'a>(value: &'a Option<String>, flag: &str, function: Function) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!(
            "missing required argument {} for {}",
            flag,
            Operation::from(function)
        ),
    }
}

/// Freshness gap for get functions; timestamp mode requires --gap
fn gate(cli: &KeyRelayCli) -> Result<Option<i64>> {
    if !cli.use_timestamp {
        return Ok(None);
    }
    match cli.gap {
        Some(gap) if gap > 0 => Ok(Some(gap)),
        _ => bail!(
            "missing required argument --gap for {} in timestamp mode",
            Operation::from(cli.function)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> KeyRelayCli {
        KeyRelayCli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_require_rejects_missing_and_empty() {
        assert!(require(&None, "--key", Function::GetFile).is_err());
        assert!(require(&Some(String::new()), "--key", Function::GetFile).is_err());
        assert_eq!(require(&Some("px".to_string()), "--key", Function::GetFile).unwrap(), "px");
    }

    #[test]
    fn test_gate_requires_gap_in_timestamp_mode() {
        let cli = parse(&["keyrelay", "h", "1", "getmessage", "-k", "px", "-t"]);
        let err = gate(&cli).unwrap_err();
        assert!(err.to_string().contains("--gap"));

        let cli = parse(&["keyrelay", "h", "1", "getmessage", "-k", "px", "-t", "-g", "60"]);
        assert_eq!(gate(&cli).unwrap(), Some(60));

        let cli = parse(&["keyrelay", "h", "1", "getmessage", "-k", "px", "-g", "60"]);
        assert_eq!(gate(&cli).unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_executable_is_an_error() {
        let cli = parse(&["keyrelay", "h", "1", "status", "--exe", "/nonexistent/mc-123456"]);
        let err = execute_command(&cli).await.unwrap_err();
        assert!(format!("{:#}", err).contains("not found"));
    }

    #[test]
    fn test_report_skipped_is_failure() {
        let cli = parse(&["keyrelay", "h", "1", "getmessage", "-k", "px"]);
        assert!(!report(&cli, None).unwrap());

        let ok = InvocationResult::new(Outcome::Success("1".to_string()));
        assert!(report(&cli, Some(&ok)).unwrap());
    }
}
