//! gojsonrpc - call methods on a Go net/rpc/jsonrpc server from the shell.
//!
//! ```bash
//! # One call, result JSON on stdout
//! gojsonrpc --host 127.0.0.1 --port 1234 --object Arith call Multiply '{"A": 7, "B": 8}'
//!
//! # Settings from a config file, with an override
//! gojsonrpc --config ./client.json --retries 3 call Echo '"hi"'
//!
//! # Print the resolved configuration
//! gojsonrpc --object Arith show-config
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=gojsonrpc_client=debug` to trace
//! connects, resends and frames.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gojsonrpc_client::rpc::{default_config_path, ClientConfig, RpcClient};

#[derive(Parser)]
#[command(name = "gojsonrpc", version, about = "Call methods on a Go JSON-RPC server")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

/// Settings that override the config file.
#[derive(Args)]
struct ConnectionArgs {
    /// JSON config file (defaults to $GOJSONRPC_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server host
    #[arg(long, env = "GOJSONRPC_HOST", global = true)]
    host: Option<String>,

    /// Server port
    #[arg(long, env = "GOJSONRPC_PORT", global = true)]
    port: Option<u16>,

    /// Remote object name, prepended as `Object.Method`
    #[arg(long, env = "GOJSONRPC_OBJECT", global = true)]
    object: Option<String>,

    /// Connection attempts before giving up (negative retries forever)
    #[arg(long, allow_hyphen_values = true, global = true)]
    retries: Option<i64>,

    /// Backoff ceiling in seconds
    #[arg(long, global = true)]
    max_sleep: Option<f64>,

    /// Per-response read timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Call a method and print its result as JSON
    Call {
        /// Method name without the object prefix (e.g. Multiply)
        method: String,

        /// The single argument as JSON (defaults to null)
        #[arg(allow_hyphen_values = true)]
        params: Option<String>,
    },
    /// Print the resolved client configuration as JSON
    ShowConfig,
}

impl ConnectionArgs {
    /// Merge the config file (if any) with command-line overrides.
    fn resolve(&self) -> Result<ClientConfig> {
        let explicit = self.config.is_some();
        let path = self.config.clone().unwrap_or_else(default_config_path);

        let mut config = if explicit || path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            ClientConfig::load(&path)?
        } else {
            let port = self
                .port
                .context("--port is required when no config file is present")?;
            let object = self
                .object
                .clone()
                .context("--object is required when no config file is present")?;
            ClientConfig::new("127.0.0.1", port, object)
        };

        if let Some(host) = &self.host {
            config.address.host = host.clone();
        }
        if let Some(port) = self.port {
            config.address.port = port;
        }
        if let Some(object) = &self.object {
            config.object_name = object.clone();
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(max_sleep) = self.max_sleep {
            config.max_sleep_time = max_sleep;
        }
        if self.timeout.is_some() {
            config.read_timeout = self.timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_params(raw: Option<&str>) -> Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw)
            .with_context(|| format!("params must be valid JSON: {}", raw)),
        None => Ok(Value::Null),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gojsonrpc_client=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.connection.resolve()?;

    match cli.command {
        Command::Call { method, params } => {
            let params = parse_params(params.as_deref())?;
            tracing::info!(
                "Calling {} on {}",
                config.method_path(&method),
                config.address
            );

            let mut client = RpcClient::connect(config).await?;
            let result = client
                .call(&method, params)
                .await
                .with_context(|| format!("call to {} failed", method))?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_params() {
        assert_eq!(parse_params(None).unwrap(), Value::Null);
        assert_eq!(
            parse_params(Some(r#"{"A": 7, "B": 8}"#)).unwrap(),
            json!({"A": 7, "B": 8})
        );
        assert!(parse_params(Some("{oops")).is_err());
    }

    #[test]
    fn test_flags_build_config_without_file() {
        let cli = Cli::try_parse_from([
            "gojsonrpc",
            "--config",
            "/nonexistent/ignored.json",
            "show-config",
        ])
        .unwrap();
        // An explicit but missing config file is an error.
        assert!(cli.connection.resolve().is_err());

        let cli = Cli::try_parse_from([
            "gojsonrpc",
            "--host",
            "10.1.2.3",
            "--port",
            "4000",
            "--object",
            "Arith",
            "--retries",
            "-1",
            "--max-sleep",
            "8",
            "call",
            "Multiply",
            r#"{"A": 1}"#,
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Call { ref method, .. } if method == "Multiply"));
        assert_eq!(cli.connection.retries, Some(-1));
        assert_eq!(cli.connection.max_sleep, Some(8.0));
    }

    #[test]
    fn test_negative_number_params() {
        let cli = Cli::try_parse_from([
            "gojsonrpc",
            "--port",
            "1",
            "--object",
            "Arith",
            "call",
            "Echo",
            "-5",
        ])
        .unwrap();

        match cli.command {
            Command::Call { method, params } => {
                assert_eq!(method, "Echo");
                assert_eq!(params.as_deref(), Some("-5"));
                assert_eq!(parse_params(params.as_deref()).unwrap(), json!(-5));
            }
            Command::ShowConfig => panic!("Expected call subcommand"),
        }
    }

    #[test]
    fn test_explicit_config_file_with_overrides() {
        let path = std::env::temp_dir().join(format!(
            "gojsonrpc-cli-test-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"host": "127.0.0.1", "port": 1234, "object_name": "Arith", "retries": 5}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "gojsonrpc",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "5678",
            "--timeout",
            "2.5",
            "show-config",
        ])
        .unwrap();
        let config = cli.connection.resolve();
        let _ = std::fs::remove_file(&path);

        let config = config.unwrap();
        assert_eq!(config.address.port, 5678);
        assert_eq!(config.object_name, "Arith");
        assert_eq!(config.retries, 5);
        assert_eq!(config.read_timeout, Some(2.5));
    }
}
