//! Service configuration
//!
//! Every setting can come from a command-line flag or its environment variable.
//! Leaving the engine command unset disables the external analysis engine.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::analysis::{AnalysisDispatcher, DispatcherConfig, ExternalEngine};
use crate::record_store::RecordStoreConfig;

/// Command-line arguments for `feeding-server`
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Bird feeding tracker API server", long_about = None)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "FEEDING_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "FEEDING_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding feedings.jsonl
    #[arg(long, env = "FEEDING_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Executable of the external analysis engine (disabled when unset)
    #[arg(long, env = "FEEDING_ENGINE_COMMAND")]
    pub engine_command: Option<String>,

    /// Argument passed to the engine; repeat for several
    #[arg(
        long = "engine-arg",
        env = "FEEDING_ENGINE_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub engine_args: Vec<String>,

    /// Deadline for each engine probe or call, in milliseconds
    #[arg(long, env = "FEEDING_ENGINE_TIMEOUT_MS", default_value_t = 30_000)]
    pub engine_timeout_ms: u64,

    /// Seconds to wait before re-probing an unavailable engine
    #[arg(long, env = "FEEDING_ENGINE_REPROBE_SECS", default_value_t = 30)]
    pub engine_reprobe_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, env = "FEEDING_LOG_JSON")]
    pub log_json: bool,

    /// Log filter directive, e.g. `bird_feeding=debug`
    #[arg(long, env = "FEEDING_LOG_FILTER")]
    pub log_filter: Option<String>,
}

/// External analysis engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub reprobe_after: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let defaults = DispatcherConfig::default();
        Self {
            command: None,
            args: Vec::new(),
            timeout: defaults.timeout,
            reprobe_after: defaults.reprobe_after,
        }
    }
}

impl EngineConfig {
    pub fn is_enabled(&self) -> bool {
        self.command.is_some()
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            timeout: self.timeout,
            reprobe_after: self.reprobe_after,
        }
    }

    /// Build the dispatcher this configuration describes
    pub fn build_dispatcher(&self) -> AnalysisDispatcher {
        match &self.command {
            Some(command) => AnalysisDispatcher::with_external_engine(
                ExternalEngine::new(command, self.args.clone()),
                self.dispatcher_config(),
            ),
            None => AnalysisDispatcher::local_only(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub store: RecordStoreConfig,
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            store: RecordStoreConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Socket address to bind, if host and port form a valid one
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl From<ServerArgs> for ServiceConfig {
    fn from(args: ServerArgs) -> Self {
        // An empty command (e.g. `FEEDING_ENGINE_COMMAND=`) means disabled
        let command = args
            .engine_command
            .filter(|c| !c.trim().is_empty())
            .map(PathBuf::from);

        Self {
            host: args.host,
            port: args.port,
            store: RecordStoreConfig::new(args.data_dir),
            engine: EngineConfig {
                command,
                args: args.engine_args,
                timeout: Duration::from_millis(args.engine_timeout_ms),
                reprobe_after: Duration::from_secs(args.engine_reprobe_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_disabled_by_default() {
        let config = ServiceConfig::default();
        assert!(!config.engine.is_enabled());
        assert_eq!(config.engine.timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_args_map_to_engine_config() {
        let args = ServerArgs::try_parse_from([
            "feeding-server",
            "--port",
            "9000",
            "--data-dir",
            "/tmp/feedings",
            "--engine-command",
            "java",
            "--engine-arg",
            "-jar",
            "--engine-arg",
            "java/bird-analyzer.jar",
            "--engine-timeout-ms",
            "1500",
        ])
        .unwrap();

        let config = ServiceConfig::from(args);
        assert_eq!(config.port, 9000);
        assert_eq!(config.store.records_path(), PathBuf::from("/tmp/feedings/feedings.jsonl"));
        assert_eq!(config.engine.command, Some(PathBuf::from("java")));
        assert_eq!(config.engine.args, vec!["-jar", "java/bird-analyzer.jar"]);
        assert_eq!(config.engine.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_empty_engine_command_disables_engine() {
        let args =
            ServerArgs::try_parse_from(["feeding-server", "--engine-command", ""]).unwrap();
        assert!(!ServiceConfig::from(args).engine.is_enabled());
    }
}
