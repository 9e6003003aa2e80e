//! Runtime configuration from command-line arguments and environment.

use clap::Parser;
use mailbox_contract::prelude::{Bytes, EngineConfig, ServiceConfig};
use std::path::PathBuf;

/// Command-line arguments. Every option also reads an environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "mailbox-runtime")]
#[command(about = "Decide a mailbox application call against a persisted state snapshot")]
pub struct RuntimeConfig {
    /// Call request JSON file, or `-` for stdin.
    #[arg(short, long, default_value = "-")]
    pub call: PathBuf,

    /// State snapshot file; created on first admitted call.
    #[arg(long, env = "MAILBOX_STATE_FILE", default_value = "mailbox-state.json")]
    pub state_file: PathBuf,

    /// Fee stored at creation when the create call supplies none.
    #[arg(long, env = "MAILBOX_DEFAULT_FEE", default_value_t = EngineConfig::DEFAULT_FEE)]
    pub default_fee: u64,

    /// Version tag stored at creation when the create call supplies none.
    #[arg(long, env = "MAILBOX_DEFAULT_VERSION", default_value = EngineConfig::DEFAULT_VERSION)]
    pub default_version: String,

    /// Write a recipient record for every admitted share that names one.
    #[arg(long, env = "MAILBOX_RECORD_RECIPIENTS")]
    pub record_recipients: bool,

    /// Evaluate only; never write the state file.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip invariant checks before committing.
    #[arg(long)]
    pub skip_invariants: bool,

    /// Print Prometheus metrics to stderr on exit.
    #[arg(long)]
    pub print_metrics: bool,
}

impl RuntimeConfig {
    /// Engine tunables.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_version: Bytes::from(self.default_version.as_str()),
            default_fee: self.default_fee,
            record_recipients: self.record_recipients,
        }
    }

    /// Service configuration.
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            engine: self.engine_config(),
            check_invariants: !self.skip_invariants,
        }
    }

    /// Whether the call request is read from stdin.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.call.as_os_str() == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::parse_from(["mailbox-runtime"]);
        assert!(config.reads_stdin());
        assert_eq!(config.engine_config(), EngineConfig::default());
        assert!(config.service_config().check_invariants);
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::parse_from([
            "mailbox-runtime",
            "--call",
            "share.json",
            "--default-fee",
            "250",
            "--default-version",
            "v3",
            "--record-recipients",
        ]);
        assert!(!config.reads_stdin());
        let engine = config.engine_config();
        assert_eq!(engine.default_fee, 250);
        assert_eq!(engine.default_version, Bytes::from("v3"));
        assert!(engine.record_recipients);
    }
}
