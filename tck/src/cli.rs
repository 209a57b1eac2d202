//! # CLI Interface
//!
//! Command-line arguments for `hiero-tck`. Every flag can also come from the
//! environment, which is how the conformance harness usually configures it.

use clap::Parser;

/// JSON-RPC control server for the Hiero SDK conformance suites.
///
/// Listens for JSON-RPC 2.0 requests on `POST /` and drives the SDK on the
/// harness's behalf: one client per session, one transaction per call.
#[derive(Parser, Debug)]
#[command(name = "hiero-tck", about = "Hiero SDK TCK server", version)]
pub struct TckCli {
    /// Interface to bind.
    #[arg(long, env = "TCK_HOST", default_value = "localhost")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "TCK_PORT", default_value_t = 8544)]
    pub port: u16,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "TCK_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl TckCli {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        TckCli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = TckCli::parse_from(["hiero-tck", "--host", "0.0.0.0", "--port", "9000"]);
        assert_eq!(cli.bind_address(), "0.0.0.0:9000");
    }
}
