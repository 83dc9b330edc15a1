//! Server configuration from command-line flags and environment variables.
//!
//! `main` loads `.env` with dotenvy before parsing, so every flag can also be
//! supplied there:
//!
//! ```bash
//! AZURE_PAT=<personal access token>   # required
//! HOST=127.0.0.1
//! PORT=8000
//! DATA_DIR=data
//! DEFAULT_PROJECT=CHMP
//! LOG_FORMAT=json                     # text (default) or json
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{AppError, Result};

pub const DEFAULT_ORGANIZATION_URL: &str = "https://dev.azure.com/PSJH";
pub const DEFAULT_RELEASE_MANAGEMENT_URL: &str = "https://vsrm.dev.azure.com/PSJH";
pub const DEFAULT_DEVOPS_PROJECT: &str = "Administrative Technology";
pub const DEFAULT_RELEASE_PLAN_QUERY_URL: &str = "https://dev.azure.com/PSJH/1b24dd3b-420d-469b-a3d3-b3e04acc5cc0/_apis/wit/wiql/f15729e0-53bd-4525-b9cb-3f3db9af8bff?api-version=7.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Release dashboard API server.
#[derive(Clone, Parser)]
#[command(name = "release-dashboard", version, about)]
pub struct Config {
    /// Azure DevOps personal access token
    #[arg(long, env = "AZURE_PAT", hide_env_values = true)]
    pub azure_pat: String,

    /// Address to bind (IP literal or host name)
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory holding projects.json and per-project urls.json files
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Project used when a request does not name one
    #[arg(long, env = "DEFAULT_PROJECT", default_value = "CHMP")]
    pub default_project: String,

    /// Azure DevOps organization URL (work items, iterations, deep links)
    #[arg(long, env = "AZURE_DEVOPS_ORG_URL", default_value = DEFAULT_ORGANIZATION_URL)]
    pub organization_url: String,

    /// Azure DevOps release management URL (classic releases)
    #[arg(long, env = "AZURE_DEVOPS_VSRM_URL", default_value = DEFAULT_RELEASE_MANAGEMENT_URL)]
    pub release_management_url: String,

    /// Azure DevOps project that owns the teams and release pipelines
    #[arg(long, env = "AZURE_DEVOPS_PROJECT", default_value = DEFAULT_DEVOPS_PROJECT)]
    pub devops_project: String,

    /// Stored WIQL query listing the release plan work items
    #[arg(long, env = "AZURE_DEVOPS_RELEASE_PLAN_QUERY_URL", default_value = DEFAULT_RELEASE_PLAN_QUERY_URL)]
    pub release_plan_query_url: String,

    /// Timeout for each Azure DevOps request, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

// Hand-written so the token never reaches a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("azure_pat", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("default_project", &self.default_project)
            .field("organization_url", &self.organization_url)
            .field("release_management_url", &self.release_management_url)
            .field("devops_project", &self.devops_project)
            .field("release_plan_query_url", &self.release_plan_query_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Check values clap cannot: a non-blank token and parseable URLs.
    pub fn validate(&self) -> Result<()> {
        if self.azure_pat.trim().is_empty() {
            return Err(AppError::Config(
                "AZURE_PAT environment variable not set".to_string(),
            ));
        }
        for (name, value) in [
            ("organization URL", &self.organization_url),
            ("release management URL", &self.release_management_url),
            ("release plan query URL", &self.release_plan_query_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "UPSTREAM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address to listen on. Host names are resolved and the first
    /// address returned wins.
    pub async fn bind_addr(&self) -> Result<SocketAddr> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| AppError::Config(format!("Cannot resolve HOST '{}': {}", self.host, e)))?
            .next()
            .ok_or_else(|| AppError::Config(format!("HOST '{}' has no addresses", self.host)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Organization URL without a trailing slash.
    pub fn organization_base(&self) -> &str {
        self.organization_url.trim_end_matches('/')
    }

    /// Release management URL without a trailing slash.
    pub fn release_management_base(&self) -> &str {
        self.release_management_url.trim_end_matches('/')
    }

    /// DevOps project name, percent-encoded for use in a URL path.
    pub fn devops_project_segment(&self) -> String {
        urlencoding::encode(&self.devops_project).into_owned()
    }
}
