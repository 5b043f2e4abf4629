use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::session::DEFAULT_HELP_URL;
use crate::shortcut::HostPlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliPlatform {
    Macos,
    Windows,
    Linux,
    Other,
}

impl From<CliPlatform> for HostPlatform {
    fn from(value: CliPlatform) -> Self {
        match value {
            CliPlatform::Macos => HostPlatform::MacOs,
            CliPlatform::Windows => HostPlatform::Windows,
            CliPlatform::Linux => HostPlatform::Linux,
            CliPlatform::Other => HostPlatform::Other,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "keyentry", about = "Enter an API key and start a session.")]
pub struct AppConfig {
    /// Window and header title.
    #[arg(long, default_value = "Session Launcher")]
    pub title: String,

    /// JSON file holding the saved API key.
    #[arg(long, value_name = "PATH", conflicts_with = "ephemeral")]
    pub store: Option<PathBuf>,

    /// Keep the API key in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Page opened by the "Get one here" link.
    #[arg(long, default_value = DEFAULT_HELP_URL)]
    pub help_url: String,

    /// Override host platform detection (decides Cmd+Enter vs Ctrl+Enter).
    #[arg(long, value_enum)]
    pub platform: Option<CliPlatform>,
}

impl AppConfig {
    pub fn host_platform(&self) -> HostPlatform {
        self.platform
            .map(HostPlatform::from)
            .unwrap_or_else(HostPlatform::detect)
    }
}
