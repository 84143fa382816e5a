pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::google_ads::GoogleAdsClient;
pub use config::{CliConfig, GoogleAdsConfig};
pub use core::{server::McpServer, tools::ToolContext};
pub use utils::error::{AdsError, Result};
