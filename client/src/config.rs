use std::time::Duration;

use clap::{Parser, Subcommand};
use reelchain_common::{
    config::{DEFAULT_GAS_BUDGET, MAX_PAGE_SIZE, VERSION},
    crypto::ObjectId,
    logger::{default_logs_datetime_format, default_logs_path, LogLevel, ModuleConfig},
    network::Network,
    rpc::RpcClientConfig,
};
use serde::{Deserialize, Serialize};

use crate::{
    capability::CapabilitySelection,
    context::ClientSettings,
    ledger::EventOrder,
    manifest::DEFAULT_MANIFEST_PATH,
    transaction_builder::GasSettings,
};

// Environment variable holding the base64 encoded signing key
pub const KEY_ENV: &str = "KEY";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;

// Functions Helpers
fn default_manifest_path() -> String {
    DEFAULT_MANIFEST_PATH.to_owned()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connection_timeout() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_SECS
}

fn default_gas_budget() -> u64 {
    DEFAULT_GAS_BUDGET
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_log_filename() -> String {
    String::from("reelchain.log")
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network selected for the ledger
    #[clap(long, value_enum, default_value_t = Network::Devnet)]
    #[serde(default)]
    pub network: Network,
    /// Fullnode JSON-RPC address to use instead of the network default
    #[clap(long)]
    pub rpc_address: Option<String>,
    /// Timeout in seconds for a single RPC request
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Timeout in seconds to connect to the node
    #[clap(long, default_value_t = DEFAULT_CONNECTION_TIMEOUT_SECS)]
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
    /// Path of the deployment manifest mapping names to object ids
    #[clap(long, default_value_t = default_manifest_path())]
    #[serde(default = "default_manifest_path")]
    pub manifest: String,
}

impl NetworkConfig {
    pub fn rpc_address(&self) -> &str {
        self.rpc_address
            .as_deref()
            .unwrap_or_else(|| self.network.fullnode_url())
    }

    pub fn rpc_client_config(&self) -> RpcClientConfig {
        RpcClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout),
            connection_timeout: Duration::from_secs(self.connection_timeout),
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct GasConfig {
    /// Gas budget in MIST for each transaction
    #[clap(long, default_value_t = DEFAULT_GAS_BUDGET)]
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
    /// Gas price in MIST
    /// By default, the reference gas price of the node is used
    #[clap(long)]
    pub gas_price: Option<u64>,
}

impl From<&GasConfig> for GasSettings {
    fn from(config: &GasConfig) -> Self {
        Self {
            budget: config.gas_budget,
            price: config.gas_price,
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Set log level
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Set file log level
    /// By default, it will be the same as log level
    #[clap(long, value_enum)]
    pub file_log_level: Option<LogLevel>,
    /// Disable the log file
    #[clap(long)]
    #[serde(default)]
    pub disable_file_logging: bool,
    /// Disable the usage of colors in log
    #[clap(long)]
    #[serde(default)]
    pub disable_log_color: bool,
    /// Log filename
    ///
    /// By default filename is reelchain.log.
    /// File will be stored in logs directory, this is only the filename, not the full path.
    #[clap(long, default_value_t = default_log_filename())]
    #[serde(default = "default_log_filename")]
    pub filename_log: String,
    /// Logs directory
    ///
    /// By default it will be logs/ of the current directory.
    /// It must end with a / to be a valid folder.
    #[clap(long, default_value_t = default_logs_path())]
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    /// Module configuration for logs, as module=level
    #[clap(long)]
    #[serde(default)]
    pub logs_modules: Vec<ModuleConfig>,
    /// Change the datetime format used by the logger
    #[clap(long, default_value_t = default_logs_datetime_format())]
    #[serde(default = "default_logs_datetime_format")]
    pub datetime_format: String,
}

#[derive(Debug, Clone, Subcommand, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Create a profile owned by the signer
    CreateProfile {
        /// Profile username
        #[clap(long)]
        username: String,
        /// Short description of the profile
        #[clap(long, default_value = "")]
        bio: String,
        /// Profile picture url
        #[clap(long, default_value = "")]
        pfp: String,
    },
    /// Publish a video from the signer profile
    CreateVideo {
        /// Url of the video
        url: String,
        /// Length of the video in seconds
        length: u64,
    },
    /// Follow another profile
    Follow {
        /// Id of the profile to follow
        profile: ObjectId,
    },
    /// Stop following a profile
    Unfollow {
        /// Id of the profile to unfollow
        profile: ObjectId,
    },
    /// Like a video
    LikeVideo {
        /// Id of the VideoStats object of the video
        video_stats: ObjectId,
    },
    /// Tip a profile from the signer gas coin
    Tip {
        /// Id of the profile to tip
        profile: ObjectId,
        /// Amount in SUI, e.g. 0.1
        amount: String,
    },
    /// Withdraw the tips received by the signer profile
    WithdrawTips,
    /// List every profile created on the ledger
    ListProfiles,
    /// List every video created on the ledger
    ListVideos,
    /// Print the signer address
    Whoami,
    /// Print the profile capability of the signer and the profile it controls
    LocateProfile,
}

#[derive(Parser, Serialize, Deserialize, Clone)]
#[clap(
    version = VERSION,
    about = "Reelchain - Profiles, videos and tips on the ledger from the command line",
    long_about = r#"Reelchain - Profiles, videos and tips on the ledger from the command line

The signing key is read from the KEY environment variable, or from a .env file
in the current directory. It is the base64 encoding of the scheme flag (0x00 for
Ed25519) followed by the 32 bytes secret key.

Object ids of the deployed contract are read from the manifest (created.json by
default): a JSON list of { "type": name, "id": object id } entries, where the
entry named "package" is the contract package.

EXAMPLES:
  reelchain create-profile --username alice --bio "hello" --pfp https://example.com/a.png
  reelchain create-video https://example.com/video.mp4 100
  reelchain follow 0x157db3ca1a51ceaf9169f62eadf2158b4adc70fa28114945923601c598fdb7fe
  reelchain tip 0x3e13696db5948db4d904dca0a4f739159bfe7a342f9128d2574f90900059c1b6 0.1
  reelchain --dry-run withdraw-tips
  reelchain --network testnet list-profiles
"#
)]
#[command(styles = reelchain_common::get_cli_styles())]
pub struct Config {
    /// Network configuration
    #[clap(flatten)]
    pub network: NetworkConfig,
    /// Gas configuration
    #[clap(flatten)]
    pub gas: GasConfig,
    /// Log configuration
    #[clap(flatten)]
    pub log: LogConfig,
    /// Base64 signing key
    #[clap(long, env = "KEY", hide = true, hide_env_values = true)]
    #[serde(skip)]
    #[serde(default)]
    pub key: Option<String>,
    /// Profile capability to use when the signer owns several of them
    #[clap(long)]
    pub capability_id: Option<ObjectId>,
    /// Use the first profile capability found when the signer owns several of them
    #[clap(long)]
    #[serde(default)]
    pub pick_first: bool,
    /// Page size used for paged queries
    #[clap(long, default_value_t = MAX_PAGE_SIZE)]
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Order in which events are listed
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub order: EventOrder,
    /// Simulate transactions instead of submitting them
    #[clap(long)]
    #[serde(default)]
    pub dry_run: bool,
    /// JSON File to load the configuration from
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub config_file: Option<String>,
    /// Generate the template at the `config_file` path
    #[clap(long)]
    #[serde(skip)]
    #[serde(default)]
    pub generate_config_template: bool,
    /// Command to execute
    #[clap(subcommand)]
    #[serde(skip)]
    #[serde(default)]
    pub command: Option<Command>,
}

impl Config {
    pub fn selection(&self) -> CapabilitySelection {
        match self.capability_id {
            Some(id) => CapabilitySelection::Explicit(id),
            None if self.pick_first => CapabilitySelection::First,
            None => CapabilitySelection::Unique,
        }
    }

    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            gas: GasSettings::from(&self.gas),
            selection: self.selection(),
            page_size: self.page_size,
            order: self.order,
            dry_run: self.dry_run,
        }
    }
}
