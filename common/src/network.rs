use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// Ledger network selected by the client
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Network {
    Mainnet,
    Testnet,
    #[default]
    Devnet,
    Localnet,
}

impl Network {
    // Public fullnode JSON-RPC endpoint for this network
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Localnet => "http://127.0.0.1:9000",
        }
    }

    pub fn is_mainnet(&self) -> bool {
        *self == Network::Mainnet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_network() {
        assert_eq!(Network::from_str("devnet").unwrap(), Network::Devnet);
        assert_eq!(Network::from_str("MAINNET").unwrap(), Network::Mainnet);
        assert!(Network::from_str("stagenet").is_err());
    }

    #[test]
    fn test_display_and_serde_agree() {
        for network in [
            Network::Mainnet,
            Network::Testnet,
            Network::Devnet,
            Network::Localnet,
        ] {
            let json = serde_json::to_string(&network).unwrap();
            assert_eq!(json, format!("\"{}\"", network));
        }
    }
}
