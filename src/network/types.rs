//! Network identifiers and chain metadata.

use serde_json::{json, Value};
use std::fmt;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::{NativeCurrency, NetworkConfig};

/// Chain id of a logical network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub u64);

impl NetworkId {
    /// Hex quantity form used by wallet RPC methods (56 → "0x38").
    pub fn to_hex(self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NetworkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<NetworkId> for u64 {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl NetworkConfig {
    pub fn id(&self) -> NetworkId {
        NetworkId(self.network_id)
    }

    /// Primary endpoints in catalog order.
    pub fn primary_uris(&self) -> &[String] {
        &self.rpc_urls
    }

    /// Fallback endpoints in catalog order.
    pub fn fallback_uris(&self) -> &[String] {
        &self.fallback_rpc_urls
    }

    /// Parameters for `wallet_switchEthereumChain`.
    pub fn switch_chain_params(&self) -> Value {
        json!([{ "chainId": self.id().to_hex() }])
    }

    /// Parameters for `wallet_addEthereumChain` (EIP-3085).
    pub fn add_chain_params(&self) -> Value {
        let mut params = json!({
            "chainId": self.id().to_hex(),
            "chainName": self.chain_name,
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        });
        if let Some(currency) = &self.native_currency {
            params["nativeCurrency"] = json!({
                "name": currency.name,
                "symbol": currency.symbol,
                "decimals": currency.decimals,
            });
        }
        json!([params])
    }
}
