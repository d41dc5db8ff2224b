//! Read-only network catalog.

use std::collections::HashMap;

use crate::config::ReactorConfig;
use crate::error::{ReactorError, ReactorResult};
use crate::network::types::{NetworkConfig, NetworkId};

/// Static table of networks keyed by id.
#[derive(Debug, Clone, Default)]
pub struct NetworkCatalog {
    networks: HashMap<NetworkId, NetworkConfig>,
    supported: Option<NetworkId>,
}

impl NetworkCatalog {
    /// Build a catalog. The first network is the supported one.
    pub fn new(networks: Vec<NetworkConfig>) -> Self {
        let supported = networks.first().map(NetworkConfig::id);
        let networks = networks.into_iter().map(|n| (n.id(), n)).collect();
        Self {
            networks,
            supported,
        }
    }

    pub fn from_config(config: &ReactorConfig) -> Self {
        let mut catalog = Self::new(config.networks.clone());
        catalog.supported = config.run_network_id().map(NetworkId);
        catalog
    }

    /// Look up a network, failing for unknown ids.
    pub fn get(&self, id: NetworkId) -> ReactorResult<&NetworkConfig> {
        self.networks
            .get(&id)
            .ok_or(ReactorError::UnknownNetwork(id))
    }

    pub fn lookup(&self, id: NetworkId) -> Option<&NetworkConfig> {
        self.networks.get(&id)
    }

    /// The network the client runs on, with its chain name.
    pub fn supported_network(&self) -> ReactorResult<(NetworkId, &str)> {
        let id = self.supported.ok_or(ReactorError::UnknownNetwork(NetworkId(0)))?;
        let network = self.get(id)?;
        Ok((id, network.chain_name.as_str()))
    }

    pub fn ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<_> = self.networks.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(id: u64, name: &str) -> NetworkConfig {
        NetworkConfig {
            network_id: id,
            chain_name: name.into(),
            rpc_urls: vec![format!("https://{name}.example")],
            fallback_rpc_urls: Vec::new(),
            native_currency: None,
            block_explorer_urls: Vec::new(),
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = NetworkCatalog::new(vec![network(56, "bsc"), network(97, "testnet")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(NetworkId(97)).unwrap().chain_name, "testnet");
        assert!(catalog.lookup(NetworkId(1)).is_none());
        assert!(matches!(
            catalog.get(NetworkId(1)),
            Err(ReactorError::UnknownNetwork(NetworkId(1)))
        ));
        assert_eq!(catalog.ids(), vec![NetworkId(56), NetworkId(97)]);
    }

    #[test]
    fn test_supported_network_from_config() {
        let mut config = ReactorConfig::default();
        config.networks = vec![network(56, "bsc"), network(97, "testnet")];
        config.default_network = Some(97);

        let catalog = NetworkCatalog::from_config(&config);
        assert_eq!(catalog.supported_network().unwrap(), (NetworkId(97), "testnet"));

        config.default_network = None;
        let catalog = NetworkCatalog::from_config(&config);
        assert_eq!(catalog.supported_network().unwrap(), (NetworkId(56), "bsc"));
    }

    #[test]
    fn test_empty_catalog_has_no_supported_network() {
        let catalog = NetworkCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.supported_network().is_err());
    }
}
