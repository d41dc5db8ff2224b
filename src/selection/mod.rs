//! Endpoint selection subsystem.
//!
//! # Data Flow
//! ```text
//! Caller asks for endpoints of a network
//!     → selector.rs get_eligible_endpoints
//!         (primary list minus blocklist, else fallback list)
//!     → selector.rs check_all_nodes_status (concurrent probes)
//!     → live endpoints
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate; duplicates weight the rotation)
//!         - ordered.rs (first live endpoint in catalog order)
//! ```
//!
//! # Design Decisions
//! - Selection is request driven: no background timers
//! - Endpoint lists are ordered sequences, never sets
//! - Balancers are stateless apart from their own cursor

pub mod ordered;
pub mod round_robin;
pub mod selector;

use crate::config::SelectionStrategy;

pub use ordered::Ordered;
pub use round_robin::RoundRobin;
pub use selector::EndpointSelector;

/// Picks one endpoint out of the live set.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    fn next_endpoint(&self, live: &[String]) -> Option<String>;
}

/// Balancer for a configured strategy.
pub fn balancer_for(strategy: SelectionStrategy) -> Box<dyn LoadBalancer> {
    match strategy {
        SelectionStrategy::RoundRobin => Box::new(RoundRobin::new()),
        SelectionStrategy::Ordered => Box::new(Ordered),
    }
}
