//! Network catalog subsystem.
//!
//! # Data Flow
//! ```text
//! ReactorConfig.networks
//!     → catalog.rs (NetworkId → NetworkConfig, read-only)
//!     → primary / fallback endpoint lists for selection
//!     → chain metadata for wallet add/switch requests
//! ```

pub mod catalog;
pub mod types;

pub use catalog::NetworkCatalog;
pub use types::{NetworkConfig, NetworkId};
