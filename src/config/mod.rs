//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ReactorConfig (validated, immutable)
//!     → NetworkCatalog + HealthCheckConfig shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the catalog is read-only
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HealthCheckConfig, NativeCurrency, NetworkConfig, ObservabilityConfig, ReactorConfig,
    SelectionConfig, SelectionStrategy, StorageConfig,
};
pub use validation::ValidationError;
