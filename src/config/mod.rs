//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps Arc<ServiceSettings> (basket and forwarding sections)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Listener and observability changes need a restart
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BasketSettings, ForwardingSettings, ListenerConfig, ObservabilityConfig, ServiceConfig,
    ServiceSettings, TimeoutConfig,
};
pub use watcher::ConfigWatcher;
