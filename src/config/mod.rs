//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MuxConfig (validated, immutable)
//!     → used once at startup to build upstreams and the listener
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - Optional fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any failure is fatal before traffic is served

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::MetricsConfig;
pub use schema::MuxConfig;
pub use schema::ServerConfig;
pub use validation::ValidationError;
