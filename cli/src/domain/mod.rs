//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`
//! sockets. All functions are synchronous and take data in, returning data out.

pub mod address;
pub mod backoff;
pub mod config;
pub mod credential;
pub mod error;
pub mod policy;
pub mod probe;
pub mod volume;

pub use backoff::RetryPolicy;
pub use config::{ProvcheckConfig, set_config_value, validate_config_key};
pub use credential::{Credential, PrivateKeyFile};
pub use error::{AddressError, ConfigError, ConnectError};
pub use probe::{PortProbeResult, ProbeRecord};
