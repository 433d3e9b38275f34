//! Field-mapped records for the legacy Linode API (`api_action` protocol)
//!
//! A [`LinodeSession`] binds one remote collaborator (normally the HTTP
//! [`api::Client`]) to the Linode, disk, boot-config, kernel, distribution and
//! datacenter entity types.

pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod session;

pub use config::{Config, ConfigError};
pub use entities::{Datacenter, Distribution, Kernel, Linode, LinodeConfig, LinodeDisk};
pub use error::{Error, Result};
pub use recordmap::{Collection, Entity, Filters, RecordError};
pub use session::LinodeSession;
