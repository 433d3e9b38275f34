//! Entity types exposed by the Linode API

pub mod boot_config;
pub mod catalog;
pub mod disk;
pub mod linode;

pub use boot_config::LinodeConfig;
pub use catalog::{Datacenter, Distribution, Kernel};
pub use disk::LinodeDisk;
pub use linode::Linode;
