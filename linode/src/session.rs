//! Wires one remote collaborator to every entity type

use std::sync::Arc;

use recordmap::{Collection, RemoteOperations};

use crate::api::Client;
use crate::config::Config;
use crate::entities::{
    boot_config, catalog, disk, linode, Datacenter, Distribution, Kernel, Linode, LinodeConfig,
    LinodeDisk,
};

/// Entry point to every Linode entity collection.
///
/// Descriptors are built once here and shared by all records produced
/// through the session.
#[derive(Clone, Debug)]
pub struct LinodeSession {
    linodes: Collection<Linode>,
    disks: Collection<LinodeDisk>,
    configs: Collection<LinodeConfig>,
    kernels: Collection<Kernel>,
    distributions: Collection<Distribution>,
    datacenters: Collection<Datacenter>,
}

impl LinodeSession {
    pub fn new(remote: Arc<dyn RemoteOperations>) -> recordmap::Result<Self> {
        Ok(Self {
            linodes: Collection::new(linode::descriptor(Arc::clone(&remote))?),
            disks: Collection::new(disk::descriptor(Arc::clone(&remote))?),
            configs: Collection::new(boot_config::descriptor(Arc::clone(&remote))?),
            kernels: Collection::new(catalog::kernel_descriptor(Arc::clone(&remote))?),
            distributions: Collection::new(catalog::distribution_descriptor(Arc::clone(
                &remote,
            ))?),
            datacenters: Collection::new(catalog::datacenter_descriptor(remote)?),
        })
    }

    /// Build an HTTP client from `config` and wire it to every entity type
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = Client::from_config(config)?;
        Ok(Self::new(Arc::new(client))?)
    }

    pub fn linodes(&self) -> &Collection<Linode> {
        &self.linodes
    }

    pub fn disks(&self) -> &Collection<LinodeDisk> {
        &self.disks
    }

    pub fn configs(&self) -> &Collection<LinodeConfig> {
        &self.configs
    }

    pub fn kernels(&self) -> &Collection<Kernel> {
        &self.kernels
    }

    pub fn distributions(&self) -> &Collection<Distribution> {
        &self.distributions
    }

    pub fn datacenters(&self) -> &Collection<Datacenter> {
        &self.datacenters
    }
}
