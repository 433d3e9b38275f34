//! Read-only catalogs: kernels, distributions and datacenters

use std::sync::Arc;

use recordmap::convert::{BOOLEAN, INTEGER, STRING, UNBOOLEAN};
use recordmap::{mapped_entity, EntityDescriptor, FieldMapping, RemoteOperations, Result};

mapped_entity! {
    pub struct Kernel {
        id / set_id: i64 => "id",
        label / set_label: String => "label",
        name / set_name: String => "name",
        is_xen / set_is_xen: bool => "is_xen",
    }
}

mapped_entity! {
    pub struct Distribution {
        id / set_id: i64 => "id",
        label / set_label: String => "label",
        name / set_name: String => "name",
        min / set_min: i64 => "min",
        is_64bit / set_is_64bit: bool => "is_64bit",
        created / set_created: String => "created",
    }
}

mapped_entity! {
    pub struct Datacenter {
        id / set_id: i64 => "id",
        location / set_location: String => "location",
        name / set_name: String => "name",
    }
}

pub fn kernel_descriptor(remote: Arc<dyn RemoteOperations>) -> Result<Arc<EntityDescriptor>> {
    let fields = FieldMapping::builder("Kernel")
        .converted("id", "KernelID", INTEGER, None)
        .converted("label", "Label", STRING, None)
        .converted("name", "Label", STRING, None)
        .converted("is_xen", "IsXen", BOOLEAN, UNBOOLEAN)
        .build()?;

    EntityDescriptor::builder(fields, remote)
        .list("avail.kernels")
        .build()
}

pub fn distribution_descriptor(
    remote: Arc<dyn RemoteOperations>,
) -> Result<Arc<EntityDescriptor>> {
    let fields = FieldMapping::builder("Distribution")
        .converted("id", "DistributionID", INTEGER, None)
        .converted("label", "Label", STRING, None)
        .converted("name", "Label", STRING, None)
        .converted("min", "MinImageSize", INTEGER, None)
        .converted("is_64bit", "Is64Bit", BOOLEAN, UNBOOLEAN)
        .field("created", "CREATE_DT")
        .build()?;

    EntityDescriptor::builder(fields, remote)
        .list("avail.distributions")
        .build()
}

pub fn datacenter_descriptor(remote: Arc<dyn RemoteOperations>) -> Result<Arc<EntityDescriptor>> {
    let fields = FieldMapping::builder("Datacenter")
        .converted("id", "DatacenterID", INTEGER, None)
        .converted("location", "Location", STRING, None)
        .converted("name", "Location", STRING, None)
        .build()?;

    EntityDescriptor::builder(fields, remote)
        .list("avail.datacenters")
        .build()
}
