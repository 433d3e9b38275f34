//! Boot configuration profiles of a Linode

use std::sync::Arc;

use recordmap::convert::{BOOLEAN, INTEGER, STRING, UNBOOLEAN};
use recordmap::{mapped_entity, Entity, EntityDescriptor, FieldMapping, RemoteOperations, Result};

mapped_entity! {
    /// A boot configuration profile belonging to one Linode
    pub struct LinodeConfig {
        id / set_id: i64 => "id",
        linode / set_linode: i64 => "linode",
        kernel / set_kernel: i64 => "kernel",
        name / set_name: String => "name",
        label / set_label: String => "label",
        comments / set_comments: String => "comments",
        ram_limit / set_ram_limit: i64 => "ram_limit",
        disk_list / set_disk_list: String => "disk_list",
        root_device_num / set_root_device_num: i64 => "root_device_num",
        root_device_custom / set_root_device_custom: String => "root_device_custom",
        root_device_readonly / set_root_device_readonly: bool => "root_device_readonly",
        disable_updatedb / set_disable_updatedb: bool => "disable_updatedb",
        helper_xen / set_helper_xen: bool => "helper_xen",
        helper_depmod / set_helper_depmod: bool => "helper_depmod",
    }
}

pub fn fields() -> Result<FieldMapping> {
    FieldMapping::builder("LinodeConfig")
        .converted("id", "ConfigID", INTEGER, None)
        .converted("linode", "LinodeID", INTEGER, None)
        .converted("kernel", "KernelID", INTEGER, None)
        .converted("name", "Label", STRING, None)
        .converted("label", "Label", STRING, None)
        .converted("comments", "Comments", STRING, None)
        .converted("ram_limit", "RAMLimit", INTEGER, None)
        .converted("disk_list", "DiskList", STRING, None)
        .converted("root_device_num", "RootDeviceNum", INTEGER, None)
        .converted("root_device_custom", "RootDeviceCustom", STRING, None)
        .converted("root_device_readonly", "RootDeviceRO", BOOLEAN, UNBOOLEAN)
        .converted("disable_updatedb", "helper_disableUpdateDB", BOOLEAN, UNBOOLEAN)
        .converted("helper_xen", "helper_xen", BOOLEAN, UNBOOLEAN)
        .converted("helper_depmod", "helper_depmod", BOOLEAN, UNBOOLEAN)
        .build()
}

pub fn descriptor(remote: Arc<dyn RemoteOperations>) -> Result<Arc<EntityDescriptor>> {
    EntityDescriptor::builder(fields()?, remote)
        .create("linode.config.create")
        .update("linode.config.update")
        .list("linode.config.list")
        .primary_key("id")
        .build()
}

impl LinodeConfig {
    pub async fn delete(&self) -> Result<()> {
        let arguments = self
            .record()
            .key_arguments(&[("linodeid", "linode"), ("configid", "id")])?;
        self.record()
            .invoke("linode.config.delete", arguments)
            .await
            .map(|_| ())
    }
}
