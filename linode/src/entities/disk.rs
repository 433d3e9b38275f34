//! Disks attached to a Linode

use std::sync::Arc;

use recordmap::convert::{INTEGER, STRING};
use recordmap::mapping::find_field;
use recordmap::{
    mapped_entity, Arguments, Collection, Entity, EntityDescriptor, FieldMapping, Filters,
    RemoteOperations, Result,
};
use serde_json::Value;

mapped_entity! {
    /// A disk image belonging to one Linode
    pub struct LinodeDisk {
        id / set_id: i64 => "id",
        linode / set_linode: i64 => "linode",
        disk_type / set_disk_type: String => "type",
        name / set_name: String => "name",
        label / set_label: String => "label",
        size / set_size: i64 => "size",
    }
}

pub fn fields() -> Result<FieldMapping> {
    FieldMapping::builder("LinodeDisk")
        .converted("id", "DiskID", INTEGER, None)
        .converted("linode", "LinodeID", INTEGER, None)
        .converted("type", "Type", STRING, None)
        .converted("name", "Label", STRING, None)
        .converted("label", "Label", STRING, None)
        .converted("size", "Size", INTEGER, None)
        .build()
}

pub fn descriptor(remote: Arc<dyn RemoteOperations>) -> Result<Arc<EntityDescriptor>> {
    EntityDescriptor::builder(fields()?, remote)
        .create("linode.disk.create")
        .update("linode.disk.update")
        .list("linode.disk.list")
        .primary_key("id")
        .build()
}

const DUPLICATE: &str = "linode.disk.duplicate";

impl LinodeDisk {
    fn keys(&self) -> Result<Arguments> {
        self.record()
            .key_arguments(&[("linodeid", "linode"), ("diskid", "id")])
    }

    /// Copy the disk on the same Linode and fetch the new record
    pub async fn duplicate(&self) -> Result<LinodeDisk> {
        let linode = self.record().require("linode")?;
        let result = self.record().invoke(DUPLICATE, self.keys()?).await?;

        let descriptor = Arc::clone(self.record().descriptor());
        let disk_id = match &result {
            Value::Object(raw) => find_field(raw, "DiskID").cloned(),
            _ => None,
        }
        .ok_or_else(|| descriptor.unexpected(DUPLICATE, "result has no DiskID field"))?;

        Collection::<LinodeDisk>::new(descriptor)
            .get(Filters::new().with("linode", linode).with("id", disk_id))
            .await
    }

    pub async fn resize(&self, size: i64) -> Result<()> {
        let mut arguments = self.keys()?;
        arguments.insert("size".to_string(), Value::from(size));
        self.record()
            .invoke("linode.disk.resize", arguments)
            .await
            .map(|_| ())
    }

    pub async fn delete(&self) -> Result<()> {
        self.record()
            .invoke("linode.disk.delete", self.keys()?)
            .await
            .map(|_| ())
    }
}
