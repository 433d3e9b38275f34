//! Linode virtual machines

use std::sync::Arc;

use recordmap::convert::{BOOLEAN, INTEGER, STRING, UNBOOLEAN};
use recordmap::{mapped_entity, Entity, EntityDescriptor, FieldMapping, RemoteOperations, Result};

mapped_entity! {
    /// A Linode virtual machine
    pub struct Linode {
        id / set_id: i64 => "id",
        name / set_name: String => "name",
        label / set_label: String => "label",
        group / set_group: String => "group",
        status / set_status: i64 => "status",
        datacenter / set_datacenter: i64 => "datacenter",
        plan / set_plan: i64 => "plan",
        total_ram / set_total_ram: i64 => "total_ram",
        total_disk / set_total_disk: i64 => "total_disk",
        cpu_enabled / set_cpu_enabled: bool => "cpu_enabled",
        cpu_threshold / set_cpu_threshold: i64 => "cpu_threshold",
        diskio_enabled / set_diskio_enabled: bool => "diskio_enabled",
        diskio_threshold / set_diskio_threshold: i64 => "diskio_threshold",
        bwin_enabled / set_bwin_enabled: bool => "bwin_enabled",
        bwin_threshold / set_bwin_threshold: i64 => "bwin_threshold",
        bwout_enabled / set_bwout_enabled: bool => "bwout_enabled",
        bwout_threshold / set_bwout_threshold: i64 => "bwout_threshold",
        bwquota_enabled / set_bwquota_enabled: bool => "bwquota_enabled",
        bwquota_threshold / set_bwquota_threshold: i64 => "bwquota_threshold",
        backup_window / set_backup_window: i64 => "backup_window",
        backup_weekly_day / set_backup_weekly_day: i64 => "backup_weekly_day",
        watchdog / set_watchdog: bool => "watchdog",
    }
}

pub fn fields() -> Result<FieldMapping> {
    FieldMapping::builder("Linode")
        .converted("id", "LinodeID", INTEGER, None)
        .converted("name", "Label", STRING, None)
        .converted("label", "Label", STRING, None)
        .field("group", "lpm_displayGroup")
        .converted("status", "Status", INTEGER, None)
        .converted("datacenter", "DatacenterID", INTEGER, None)
        .converted("plan", "PlanID", INTEGER, None)
        .converted("total_ram", "TotalRAM", INTEGER, None)
        .converted("total_disk", "TotalHD", INTEGER, None)
        .converted("cpu_enabled", "Alert_cpu_enabled", BOOLEAN, UNBOOLEAN)
        .converted("cpu_threshold", "Alert_cpu_threshold", INTEGER, None)
        .converted("diskio_enabled", "Alert_diskio_enabled", BOOLEAN, UNBOOLEAN)
        .converted("diskio_threshold", "Alert_diskio_threshold", INTEGER, None)
        .converted("bwin_enabled", "Alert_bwin_enabled", BOOLEAN, UNBOOLEAN)
        .converted("bwin_threshold", "Alert_bwin_threshold", INTEGER, None)
        .converted("bwout_enabled", "Alert_bwout_enabled", BOOLEAN, UNBOOLEAN)
        .converted("bwout_threshold", "Alert_bwout_threshold", INTEGER, None)
        .converted("bwquota_enabled", "Alert_bwquota_enabled", BOOLEAN, UNBOOLEAN)
        .converted("bwquota_threshold", "Alert_bwquota_threshold", INTEGER, None)
        .converted("backup_window", "backupWindow", INTEGER, None)
        .converted("backup_weekly_day", "backupWeeklyDay", INTEGER, None)
        .converted("watchdog", "watchdog", BOOLEAN, UNBOOLEAN)
        .build()
}

pub fn descriptor(remote: Arc<dyn RemoteOperations>) -> Result<Arc<EntityDescriptor>> {
    EntityDescriptor::builder(fields()?, remote)
        .create("linode.create")
        .update("linode.update")
        .list("linode.list")
        .primary_key("id")
        .build()
}

impl Linode {
    async fn act(&self, operation: &str) -> Result<()> {
        let arguments = self.record().key_arguments(&[("linodeid", "id")])?;
        self.record().invoke(operation, arguments).await.map(|_| ())
    }

    pub async fn boot(&self) -> Result<()> {
        self.act("linode.boot").await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.act("linode.shutdown").await
    }

    pub async fn reboot(&self) -> Result<()> {
        self.act("linode.reboot").await
    }

    pub async fn delete(&self) -> Result<()> {
        self.act("linode.delete").await
    }
}
