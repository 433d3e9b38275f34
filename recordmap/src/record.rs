//! Mapped records: a backing store of raw remote values projected through a
//! field mapping

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::convert::is_truthy;
use crate::descriptor::EntityDescriptor;
use crate::error::{ConversionError, RecordError, Result};
use crate::mapping::{find_field, RawRecord};
use crate::remote::Arguments;

/// A single remote entity.
///
/// The backing store, keyed by lowercased remote field name, is the only
/// state. Local attribute reads and writes are projections through the
/// type's field mapping; assignments stay local until [`MappedRecord::save`].
#[derive(Clone)]
pub struct MappedRecord {
    descriptor: Arc<EntityDescriptor>,
    store: RawRecord,
}

impl std::fmt::Debug for MappedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRecord")
            .field("entity", &self.descriptor.name())
            .field("store", &self.store)
            .finish()
    }
}

impl MappedRecord {
    /// An empty record that has not been persisted yet
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            descriptor,
            store: RawRecord::new(),
        }
    }

    /// Wrap a raw mapping returned by the remote service
    pub fn from_raw(descriptor: Arc<EntityDescriptor>, raw: RawRecord) -> Self {
        let store = raw
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();
        Self { descriptor, store }
    }

    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    pub fn entity(&self) -> &str {
        self.descriptor.name()
    }

    pub fn raw(&self) -> &RawRecord {
        &self.store
    }

    /// Read a local attribute, applying the field's read conversion
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        self.descriptor.fields().read(&self.store, name)
    }

    /// Read a local attribute and deserialize it. A null value reads as `None`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get(name)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value::<T>(value.clone())
                .map(Some)
                .map_err(|_| RecordError::Conversion {
                    entity: self.entity().to_string(),
                    field: name.to_string(),
                    source: ConversionError::new(std::any::type_name::<T>(), &value),
                }),
        }
    }

    /// Assign a local attribute. The raw value is computed before the store is
    /// touched, so a failed conversion leaves the record unchanged.
    ///
    /// The primary key of a persisted record is fixed; assigning it a
    /// different value fails with [`RecordError::PrimaryKeyChange`].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (key, raw) = self.descriptor.fields().write(name, value.into())?;

        if self.is_primary_key(&key)
            && self.is_persisted()?
            && self.store.get(&key) != Some(&raw)
        {
            return Err(RecordError::PrimaryKeyChange {
                entity: self.entity().to_string(),
                field: name.to_string(),
            });
        }

        self.store.insert(key, raw);
        Ok(())
    }

    fn is_primary_key(&self, store_key: &str) -> bool {
        self.descriptor
            .primary_key()
            .and_then(|local| self.descriptor.fields().resolve(local).ok())
            .is_some_and(|spec| spec.store_key() == store_key)
    }

    /// Read an identifying attribute that must be present
    pub fn require(&self, name: &str) -> Result<Value> {
        match self.get(name)? {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(RecordError::MissingKey {
                entity: self.entity().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Arguments for an action call: each pair names the remote argument and
    /// the local attribute supplying it. Every attribute must be set.
    pub fn key_arguments(&self, keys: &[(&str, &str)]) -> Result<Arguments> {
        keys.iter()
            .map(|(argument, field)| -> Result<(String, Value)> {
                Ok((argument.to_string(), self.require(field)?))
            })
            .collect()
    }

    /// Call a remote operation on behalf of this record
    pub async fn invoke(&self, operation: &str, arguments: Arguments) -> Result<Value> {
        self.descriptor.invoke(operation, arguments).await
    }

    /// Current primary key value, if the type declares one and it is set
    pub fn primary_key(&self) -> Result<Option<Value>> {
        match self.descriptor.primary_key() {
            Some(key) => self.get(key),
            None => Ok(None),
        }
    }

    pub fn is_persisted(&self) -> Result<bool> {
        Ok(self.primary_key()?.as_ref().is_some_and(is_truthy))
    }

    /// Persist the record: create it remotely when the primary key is unset,
    /// otherwise send an update.
    pub async fn save(&mut self) -> Result<()> {
        let key_spec = self.descriptor.primary_key_spec("create")?.clone();

        if self.is_persisted()? {
            return self.update().await;
        }

        let operation = self.descriptor.create_operation().ok_or_else(|| {
            RecordError::ReadOnlyEntity {
                entity: self.entity().to_string(),
                operation: "create",
            }
        })?;

        let result = self
            .descriptor
            .invoke(operation, self.store.clone())
            .await?;

        let Value::Object(created) = result else {
            return Err(self
                .descriptor
                .unexpected(operation, "expected a record"));
        };

        let id = find_field(&created, key_spec.remote_name())
            .cloned()
            .ok_or_else(|| {
                self.descriptor.unexpected(
                    operation,
                    &format!("result has no {} field", key_spec.remote_name()),
                )
            })?;

        tracing::debug!("{}: created with {} = {}", self.entity(), key_spec.remote_name(), id);
        let (key, raw) = self.descriptor.fields().write(key_spec.local_name(), id)?;
        self.store.insert(key, raw);
        Ok(())
    }

    /// Send the whole backing store through the bound update operation
    pub async fn update(&self) -> Result<()> {
        let operation = self.descriptor.update_operation().ok_or_else(|| {
            RecordError::ReadOnlyEntity {
                entity: self.entity().to_string(),
                operation: "update",
            }
        })?;

        self.descriptor
            .invoke(operation, self.store.clone())
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{BOOLEAN, INTEGER, STRING, UNBOOLEAN};
    use crate::mapping::FieldMapping;
    use crate::remote::MockRemote;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn server_descriptor(remote: Arc<MockRemote>) -> Arc<EntityDescriptor> {
        let fields = FieldMapping::builder("Server")
            .converted("id", "ServerID", INTEGER, None)
            .converted("name", "Label", STRING, None)
            .converted("label", "Label", STRING, None)
            .converted("watchdog", "watchdog", BOOLEAN, UNBOOLEAN)
            .field("group", "displayGroup")
            .build()
            .unwrap();

        EntityDescriptor::builder(fields, remote)
            .create("server.create")
            .update("server.update")
            .list("server.list")
            .primary_key("id")
            .build()
            .unwrap()
    }

    fn catalog_descriptor(remote: Arc<MockRemote>) -> Arc<EntityDescriptor> {
        let fields = FieldMapping::builder("Image")
            .converted("id", "ImageID", INTEGER, None)
            .build()
            .unwrap();

        EntityDescriptor::builder(fields, remote)
            .list("image.list")
            .build()
            .unwrap()
    }

    #[test]
    fn from_raw_lowercases_keys() {
        let raw = json!({"ServerID": "12", "LABEL": "db"});
        let Value::Object(raw) = raw else { unreachable!() };
        let record = MappedRecord::from_raw(server_descriptor(Arc::new(MockRemote::new())), raw);

        assert!(record.raw().contains_key("serverid"));
        assert_eq!(record.get("id").unwrap(), Some(json!(12)));
        assert_eq!(record.get("name").unwrap(), Some(json!("db")));
    }

    #[test]
    fn aliases_share_storage() {
        let mut record = MappedRecord::new(server_descriptor(Arc::new(MockRemote::new())));
        record.set("name", "web1").unwrap();
        assert_eq!(record.get("label").unwrap(), Some(json!("web1")));
        assert_eq!(record.raw().len(), 1);
    }

    #[test]
    fn boolean_fields_store_one_and_zero() {
        let mut record = MappedRecord::new(server_descriptor(Arc::new(MockRemote::new())));

        record.set("watchdog", true).unwrap();
        assert_eq!(record.raw()["watchdog"], json!(1));
        assert_eq!(record.get_as::<bool>("watchdog").unwrap(), Some(true));

        record.set("watchdog", false).unwrap();
        assert_eq!(record.raw()["watchdog"], json!(0));
        assert_eq!(record.get_as::<bool>("watchdog").unwrap(), Some(false));
    }

    #[test]
    fn unknown_fields_fail_on_both_paths() {
        let mut record = MappedRecord::new(server_descriptor(Arc::new(MockRemote::new())));
        assert!(record.get("memory").unwrap_err().is_unknown_field());
        assert!(record.set("memory", 512).unwrap_err().is_unknown_field());
        assert!(record.raw().is_empty());
    }

    #[test]
    fn failed_conversion_leaves_store_untouched() {
        let mut record = MappedRecord::new(server_descriptor(Arc::new(MockRemote::new())));
        record.set("id", 5).unwrap();

        assert_err!(record.set("id", "five"));
        assert_eq!(record.get("id").unwrap(), Some(json!(5)));
    }

    #[test]
    fn get_as_reports_type_mismatch() {
        let mut record = MappedRecord::new(server_descriptor(Arc::new(MockRemote::new())));
        record.set("group", "prod").unwrap();

        let error = record.get_as::<i64>("group").unwrap_err();
        assert!(matches!(error, RecordError::Conversion { ref field, .. } if field == "group"));
    }

    #[test]
    fn require_rejects_missing_keys() {
        let record = MappedRecord::new(server_descriptor(Arc::new(MockRemote::new())));
        assert!(matches!(
            record.require("id"),
            Err(RecordError::MissingKey { ref field, .. }) if field == "id"
        ));
    }

    #[tokio::test]
    async fn primary_key_is_fixed_once_persisted() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.update", json!({"ServerID": 42}));

        let raw = json!({"ServerID": 42, "Label": "web1"});
        let Value::Object(raw) = raw else { unreachable!() };
        let mut record = MappedRecord::from_raw(server_descriptor(remote.clone()), raw);

        assert!(matches!(
            record.set("id", 7),
            Err(RecordError::PrimaryKeyChange { ref field, .. }) if field == "id"
        ));
        // Reassigning the same value is harmless.
        assert_ok!(record.set("id", "42"));
        assert_eq!(record.get("id").unwrap(), Some(json!(42)));

        assert_ok!(record.save().await);
        assert_eq!(remote.calls_to("server.update")[0].arguments["serverid"], json!(42));
    }

    #[tokio::test]
    async fn unsaved_record_may_take_any_primary_key() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.create", json!({"ServerID": 11}));

        let mut record = MappedRecord::new(server_descriptor(remote));
        record.set("id", 0).unwrap();
        assert_ok!(record.set("id", 0));
        assert_ok!(record.save().await);
        assert_eq!(record.get("id").unwrap(), Some(json!(11)));

        assert!(matches!(
            record.set("id", 12),
            Err(RecordError::PrimaryKeyChange { .. })
        ));
    }

    #[tokio::test]
    async fn key_arguments_drive_actions() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.boot", json!({"JobID": 1}));

        let mut record = MappedRecord::new(server_descriptor(remote.clone()));
        assert!(matches!(
            record.key_arguments(&[("serverid", "id")]),
            Err(RecordError::MissingKey { .. })
        ));

        record.set("id", 8).unwrap();
        let arguments = record.key_arguments(&[("serverid", "id")]).unwrap();
        let result = record.invoke("server.boot", arguments).await.unwrap();

        assert_eq!(result, json!({"JobID": 1}));
        assert_eq!(remote.calls()[0].arguments["serverid"], json!(8));
    }

    #[tokio::test]
    async fn save_without_primary_key_creates() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.create", json!({"ServerID": 42}));

        let mut record = MappedRecord::new(server_descriptor(remote.clone()));
        record.set("label", "web1").unwrap();
        record.set("watchdog", true).unwrap();
        assert_ok!(record.save().await);

        assert_eq!(record.get_as::<i64>("id").unwrap(), Some(42));
        assert!(record.is_persisted().unwrap());

        let calls = remote.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "server.create");
        assert_eq!(
            Value::Object(calls[0].arguments.clone()),
            json!({"label": "web1", "watchdog": 1})
        );
    }

    #[tokio::test]
    async fn save_with_primary_key_updates() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.update", json!({"ServerID": 7}));

        let mut record = MappedRecord::new(server_descriptor(remote.clone()));
        record.set("id", 7).unwrap();
        record.set("label", "renamed").unwrap();
        assert_ok!(record.save().await);

        assert!(remote.calls_to("server.create").is_empty());
        let updates = remote.calls_to("server.update");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].arguments["serverid"], json!(7));
        assert_eq!(updates[0].arguments["label"], json!("renamed"));
    }

    #[tokio::test]
    async fn zero_primary_key_counts_as_unset() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.create", json!({"serverid": 9}));

        let mut record = MappedRecord::new(server_descriptor(remote.clone()));
        record.set("id", 0).unwrap();
        assert_ok!(record.save().await);

        assert_eq!(remote.calls_to("server.create").len(), 1);
        assert_eq!(record.get("id").unwrap(), Some(json!(9)));
    }

    #[tokio::test]
    async fn failed_create_keeps_local_state() {
        let remote = Arc::new(MockRemote::new());
        remote.fail("server.create", "label already in use");

        let mut record = MappedRecord::new(server_descriptor(remote));
        record.set("label", "web1").unwrap();

        match record.save().await {
            Err(RecordError::Remote {
                operation,
                arguments,
                ..
            }) => {
                assert_eq!(operation, "server.create");
                assert_eq!(arguments, json!({"label": "web1"}));
            }
            other => panic!("Expected Remote error, got {:?}", other),
        }
        assert_eq!(record.get("label").unwrap(), Some(json!("web1")));
        assert_eq!(record.get("id").unwrap(), None);
    }

    #[tokio::test]
    async fn create_result_without_primary_key_is_unexpected() {
        let remote = Arc::new(MockRemote::new());
        remote.respond("server.create", json!({"JobID": 3}));

        let mut record = MappedRecord::new(server_descriptor(remote));
        let result = record.save().await;
        assert!(matches!(result, Err(RecordError::UnexpectedResponse { .. })));
    }

    #[tokio::test]
    async fn read_only_entities_refuse_to_save() {
        let remote = Arc::new(MockRemote::new());
        let mut record = MappedRecord::new(catalog_descriptor(remote.clone()));
        record.set("id", 3).unwrap();

        assert!(matches!(
            record.save().await,
            Err(RecordError::ReadOnlyEntity { operation: "create", .. })
        ));
        assert!(matches!(
            record.update().await,
            Err(RecordError::ReadOnlyEntity { operation: "update", .. })
        ));
        assert!(remote.calls().is_empty());
    }
}
