//! Per-type entity descriptors binding a field mapping to remote operations

use std::sync::Arc;

use serde_json::Value;

use crate::error::{RecordError, Result};
use crate::mapping::{FieldMapping, FieldSpec};
use crate::remote::{Arguments, RemoteOperations};

/// Everything a record needs to know about its type: the field mapping, the
/// remote operations bound for create, update and list, and the primary key.
///
/// Built once at startup and shared by reference; never mutated afterwards.
pub struct EntityDescriptor {
    fields: FieldMapping,
    remote: Arc<dyn RemoteOperations>,
    create: Option<String>,
    update: Option<String>,
    list: String,
    primary_key: Option<String>,
}

impl std::fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("entity", &self.fields.entity())
            .field("fields", &self.fields.len())
            .field("create", &self.create)
            .field("update", &self.update)
            .field("list", &self.list)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}

impl EntityDescriptor {
    pub fn builder(
        fields: FieldMapping,
        remote: Arc<dyn RemoteOperations>,
    ) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            fields,
            remote,
            create: None,
            update: None,
            list: None,
            primary_key: None,
        }
    }

    pub fn name(&self) -> &str {
        self.fields.entity()
    }

    pub fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    pub fn create_operation(&self) -> Option<&str> {
        self.create.as_deref()
    }

    pub fn update_operation(&self) -> Option<&str> {
        self.update.as_deref()
    }

    pub fn list_operation(&self) -> &str {
        &self.list
    }

    /// Local name of the primary key field
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub(crate) fn primary_key_spec(&self, operation: &'static str) -> Result<&FieldSpec> {
        let local = self
            .primary_key
            .as_deref()
            .ok_or_else(|| RecordError::ReadOnlyEntity {
                entity: self.name().to_string(),
                operation,
            })?;
        self.fields.resolve(local)
    }

    /// Call a remote operation, attaching entity and argument context on failure
    pub async fn invoke(&self, operation: &str, arguments: Arguments) -> Result<Value> {
        tracing::debug!(
            "{}: invoking {} with {} argument(s)",
            self.name(),
            operation,
            arguments.len()
        );

        let context = Value::Object(arguments.clone());
        match self.remote.call(operation, arguments).await {
            Ok(value) => Ok(value),
            Err(source) => {
                tracing::debug!("{}: {} failed: {}", self.name(), operation, source);
                Err(RecordError::Remote {
                    entity: self.name().to_string(),
                    operation: operation.to_string(),
                    arguments: context,
                    source,
                })
            }
        }
    }

    /// Invoke the bound list operation and split the result into raw records
    pub async fn invoke_list(&self, arguments: Arguments) -> Result<Vec<crate::RawRecord>> {
        let operation = self.list.as_str();
        let value = self.invoke(operation, arguments).await?;

        let Value::Array(rows) = value else {
            return Err(self.unexpected(operation, "expected an array of records"));
        };

        rows.into_iter()
            .map(|row| match row {
                Value::Object(raw) => Ok(raw),
                other => Err(self.unexpected(
                    operation,
                    &format!("expected a record, got {}", other),
                )),
            })
            .collect()
    }

    pub fn unexpected(&self, operation: &str, detail: &str) -> RecordError {
        RecordError::UnexpectedResponse {
            entity: self.name().to_string(),
            operation: operation.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Builder for [`EntityDescriptor`]
pub struct EntityDescriptorBuilder {
    fields: FieldMapping,
    remote: Arc<dyn RemoteOperations>,
    create: Option<String>,
    update: Option<String>,
    list: Option<String>,
    primary_key: Option<String>,
}

impl EntityDescriptorBuilder {
    pub fn create(mut self, operation: impl Into<String>) -> Self {
        self.create = Some(operation.into());
        self
    }

    pub fn update(mut self, operation: impl Into<String>) -> Self {
        self.update = Some(operation.into());
        self
    }

    pub fn list(mut self, operation: impl Into<String>) -> Self {
        self.list = Some(operation.into());
        self
    }

    pub fn primary_key(mut self, local: impl Into<String>) -> Self {
        self.primary_key = Some(local.into());
        self
    }

    pub fn build(self) -> Result<Arc<EntityDescriptor>> {
        let entity = self.fields.entity().to_string();

        if let Some(key) = &self.primary_key {
            if !self.fields.contains(key) {
                return Err(RecordError::UnknownPrimaryKey {
                    entity,
                    field: key.clone(),
                });
            }
        }

        let list = self
            .list
            .ok_or_else(|| RecordError::MissingListOperation(entity))?;

        Ok(Arc::new(EntityDescriptor {
            fields: self.fields,
            remote: self.remote,
            create: self.create,
            update: self.update,
            list,
            primary_key: self.primary_key,
        }))
    }
}
