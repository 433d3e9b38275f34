//! Field mapping tables translating local attribute names to remote fields
//!
//! A [`FieldMapping`] is declared once per entity type and shared by every
//! record of that type. Local names are matched case-insensitively and several
//! local names may alias the same remote field.

use serde_json::{Map, Value};

use crate::convert::Conversion;
use crate::error::{RecordError, Result};

/// Raw field values keyed by lowercased remote field name
pub type RawRecord = Map<String, Value>;

/// Case-insensitive lookup of a remote field in a raw mapping
pub fn find_field<'a>(raw: &'a RawRecord, remote: &str) -> Option<&'a Value> {
    raw.iter()
        .find(|(field, _)| field.eq_ignore_ascii_case(remote))
        .map(|(_, value)| value)
}

/// One row of a field mapping
#[derive(Debug, Clone)]
pub struct FieldSpec {
    local: String,
    remote: String,
    to_local: Option<Conversion>,
    to_remote: Option<Conversion>,
}

impl FieldSpec {
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Remote field name as the remote service spells it
    pub fn remote_name(&self) -> &str {
        &self.remote
    }

    /// Key under which the field lives in a backing store
    pub fn store_key(&self) -> String {
        self.remote.to_lowercase()
    }

    pub fn to_local(&self) -> Option<Conversion> {
        self.to_local
    }

    pub fn to_remote(&self) -> Option<Conversion> {
        self.to_remote
    }

    /// Conversion applied on write. Falls back to the read conversion, which
    /// the builder only permits for idempotent conversions.
    pub fn write_conversion(&self) -> Option<Conversion> {
        self.to_remote.or(self.to_local)
    }
}

/// Immutable, ordered table of field specs for one entity type
#[derive(Debug, Clone)]
pub struct FieldMapping {
    entity: String,
    fields: Vec<FieldSpec>,
}

impl FieldMapping {
    pub fn builder(entity: impl Into<String>) -> FieldMappingBuilder {
        FieldMappingBuilder {
            entity: entity.into(),
            fields: Vec::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, local: &str) -> bool {
        self.lookup(local).is_some()
    }

    fn lookup(&self, local: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|spec| spec.local.eq_ignore_ascii_case(local))
    }

    pub fn resolve(&self, local: &str) -> Result<&FieldSpec> {
        self.lookup(local).ok_or_else(|| RecordError::UnknownField {
            entity: self.entity.clone(),
            field: local.to_string(),
        })
    }

    /// Read a local field out of a backing store, applying the read conversion
    pub fn read(&self, store: &RawRecord, local: &str) -> Result<Option<Value>> {
        let spec = self.resolve(local)?;
        let Some(raw) = store.get(&spec.store_key()) else {
            return Ok(None);
        };

        match spec.to_local {
            Some(conversion) => conversion
                .apply(raw)
                .map(Some)
                .map_err(|source| self.conversion_error(spec, source)),
            None => Ok(Some(raw.clone())),
        }
    }

    /// Convert a local value into the raw form and the store key it belongs under
    pub fn write(&self, local: &str, value: Value) -> Result<(String, Value)> {
        let spec = self.resolve(local)?;
        let raw = self.to_raw(spec, value)?;
        Ok((spec.store_key(), raw))
    }

    /// Translate a filter into a remote keyword argument. Values go through the
    /// same write conversion as attribute assignment.
    pub fn translate_filter(&self, local: &str, value: Value) -> Result<(String, Value)> {
        let spec = self.resolve(local)?;
        let raw = self.to_raw(spec, value)?;
        Ok((spec.remote.clone(), raw))
    }

    fn to_raw(&self, spec: &FieldSpec, value: Value) -> Result<Value> {
        match spec.write_conversion() {
            Some(conversion) => conversion
                .apply(&value)
                .map_err(|source| self.conversion_error(spec, source)),
            None => Ok(value),
        }
    }

    fn conversion_error(
        &self,
        spec: &FieldSpec,
        source: crate::error::ConversionError,
    ) -> RecordError {
        RecordError::Conversion {
            entity: self.entity.clone(),
            field: spec.local.clone(),
            source,
        }
    }
}

/// Builder for [`FieldMapping`]
pub struct FieldMappingBuilder {
    entity: String,
    fields: Vec<FieldSpec>,
}

impl FieldMappingBuilder {
    /// Declare a field whose raw value is used as-is
    pub fn field(self, local: impl Into<String>, remote: impl Into<String>) -> Self {
        self.converted(local, remote, None::<Conversion>, None::<Conversion>)
    }

    /// Declare a field with read and optional write conversions
    pub fn converted(
        mut self,
        local: impl Into<String>,
        remote: impl Into<String>,
        to_local: impl Into<Option<Conversion>>,
        to_remote: impl Into<Option<Conversion>>,
    ) -> Self {
        self.fields.push(FieldSpec {
            local: local.into(),
            remote: remote.into(),
            to_local: to_local.into(),
            to_remote: to_remote.into(),
        });
        self
    }

    pub fn build(self) -> Result<FieldMapping> {
        for (index, spec) in self.fields.iter().enumerate() {
            if self.fields[..index]
                .iter()
                .any(|earlier| earlier.local.eq_ignore_ascii_case(&spec.local))
            {
                return Err(RecordError::DuplicateField(spec.local.clone()));
            }

            if let (Some(to_local), None) = (spec.to_local, spec.to_remote) {
                if !to_local.is_idempotent() {
                    return Err(RecordError::MissingWriteConversion {
                        field: spec.local.clone(),
                        conversion: to_local.name(),
                    });
                }
            }
        }

        Ok(FieldMapping {
            entity: self.entity,
            fields: self.fields,
        })
    }
}
