//! Type-level operations over all records of one entity type

use std::marker::PhantomData;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::Value;

use crate::descriptor::EntityDescriptor;
use crate::error::{RecordError, Result};
use crate::mapping::RawRecord;
use crate::record::MappedRecord;
use crate::remote::Arguments;

/// Lazily fetched records. The remote list operation runs on first poll.
pub type RecordStream<E> = BoxStream<'static, Result<E>>;

/// A typed wrapper around a [`MappedRecord`]
pub trait Entity: Sized + Send + 'static {
    fn from_record(record: MappedRecord) -> Self;

    fn record(&self) -> &MappedRecord;

    fn record_mut(&mut self) -> &mut MappedRecord;

    fn into_record(self) -> MappedRecord;

    fn get(&self, name: &str) -> Result<Option<Value>> {
        self.record().get(name)
    }

    fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.record_mut().set(name, value)
    }
}

impl Entity for MappedRecord {
    fn from_record(record: MappedRecord) -> Self {
        record
    }

    fn record(&self) -> &MappedRecord {
        self
    }

    fn record_mut(&mut self) -> &mut MappedRecord {
        self
    }

    fn into_record(self) -> MappedRecord {
        self
    }
}

/// Ordered list filters keyed by local field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    filters: Vec<(String, Value)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.filters.iter().map(|(field, value)| (field.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Filters::new(), |filters, (field, value)| filters.with(field, value))
    }
}

/// Entry point for listing, fetching and constructing records of one type
pub struct Collection<E> {
    descriptor: Arc<EntityDescriptor>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for Collection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Collection").field(&self.descriptor).finish()
    }
}

impl<E: Entity> Collection<E> {
    pub fn new(descriptor: Arc<EntityDescriptor>) -> Self {
        Self {
            descriptor,
            _entity: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    /// A fresh, unsaved record
    pub fn new_record(&self) -> E {
        E::from_record(MappedRecord::new(Arc::clone(&self.descriptor)))
    }

    pub fn from_raw(&self, raw: RawRecord) -> E {
        E::from_record(MappedRecord::from_raw(Arc::clone(&self.descriptor), raw))
    }

    /// Records matching `filters`, in the order the remote returns them.
    ///
    /// Filter names are resolved immediately; the remote call is deferred
    /// until the stream is first polled. Each call fetches afresh.
    pub fn list(&self, filters: Filters) -> Result<RecordStream<E>> {
        let arguments = self.translate(&filters)?;
        let descriptor = Arc::clone(&self.descriptor);

        let records = stream::once(async move {
            let rows = descriptor.invoke_list(arguments).await;
            (descriptor, rows)
        })
        .flat_map(|(descriptor, rows)| match rows {
            Ok(rows) => stream::iter(rows.into_iter().map(move |raw| {
                Ok(E::from_record(MappedRecord::from_raw(
                    Arc::clone(&descriptor),
                    raw,
                )))
            }))
            .left_stream(),
            Err(error) => stream::once(futures::future::ready(Err(error))).right_stream(),
        })
        .boxed();

        Ok(records)
    }

    /// Collect every record matching `filters`
    pub async fn all(&self, filters: Filters) -> Result<Vec<E>> {
        self.list(filters)?.try_collect().await
    }

    /// The first record matching `filters`
    pub async fn get(&self, filters: Filters) -> Result<E> {
        let arguments = self.translate(&filters)?;
        let context = Value::Object(arguments.clone());
        let rows = self.descriptor.invoke_list(arguments).await?;

        if rows.len() > 1 {
            tracing::debug!(
                "{}: {} records matched {}, using the first",
                self.descriptor.name(),
                rows.len(),
                context
            );
        }

        rows.into_iter()
            .next()
            .map(|raw| self.from_raw(raw))
            .ok_or_else(|| RecordError::NotFound {
                entity: self.descriptor.name().to_string(),
                filters: context,
            })
    }

    fn translate(&self, filters: &Filters) -> Result<Arguments> {
        let fields = self.descriptor.fields();
        filters
            .iter()
            .map(|(field, value)| fields.translate_filter(field, value.clone()))
            .collect()
    }
}
