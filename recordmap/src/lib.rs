//! recordmap - field-mapped records over remote infrastructure APIs
//!
//! Entity types declare a [`FieldMapping`] from ergonomic local attribute names
//! to the remote service's field names, along with the remote operations used
//! to create, update and list them. Records keep the raw remote values and
//! convert lazily on every read and write.

pub mod collection;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod mapping;
pub mod record;
pub mod remote;

pub use collection::{Collection, Entity, Filters, RecordStream};
pub use convert::Conversion;
pub use descriptor::{EntityDescriptor, EntityDescriptorBuilder};
pub use error::{ConversionError, RecordError, Result};
pub use mapping::{FieldMapping, FieldMappingBuilder, FieldSpec, RawRecord};
pub use record::MappedRecord;
pub use remote::{Arguments, RemoteError, RemoteOperations};

/// Declare a newtype entity over [`MappedRecord`] with typed accessors.
///
/// Each accessor line names the getter, the setter, the value type and the
/// local field it projects:
///
/// ```ignore
/// recordmap::mapped_entity! {
///     pub struct Kernel {
///         id / set_id: i64 => "id",
///         is_xen / set_is_xen: bool => "is_xen",
///     }
/// }
/// ```
#[macro_export]
macro_rules! mapped_entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $getter:ident / $setter:ident : $ty:ty => $field:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name($crate::MappedRecord);

        impl $crate::Entity for $name {
            fn from_record(record: $crate::MappedRecord) -> Self {
                Self(record)
            }

            fn record(&self) -> &$crate::MappedRecord {
                &self.0
            }

            fn record_mut(&mut self) -> &mut $crate::MappedRecord {
                &mut self.0
            }

            fn into_record(self) -> $crate::MappedRecord {
                self.0
            }
        }

        impl $name {
            $(
                pub fn $getter(&self) -> $crate::Result<Option<$ty>> {
                    self.0.get_as::<$ty>($field)
                }

                pub fn $setter(&mut self, value: impl Into<$ty>) -> $crate::Result<()> {
                    let value: $ty = value.into();
                    self.0.set($field, value)
                }
            )*

            /// Create the entity remotely if it has no primary key, otherwise update it
            pub async fn save(&mut self) -> $crate::Result<()> {
                self.0.save().await
            }

            pub async fn update(&self) -> $crate::Result<()> {
                self.0.update().await
            }
        }
    };
}
