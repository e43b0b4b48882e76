use crate::{
    descriptor::{Builder, TypeDescriptor},
    error::BuildError,
    model::RecordShape,
    obs::sink::{self, MetricsEvent},
    traits::Mapped,
};
use parking_lot::RwLock;
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock},
};

static GLOBAL: LazyLock<DescriptorRegistry> = LazyLock::new(DescriptorRegistry::new);

///
/// DescriptorRegistry
///
/// Append-only cache of type descriptors keyed by type identity.
///
/// Concurrent first use of a type may build its descriptor more than once;
/// only the first published result is retained and every caller receives
/// that one. Only the publish step takes the write lock. Nested records
/// described along the way are published too.
///

#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl DescriptorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by the convenience entry points.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Fetch or build the descriptor for `T`.
    pub fn descriptor<T: Mapped>(&self) -> Result<Arc<TypeDescriptor>, BuildError> {
        self.describe(TypeId::of::<T>(), T::shape)
    }

    /// Fetch or build the descriptor for the record identified by `type_id`.
    pub fn describe(
        &self,
        type_id: TypeId,
        shape: fn() -> RecordShape,
    ) -> Result<Arc<TypeDescriptor>, BuildError> {
        if let Some(found) = self.get(type_id) {
            sink::record(MetricsEvent::DescriptorCacheHit {
                type_name: found.type_name(),
            });
            return Ok(found);
        }

        let shape = shape();
        match Builder::new(self).build(&shape) {
            Ok(built) => Ok(self.publish(built.descriptor)),
            Err(err) => {
                tracing::debug!(type_name = shape.type_name, error = %err, "descriptor build failed");
                sink::record(MetricsEvent::DescriptorFailed {
                    type_name: shape.type_name,
                });
                Err(err)
            }
        }
    }

    // First published descriptor for a type wins.
    pub(crate) fn publish(&self, built: TypeDescriptor) -> Arc<TypeDescriptor> {
        tracing::debug!(
            type_name = built.type_name(),
            columns = built.len(),
            "descriptor built"
        );
        sink::record(MetricsEvent::DescriptorBuilt {
            type_name: built.type_name(),
            columns: built.len() as u64,
        });

        let mut descriptors = self.descriptors.write();
        let published = descriptors
            .entry(built.type_id())
            .or_insert_with(|| Arc::new(built));

        Arc::clone(published)
    }

    #[must_use]
    pub fn get(&self, type_id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.descriptors.read().get(&type_id).cloned()
    }

    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.descriptors.read().contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}
