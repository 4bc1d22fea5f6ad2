//! Per-category state: variant list, selection and part cache
//!
//! Variant lists are fixed once loaded and index-addressed with circular
//! arithmetic. The selection is mutated only by the session's navigation
//! operations.

use std::sync::Arc;

use crate::core::cache::PartStore;
use crate::entities::variant::VariantDescriptor;

#[derive(Debug)]
pub struct Category {
    name: String,
    variants: Arc<Vec<VariantDescriptor>>,
    store: Arc<PartStore>,
    selection: usize,
}

impl Category {
    pub fn new(name: impl Into<String>, variants: Vec<VariantDescriptor>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            variants: Arc::new(variants),
            store: Arc::new(PartStore::new(capacity)),
            selection: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[VariantDescriptor] {
        &self.variants
    }

    pub fn descriptor(&self, index: usize) -> Option<&VariantDescriptor> {
        self.variants.get(index)
    }

    /// The active variant index
    pub fn selection(&self) -> usize {
        self.selection
    }

    pub(crate) fn set_selection(&mut self, index: usize) {
        self.selection = index;
    }

    pub fn store(&self) -> &Arc<PartStore> {
        &self.store
    }
}
