//! Bibliographic metadata record model.
//!
//! A [`MetadataRecord`] holds a [`DigitalDocument`] whose logical structure
//! is a tree of [`DocStruct`] nodes. Each node owns a list of [`Metadata`]
//! field/value pairs.

pub mod reconcile;
pub mod ruleset;
pub mod store;

pub use reconcile::{apply_field, plan_field, reconcile, FieldChange, FieldPlan};
pub use ruleset::{MetadataRule, Occurrence, Ruleset, SchemaProvider};
pub use store::{JsonRecordStore, RecordStore};

use serde::{Deserialize, Serialize};

/// One field-type name and its string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Field-type name, e.g. `ocrText`
    #[serde(rename = "type")]
    pub type_name: String,
    /// Field value
    pub value: String,
}

impl Metadata {
    /// Create a metadata value.
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}

/// A node of the logical or physical structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocStruct {
    /// Structure type, e.g. `Monograph`
    #[serde(rename = "type")]
    pub type_name: String,
    /// Metadata attached to this node
    #[serde(default)]
    pub metadata: Vec<Metadata>,
    /// Child structures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocStruct>,
}

impl DocStruct {
    /// Create an empty node of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            metadata: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: attach a metadata value.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.push(metadata);
        self
    }

    /// Builder: attach a child node.
    pub fn with_child(mut self, child: DocStruct) -> Self {
        self.children.push(child);
        self
    }

    /// All metadata of the given type, in order.
    pub fn metadata_by_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Metadata> + 'a {
        self.metadata.iter().filter(move |m| m.type_name == type_name)
    }

    /// Index of the first metadata of the given type.
    pub fn position_of(&self, type_name: &str) -> Option<usize> {
        self.metadata.iter().position(|m| m.type_name == type_name)
    }

    /// Number of metadata values of the given type.
    pub fn count_metadata(&self, type_name: &str) -> usize {
        self.metadata_by_type(type_name).count()
    }

    /// Append a metadata value.
    pub fn add_metadata(&mut self, metadata: Metadata) {
        self.metadata.push(metadata);
    }

    /// Substitute the metadata at `index` in place, returning the old value.
    pub fn change_metadata(&mut self, index: usize, metadata: Metadata) -> Option<Metadata> {
        let slot = self.metadata.get_mut(index)?;
        Some(std::mem::replace(slot, metadata))
    }

    /// Remove the metadata at `index`.
    pub fn remove_metadata(&mut self, index: usize) -> Option<Metadata> {
        (index < self.metadata.len()).then(|| self.metadata.remove(index))
    }
}

/// The logical and physical structure of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalDocument {
    /// Logical structure root
    pub logical: DocStruct,
    /// Physical structure root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<DocStruct>,
}

/// A persisted bibliographic metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// The described document
    pub document: DigitalDocument,
}

impl MetadataRecord {
    /// Create a record around a logical root.
    pub fn new(logical: DocStruct) -> Self {
        Self {
            document: DigitalDocument {
                logical,
                physical: None,
            },
        }
    }

    /// Logical root node.
    pub fn logical(&self) -> &DocStruct {
        &self.document.logical
    }

    /// Mutable logical root node.
    pub fn logical_mut(&mut self) -> &mut DocStruct {
        &mut self.document.logical
    }
}
