//! Replace-or-insert of a single metadata field on a node.
//!
//! Reconciliation is split in two so the orchestrator can validate the
//! configured field before reading any OCR file:
//!
//! 1. [`plan_field`] finds an existing instance or checks the schema.
//! 2. [`apply_field`] performs the mutation.
//!
//! After a successful apply exactly one instance of the field exists on the
//! node and it carries the new value.

use super::ruleset::SchemaProvider;
use super::{DocStruct, Metadata};
use crate::error::{Error, Result};

/// Outcome of the existence and addability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPlan {
    /// The field exists at `index` and will be substituted
    Replace {
        /// Position in the node's metadata list
        index: usize,
    },
    /// The field is absent but addable
    Insert,
}

/// What [`apply_field`] did to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// An existing instance was substituted
    Replaced {
        /// The instance that was substituted
        previous: Metadata,
        /// Extra instances of the same type that were dropped
        removed_duplicates: usize,
    },
    /// A new instance was appended
    Inserted,
}

impl FieldChange {
    /// Whether an existing instance was substituted.
    pub fn is_replacement(&self) -> bool {
        matches!(self, FieldChange::Replaced { .. })
    }
}

/// Decide whether `field` will replace an existing instance or be inserted.
///
/// Fails with [`Error::FieldNotAllowed`] when the field is absent and the
/// schema does not allow adding it (hidden field types included).
pub fn plan_field(node: &DocStruct, field: &str, schema: &dyn SchemaProvider) -> Result<FieldPlan> {
    if let Some(index) = node.position_of(field) {
        log::debug!("'{}' exists on '{}' at {}", field, node.type_name, index);
        return Ok(FieldPlan::Replace { index });
    }

    if schema.addable_field_names(node, true).contains(field) {
        log::debug!("'{}' is addable to '{}'", field, node.type_name);
        return Ok(FieldPlan::Insert);
    }

    Err(Error::FieldNotAllowed {
        field: field.to_string(),
        node_type: node.type_name.clone(),
    })
}

/// Write `value` into `field` on `node` according to `plan`.
///
/// The old instance is substituted in place, so the node never holds both
/// old and new values. A stale plan is corrected against the node's
/// current state.
pub fn apply_field(node: &mut DocStruct, field: &str, plan: FieldPlan, value: String) -> FieldChange {
    let new_metadata = Metadata::new(field, value);

    let index = match plan {
        FieldPlan::Replace { index } if is_field_at(node, index, field) => Some(index),
        _ => node.position_of(field),
    };

    let Some(index) = index else {
        log::debug!("adding new Metadata...");
        node.add_metadata(new_metadata);
        return FieldChange::Inserted;
    };

    log::debug!("replacing the old Metadata...");
    let previous = std::mem::replace(&mut node.metadata[index], new_metadata);

    let removed_duplicates = remove_after(node, index, field);
    if removed_duplicates > 0 {
        log::warn!(
            "Removed {} duplicate '{}' value(s) from '{}'",
            removed_duplicates,
            field,
            node.type_name
        );
    }

    FieldChange::Replaced {
        previous,
        removed_duplicates,
    }
}

/// Plan and apply in one call.
pub fn reconcile(
    node: &mut DocStruct,
    field: &str,
    value: String,
    schema: &dyn SchemaProvider,
) -> Result<FieldChange> {
    let plan = plan_field(node, field, schema)?;
    Ok(apply_field(node, field, plan, value))
}

fn is_field_at(node: &DocStruct, index: usize, field: &str) -> bool {
    node.metadata.get(index).is_some_and(|m| m.type_name == field)
}

fn remove_after(node: &mut DocStruct, index: usize, field: &str) -> usize {
    let before = node.metadata.len();
    let mut position = 0;
    node.metadata.retain(|m| {
        let keep = position <= index || m.type_name != field;
        position += 1;
        keep
    });
    before - node.metadata.len()
}
