//! Schema constraints for metadata nodes.
//!
//! The step only asks the schema one question: which field types may still
//! be added to a node. [`Ruleset`] answers it from a JSON ruleset:
//!
//! ```text
//! {
//!   "metadata_types": [{ "name": "ocrText", "hidden": true }],
//!   "doc_struct_types": [
//!     { "name": "Monograph", "allowed": [{ "name": "ocrText", "num": "1o" }] }
//!   ]
//! }
//! ```

use super::DocStruct;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Capability reporting which field types are addable to a node.
pub trait SchemaProvider {
    /// Field-type names that may still be added to `node`.
    fn addable_field_names(&self, node: &DocStruct, include_hidden: bool) -> BTreeSet<String>;
}

/// How often a field type may occur on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occurrence {
    /// Exactly one
    #[serde(rename = "1m")]
    ExactlyOne,
    /// Zero or one
    #[serde(rename = "1o")]
    ZeroOrOne,
    /// One or more
    #[serde(rename = "+")]
    OneOrMore,
    /// Any number
    #[serde(rename = "*")]
    Any,
}

impl Occurrence {
    /// Whether one more instance fits when `current` already exist.
    pub fn allows_another(self, current: usize) -> bool {
        match self {
            Occurrence::ExactlyOne | Occurrence::ZeroOrOne => current == 0,
            Occurrence::OneOrMore | Occurrence::Any => true,
        }
    }
}

/// A field type allowed on a structure type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRule {
    /// Field-type name
    pub name: String,
    /// Occurrence limit
    pub num: Occurrence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MetadataTypeDef {
    name: String,
    #[serde(default)]
    hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocStructTypeDef {
    name: String,
    #[serde(default)]
    allowed: Vec<MetadataRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RulesetFile {
    #[serde(default)]
    metadata_types: Vec<MetadataTypeDef>,
    #[serde(default)]
    doc_struct_types: Vec<DocStructTypeDef>,
}

/// Ruleset-backed [`SchemaProvider`].
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    hidden: HashMap<String, bool>,
    allowed: HashMap<String, Vec<MetadataRule>>,
}

impl Ruleset {
    /// Create an empty ruleset that allows nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ruleset from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read ruleset {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Parse a ruleset from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: RulesetFile = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid ruleset: {}", e)))?;

        let mut ruleset = Self::new();
        for def in file.metadata_types {
            ruleset.hidden.insert(def.name, def.hidden);
        }
        for def in file.doc_struct_types {
            ruleset.allowed.insert(def.name, def.allowed);
        }
        Ok(ruleset)
    }

    /// Builder: declare a field type.
    pub fn with_metadata_type(mut self, name: impl Into<String>, hidden: bool) -> Self {
        self.hidden.insert(name.into(), hidden);
        self
    }

    /// Builder: allow a field type on a structure type.
    pub fn allow(mut self, doc_struct: impl Into<String>, field: impl Into<String>, num: Occurrence) -> Self {
        self.allowed.entry(doc_struct.into()).or_default().push(MetadataRule {
            name: field.into(),
            num,
        });
        self
    }

    /// Whether a field type is declared at all.
    pub fn knows_metadata_type(&self, name: &str) -> bool {
        self.hidden.contains_key(name)
    }

    fn is_hidden(&self, name: &str) -> bool {
        self.hidden.get(name).copied().unwrap_or(false) || name.starts_with('_')
    }
}

impl SchemaProvider for Ruleset {
    fn addable_field_names(&self, node: &DocStruct, include_hidden: bool) -> BTreeSet<String> {
        let Some(rules) = self.allowed.get(&node.type_name) else {
            log::debug!("Structure type '{}' is not in the ruleset", node.type_name);
            return BTreeSet::new();
        };

        rules
            .iter()
            .filter(|rule| include_hidden || !self.is_hidden(&rule.name))
            .filter(|rule| rule.num.allows_another(node.count_metadata(&rule.name)))
            .map(|rule| rule.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;

    fn ruleset() -> Ruleset {
        Ruleset::new()
            .with_metadata_type("TitleDocMain", false)
            .with_metadata_type("Author", false)
            .with_metadata_type("ocrText", true)
            .allow("Monograph", "TitleDocMain", Occurrence::ExactlyOne)
            .allow("Monograph", "Author", Occurrence::Any)
            .allow("Monograph", "ocrText", Occurrence::ZeroOrOne)
    }

    #[test]
    fn test_hidden_types_need_include_hidden() {
        let node = DocStruct::new("Monograph");
        let visible = ruleset().addable_field_names(&node, false);
        let all = ruleset().addable_field_names(&node, true);

        assert!(!visible.contains("ocrText"));
        assert!(all.contains("ocrText"));
        assert!(all.contains("TitleDocMain"));
    }

    #[test]
    fn test_single_occurrence_types_fill_up() {
        let node = DocStruct::new("Monograph")
            .with_metadata(Metadata::new("TitleDocMain", "T"))
            .with_metadata(Metadata::new("Author", "A"));
        let addable = ruleset().addable_field_names(&node, true);

        assert!(!addable.contains("TitleDocMain"));
        assert!(addable.contains("Author"));
        assert!(addable.contains("ocrText"));
    }

    #[test]
    fn test_unknown_struct_type_allows_nothing() {
        let node = DocStruct::new("Periodical");
        assert!(ruleset().addable_field_names(&node, true).is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "metadata_types": [{ "name": "ocrText", "hidden": true }, { "name": "Note" }],
            "doc_struct_types": [
                { "name": "Monograph", "allowed": [
                    { "name": "ocrText", "num": "1o" },
                    { "name": "Note", "num": "*" }
                ] }
            ]
        }"#;
        let ruleset = Ruleset::from_json_str(json).unwrap();
        let node = DocStruct::new("Monograph");

        assert!(ruleset.knows_metadata_type("Note"));
        assert_eq!(
            ruleset.addable_field_names(&node, true).into_iter().collect::<Vec<_>>(),
            vec!["Note", "ocrText"]
        );
        assert_eq!(
            ruleset.addable_field_names(&node, false).into_iter().collect::<Vec<_>>(),
            vec!["Note"]
        );
    }

    #[test]
    fn test_invalid_occurrence_is_rejected() {
        let json = r#"{ "doc_struct_types": [{ "name": "M", "allowed": [{ "name": "x", "num": "2" }] }] }"#;
        assert!(matches!(Ruleset::from_json_str(json), Err(Error::Config(_))));
    }
}
