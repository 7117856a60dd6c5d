//! Configuration for the OCR-to-metadata step.
//!
//! A [`StepConfig`] can be built in code or selected from a plugin
//! configuration file:
//!
//! ```text
//! <config_plugin>
//!   <config>
//!     <project>*</project>
//!     <step>*</step>
//!     <metadataField>ocrText</metadataField>
//!     <failurePolicy>absorb</failurePolicy>
//!   </config>
//! </config_plugin>
//! ```
//!
//! A section may list several `<project>` and `<step>` entries. A section
//! without any `<project>` (or `<step>`) matches every project (or step).

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

const WILDCARD: &str = "*";

/// What to do when a single OCR file cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure, count the file as empty and keep going.
    #[default]
    Absorb,
    /// Fail the whole run on the first unreadable file.
    Abort,
}

impl FailurePolicy {
    /// Parse a policy name (`absorb` or `abort`, case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "absorb" => Some(Self::Absorb),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Settings for one run of the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    /// Field-type name that receives the aggregated text
    pub metadata_field: String,
    /// Handling of per-file extraction failures
    pub failure_policy: FailurePolicy,
}

impl StepConfig {
    /// Create a configuration for `metadata_field` with the default policy.
    pub fn new(metadata_field: impl Into<String>) -> Self {
        Self {
            metadata_field: metadata_field.into(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Set the per-file failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Check that the configuration can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.metadata_field.trim().is_empty() {
            return Err(Error::Config("metadataField must not be empty".to_string()));
        }
        Ok(())
    }
}

/// One `<config>` section of a plugin configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    /// Project names this section applies to
    pub projects: Vec<String>,
    /// Step names this section applies to
    pub steps: Vec<String>,
    /// Configured field-type name
    pub metadata_field: Option<String>,
    /// Configured failure policy
    pub failure_policy: Option<FailurePolicy>,
}

impl ConfigSection {
    fn matches_project(&self, project: &str) -> bool {
        self.projects.iter().any(|p| p == project)
    }

    fn matches_step(&self, step: &str) -> bool {
        self.steps.iter().any(|s| s == step)
    }

    fn wildcard_project(&self) -> bool {
        self.projects.is_empty() || self.matches_project(WILDCARD)
    }

    fn wildcard_step(&self) -> bool {
        self.steps.is_empty() || self.matches_step(WILDCARD)
    }

    fn to_step_config(&self) -> Result<StepConfig> {
        let field = self
            .metadata_field
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| Error::Config("missing metadataField".to_string()))?;

        Ok(StepConfig::new(field).with_failure_policy(self.failure_policy.unwrap_or_default()))
    }
}

/// Parsed plugin configuration file.
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    sections: Vec<ConfigSection>,
}

impl PluginConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&xml)
    }

    /// Parse configuration XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut sections = Vec::new();
        let mut current: Option<ConfigSection> = None;
        let mut stack: Vec<String> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if stack.len() == 1 && name == "config" {
                        current = Some(ConfigSection::default());
                    }
                    stack.push(name);
                },
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::Config(format!("invalid text: {}", err)))?
                        .trim()
                        .to_string();
                    if let (Some(section), 3) = (current.as_mut(), stack.len()) {
                        apply_setting(section, &stack[2], text)?;
                    }
                },
                Ok(Event::End(_)) => {
                    if stack.len() == 2 {
                        if let Some(section) = current.take() {
                            sections.push(section);
                        }
                    }
                    stack.pop();
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Config(format!(
                        "malformed configuration at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                },
                _ => {},
            }
        }

        if !stack.is_empty() {
            return Err(Error::Config("unexpected end of configuration".to_string()));
        }

        Ok(Self { sections })
    }

    /// All parsed sections in file order.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    /// Select the configuration for a project and step.
    ///
    /// Precedence: exact project and step, exact project with any step,
    /// any project with exact step, then any project and step.
    pub fn select(&self, project: &str, step: &str) -> Result<StepConfig> {
        let passes: [&dyn Fn(&ConfigSection) -> bool; 4] = [
            &|s| s.matches_project(project) && s.matches_step(step),
            &|s| s.matches_project(project) && s.wildcard_step(),
            &|s| s.wildcard_project() && s.matches_step(step),
            &|s| s.wildcard_project() && s.wildcard_step(),
        ];

        for pass in passes {
            if let Some(section) = self.sections.iter().find(|s| pass(s)) {
                log::debug!("Using configuration section {:?}", section);
                return section.to_step_config();
            }
        }

        Err(Error::Config(format!(
            "no configuration section for project '{}' and step '{}'",
            project, step
        )))
    }
}

fn apply_setting(section: &mut ConfigSection, key: &str, value: String) -> Result<()> {
    match key {
        "project" => section.projects.push(value),
        "step" => section.steps.push(value),
        "metadataField" => section.metadata_field = Some(value),
        "failurePolicy" => {
            let policy = FailurePolicy::from_name(&value)
                .ok_or_else(|| Error::Config(format!("unknown failurePolicy '{}'", value)))?;
            section.failure_policy = Some(policy);
        },
        other => log::debug!("Ignoring unknown configuration element <{}>", other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_config_builder() {
        let config = StepConfig::new("ocrText").with_failure_policy(FailurePolicy::Abort);
        assert_eq!(config.metadata_field, "ocrText");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_field_is_invalid() {
        assert!(StepConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_failure_policy_names() {
        assert_eq!(FailurePolicy::from_name("ABSORB"), Some(FailurePolicy::Absorb));
        assert_eq!(FailurePolicy::from_name(" abort "), Some(FailurePolicy::Abort));
        assert_eq!(FailurePolicy::from_name("retry"), None);
    }

    #[test]
    fn test_parse_single_section() {
        let xml = r#"<config_plugin>
  <config>
    <project>*</project>
    <step>*</step>
    <metadataField>ocrText</metadataField>
  </config>
</config_plugin>"#;

        let config = PluginConfig::parse(xml).unwrap();
        assert_eq!(config.sections().len(), 1);

        let step = config.select("Manuscripts", "OCR to metadata").unwrap();
        assert_eq!(step.metadata_field, "ocrText");
        assert_eq!(step.failure_policy, FailurePolicy::Absorb);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let xml = "<config_plugin><config><failurePolicy>sometimes</failurePolicy></config></config_plugin>";
        assert!(matches!(PluginConfig::parse(xml), Err(Error::Config(_))));
    }

    #[test]
    fn test_unclosed_configuration_is_rejected() {
        let xml = "<config_plugin><config><metadataField>ocrText</metadataField>";
        assert!(PluginConfig::parse(xml).is_err());
    }
}
