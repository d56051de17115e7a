//! Merge outcomes that need a developer's attention.

use serde::Serialize;

/// A secondary occurrence of a node that survived the merge. Its
/// surroundings were written by the developer, so whether it still makes
/// sense cannot be checked automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryNodeWarning {
    pub name_in_id: String,
    /// The merged occurrence as printed into the output.
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningInfo {
    raw_warnings: Vec<String>,
    secondary_nodes: Vec<SecondaryNodeWarning>,
}

impl WarningInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_raw_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "merge warning");
        self.raw_warnings.push(message);
    }

    pub fn add_secondary_node(&mut self, name_in_id: impl Into<String>, code: impl Into<String>) {
        let name_in_id = name_in_id.into();
        tracing::warn!(name_in_id = %name_in_id, "secondary node kept in developer code");
        self.secondary_nodes.push(SecondaryNodeWarning {
            name_in_id,
            code: code.into(),
        });
    }

    pub fn raw_warnings(&self) -> &[String] {
        &self.raw_warnings
    }

    pub fn secondary_nodes(&self) -> &[SecondaryNodeWarning] {
        &self.secondary_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.raw_warnings.is_empty() && self.secondary_nodes.is_empty()
    }

    pub fn extend(&mut self, other: WarningInfo) {
        self.raw_warnings.extend(other.raw_warnings);
        self.secondary_nodes.extend(other.secondary_nodes);
    }

    /// One line per warning, for terminal output.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.raw_warnings.clone();
        lines.extend(self.secondary_nodes.iter().map(|s| {
            format!(
                "secondary occurrence of {} kept, please review: {}",
                s.name_in_id,
                s.code.lines().next().unwrap_or_default()
            )
        }));
        lines
    }
}
