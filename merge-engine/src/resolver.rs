//! Per-component merge pipeline.
//!
//! For every component handed in, the pipeline:
//!
//! 1. reads the revision of the edited file's managed markup,
//! 2. fetches the base file generated at that revision,
//! 3. parses the managed markup of base, edited and new,
//! 4. renames base and edited to the new version's ids and merges the trees,
//! 5. splices the result back into the edited file.
//!
//! Components are independent and run concurrently. A component whose base
//! cannot be found falls back to keeping the edited file with new's markup
//! appended for a manual merge.

use std::collections::BTreeMap;
use std::sync::Arc;

use codemerge_core::{ProjectSyncDataProvider, Settings};
use tokio::task::JoinSet;

use crate::amalgamator::rename_and_merge;
use crate::code_version::CodeVersion;
use crate::error::MergeError;
use crate::skeleton::{ComponentFile, FileMerge, assemble, manual_merge_fallback};
use crate::types::{IdMap, MergeScenario};
use crate::warnings::WarningInfo;

/// One component to merge.
#[derive(Debug, Clone, Default)]
pub struct ComponentInfoForMerge {
    /// The file on disk, possibly edited by a developer.
    pub edited_file: String,
    /// The freshly generated file.
    pub new_file: String,
    pub new_name_in_id_to_uuid: IdMap,
}

/// What a [`PreMergeHook`] gets to see before a component is merged.
#[derive(Debug)]
pub struct PreMergeContext<'a> {
    pub component_id: &'a str,
    pub base_file: &'a str,
    pub base_name_in_id_to_uuid: &'a IdMap,
    pub new_file: &'a str,
    pub new_name_in_id_to_uuid: &'a IdMap,
}

pub type PreMergeHook = Arc<dyn Fn(&PreMergeContext<'_>) + Send + Sync>;

/// Configuration for [`merge_files`].
#[derive(Clone)]
pub struct MergeOptions {
    /// Keep the edited file and append new's markup when no base exists.
    /// When off, such components are left out of the output.
    pub append_jsx_on_missing_base: bool,
    pub pre_merge: Option<PreMergeHook>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            append_jsx_on_missing_base: true,
            pre_merge: None,
        }
    }
}

impl MergeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            append_jsx_on_missing_base: settings.merge.append_jsx_on_missing_base,
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for MergeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeOptions")
            .field("append_jsx_on_missing_base", &self.append_jsx_on_missing_base)
            .field("pre_merge", &self.pre_merge.is_some())
            .finish()
    }
}

/// Result of [`merge_files`].
#[derive(Debug, Clone, Default)]
pub struct MergeOutput {
    /// Merged file text by component id.
    pub files: BTreeMap<String, String>,
    /// Only components with something to review appear here.
    pub warnings: BTreeMap<String, WarningInfo>,
}

enum Outcome {
    /// The edited file carries no managed markup.
    NotManaged(WarningInfo),
    Merged(Option<String>, WarningInfo),
}

/// Merge every component in `components`.
///
/// Returns `None` when no component had managed markup to merge.
pub async fn merge_files(
    components: &BTreeMap<String, ComponentInfoForMerge>,
    project_id: &str,
    provider: Arc<dyn ProjectSyncDataProvider>,
    options: &MergeOptions,
) -> Result<Option<MergeOutput>, MergeError> {
    let mut tasks = JoinSet::new();
    for (component_id, info) in components {
        let component_id = component_id.clone();
        let info = info.clone();
        let project_id = project_id.to_string();
        let provider = provider.clone();
        let options = options.clone();
        tasks.spawn(async move {
            let outcome =
                merge_component(&component_id, info, &project_id, provider.as_ref(), &options).await;
            (component_id, outcome)
        });
    }

    let mut output = MergeOutput::default();
    let mut updatable = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (component_id, outcome) = joined.map_err(|e| MergeError::Task(e.to_string()))?;
        let (file, warnings) = match outcome? {
            Outcome::NotManaged(warnings) => (None, warnings),
            Outcome::Merged(file, warnings) => {
                updatable += 1;
                (file, warnings)
            }
        };
        if let Some(file) = file {
            output.files.insert(component_id.clone(), file);
        }
        if !warnings.is_empty() {
            output.warnings.insert(component_id, warnings);
        }
    }

    if updatable == 0 {
        tracing::info!(project_id, "no component has managed markup to merge");
        return Ok(None);
    }
    Ok(Some(output))
}

async fn merge_component(
    component_id: &str,
    info: ComponentInfoForMerge,
    project_id: &str,
    provider: &dyn ProjectSyncDataProvider,
    options: &MergeOptions,
) -> Result<Outcome, MergeError> {
    let mut warnings = WarningInfo::new();
    let edited = ComponentFile::parse(info.edited_file)?;
    let Some(revision) = edited.revision() else {
        warnings.add_raw_warning(format!(
            "component {} has no plasmic-managed-jsx marker and was not updated",
            component_id
        ));
        return Ok(Outcome::NotManaged(warnings));
    };
    let new = ComponentFile::parse(info.new_file)?;

    let base_skeleton = match provider.fetch(project_id, revision).await {
        Ok(model) => model.component(component_id).cloned(),
        Err(e) => {
            tracing::debug!(component_id, revision, error = %e, "base metadata unavailable");
            None
        }
    };
    let Some(base_skeleton) = base_skeleton else {
        return Ok(missing_base(component_id, revision, &edited, &new, options, warnings));
    };

    let base_map = base_skeleton.id_map();
    if let Some(hook) = &options.pre_merge {
        hook(&PreMergeContext {
            component_id,
            base_file: &base_skeleton.file_content,
            base_name_in_id_to_uuid: &base_map,
            new_file: new.text(),
            new_name_in_id_to_uuid: &info.new_name_in_id_to_uuid,
        });
    }

    let base = ComponentFile::parse(base_skeleton.file_content)?;
    let (Some(edited_jsx), Some(base_jsx), Some(new_jsx)) =
        (edited.managed_jsx(), base.managed_jsx(), new.managed_jsx())
    else {
        return Ok(missing_base(component_id, revision, &edited, &new, options, warnings));
    };

    let edited_version = CodeVersion::from_file_region(&edited, &edited_jsx, base_map.clone())?;
    let base_version = CodeVersion::from_file_region(&base, &base_jsx, base_map)?;
    let new_version =
        CodeVersion::from_file_region(&new, &new_jsx, info.new_name_in_id_to_uuid)?;

    let merged = rename_and_merge(MergeScenario::new(&base_version, &edited_version, &new_version))?;
    warnings.extend(merged.warnings);
    let file = assemble(FileMerge {
        edited: &edited,
        new: &new,
        base: &base,
        merged_markup: &merged.syntax,
    })?;
    tracing::info!(component_id, revision, to_revision = new_jsx.revision, "merged component");
    Ok(Outcome::Merged(Some(file), warnings))
}

fn missing_base(
    component_id: &str,
    revision: u64,
    edited: &ComponentFile,
    new: &ComponentFile,
    options: &MergeOptions,
    mut warnings: WarningInfo,
) -> Outcome {
    if !options.append_jsx_on_missing_base {
        warnings.add_raw_warning(format!(
            "no base version of component {} at revision {}; component left unmerged",
            component_id, revision
        ));
        return Outcome::Merged(None, warnings);
    }
    warnings.add_raw_warning(format!(
        "no base version of component {} at revision {}; new markup appended for manual merge",
        component_id, revision
    ));
    Outcome::Merged(Some(manual_merge_fallback(edited.text(), new)), warnings)
}
