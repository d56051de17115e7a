//! # codemerge-engine
//!
//! Structural three-way merge of generated React component files.
//!
//! A code generator owns the markup of a component (its "managed" JSX) while
//! developers are free to edit the same file: add props, wrap elements, hide
//! them behind conditions, or rewrite the handlers. When the generator
//! produces a new revision, this crate merges three versions of the file:
//!
//! - **base**: what the generator emitted at the revision the developer
//!   started from, fetched through a [`codemerge_core::ProjectSyncDataProvider`],
//! - **edited**: the file on disk,
//! - **new**: what the generator emits now.
//!
//! Generated elements carry stable logical ids through their helper
//! accessors (`rh.clsImg()`, `rh.propsImg()`, `rh.showImg()`), so the merge
//! matches elements by id rather than by position and keeps the developer's
//! code around them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use codemerge_core::MetadataStore;
//! use codemerge_engine::{ComponentInfoForMerge, MergeOptions, merge_files};
//!
//! # async fn run() -> Result<(), codemerge_engine::MergeError> {
//! let components = BTreeMap::from([(
//!     "component-uuid".to_string(),
//!     ComponentInfoForMerge {
//!         edited_file: std::fs::read_to_string("Button.tsx").unwrap_or_default(),
//!         new_file: std::fs::read_to_string("Button.new.tsx").unwrap_or_default(),
//!         new_name_in_id_to_uuid: BTreeMap::new(),
//!     },
//! )]);
//! let store = Arc::new(MetadataStore::new(".codemerge/metadata"));
//! if let Some(output) = merge_files(&components, "project", store, &MergeOptions::default()).await? {
//!     for (id, file) in &output.files {
//!         println!("{id}:\n{file}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod amalgamator;
pub mod ast;
pub mod code_version;
pub mod error;
pub mod imports;
pub mod parser;
pub mod printer;
pub mod rename;
pub mod resolver;
pub mod skeleton;
pub mod syntax;
pub mod types;
pub mod warnings;

pub use amalgamator::{MergedJsx, merge_versions, rename_and_merge};
pub use code_version::CodeVersion;
pub use error::{MergeError, ParseError};
pub use rename::rename_jsx_tree;
pub use resolver::{
    ComponentInfoForMerge, MergeOptions, MergeOutput, PreMergeContext, PreMergeHook, merge_files,
};
pub use skeleton::ComponentFile;
pub use syntax::same_code;
pub use types::{IdMap, MergeScenario};
pub use warnings::{SecondaryNodeWarning, WarningInfo};
