//! Re-point a version's logical ids at another version's names.
//!
//! Between revisions the generator may rename an element (`Img` becomes
//! `Img2`) while its uuid stays the same. Before merging, the edited and
//! base versions are rewritten so that every accessor and slot argument
//! uses the new version's name for the same uuid.

use crate::code_version::CodeVersion;
use crate::error::ParseError;
use crate::parser::member_accessor;
use crate::printer::Syntax;
use crate::syntax::Visit;
use crate::types::{ARGS_OBJECT, Accessor};

/// Rewrite `source`'s markup with `target`'s logical ids.
///
/// Ids that `target` no longer has keep their name, and their
/// `(name, uuid)` pair is carried into the returned version's id map so the
/// node stays addressable.
pub fn rename_jsx_tree(source: &CodeVersion, target: &CodeVersion) -> Result<CodeVersion, ParseError> {
    let tree = source.tree();
    let mut revised = target.name_in_id_to_uuid().clone();
    let mut renamed = 0usize;

    let syntax = tree.clone_with(source.root_syntax(), &mut |id| {
        if let Some(accessor) = member_accessor(tree, id) {
            let Some(uuid) = source.uuid_of(&accessor.name_in_id) else {
                tracing::debug!(accessor = %accessor, "accessor id missing from id map");
                return Visit::Recurse;
            };
            return match target.find_matching_name_in_id(&accessor.name_in_id, Some(uuid)) {
                Some(name) if name != accessor.name_in_id => {
                    renamed += 1;
                    Visit::Replace(Syntax::code(Accessor::new(accessor.kind, name).to_string()))
                }
                Some(_) => Visit::Recurse,
                None => {
                    revised.insert(accessor.name_in_id.clone(), uuid.to_string());
                    Visit::Recurse
                }
            };
        }
        if let Some((ARGS_OBJECT, arg)) = tree.member_parts(id) {
            let matched = target.find_matching_slot_arg_name(arg, source.slot_arg_uuid(arg));
            if let Some(name) = matched.filter(|n| n != arg) {
                renamed += 1;
                return Visit::Replace(Syntax::code(format!("{}.{}", ARGS_OBJECT, name)));
            }
        }
        Visit::Recurse
    });

    // Keep pairs for ids only this version knows, even when no accessor
    // referenced them in the markup.
    for (name, uuid) in source.name_in_id_to_uuid() {
        if target
            .find_matching_name_in_id(name, Some(uuid))
            .is_none()
        {
            revised.entry(name.clone()).or_insert_with(|| uuid.clone());
        }
    }

    let indent = tree.line_indent(source.root_syntax());
    tracing::debug!(renamed, "renamed markup ids");
    CodeVersion::from_expression_at(&syntax.print(indent), indent, revised)
}
