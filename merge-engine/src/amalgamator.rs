//! Three-way merge of a component's markup.
//!
//! The merge walks the new version's node tree. Every identified element is
//! matched by logical id with its occurrence in the edited and base
//! versions, which have been renamed to the new version's ids first. The
//! element itself is rebuilt from the three versions (tag name, attributes,
//! children), while developer code around a matched element, such as a
//! guard, a wrapper or an IIFE, is cloned from the edited version with the
//! merged element spliced in.
//!
//! Nothing here fails: every situation the merge cannot settle degrades to
//! a fixed policy (keep edited, keep new, or emit both) and, where the
//! developer should look at the result, a warning.

use std::collections::{HashMap, HashSet};

use similar::TextDiff;

use crate::ast::{NodeId, PlasmicAttr, PlasmicNode, TagOrComponent};
use crate::code_version::CodeVersion;
use crate::error::ParseError;
use crate::parser::{call_accessor, member_accessor};
use crate::printer::Syntax;
use crate::rename::rename_jsx_tree;
use crate::syntax::{SyntaxId, SyntaxTree, Visit};
use crate::types::{Accessor, AccessorKind, MergeScenario};
use crate::warnings::WarningInfo;

/// A value-less attribute (`<input disabled />`) compares and prints as this.
const VALUELESS_ATTR: &str = "true";

/// Joins the two names of an element renamed on both sides.
const TAG_CONFLICT_SEPARATOR: &str = "___";

/// Merged markup plus whatever the developer should review.
#[derive(Debug, Clone)]
pub struct MergedJsx {
    pub syntax: Syntax,
    pub warnings: WarningInfo,
}

/// Rename the edited and base versions to the new version's ids, then
/// merge the three.
pub fn rename_and_merge(versions: MergeScenario<&CodeVersion>) -> Result<MergedJsx, ParseError> {
    let edited = rename_jsx_tree(versions.edited, versions.new)?;
    let base = rename_jsx_tree(versions.base, versions.new)?;
    Ok(merge_versions(MergeScenario::new(&base, &edited, versions.new)))
}

/// Merge versions whose ids already agree with `versions.new`.
pub fn merge_versions(versions: MergeScenario<&CodeVersion>) -> MergedJsx {
    let mut merger = TreeMerger::new(versions);
    let syntax = merger.merge_root();
    merger.report_deleted_primaries();
    MergedJsx {
        syntax,
        warnings: merger.warnings,
    }
}

/// How to settle an attribute both sides may have touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    EmitEdited,
    EmitNew,
    /// Keep both values, new first, in a fragment.
    EmitBoth,
}

/// Decide an attribute from the fingerprints of its three values. `base`
/// is `None` when the base element lacked the attribute.
pub fn conflict_resolution(name: &str, base: Option<&str>, edited: &str, new: &str) -> Resolution {
    if edited == new {
        return Resolution::EmitEdited;
    }
    let Some(base) = base else {
        return Resolution::EmitBoth;
    };
    if base == edited {
        Resolution::EmitNew
    } else if name.starts_with("on") || base == new {
        Resolution::EmitEdited
    } else {
        Resolution::EmitBoth
    }
}

/// A merge result that has not been placed yet. The same value prints
/// differently as a JSX child, an expression and an attribute value.
#[derive(Debug, Clone)]
enum Piece {
    /// An element or fragment.
    Jsx(Syntax),
    /// A string literal.
    Quoted(Syntax),
    Expr(Syntax),
    /// JSX text.
    Text(String),
}

impl Piece {
    fn classify(tree: &SyntaxTree, id: SyntaxId, syntax: Syntax) -> Piece {
        if tree.is_jsx_element(id) || tree.is_fragment(id) {
            Piece::Jsx(syntax)
        } else if tree.kind(id) == "string" {
            Piece::Quoted(syntax)
        } else {
            Piece::Expr(syntax)
        }
    }

    fn verbatim(tree: &SyntaxTree, raw: SyntaxId) -> Piece {
        let id = tree.unwrap_expression(raw);
        Piece::classify(tree, id, tree.verbatim(id))
    }

    fn into_child(self) -> Syntax {
        match self {
            Piece::Jsx(s) => s,
            Piece::Quoted(s) | Piece::Expr(s) => Syntax::container(s),
            Piece::Text(text) => Syntax::Text(text),
        }
    }

    fn into_expr(self) -> Syntax {
        match self {
            Piece::Jsx(s) | Piece::Quoted(s) | Piece::Expr(s) => s,
            Piece::Text(text) => Syntax::code(quote(&text)),
        }
    }

    fn into_attr_value(self) -> Syntax {
        match self {
            Piece::Jsx(s) | Piece::Expr(s) => Syntax::container(s),
            Piece::Quoted(s) => s,
            Piece::Text(text) => Syntax::code(quote(&text)),
        }
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render `piece` for the position `target` occupies in `tree`.
fn place(piece: Piece, tree: &SyntaxTree, target: SyntaxId) -> Syntax {
    match tree.parent(target) {
        Some(p) if tree.is_jsx_element(p) || tree.is_fragment(p) => piece.into_child(),
        Some(p) if tree.kind(p) == "jsx_attribute" => piece.into_attr_value(),
        _ => piece.into_expr(),
    }
}

/// What takes the place of a removed occurrence: nothing inside a child
/// list, `null` in expression position.
fn removal(tree: &SyntaxTree, raw: SyntaxId) -> (SyntaxId, Syntax) {
    let in_children = |n: SyntaxId| {
        tree.parent(n)
            .is_some_and(|p| tree.is_jsx_element(p) || tree.is_fragment(p))
    };
    if in_children(raw) {
        return (raw, Syntax::empty());
    }
    if let Some(container) = tree.parent(raw).filter(|&p| tree.kind(p) == "jsx_expression") {
        if in_children(container) {
            return (container, Syntax::empty());
        }
    }
    (raw, Syntax::code("null"))
}

fn show_call(name_in_id: &str) -> Syntax {
    Syntax::code(format!("{}()", Accessor::new(AccessorKind::Show, name_in_id)))
}

/// `rh.show<Id>() && <x/>` with nothing else in the condition.
fn is_plain_guard(tree: &SyntaxTree, call: SyntaxId, element: SyntaxId) -> bool {
    let Some(parent) = tree.parent(call) else {
        return false;
    };
    tree.logical_operator(parent) == Some("&&")
        && tree.child_by_field(parent, "left") == Some(call)
        && tree
            .child_by_field(parent, "right")
            .is_some_and(|right| tree.unwrap_expression(right) == element)
}

fn find_tag<'v>(version: &'v CodeVersion, name_in_id: &str) -> Option<&'v TagOrComponent> {
    version
        .find_tag_or_component(name_in_id)
        .and_then(|id| version.tag(id))
}

fn find_attr<'t>(tag: &'t TagOrComponent, name: &str) -> Option<&'t PlasmicAttr> {
    tag.element.attrs.iter().find(|a| a.name() == Some(name))
}

fn tag_name<'v>(version: &'v CodeVersion, tag: &TagOrComponent) -> &'v str {
    let tree = version.tree();
    tree.jsx_name(tag.element.syntax)
        .map_or("", |name| tree.text(name))
}

fn value_fingerprint(version: &CodeVersion, value: Option<NodeId>) -> String {
    match value {
        Some(v) => {
            let tree = version.tree();
            tree.fingerprint(tree.unwrap_expression(version.node(v).raw()))
        }
        None => VALUELESS_ATTR.to_string(),
    }
}

fn value_expr(version: &CodeVersion, value: Option<NodeId>) -> Syntax {
    match value {
        Some(v) => {
            let tree = version.tree();
            tree.verbatim(tree.unwrap_expression(version.node(v).raw()))
        }
        None => Syntax::code(VALUELESS_ATTR),
    }
}

fn value_list(version: &CodeVersion, value: Option<NodeId>) -> Vec<NodeId> {
    match value.map(|v| (v, version.node(v))) {
        None => Vec::new(),
        Some((_, PlasmicNode::JsxFragment { children, .. })) => children.clone(),
        Some((v, _)) => vec![v],
    }
}

fn is_fragment_node(version: &CodeVersion, id: NodeId) -> bool {
    matches!(version.node(id), PlasmicNode::JsxFragment { .. })
}

/// `className={rh.cls<Id>()}` exactly as generated.
fn is_bare_cls_call(version: &CodeVersion, value: NodeId) -> bool {
    let tree = version.tree();
    let expr = tree.unwrap_expression(version.node(value).raw());
    call_accessor(tree, expr).is_some_and(|a| a.kind == AccessorKind::Cls)
        && tree.call_argument_count(expr) == 0
}

/// Identity of a leaf child for comparisons across versions. Text and
/// string literals compare with each other by value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LeafKey {
    Text(String),
    Opaque(String),
}

fn leaf_key(version: &CodeVersion, id: NodeId) -> Option<LeafKey> {
    let node = version.node(id);
    if let Some(value) = node.text_value() {
        return Some(LeafKey::Text(value.to_string()));
    }
    match node {
        PlasmicNode::Opaque { raw } => {
            let tree = version.tree();
            Some(LeafKey::Opaque(tree.fingerprint(tree.unwrap_expression(*raw))))
        }
        _ => None,
    }
}

fn kind_class(node: &PlasmicNode) -> &'static str {
    match node {
        PlasmicNode::Text { .. } | PlasmicNode::StringLit { .. } => "text",
        other => other.kind_name(),
    }
}

fn is_opaque(node: &PlasmicNode) -> bool {
    matches!(node, PlasmicNode::Opaque { .. })
}

/// Identified elements directly held by an attribute value: the primary
/// node, its secondaries, and the same for each fragment child.
fn collect_tags(version: &CodeVersion, id: NodeId, out: &mut HashSet<String>) {
    match version.node(id) {
        PlasmicNode::TagOrComponent(tag) => {
            out.insert(tag.element.name_in_id.clone());
            for &sec in &tag.secondary_nodes {
                if let Some(name) = version.node(sec).name_in_id() {
                    out.insert(name.to_string());
                }
            }
        }
        PlasmicNode::JsxFragment { children, .. } => {
            for &child in children {
                collect_tags(version, child, out);
            }
        }
        _ => {}
    }
}

/// Position in a merged child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    New(NodeId),
    Edited(NodeId),
}

struct TreeMerger<'a> {
    base: &'a CodeVersion,
    edited: &'a CodeVersion,
    new: &'a CodeVersion,
    /// Elements placed by the developer inside attributes of their own.
    /// They are emitted there and nowhere else.
    attr_owned: HashSet<String>,
    warnings: WarningInfo,
}

impl<'a> TreeMerger<'a> {
    fn new(versions: MergeScenario<&'a CodeVersion>) -> Self {
        let MergeScenario { base, edited, new } = versions;
        let mut attr_owned = HashSet::new();
        for name in edited.tag_names() {
            let Some(tag) = find_tag(edited, name) else {
                continue;
            };
            let new_tag = find_tag(new, name);
            let base_tag = find_tag(base, name);
            for attr in &tag.element.attrs {
                let owned = match attr {
                    PlasmicAttr::Named { name, .. } => {
                        new_tag.and_then(|t| find_attr(t, name)).is_none()
                            && base_tag.and_then(|t| find_attr(t, name)).is_none()
                    }
                    PlasmicAttr::Spread { syntax, .. } => {
                        edited.props_id_spreador(tag) != Some(*syntax)
                    }
                };
                if let Some(value) = attr.value().filter(|_| owned) {
                    collect_tags(edited, value, &mut attr_owned);
                }
            }
        }
        if !attr_owned.is_empty() {
            tracing::debug!(count = attr_owned.len(), "nodes held by developer attributes");
        }

        Self {
            base,
            edited,
            new,
            attr_owned,
            warnings: WarningInfo::new(),
        }
    }

    fn merge_root(&mut self) -> Syntax {
        match self.serialize_node(self.new.root()) {
            Some(piece) => piece.into_expr(),
            None => Syntax::code("null"),
        }
    }

    /// Secondary occurrences only survive inside their primary's code, so a
    /// primary the generator deleted takes them along. One warning per such
    /// node lists what went with it.
    fn report_deleted_primaries(&mut self) {
        let edited = self.edited;
        let mut names: Vec<&str> = edited
            .tag_names()
            .filter(|name| !edited.is_secondary(name))
            .collect();
        names.sort_unstable();
        for name in names {
            let Some(tag) = find_tag(edited, name) else {
                continue;
            };
            if tag.secondary_nodes.is_empty()
                || find_tag(self.new, name).is_some()
                || find_tag(self.base, name).is_none()
            {
                continue;
            }
            let dropped: Vec<&str> = tag
                .secondary_nodes
                .iter()
                .filter_map(|&sec| edited.tag(sec))
                .map(|sec| sec.element.name_in_id.as_str())
                .collect();
            self.warnings.add_raw_warning(format!(
                "node {} was deleted by the generator; its secondary occurrences ({}) were removed with it",
                name,
                dropped.join(", ")
            ));
        }
    }

    /// The merge result for a node of the new version, `None` when it must
    /// not appear at its new position.
    fn serialize_node(&mut self, id: NodeId) -> Option<Piece> {
        let new = self.new;
        match new.node(id) {
            PlasmicNode::TagOrComponent(tag) => self.serialize_tag(tag),
            PlasmicNode::Text { value, .. } => Some(Piece::Text(value.clone())),
            PlasmicNode::JsxFragment { children, .. } => {
                let children = children
                    .iter()
                    .filter_map(|&c| self.serialize_node(c))
                    .map(Piece::into_child)
                    .collect();
                Some(Piece::Jsx(Syntax::Fragment(children)))
            }
            other => Some(Piece::verbatim(new.tree(), other.raw())),
        }
    }

    fn serialize_tag(&mut self, new_tag: &TagOrComponent) -> Option<Piece> {
        let name = new_tag.element.name_in_id.as_str();
        if self.attr_owned.contains(name) {
            tracing::debug!(name_in_id = name, "node lives in a developer attribute");
            return None;
        }
        let edited = self.edited;
        if let Some(edited_tag) = find_tag(edited, name) {
            if edited.is_secondary(name) {
                tracing::debug!(name_in_id = name, "node merged at its primary occurrence");
                return None;
            }
            return Some(self.merge_occurrence(new_tag, edited_tag));
        }
        if find_tag(self.base, name).is_some() {
            tracing::debug!(name_in_id = name, "node deleted by developer");
            return None;
        }
        tracing::debug!(name_in_id = name, "node added by generator");
        Some(self.emit_new(new_tag))
    }

    /// Merge a matched element and put it back into the edited code that
    /// surrounds it.
    fn merge_occurrence(&mut self, new_tag: &TagOrComponent, edited_tag: &TagOrComponent) -> Piece {
        let (new, edited) = (self.new, self.edited);
        let tree = edited.tree();
        let new_name = new_tag.element.name_in_id.as_str();
        let element = self.merge_element(new_tag, edited_tag);

        let new_guards = new.has_show_func_call(new_tag);
        let edited_guards = edited.has_show_func_call(edited_tag);
        let merged = if new_guards && !edited_guards {
            tracing::debug!(name_in_id = new_name, "adding show guard");
            Piece::Expr(Syntax::and(show_call(new_name), element))
        } else {
            Piece::Jsx(element)
        };

        let raw = tree.unwrap_expression(edited_tag.raw);
        let element_syntax = edited_tag.element.syntax;
        if raw == element_syntax {
            return merged;
        }

        let mut replacements = HashMap::new();
        replacements.insert(element_syntax, place(merged, tree, element_syntax));
        for &sec in &edited_tag.secondary_nodes {
            self.merge_secondary(sec, &mut replacements);
        }
        let edited_name = edited_tag.element.name_in_id.as_str();
        let syntax = tree.clone_with(raw, &mut |id| {
            if let Some(replacement) = replacements.remove(&id) {
                return Visit::Replace(replacement);
            }
            if edited.is_show_call(id, edited_name) {
                // A guard the developer extended keeps its call.
                if new_guards || !is_plain_guard(tree, id, element_syntax) {
                    return Visit::Replace(show_call(new_name));
                }
                tracing::debug!(name_in_id = new_name, "show guard dropped by generator");
                return Visit::Replace(Syntax::code("true"));
            }
            Visit::Recurse
        });
        Piece::classify(tree, raw, syntax)
    }

    fn merge_secondary(&mut self, sec: NodeId, replacements: &mut HashMap<SyntaxId, Syntax>) {
        let edited = self.edited;
        let tree = edited.tree();
        let Some(sec_tag) = edited.tag(sec) else {
            return;
        };
        let name = sec_tag.element.name_in_id.as_str();
        match find_tag(self.new, name) {
            Some(new_sec) => {
                let piece = self.merge_occurrence(new_sec, sec_tag);
                let syntax = place(piece, tree, sec_tag.raw);
                self.warnings.add_secondary_node(name, syntax.to_string());
                replacements.insert(sec_tag.raw, syntax);
            }
            None => {
                tracing::debug!(name_in_id = name, "removing secondary occurrence of deleted node");
                let (target, syntax) = removal(tree, sec_tag.raw);
                replacements.insert(target, syntax);
            }
        }
    }

    /// A node only the new version has: its own code, with every element
    /// inside it merged.
    fn emit_new(&mut self, new_tag: &TagOrComponent) -> Piece {
        let new = self.new;
        let tree = new.tree();
        let element = self.emit_new_element(new_tag);
        let raw = tree.unwrap_expression(new_tag.raw);
        let element_syntax = new_tag.element.syntax;
        if raw == element_syntax {
            return Piece::Jsx(element);
        }

        let mut replacements = HashMap::new();
        replacements.insert(element_syntax, place(Piece::Jsx(element), tree, element_syntax));
        for &sec in &new_tag.secondary_nodes {
            let Some(sec_tag) = new.tag(sec) else {
                continue;
            };
            let name = sec_tag.element.name_in_id.as_str();
            let deleted = self.attr_owned.contains(name)
                || (find_tag(self.edited, name).is_none() && find_tag(self.base, name).is_some());
            if deleted {
                let (target, syntax) = removal(tree, sec_tag.raw);
                replacements.insert(target, syntax);
            } else if let Some(element) = self.element_only(name) {
                let target = sec_tag.element.syntax;
                replacements.insert(target, place(Piece::Jsx(element), tree, target));
            }
        }
        let syntax = tree.clone_with(raw, &mut |id| {
            replacements.remove(&id).map_or(Visit::Recurse, Visit::Replace)
        });
        Piece::classify(tree, raw, syntax)
    }

    fn emit_new_element(&mut self, new_tag: &TagOrComponent) -> Syntax {
        let attrs = new_tag
            .element
            .attrs
            .iter()
            .map(|attr| self.emit_new_attr(attr))
            .collect();
        let children = new_tag
            .element
            .children
            .iter()
            .filter_map(|&c| self.serialize_node(c))
            .map(Piece::into_child)
            .collect();
        Syntax::Element {
            name: tag_name(self.new, new_tag).to_string(),
            attrs,
            children,
        }
    }

    fn emit_new_attr(&mut self, attr: &PlasmicAttr) -> Syntax {
        let new = self.new;
        match attr {
            PlasmicAttr::Named {
                name,
                value: Some(value),
                ..
            } if new.node(*value).is_managed_markup() => Syntax::Attr {
                name: name.clone(),
                value: Some(Box::new(self.merge_attr_value(Some(*value), None, None))),
            },
            PlasmicAttr::Spread { syntax, .. } => self.clone_with_elements(new, *syntax),
            other => new.tree().verbatim(other.syntax()),
        }
    }

    fn emit_edited_attr(&mut self, attr: &PlasmicAttr) -> Syntax {
        self.clone_with_elements(self.edited, attr.syntax())
    }

    /// Just the merged element for `name_in_id`, without any surrounding
    /// code. `None` when the new version no longer has it.
    fn element_only(&mut self, name_in_id: &str) -> Option<Syntax> {
        let new_tag = find_tag(self.new, name_in_id)?;
        Some(match find_tag(self.edited, name_in_id) {
            Some(edited_tag) => self.merge_element(new_tag, edited_tag),
            None => self.emit_new_element(new_tag),
        })
    }

    /// Clone `syntax` from `version`, merging every identified element in it.
    fn clone_with_elements(&mut self, version: &'a CodeVersion, syntax: SyntaxId) -> Syntax {
        let tree = version.tree();
        let inner: Vec<(SyntaxId, String)> = version
            .tag_names()
            .filter_map(|name| {
                let tag = find_tag(version, name)?;
                tree.contains(syntax, tag.element.syntax)
                    .then(|| (tag.element.syntax, name.to_string()))
            })
            .collect();

        let mut replacements = HashMap::new();
        for (element, name) in &inner {
            let nested = inner
                .iter()
                .any(|(other, _)| other != element && tree.contains(*other, *element));
            if nested {
                continue;
            }
            if let Some(merged) = self.element_only(name) {
                replacements.insert(*element, merged);
            }
        }
        if replacements.is_empty() {
            return tree.verbatim(syntax);
        }
        tree.clone_with(syntax, &mut |id| {
            replacements.remove(&id).map_or(Visit::Recurse, Visit::Replace)
        })
    }

    fn merge_element(&mut self, new_tag: &TagOrComponent, edited_tag: &TagOrComponent) -> Syntax {
        let (new, edited, base) = (self.new, self.edited, self.base);
        let base_tag = find_tag(base, &new_tag.element.name_in_id);

        let new_name = tag_name(new, new_tag);
        let edited_name = tag_name(edited, edited_tag);
        let base_name = base_tag.map_or(new_name, |t| tag_name(base, t));
        let name = if base_name == edited_name {
            new_name.to_string()
        } else if base_name == new_name || edited_name == new_name {
            edited_name.to_string()
        } else {
            tracing::debug!(
                edited = edited_name,
                new = new_name,
                "tag renamed on both sides"
            );
            format!("{}{}{}", edited_name, TAG_CONFLICT_SEPARATOR, new_name)
        };

        let attrs = self.merge_attributes(new_tag, edited_tag, base_tag);
        let base_children = base_tag.map_or(&[][..], |t| t.element.children.as_slice());
        let children = self
            .merge_child_list(
                &new_tag.element.children,
                &edited_tag.element.children,
                base_children,
            )
            .into_iter()
            .map(Piece::into_child)
            .collect();
        Syntax::Element {
            name,
            attrs,
            children,
        }
    }

    /// Re-point the accessors of `from` inside an edited attribute to `to`.
    fn repoint(&self, syntax: SyntaxId, from: &str, to: &str) -> Syntax {
        let tree = self.edited.tree();
        if from == to {
            return tree.verbatim(syntax);
        }
        tree.clone_with(syntax, &mut |id| match member_accessor(tree, id) {
            Some(accessor) if accessor.name_in_id == from => {
                Visit::Replace(Syntax::code(Accessor::new(accessor.kind, to).to_string()))
            }
            _ => Visit::Recurse,
        })
    }

    fn merge_attributes(
        &mut self,
        new_tag: &TagOrComponent,
        edited_tag: &TagOrComponent,
        base_tag: Option<&TagOrComponent>,
    ) -> Vec<Syntax> {
        let (new, edited, base) = (self.new, self.edited, self.base);
        let from = edited_tag.element.name_in_id.as_str();
        let to = new_tag.element.name_in_id.as_str();
        let new_props = new.props_id_spreador(new_tag);
        let edited_props = edited.props_id_spreador(edited_tag);

        let mut attrs = Vec::new();
        let mut class_at = None;
        for attr in &edited_tag.element.attrs {
            match attr {
                PlasmicAttr::Spread { syntax, .. } if Some(*syntax) == edited_props => {
                    let tree = edited.tree();
                    if new_props.is_some() {
                        attrs.push(self.repoint(*syntax, from, to));
                    } else if tree
                        .spread_argument(*syntax)
                        .is_some_and(|arg| tree.call_argument_count(arg) == 0)
                    {
                        tracing::debug!(name_in_id = to, "props spread dropped by generator");
                    } else {
                        attrs.push(tree.verbatim(*syntax));
                    }
                }
                PlasmicAttr::Spread { syntax, .. } => {
                    attrs.push(self.clone_with_elements(edited, *syntax));
                }
                PlasmicAttr::Named {
                    name, value, syntax,
                } if name == "className" => {
                    if !new.has_class_name_id_attr(new_tag)
                        && value.is_some_and(|v| is_bare_cls_call(edited, v))
                    {
                        tracing::debug!(name_in_id = to, "class accessor dropped by generator");
                    } else {
                        class_at = Some(attrs.len());
                        attrs.push(self.repoint(*syntax, from, to));
                    }
                }
                PlasmicAttr::Named { name, value, .. } => {
                    let base_attr = base_tag.and_then(|t| find_attr(t, name));
                    match (find_attr(new_tag, name), base_attr) {
                        (Some(new_attr), _) => {
                            attrs.push(self.merge_named_attr(name, new_attr, attr, base_attr));
                        }
                        (None, Some(base_attr))
                            if value_fingerprint(base, base_attr.value())
                                == value_fingerprint(edited, *value) =>
                        {
                            tracing::debug!(attr = %name, "attribute removed by generator");
                        }
                        (None, _) => attrs.push(self.emit_edited_attr(attr)),
                    }
                }
            }
        }

        if edited_props.is_none() {
            if let Some(spread) = new_props {
                attrs.insert(class_at.map_or(0, |i| i + 1), new.tree().verbatim(spread));
            }
        }
        if class_at.is_none() {
            if let Some(class) = find_attr(new_tag, "className") {
                attrs.insert(0, new.tree().verbatim(class.syntax()));
            }
        }
        for attr in &new_tag.element.attrs {
            let PlasmicAttr::Named { name, .. } = attr else {
                continue;
            };
            let known = name == "className"
                || find_attr(edited_tag, name).is_some()
                || base_tag.is_some_and(|t| find_attr(t, name).is_some());
            if !known {
                attrs.push(self.emit_new_attr(attr));
            }
        }
        attrs
    }

    fn merge_named_attr(
        &mut self,
        name: &str,
        new_attr: &PlasmicAttr,
        edited_attr: &PlasmicAttr,
        base_attr: Option<&PlasmicAttr>,
    ) -> Syntax {
        let (new, edited, base) = (self.new, self.edited, self.base);
        if let Some(value) = new_attr.value().filter(|&v| new.node(v).is_managed_markup()) {
            let merged = self.merge_attr_value(
                Some(value),
                edited_attr.value(),
                base_attr.and_then(PlasmicAttr::value),
            );
            return Syntax::Attr {
                name: name.to_string(),
                value: Some(Box::new(merged)),
            };
        }

        let new_fp = value_fingerprint(new, new_attr.value());
        let edited_fp = value_fingerprint(edited, edited_attr.value());
        let base_fp = base_attr.map(|a| value_fingerprint(base, a.value()));
        match conflict_resolution(name, base_fp.as_deref(), &edited_fp, &new_fp) {
            Resolution::EmitEdited => self.emit_edited_attr(edited_attr),
            Resolution::EmitNew => new.tree().verbatim(new_attr.syntax()),
            Resolution::EmitBoth => {
                tracing::debug!(attr = name, "attribute changed on both sides, keeping both");
                let both = Syntax::Fragment(vec![
                    Syntax::container(value_expr(new, new_attr.value())),
                    Syntax::container(value_expr(edited, edited_attr.value())),
                ]);
                Syntax::Attr {
                    name: name.to_string(),
                    value: Some(Box::new(Syntax::container(both))),
                }
            }
        }
    }

    /// Merge an attribute value holding managed markup as a child list.
    /// A single resulting node gets a fragment around it only when the
    /// edited value had one (or, lacking an edited value, the new one).
    fn merge_attr_value(
        &mut self,
        new_value: Option<NodeId>,
        edited_value: Option<NodeId>,
        base_value: Option<NodeId>,
    ) -> Syntax {
        let (new, edited, base) = (self.new, self.edited, self.base);
        let as_fragment = match edited_value {
            Some(v) => is_fragment_node(edited, v),
            None => new_value.is_some_and(|v| is_fragment_node(new, v)),
        };
        let mut pieces = self.merge_child_list(
            &value_list(new, new_value),
            &value_list(edited, edited_value),
            &value_list(base, base_value),
        );
        if pieces.len() == 1 && !as_fragment {
            if let Some(piece) = pieces.pop() {
                return piece.into_attr_value();
            }
        }
        let children = pieces.into_iter().map(Piece::into_child).collect();
        Syntax::container(Syntax::Fragment(children))
    }

    fn merge_child_list(
        &mut self,
        new_list: &[NodeId],
        edited_list: &[NodeId],
        base_list: &[NodeId],
    ) -> Vec<Piece> {
        let (new, edited, base) = (self.new, self.edited, self.base);
        let base_leaves: Vec<LeafKey> = base_list.iter().filter_map(|&b| leaf_key(base, b)).collect();
        let edited_leaves: Vec<LeafKey> =
            edited_list.iter().filter_map(|&e| leaf_key(edited, e)).collect();

        // A generated leaf the developer removed or rewrote stays out.
        let mut merged: Vec<Slot> = new_list
            .iter()
            .copied()
            .filter(|&n| match leaf_key(new, n) {
                Some(key) => !base_leaves.contains(&key) || edited_leaves.contains(&key),
                None => true,
            })
            .map(Slot::New)
            .collect();

        let mut cursor = 0;
        for (i, &child) in edited_list.iter().enumerate() {
            if !self.is_insertable(child) {
                continue;
            }
            if let Some(key) = leaf_key(edited, child) {
                let present = (cursor..merged.len())
                    .find(|&p| self.slot_key(merged[p]).as_ref() == Some(&key));
                if let Some(pos) = present {
                    cursor = pos + 1;
                    continue;
                }
                if base_leaves.contains(&key) {
                    continue;
                }
            }
            let at = match i.checked_sub(1).map(|p| edited_list[p]) {
                None => cursor,
                Some(prev) => self
                    .find_prev(&merged, cursor, prev)
                    .map_or(cursor, |p| p + 1),
            };
            merged.insert(at, Slot::Edited(child));
            cursor = at + 1;
        }

        self.resolve_opaque_divergence(&mut merged, new_list, edited_list, base_list);

        merged
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::New(id) => self.serialize_node(id),
                Slot::Edited(id) => Some(self.edited_piece(id)),
            })
            .collect()
    }

    /// Edited children that are kept by inserting them: leaves, and
    /// elements neither the base nor the new version knows.
    fn is_insertable(&self, child: NodeId) -> bool {
        match self.edited.node(child) {
            node if node.is_leaf() => true,
            PlasmicNode::TagOrComponent(tag) => {
                let name = tag.element.name_in_id.as_str();
                find_tag(self.new, name).is_none() && find_tag(self.base, name).is_none()
            }
            _ => false,
        }
    }

    fn slot_node(&self, slot: Slot) -> (&'a CodeVersion, NodeId) {
        match slot {
            Slot::New(id) => (self.new, id),
            Slot::Edited(id) => (self.edited, id),
        }
    }

    fn slot_key(&self, slot: Slot) -> Option<LeafKey> {
        let (version, id) = self.slot_node(slot);
        leaf_key(version, id)
    }

    /// Where the edited sibling `prev` ended up: its exact counterpart
    /// first, else the first node of the same kind from the cursor on.
    fn find_prev(&self, merged: &[Slot], cursor: usize, prev: NodeId) -> Option<usize> {
        let edited = self.edited;
        let prev_node = edited.node(prev);
        let perfect = (cursor.saturating_sub(1)..merged.len()).find(|&p| {
            if merged[p] == Slot::Edited(prev) {
                return true;
            }
            let (version, id) = self.slot_node(merged[p]);
            let node = version.node(id);
            match (prev_node, node) {
                (PlasmicNode::TagOrComponent(a), PlasmicNode::TagOrComponent(b)) => {
                    a.element.name_in_id == b.element.name_in_id
                }
                (PlasmicNode::ChildStrCall { .. }, PlasmicNode::ChildStrCall { .. }) => true,
                (PlasmicNode::Opaque { .. }, PlasmicNode::Opaque { .. }) => {
                    leaf_key(edited, prev) == leaf_key(version, id)
                }
                _ => prev_node.text_value().is_some() && prev_node.text_value() == node.text_value(),
            }
        });
        perfect.or_else(|| {
            (cursor..merged.len()).find(|&p| {
                let (version, id) = self.slot_node(merged[p]);
                kind_class(version.node(id)) == kind_class(prev_node)
            })
        })
    }

    /// A base opaque child rewritten on both sides: keep the developer's
    /// version, drop the generated one and say so.
    fn resolve_opaque_divergence(
        &mut self,
        merged: &mut Vec<Slot>,
        new_list: &[NodeId],
        edited_list: &[NodeId],
        base_list: &[NodeId],
    ) {
        let (new, edited, base) = (self.new, self.edited, self.base);
        let new_keys: Vec<LeafKey> = new_list.iter().filter_map(|&n| leaf_key(new, n)).collect();
        let edited_keys: Vec<LeafKey> =
            edited_list.iter().filter_map(|&e| leaf_key(edited, e)).collect();
        let base_keys: Vec<LeafKey> = base_list.iter().filter_map(|&b| leaf_key(base, b)).collect();

        for &b in base_list {
            if !is_opaque(base.node(b)) {
                continue;
            }
            let Some(key) = leaf_key(base, b) else {
                continue;
            };
            if new_keys.contains(&key) || edited_keys.contains(&key) {
                continue;
            }
            let edited_rewrote = merged
                .iter()
                .any(|s| matches!(*s, Slot::Edited(id) if is_opaque(edited.node(id))));
            let new_rewrite = merged.iter().position(|s| match *s {
                Slot::New(id) => {
                    is_opaque(new.node(id))
                        && leaf_key(new, id)
                            .is_some_and(|k| !base_keys.contains(&k) && !edited_keys.contains(&k))
                }
                Slot::Edited(_) => false,
            });
            let (true, Some(pos)) = (edited_rewrote, new_rewrite) else {
                continue;
            };
            if let Slot::New(id) = merged.remove(pos) {
                let base_text = base.tree().text(base.node(b).raw());
                let new_text = new.tree().text(new.node(id).raw());
                let diff = TextDiff::from_lines(base_text, new_text)
                    .unified_diff()
                    .header("base", "new")
                    .to_string();
                self.warnings.add_raw_warning(format!(
                    "Markup changed both by the developer and by the generator; kept the developer's version. Generated change:\n{}",
                    diff
                ));
            }
        }
    }

    fn edited_piece(&mut self, id: NodeId) -> Piece {
        let edited = self.edited;
        let tree = edited.tree();
        match edited.node(id) {
            PlasmicNode::Text { value, .. } => Piece::Text(value.clone()),
            PlasmicNode::TagOrComponent(tag) => {
                let raw = tree.unwrap_expression(tag.raw);
                let syntax = self.clone_with_elements(edited, raw);
                Piece::classify(tree, raw, syntax)
            }
            other => Piece::verbatim(tree, other.raw()),
        }
    }
}
