//! One version of a component's managed markup, with its id indexes.

use std::collections::HashMap;

use crate::ast::{NodeId, PlasmicNode, TagOrComponent};
use crate::error::ParseError;
use crate::parser::{PlasmicParser, call_accessor};
use crate::skeleton::{ComponentFile, ManagedJsx};
use crate::syntax::{SyntaxId, SyntaxTree};
use crate::types::{AccessorKind, IdMap, slot_arg_name};

#[derive(Debug, Clone)]
pub struct CodeVersion {
    tree: SyntaxTree,
    nodes: Vec<PlasmicNode>,
    root: NodeId,
    root_syntax: SyntaxId,
    name_in_id_to_uuid: IdMap,
    uuid_to_name_in_id: HashMap<String, String>,
    slot_arg_to_uuid: HashMap<String, String>,
    uuid_to_slot_arg: HashMap<String, String>,
    /// Every identified element, primary or secondary, by logical id.
    tags: HashMap<String, NodeId>,
    secondary_tags: HashMap<String, NodeId>,
    tags_by_uuid: HashMap<String, NodeId>,
}

impl CodeVersion {
    /// Parse a bare markup expression.
    pub fn from_expression(expr: &str, name_in_id_to_uuid: IdMap) -> Result<Self, ParseError> {
        Self::from_expression_at(expr, 0, name_in_id_to_uuid)
    }

    /// Like [`CodeVersion::from_expression`], for text whose continuation
    /// lines are indented as if the expression started at column `indent`.
    pub fn from_expression_at(
        expr: &str,
        indent: usize,
        name_in_id_to_uuid: IdMap,
    ) -> Result<Self, ParseError> {
        let (tree, expr) = SyntaxTree::parse_expression(expr, indent)?;
        Self::from_syntax(tree, expr, name_in_id_to_uuid)
    }

    /// Build from an expression node of an already parsed file.
    pub fn from_syntax(
        tree: SyntaxTree,
        expr: SyntaxId,
        name_in_id_to_uuid: IdMap,
    ) -> Result<Self, ParseError> {
        let root_syntax = tree.unwrap_expression(expr);
        let mut parser = PlasmicParser::new(&tree);
        let root = parser.parse_node(root_syntax, true)?;
        let nodes = parser.finish();

        let uuid_to_name_in_id = name_in_id_to_uuid
            .iter()
            .map(|(name, uuid)| (uuid.clone(), name.clone()))
            .collect();
        let mut slot_arg_to_uuid = HashMap::new();
        let mut uuid_to_slot_arg = HashMap::new();
        for (name, uuid) in &name_in_id_to_uuid {
            if let Some(arg) = slot_arg_name(name) {
                slot_arg_to_uuid.insert(arg.clone(), uuid.clone());
                uuid_to_slot_arg.insert(uuid.clone(), arg);
            }
        }

        let mut version = Self {
            tree,
            nodes,
            root,
            root_syntax,
            name_in_id_to_uuid,
            uuid_to_name_in_id,
            slot_arg_to_uuid,
            uuid_to_slot_arg,
            tags: HashMap::new(),
            secondary_tags: HashMap::new(),
            tags_by_uuid: HashMap::new(),
        };
        version.index(root);
        Ok(version)
    }

    /// The managed markup of a component file.
    pub fn from_file_region(
        file: &ComponentFile,
        region: &ManagedJsx,
        name_in_id_to_uuid: IdMap,
    ) -> Result<Self, ParseError> {
        Self::from_syntax(file.tree().clone(), region.expr, name_in_id_to_uuid)
    }

    fn index(&mut self, id: NodeId) {
        let mut stack = vec![(id, false)];
        while let Some((id, secondary)) = stack.pop() {
            match &self.nodes[id] {
                PlasmicNode::TagOrComponent(tag) => {
                    let name = tag.element.name_in_id.clone();
                    for attr in &tag.element.attrs {
                        if let Some(v) = attr.value() {
                            stack.push((v, false));
                        }
                    }
                    stack.extend(tag.element.children.iter().map(|&c| (c, false)));
                    stack.extend(tag.secondary_nodes.iter().map(|&c| (c, true)));

                    match self.name_in_id_to_uuid.get(&name) {
                        Some(uuid) => {
                            self.tags_by_uuid.insert(uuid.clone(), id);
                        }
                        None => tracing::debug!(name_in_id = %name, "element id missing from id map"),
                    }
                    if secondary {
                        self.secondary_tags.insert(name.clone(), id);
                    }
                    self.tags.insert(name, id);
                }
                PlasmicNode::JsxFragment { children, .. } => {
                    stack.extend(children.iter().map(|&c| (c, false)));
                }
                _ => {}
            }
        }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The (unwrapped) markup expression this version was built from.
    pub fn root_syntax(&self) -> SyntaxId {
        self.root_syntax
    }

    pub fn node(&self, id: NodeId) -> &PlasmicNode {
        &self.nodes[id]
    }

    pub fn tag(&self, id: NodeId) -> Option<&TagOrComponent> {
        self.nodes[id].as_tag()
    }

    pub fn name_in_id_to_uuid(&self) -> &IdMap {
        &self.name_in_id_to_uuid
    }

    pub fn uuid_of(&self, name_in_id: &str) -> Option<&str> {
        self.name_in_id_to_uuid.get(name_in_id).map(String::as_str)
    }

    pub fn slot_arg_uuid(&self, arg: &str) -> Option<&str> {
        self.slot_arg_to_uuid.get(arg).map(String::as_str)
    }

    pub fn find_tag_or_component(&self, name_in_id: &str) -> Option<NodeId> {
        self.tags.get(name_in_id).copied()
    }

    pub fn find_tag_by_uuid(&self, uuid: &str) -> Option<NodeId> {
        self.tags_by_uuid.get(uuid).copied()
    }

    pub fn is_secondary(&self, name_in_id: &str) -> bool {
        self.secondary_tags.contains_key(name_in_id)
    }

    /// Logical ids of every identified element.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// This version's name for a logical id from another version: the
    /// same name when this version knows it, else the name mapped to the
    /// same uuid.
    pub fn find_matching_name_in_id(&self, name_in_id: &str, uuid: Option<&str>) -> Option<String> {
        if self.name_in_id_to_uuid.contains_key(name_in_id) {
            return Some(name_in_id.to_string());
        }
        uuid.and_then(|u| self.uuid_to_name_in_id.get(u)).cloned()
    }

    pub fn find_matching_slot_arg_name(&self, arg: &str, uuid: Option<&str>) -> Option<String> {
        if self.slot_arg_to_uuid.contains_key(arg) {
            return Some(arg.to_string());
        }
        uuid.and_then(|u| self.uuid_to_slot_arg.get(u)).cloned()
    }

    /// Whether `id` is a call to `rh.show<name_in_id>()`.
    pub fn is_show_call(&self, id: SyntaxId, name_in_id: &str) -> bool {
        call_accessor(&self.tree, id)
            .is_some_and(|a| a.kind == AccessorKind::Show && a.name_in_id == name_in_id)
    }

    /// The node's wrapper (outside the element itself) calls its show guard.
    pub fn has_show_func_call(&self, tag: &TagOrComponent) -> bool {
        let element = tag.element.syntax;
        if tag.raw == element {
            return false;
        }
        self.tree
            .descendants(tag.raw)
            .into_iter()
            .filter(|&n| !self.tree.contains(element, n))
            .any(|n| self.is_show_call(n, &tag.element.name_in_id))
    }

    /// Whether the element's `className` value calls its class accessor.
    pub fn has_class_name_id_attr(&self, tag: &TagOrComponent) -> bool {
        let name = &tag.element.name_in_id;
        tag.element.attrs.iter().any(|attr| {
            attr.name() == Some("className")
                && attr.value().is_some_and(|v| {
                    self.tree
                        .descendants(self.nodes[v].raw())
                        .into_iter()
                        .filter_map(|n| call_accessor(&self.tree, n))
                        .any(|a| a.kind == AccessorKind::Cls && &a.name_in_id == name)
                })
        })
    }

    /// The attribute `{...rh.props<Id>(...)}` of the element, if any.
    pub fn props_id_spreador(&self, tag: &TagOrComponent) -> Option<SyntaxId> {
        tag.element
            .attrs
            .iter()
            .map(|a| a.syntax())
            .find(|&attr| {
                self.tree
                    .spread_argument(attr)
                    .and_then(|arg| call_accessor(&self.tree, arg))
                    .is_some_and(|a| {
                        a.kind == AccessorKind::Props && a.name_in_id == tag.element.name_in_id
                    })
            })
    }

    /// Printed source of the whole managed expression.
    pub fn source(&self) -> &str {
        self.tree.text(self.root_syntax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pairs: &[(&str, &str)]) -> IdMap {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_indexes_primary_and_secondary() {
        let v = CodeVersion::from_expression(
            r#"<div className={rh.clsRoot()}>
                {(() => { return <><img className={rh.clsImg1()} /><img className={rh.clsImg2()} /></>; })()}
                <span icon={<i className={rh.clsIcon()} />} className={rh.clsSpan()} />
            </div>"#,
            ids(&[("Root", "1"), ("Img1", "2"), ("Img2", "3"), ("Span", "4"), ("Icon", "5")]),
        )
        .unwrap();
        for name in ["Root", "Img1", "Img2", "Span", "Icon"] {
            assert!(v.find_tag_or_component(name).is_some(), "{}", name);
        }
        assert!(v.is_secondary("Img2"));
        assert!(!v.is_secondary("Img1"));
        assert_eq!(v.find_tag_by_uuid("5"), v.find_tag_or_component("Icon"));
    }

    #[test]
    fn test_matching_names() {
        let v = CodeVersion::from_expression(
            "<div className={rh.clsRoot()} />",
            ids(&[("Root", "1"), ("$slotIconSlot2", "9")]),
        )
        .unwrap();
        assert_eq!(v.find_matching_name_in_id("Root", Some("x")).as_deref(), Some("Root"));
        assert_eq!(v.find_matching_name_in_id("Old", Some("1")).as_deref(), Some("Root"));
        assert_eq!(v.find_matching_name_in_id("Old", Some("2")), None);
        assert_eq!(
            v.find_matching_slot_arg_name("iconSlot", Some("9")).as_deref(),
            Some("iconSlot2")
        );
        assert_eq!(v.slot_arg_uuid("iconSlot2"), Some("9"));
    }

    #[test]
    fn test_show_and_id_attrs() {
        let v = CodeVersion::from_expression(
            r#"<div className={rh.clsRoot()}>
                {rh.showLink() && <a {...rh.propsLink()} />}
                <b className={rh.clsB() + " extra"} />
            </div>"#,
            ids(&[("Root", "1"), ("Link", "2"), ("B", "3")]),
        )
        .unwrap();
        let link = v.tag(v.find_tag_or_component("Link").unwrap()).unwrap();
        assert!(v.has_show_func_call(link));
        assert!(!v.has_class_name_id_attr(link));
        assert!(v.props_id_spreador(link).is_some());

        let b = v.tag(v.find_tag_or_component("B").unwrap()).unwrap();
        assert!(!v.has_show_func_call(b));
        assert!(v.has_class_name_id_attr(b));
        assert!(v.props_id_spreador(b).is_none());
    }
}
