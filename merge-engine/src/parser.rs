//! Classification of JSX syntax into [`PlasmicNode`]s.
//!
//! An element is identified by the accessor calls the generator puts on
//! it: `className={rh.cls<Id>()}` (anywhere inside the class-name value)
//! or `{...rh.props<Id>()}`. Expressions that wrap identified elements
//! become a single node whose first element is primary; later ones are
//! recorded as secondary occurrences of the same expression.

use crate::ast::{NodeId, PlasmicAttr, PlasmicElement, PlasmicNode, TagOrComponent};
use crate::error::ParseError;
use crate::syntax::{SyntaxId, SyntaxTree};
use crate::types::{Accessor, AccessorKind, HELPER_OBJECT};

/// The accessor named by a `rh.<member>` expression.
pub fn member_accessor(tree: &SyntaxTree, id: SyntaxId) -> Option<Accessor> {
    let (object, property) = tree.member_parts(id)?;
    if object != HELPER_OBJECT {
        return None;
    }
    Accessor::parse(property)
}

/// The accessor called by a `rh.<member>(...)` call.
pub fn call_accessor(tree: &SyntaxTree, id: SyntaxId) -> Option<Accessor> {
    let callee = tree.call_callee(id)?;
    member_accessor(tree, callee)
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) struct PlasmicParser<'t> {
    tree: &'t SyntaxTree,
    nodes: Vec<PlasmicNode>,
}

impl<'t> PlasmicParser<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            nodes: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<PlasmicNode> {
        self.nodes
    }

    fn push(&mut self, node: PlasmicNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Classify an expression. Containers and parentheses are looked
    /// through, and the returned node's raw syntax is the outermost of them.
    /// A fragment becomes a [`PlasmicNode::JsxFragment`] only when it is an
    /// attribute value, i.e. when `fragment_as_one_node` is false.
    pub fn parse_node(
        &mut self,
        id: SyntaxId,
        fragment_as_one_node: bool,
    ) -> Result<NodeId, ParseError> {
        let tree = self.tree;
        let is_wrapper = matches!(tree.kind(id), "jsx_expression" | "parenthesized_expression");
        if is_wrapper && tree.spread_argument(id).is_none() {
            return match tree.named_children(id).next() {
                None => Ok(self.push(PlasmicNode::Opaque { raw: id })),
                Some(inner) => {
                    let node = self.parse_node(inner, fragment_as_one_node)?;
                    self.nodes[node].set_raw(id);
                    Ok(node)
                }
            };
        }
        if tree.is_fragment(id) && !fragment_as_one_node {
            let children = self.parse_children(id)?;
            return Ok(self.push(PlasmicNode::JsxFragment { children, raw: id }));
        }
        self.parse_as_one_node(id)
    }

    fn parse_as_one_node(&mut self, id: SyntaxId) -> Result<NodeId, ParseError> {
        let tree = self.tree;
        if let Some(value) = tree.string_value(id) {
            return Ok(self.push(PlasmicNode::StringLit { value, raw: id }));
        }
        if let Some(accessor) = call_accessor(tree, id) {
            if accessor.kind == AccessorKind::ChildStr {
                return Ok(self.push(PlasmicNode::ChildStrCall {
                    name_in_id: accessor.name_in_id,
                    raw: id,
                }));
            }
        }

        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if tree.is_jsx_element(n) {
                if let Some(element) = self.try_parse_element(n)? {
                    found.push(element);
                    continue;
                }
            }
            stack.extend(tree.children(n).iter().rev());
        }

        let mut found = found.into_iter();
        let Some(primary) = found.next() else {
            return Ok(self.push(PlasmicNode::Opaque { raw: id }));
        };
        let mut secondary_nodes = Vec::new();
        for element in found {
            let raw = tree
                .parent(element.syntax)
                .filter(|&p| self.is_guard_of(p, element.syntax))
                .unwrap_or(element.syntax);
            secondary_nodes.push(self.push(PlasmicNode::TagOrComponent(TagOrComponent {
                element,
                raw,
                secondary_nodes: Vec::new(),
            })));
        }
        Ok(self.push(PlasmicNode::TagOrComponent(TagOrComponent {
            element: primary,
            raw: id,
            secondary_nodes,
        })))
    }

    /// `parent` is `cond && element` (or `||`, `??`) whose other operand
    /// holds no markup of its own.
    fn is_guard_of(&self, parent: SyntaxId, element: SyntaxId) -> bool {
        let tree = self.tree;
        if tree.logical_operator(parent).is_none() {
            return false;
        }
        tree.named_children(parent)
            .filter(|&c| c != element)
            .all(|c| {
                !tree
                    .descendants(c)
                    .into_iter()
                    .any(|n| tree.is_jsx_element(n) || tree.is_fragment(n))
            })
    }

    fn element_id(&self, id: SyntaxId) -> Result<Option<String>, ParseError> {
        let tree = self.tree;
        let mut class_id = None;
        let mut props_id = None;
        for attr in tree.jsx_attributes(id) {
            if let Some(("className", Some(value))) = tree.attribute_parts(attr) {
                class_id = tree
                    .descendants(value)
                    .into_iter()
                    .filter_map(|n| call_accessor(tree, n))
                    .find(|a| a.kind == AccessorKind::Cls)
                    .map(|a| a.name_in_id);
            } else if let Some(arg) = tree.spread_argument(attr) {
                if let Some(accessor) = call_accessor(tree, arg) {
                    if accessor.kind == AccessorKind::Props {
                        props_id = Some(accessor.name_in_id);
                    }
                }
            }
        }
        match (class_id, props_id) {
            (Some(class_id), Some(props_id)) if class_id != props_id => {
                Err(ParseError::ConflictingIds { class_id, props_id })
            }
            (class_id, props_id) => Ok(class_id.or(props_id)),
        }
    }

    fn try_parse_element(&mut self, id: SyntaxId) -> Result<Option<PlasmicElement>, ParseError> {
        let Some(name_in_id) = self.element_id(id)? else {
            return Ok(None);
        };
        let tree = self.tree;
        let mut attrs = Vec::new();
        for attr in tree.jsx_attributes(id) {
            if let Some((name, value)) = tree.attribute_parts(attr) {
                let value = match value {
                    Some(v) => Some(self.parse_node(v, false)?),
                    None => None,
                };
                attrs.push(PlasmicAttr::Named {
                    name: name.to_string(),
                    value,
                    syntax: attr,
                });
            } else if let Some(arg) = tree.spread_argument(attr) {
                let value = self.parse_node(arg, false)?;
                attrs.push(PlasmicAttr::Spread {
                    value,
                    syntax: attr,
                });
            }
        }
        let children = self.parse_children(id)?;
        Ok(Some(PlasmicElement {
            name_in_id,
            syntax: id,
            attrs,
            children,
        }))
    }

    /// Children of an element or fragment. Adjacent text pieces form one
    /// text node; whitespace-only text is dropped.
    pub fn parse_children(&mut self, id: SyntaxId) -> Result<Vec<NodeId>, ParseError> {
        let tree = self.tree;
        let kids = tree.jsx_children(id);
        let is_text = |n: SyntaxId| matches!(tree.kind(n), "jsx_text" | "html_character_reference");
        let mut out = Vec::new();
        let mut i = 0;
        while i < kids.len() {
            if is_text(kids[i]) {
                let first = kids[i];
                while i < kids.len() && is_text(kids[i]) {
                    i += 1;
                }
                let last = kids[i - 1];
                let text = &tree.source()[tree.range(first).start..tree.range(last).end];
                let value = normalize_text(text);
                if !value.is_empty() {
                    out.push(self.push(PlasmicNode::Text { value, raw: first }));
                }
                continue;
            }
            out.push(self.parse_node(kids[i], true)?);
            i += 1;
        }
        Ok(out)
    }
}
