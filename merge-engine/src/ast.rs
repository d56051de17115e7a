//! Semantic view of generated markup.
//!
//! The parser classifies every JSX child and attribute value into one of
//! a few node kinds. Only elements that carry a logical id become
//! structured [`TagOrComponent`] nodes; any other expression is kept as an
//! opaque span of the syntax tree.

use crate::syntax::SyntaxId;

/// Index of a node within its [`CodeVersion`](crate::code_version::CodeVersion).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub enum PlasmicNode {
    TagOrComponent(TagOrComponent),
    /// `<>...</>` used as an attribute value.
    JsxFragment {
        children: Vec<NodeId>,
        raw: SyntaxId,
    },
    /// Trimmed JSX text, never empty.
    Text {
        value: String,
        raw: SyntaxId,
    },
    StringLit {
        value: String,
        raw: SyntaxId,
    },
    /// `rh.childStr<Id>()`
    ChildStrCall {
        name_in_id: String,
        raw: SyntaxId,
    },
    Opaque {
        raw: SyntaxId,
    },
}

/// An identified element, plus the expression that holds it.
#[derive(Debug, Clone)]
pub struct TagOrComponent {
    pub element: PlasmicElement,
    /// The outermost expression the element was found in: the element
    /// itself, or a developer wrapper such as `cond && <x/>`, `<Wrapper>`
    /// or `items.map(...)`. For secondary occurrences this is the
    /// immediate `&&`/`||` parent when there is one.
    pub raw: SyntaxId,
    /// Further identified elements found inside `raw` after this one.
    pub secondary_nodes: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct PlasmicElement {
    pub name_in_id: String,
    pub syntax: SyntaxId,
    pub attrs: Vec<PlasmicAttr>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum PlasmicAttr {
    Named {
        name: String,
        value: Option<NodeId>,
        syntax: SyntaxId,
    },
    Spread {
        value: NodeId,
        syntax: SyntaxId,
    },
}

impl PlasmicAttr {
    pub fn syntax(&self) -> SyntaxId {
        match self {
            PlasmicAttr::Named { syntax, .. } | PlasmicAttr::Spread { syntax, .. } => *syntax,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PlasmicAttr::Named { name, .. } => Some(name),
            PlasmicAttr::Spread { .. } => None,
        }
    }

    pub fn value(&self) -> Option<NodeId> {
        match self {
            PlasmicAttr::Named { value, .. } => *value,
            PlasmicAttr::Spread { value, .. } => Some(*value),
        }
    }
}

impl PlasmicNode {
    pub fn raw(&self) -> SyntaxId {
        match self {
            PlasmicNode::TagOrComponent(tag) => tag.raw,
            PlasmicNode::JsxFragment { raw, .. }
            | PlasmicNode::Text { raw, .. }
            | PlasmicNode::StringLit { raw, .. }
            | PlasmicNode::ChildStrCall { raw, .. }
            | PlasmicNode::Opaque { raw } => *raw,
        }
    }

    pub(crate) fn set_raw(&mut self, id: SyntaxId) {
        match self {
            PlasmicNode::TagOrComponent(tag) => tag.raw = id,
            PlasmicNode::JsxFragment { raw, .. }
            | PlasmicNode::Text { raw, .. }
            | PlasmicNode::StringLit { raw, .. }
            | PlasmicNode::ChildStrCall { raw, .. }
            | PlasmicNode::Opaque { raw } => *raw = id,
        }
    }

    pub fn as_tag(&self) -> Option<&TagOrComponent> {
        match self {
            PlasmicNode::TagOrComponent(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn name_in_id(&self) -> Option<&str> {
        self.as_tag().map(|t| t.element.name_in_id.as_str())
    }

    /// Text and string literals compare by value with each other.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            PlasmicNode::Text { value, .. } | PlasmicNode::StringLit { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Nodes that carry no identity of their own.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            PlasmicNode::Text { .. } | PlasmicNode::StringLit { .. } | PlasmicNode::Opaque { .. }
        )
    }

    /// Holds managed markup, so it is merged structurally rather than
    /// compared as text.
    pub fn is_managed_markup(&self) -> bool {
        matches!(
            self,
            PlasmicNode::TagOrComponent(_) | PlasmicNode::JsxFragment { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PlasmicNode::TagOrComponent(_) => "tag-or-component",
            PlasmicNode::JsxFragment { .. } => "jsx-fragment",
            PlasmicNode::Text { .. } => "text",
            PlasmicNode::StringLit { .. } => "string-lit",
            PlasmicNode::ChildStrCall { .. } => "child-str-call",
            PlasmicNode::Opaque { .. } => "opaque",
        }
    }
}
