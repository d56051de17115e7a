//! Shared vocabulary of the merge engine.
//!
//! Generated markup refers to its runtime helpers through member
//! expressions on a fixed helper object (`rh.clsRoot()`, `rh.showImg()`),
//! and to slot arguments through `args.<name>`. The suffix after the
//! accessor prefix is the node's *logical id* (its `nameInId`), which the
//! generator maps to a stable uuid per revision.

use std::collections::BTreeMap;
use std::fmt;

/// `nameInId -> uuid` for one version of a component.
pub type IdMap = BTreeMap<String, String>;

/// Object every generated accessor hangs off.
pub const HELPER_OBJECT: &str = "rh";

/// Object slot arguments are read from.
pub const ARGS_OBJECT: &str = "args";

/// Prefix of logical ids that denote slots.
pub const SLOT_PREFIX: &str = "$slot";

/// The three inputs of a merge.
///
/// `base` is what the generator emitted last time, `edited` is the
/// developer's working copy of it and `new` is the freshly generated file.
#[derive(Debug, Clone)]
pub struct MergeScenario<T> {
    pub base: T,
    pub edited: T,
    pub new: T,
}

impl<T> MergeScenario<T> {
    pub fn new(base: T, edited: T, new: T) -> Self {
        Self { base, edited, new }
    }

    pub fn as_ref(&self) -> MergeScenario<&T> {
        MergeScenario {
            base: &self.base,
            edited: &self.edited,
            new: &self.new,
        }
    }
}

/// Event helpers the generator emits, in recognition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventHandler {
    OnMouseUp,
    OnMouseDown,
    OnFocus,
    OnBlur,
    OnMouseEnter,
    OnMouseLeave,
}

impl EventHandler {
    pub const ALL: [EventHandler; 6] = [
        EventHandler::OnMouseUp,
        EventHandler::OnMouseDown,
        EventHandler::OnFocus,
        EventHandler::OnBlur,
        EventHandler::OnMouseEnter,
        EventHandler::OnMouseLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventHandler::OnMouseUp => "onMouseUp",
            EventHandler::OnMouseDown => "onMouseDown",
            EventHandler::OnFocus => "onFocus",
            EventHandler::OnBlur => "onBlur",
            EventHandler::OnMouseEnter => "onMouseEnter",
            EventHandler::OnMouseLeave => "onMouseLeave",
        }
    }
}

/// What a helper accessor produces for its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    /// `rh.cls<Id>()`: the generated class name.
    Cls,
    /// `rh.props<Id>()`: generated props, spread onto the element.
    Props,
    /// `rh.show<Id>()`: visibility guard.
    Show,
    /// `rh.childStr<Id>()`: generated text content.
    ChildStr,
    Event(EventHandler),
}

impl AccessorKind {
    /// Recognition order. `props` is tried before the event handlers so
    /// that prefixes never shadow each other.
    pub const ALL: [AccessorKind; 10] = [
        AccessorKind::Cls,
        AccessorKind::Props,
        AccessorKind::Show,
        AccessorKind::ChildStr,
        AccessorKind::Event(EventHandler::OnMouseUp),
        AccessorKind::Event(EventHandler::OnMouseDown),
        AccessorKind::Event(EventHandler::OnFocus),
        AccessorKind::Event(EventHandler::OnBlur),
        AccessorKind::Event(EventHandler::OnMouseEnter),
        AccessorKind::Event(EventHandler::OnMouseLeave),
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            AccessorKind::Cls => "cls",
            AccessorKind::Props => "props",
            AccessorKind::Show => "show",
            AccessorKind::ChildStr => "childStr",
            AccessorKind::Event(e) => e.as_str(),
        }
    }
}

/// A parsed `rh.<prefix><nameInId>` member name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub name_in_id: String,
}

impl Accessor {
    pub fn new(kind: AccessorKind, name_in_id: impl Into<String>) -> Self {
        Self {
            kind,
            name_in_id: name_in_id.into(),
        }
    }

    /// Split a helper member name into accessor kind and logical id.
    pub fn parse(member: &str) -> Option<Accessor> {
        AccessorKind::ALL.iter().find_map(|kind| {
            member
                .strip_prefix(kind.prefix())
                .filter(|rest| !rest.is_empty())
                .map(|rest| Accessor::new(*kind, rest))
        })
    }

    /// The member name, without the helper object.
    pub fn member(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.name_in_id)
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", HELPER_OBJECT, self.member())
    }
}

/// Slot argument name for a `$slot`-prefixed logical id:
/// `$slotIconSlot` becomes `iconSlot`.
pub fn slot_arg_name(name_in_id: &str) -> Option<String> {
    let rest = name_in_id.strip_prefix(SLOT_PREFIX)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}
