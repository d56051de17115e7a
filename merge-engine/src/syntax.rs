//! Tree-sitter TSX parsing into an index arena.
//!
//! Every node of the concrete syntax tree is copied into a flat `Vec`,
//! keeping kind, byte range, field name and parent/child indices, so the
//! tree can be shared across threads and queried without holding on to
//! tree-sitter's own cursor types. Anonymous tokens and comments are kept:
//! a node's text is always the exact source slice it came from.

use std::ops::Range;

use crate::error::ParseError;
use crate::printer::Syntax;

/// Index of a node within its [`SyntaxTree`].
pub type SyntaxId = usize;

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: &'static str,
    /// Field name under which the parent holds this node.
    pub field: Option<&'static str>,
    pub range: Range<usize>,
    pub named: bool,
    pub parent: Option<SyntaxId>,
    pub children: Vec<SyntaxId>,
}

/// What a [`SyntaxTree::clone_with`] hook decides for a node.
pub enum Visit {
    /// Emit this instead of the node and skip its subtree.
    Replace(Syntax),
    /// Keep the node and visit its children.
    Recurse,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
    root: SyntaxId,
}

fn tsx_language() -> tree_sitter::Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

fn build(
    cursor: &mut tree_sitter::TreeCursor,
    parent: Option<SyntaxId>,
    nodes: &mut Vec<SyntaxNode>,
) -> SyntaxId {
    let node = cursor.node();
    let id = nodes.len();
    nodes.push(SyntaxNode {
        kind: node.kind(),
        field: cursor.field_name(),
        range: node.byte_range(),
        named: node.is_named(),
        parent,
        children: Vec::new(),
    });
    if cursor.goto_first_child() {
        let mut children = Vec::new();
        loop {
            children.push(build(cursor, Some(id), nodes));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
        nodes[id].children = children;
    }
    id
}

impl SyntaxTree {
    /// Parse a whole TSX module. Syntax errors are tolerated; they show up
    /// as `ERROR` nodes.
    pub fn parse(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tsx_language())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        let tree = parser.parse(&source, None).ok_or(ParseError::ParseFailed)?;
        if tree.root_node().has_error() {
            tracing::debug!(len = source.len(), "source parsed with syntax errors");
        }

        let mut nodes = Vec::new();
        let mut cursor = tree.walk();
        let root = build(&mut cursor, None, &mut nodes);
        Ok(Self {
            source,
            nodes,
            root,
        })
    }

    /// Parse a bare expression. It is placed on its own line indented by
    /// `indent` columns, so continuation lines keep their meaning relative
    /// to it. Returns the tree and the expression node.
    pub fn parse_expression(expr: &str, indent: usize) -> Result<(Self, SyntaxId), ParseError> {
        let source = format!("(\n{}{}\n);\n", " ".repeat(indent), expr.trim());
        let tree = Self::parse(source)?;
        let statement = tree
            .named_children(tree.root)
            .next()
            .ok_or(ParseError::NotAnExpression)?;
        let parens = if tree.kind(statement) == "expression_statement" {
            tree.named_children(statement).next()
        } else {
            None
        };
        let expr = parens
            .filter(|&p| tree.kind(p) == "parenthesized_expression")
            .and_then(|p| tree.named_children(p).next())
            .ok_or(ParseError::NotAnExpression)?;
        Ok((tree, expr))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> SyntaxId {
        self.root
    }

    pub fn node(&self, id: SyntaxId) -> &SyntaxNode {
        &self.nodes[id]
    }

    pub fn kind(&self, id: SyntaxId) -> &'static str {
        self.nodes[id].kind
    }

    pub fn range(&self, id: SyntaxId) -> Range<usize> {
        self.nodes[id].range.clone()
    }

    pub fn text(&self, id: SyntaxId) -> &str {
        &self.source[self.nodes[id].range.clone()]
    }

    pub fn parent(&self, id: SyntaxId) -> Option<SyntaxId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: SyntaxId) -> &[SyntaxId] {
        &self.nodes[id].children
    }

    /// Named children, skipping comments.
    pub fn named_children(&self, id: SyntaxId) -> impl Iterator<Item = SyntaxId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|&c| self.nodes[c].named && self.nodes[c].kind != "comment")
    }

    pub fn child_by_field(&self, id: SyntaxId, field: &str) -> Option<SyntaxId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].field == Some(field))
    }

    /// Whether the node has an anonymous child token with exactly this text.
    pub fn has_token(&self, id: SyntaxId, token: &str) -> bool {
        self.nodes[id]
            .children
            .iter()
            .any(|&c| !self.nodes[c].named && self.kind(c) == token)
    }

    /// All nodes of the subtree rooted at `id`, in pre-order.
    pub fn descendants(&self, id: SyntaxId) -> Vec<SyntaxId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev());
        }
        out
    }

    pub fn contains(&self, ancestor: SyntaxId, id: SyntaxId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n].parent;
        }
        false
    }

    /// Indentation of the line the node starts on.
    pub fn line_indent(&self, id: SyntaxId) -> usize {
        let start = self.nodes[id].range.start;
        let line_start = self.source[..start].rfind('\n').map_or(0, |p| p + 1);
        let line = &self.source[line_start..];
        line.len() - line.trim_start_matches([' ', '\t']).len()
    }

    /// Strip expression containers and parentheses.
    pub fn unwrap_expression(&self, mut id: SyntaxId) -> SyntaxId {
        while matches!(self.kind(id), "jsx_expression" | "parenthesized_expression") {
            match self.named_children(id).next() {
                Some(inner) if self.kind(inner) != "spread_element" => id = inner,
                _ => break,
            }
        }
        id
    }

    // ----- JSX -----

    pub fn is_jsx_element(&self, id: SyntaxId) -> bool {
        matches!(self.kind(id), "jsx_element" | "jsx_self_closing_element") && !self.is_fragment(id)
    }

    /// `<>...</>`; older grammars produce `jsx_fragment`, newer ones a
    /// `jsx_element` whose opening tag has no name.
    pub fn is_fragment(&self, id: SyntaxId) -> bool {
        match self.kind(id) {
            "jsx_fragment" => true,
            "jsx_element" => self
                .jsx_opening(id)
                .is_some_and(|open| self.jsx_name_of_tag(open).is_none()),
            _ => false,
        }
    }

    fn jsx_opening(&self, id: SyntaxId) -> Option<SyntaxId> {
        match self.kind(id) {
            "jsx_self_closing_element" => Some(id),
            "jsx_element" => self
                .child_by_field(id, "open_tag")
                .or_else(|| {
                    self.children(id)
                        .iter()
                        .copied()
                        .find(|&c| self.kind(c) == "jsx_opening_element")
                }),
            _ => None,
        }
    }

    fn jsx_name_of_tag(&self, tag: SyntaxId) -> Option<SyntaxId> {
        self.child_by_field(tag, "name").or_else(|| {
            self.named_children(tag).find(|&c| {
                !matches!(
                    self.kind(c),
                    "jsx_attribute" | "jsx_expression" | "type_arguments"
                )
            })
        })
    }

    /// The tag name node of an element.
    pub fn jsx_name(&self, id: SyntaxId) -> Option<SyntaxId> {
        self.jsx_opening(id).and_then(|t| self.jsx_name_of_tag(t))
    }

    /// Attributes (`jsx_attribute`) and spread attributes (`jsx_expression`).
    pub fn jsx_attributes(&self, id: SyntaxId) -> Vec<SyntaxId> {
        match self.jsx_opening(id) {
            Some(tag) => self
                .named_children(tag)
                .filter(|&c| matches!(self.kind(c), "jsx_attribute" | "jsx_expression"))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Children of an element or fragment, between its tags.
    pub fn jsx_children(&self, id: SyntaxId) -> Vec<SyntaxId> {
        if self.kind(id) == "jsx_self_closing_element" {
            return Vec::new();
        }
        self.named_children(id)
            .filter(|&c| {
                !matches!(
                    self.kind(c),
                    "jsx_opening_element" | "jsx_closing_element"
                )
            })
            .collect()
    }

    /// `(name, value)` of a `jsx_attribute`.
    pub fn attribute_parts(&self, attr: SyntaxId) -> Option<(&str, Option<SyntaxId>)> {
        if self.kind(attr) != "jsx_attribute" {
            return None;
        }
        let mut named = self.named_children(attr);
        let name = named.next()?;
        Some((self.text(name), named.next()))
    }

    /// Argument of a spread attribute `{...arg}`.
    pub fn spread_argument(&self, attr: SyntaxId) -> Option<SyntaxId> {
        if self.kind(attr) != "jsx_expression" {
            return None;
        }
        let spread = self
            .named_children(attr)
            .find(|&c| self.kind(c) == "spread_element")?;
        self.named_children(spread).next()
    }

    // ----- expressions -----

    /// `object.property` where the object is a plain identifier.
    pub fn member_parts(&self, id: SyntaxId) -> Option<(&str, &str)> {
        if self.kind(id) != "member_expression" {
            return None;
        }
        let object = self.child_by_field(id, "object")?;
        let property = self.child_by_field(id, "property")?;
        if self.kind(object) != "identifier" {
            return None;
        }
        Some((self.text(object), self.text(property)))
    }

    pub fn call_callee(&self, id: SyntaxId) -> Option<SyntaxId> {
        if self.kind(id) != "call_expression" {
            return None;
        }
        self.child_by_field(id, "function")
    }

    pub fn call_argument_count(&self, id: SyntaxId) -> usize {
        self.child_by_field(id, "arguments")
            .map_or(0, |args| self.named_children(args).count())
    }

    /// The operator of `a && b`, `a || b` or `a ?? b`.
    pub fn logical_operator(&self, id: SyntaxId) -> Option<&'static str> {
        if self.kind(id) != "binary_expression" {
            return None;
        }
        let op = self.child_by_field(id, "operator").or_else(|| {
            self.children(id)
                .iter()
                .copied()
                .find(|&c| !self.nodes[c].named)
        })?;
        match self.kind(op) {
            k @ ("&&" | "||" | "??") => Some(k),
            _ => None,
        }
    }

    /// Value of a string literal, without its quotes.
    pub fn string_value(&self, id: SyntaxId) -> Option<String> {
        if self.kind(id) != "string" {
            return None;
        }
        let text = self.text(id);
        let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
        Some(inner.to_string())
    }

    // ----- comparison -----

    fn has_blank_body(&self, id: SyntaxId) -> bool {
        self.jsx_children(id)
            .iter()
            .all(|&c| self.kind(c) == "jsx_text" && self.text(c).trim().is_empty())
    }

    /// Parentheses that cannot change what the expression means: around a
    /// self-delimiting operand, or in a position that takes a whole
    /// expression anyway.
    fn is_redundant_paren(&self, id: SyntaxId) -> bool {
        let Some(inner) = self.named_children(id).next() else {
            return false;
        };
        let inner_kind = self.kind(inner);
        let Some(parent) = self.parent(id) else {
            return true;
        };
        let parent_kind = self.kind(parent);
        if parent_kind == "new_expression" {
            return false;
        }
        if matches!(
            inner_kind,
            "jsx_element"
                | "jsx_self_closing_element"
                | "identifier"
                | "string"
                | "number"
                | "true"
                | "false"
                | "null"
        ) {
            return true;
        }
        match parent_kind {
            "program" | "jsx_expression" | "parenthesized_expression" | "return_statement" => true,
            "arrow_function" => inner_kind != "object",
            "expression_statement" => !matches!(inner_kind, "object" | "function_expression"),
            "arguments" | "array" | "pair" | "variable_declarator" => {
                inner_kind != "sequence_expression"
            }
            _ => false,
        }
    }

    fn collect_tokens<'a>(&'a self, id: SyntaxId, out: &mut Vec<&'a str>) {
        let node = &self.nodes[id];
        match node.kind {
            "comment" => {}
            "jsx_text" => out.extend(self.text(id).split_whitespace()),
            ";" => {}
            // `<x></x>` reads the same as `<x />`.
            "jsx_element" if !self.is_fragment(id) && self.has_blank_body(id) => {
                if let Some(open) = self.jsx_opening(id) {
                    let start = out.len();
                    self.collect_tokens(open, out);
                    if out.len() > start && out.last() == Some(&">") {
                        out.pop();
                    }
                    out.push("/>");
                }
            }
            _ if node.children.is_empty() => {
                let text = self.text(id);
                if !text.is_empty() {
                    out.push(text);
                }
            }
            "parenthesized_expression" if self.is_redundant_paren(id) => {
                for &c in &node.children {
                    if self.nodes[c].named {
                        self.collect_tokens(c, out);
                    }
                }
            }
            _ => {
                for &c in &node.children {
                    self.collect_tokens(c, out);
                }
            }
        }
    }

    /// Formatting-insensitive identity of a subtree: its tokens with
    /// comments, semicolons and redundant parentheses dropped and JSX text
    /// split into words.
    pub fn fingerprint(&self, id: SyntaxId) -> String {
        let mut tokens = Vec::new();
        self.collect_tokens(id, &mut tokens);
        tokens.join("\u{1f}")
    }

    // ----- cloning -----

    fn piece(&self, range: Range<usize>, indent: usize) -> Syntax {
        Syntax::Source {
            text: self.source[range].to_string(),
            indent,
        }
    }

    /// The node's source, re-indentable from its own line.
    pub fn verbatim(&self, id: SyntaxId) -> Syntax {
        self.piece(self.range(id), self.line_indent(id))
    }

    /// Deep-copy a subtree, letting `hook` substitute any node. Untouched
    /// subtrees come out as verbatim source.
    pub fn clone_with<F>(&self, id: SyntaxId, hook: &mut F) -> Syntax
    where
        F: FnMut(SyntaxId) -> Visit,
    {
        let indent = self.line_indent(id);
        self.clone_node(id, indent, hook).0
    }

    fn clone_node<F>(&self, id: SyntaxId, indent: usize, hook: &mut F) -> (Syntax, bool)
    where
        F: FnMut(SyntaxId) -> Visit,
    {
        if let Visit::Replace(replacement) = hook(id) {
            return (replacement, true);
        }
        let node = &self.nodes[id];
        if node.children.is_empty() {
            return (self.piece(node.range.clone(), indent), false);
        }

        let mut parts = Vec::with_capacity(node.children.len() * 2);
        let mut changed = false;
        let mut cursor = node.range.start;
        for &child in &node.children {
            let range = self.range(child);
            if range.start > cursor {
                parts.push(self.piece(cursor..range.start, indent));
            }
            let (part, child_changed) = self.clone_node(child, indent, hook);
            changed |= child_changed;
            parts.push(part);
            cursor = cursor.max(range.end);
        }
        if node.range.end > cursor {
            parts.push(self.piece(cursor..node.range.end, indent));
        }

        if changed {
            (Syntax::Seq(parts), true)
        } else {
            (self.piece(node.range.clone(), indent), false)
        }
    }
}

/// Whether two pieces of TSX are the same code up to formatting, comments
/// and redundant parentheses.
pub fn same_code(a: &str, b: &str) -> bool {
    match (SyntaxTree::parse(a), SyntaxTree::parse(b)) {
        (Ok(x), Ok(y)) => x.fingerprint(x.root()) == y.fingerprint(y.root()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(src: &str) -> (SyntaxTree, SyntaxId) {
        SyntaxTree::parse_expression(src, 0).unwrap()
    }

    #[test]
    fn test_parse_module() {
        let tree = SyntaxTree::parse("function f() { return 42; }").unwrap();
        assert_eq!(tree.kind(tree.root()), "program");
        assert_eq!(tree.text(tree.root()), "function f() { return 42; }");
    }

    #[test]
    fn test_parse_expression_finds_element() {
        let (tree, id) = expr(r#"<div className={rh.clsRoot()}>Hi</div>"#);
        assert!(tree.is_jsx_element(id));
        let name = tree.jsx_name(id).unwrap();
        assert_eq!(tree.text(name), "div");
        let attrs = tree.jsx_attributes(id);
        assert_eq!(attrs.len(), 1);
        let (attr_name, value) = tree.attribute_parts(attrs[0]).unwrap();
        assert_eq!(attr_name, "className");
        assert_eq!(tree.text(value.unwrap()), "{rh.clsRoot()}");
        let children = tree.jsx_children(id);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.kind(children[0]), "jsx_text");
    }

    #[test]
    fn test_fragment_detection() {
        let (tree, id) = expr("<><a /></>");
        assert!(tree.is_fragment(id));
        assert!(!tree.is_jsx_element(id));
        assert_eq!(tree.jsx_children(id).len(), 1);
    }

    #[test]
    fn test_spread_and_member() {
        let (tree, id) = expr("<a {...rh.propsLink()} />");
        let attrs = tree.jsx_attributes(id);
        let arg = tree.spread_argument(attrs[0]).unwrap();
        let callee = tree.call_callee(arg).unwrap();
        assert_eq!(tree.member_parts(callee), Some(("rh", "propsLink")));
        assert_eq!(tree.call_argument_count(arg), 0);
    }

    #[test]
    fn test_logical_operator() {
        let (tree, id) = expr("rh.showX() && <a />");
        assert_eq!(tree.logical_operator(id), Some("&&"));
        let (tree, id) = expr("a + b");
        assert_eq!(tree.logical_operator(id), None);
    }

    #[test]
    fn test_fingerprint_ignores_formatting() {
        assert!(same_code(
            "<div className={(rh.clsRoot())}>\n  Hello\n   World\n</div>",
            "<div className={rh.clsRoot()}>Hello World</div>;"
        ));
        assert!(!same_code("<div>Hello</div>", "<div>Hallo</div>"));
        assert!(same_code("a(); // trailing\n", "/* lead */ a()"));
        assert!(same_code(
            "<img className={rh.clsImg()}></img>",
            "<img className={rh.clsImg()} />"
        ));
    }

    #[test]
    fn test_fingerprint_keeps_grouping_parens() {
        assert!(!same_code("<div width={(a + b) * c} />", "<div width={a + b * c} />"));
        assert!(!same_code("x = (a, b)", "x = a, b"));
        assert!(same_code("<div width={((a + b)) * c} />", "<div width={(a + b) * c} />"));
        assert!(same_code("f((a), b)", "f(a, b)"));
        assert!(same_code("rh.showA() && (<a />)", "rh.showA() && <a />"));
        assert!(same_code("() => (<div />)", "() => <div />"));
        assert!(!same_code("() => ({})", "() => {}"));
    }

    #[test]
    fn test_clone_with_replacement() {
        let (tree, id) = expr("cond && <a x={1} />");
        let out = tree.clone_with(id, &mut |n| {
            if tree.kind(n) == "identifier" && tree.text(n) == "cond" {
                Visit::Replace(Syntax::code("other"))
            } else {
                Visit::Recurse
            }
        });
        assert_eq!(out.print(0), "other && <a x={1} />");
    }

    #[test]
    fn test_untouched_clone_is_verbatim() {
        let (tree, id) = expr("f(\n  1,\n  2\n)");
        let out = tree.clone_with(id, &mut |_| Visit::Recurse);
        assert!(matches!(out, Syntax::Source { .. }));
        assert_eq!(out.print(0), "f(\n  1,\n  2\n)");
    }
}
