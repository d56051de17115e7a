//! The fixed shape of a generated component file.
//!
//! A component file carries three landmarks the merge relies on:
//!
//! ```text
//! // plasmic-managed-start
//! const rh = new PlasmicFoo__RenderHelper(variants, args, props.className);
//! // plasmic-managed-end
//!
//! // plasmic-managed-jsx/12
//! return <div className={rh.clsRoot()}>...</div>;
//! ```
//!
//! The numbered comment marks the managed markup (the returned or assigned
//! expression after it) and the start/end pair brackets statements the
//! generator owns outright. Everything else belongs to the developer and
//! is merged by union only.

use std::collections::HashSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::imports::{TextEdit, merge_imports};
use crate::printer::Syntax;
use crate::syntax::{SyntaxId, SyntaxTree};

static MANAGED_JSX_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*plasmic-managed-jsx/(\d+)\s*$").expect("Invalid managed-jsx regex")
});

const MANAGED_START: &str = "plasmic-managed-start";
const MANAGED_END: &str = "plasmic-managed-end";
const MANAGED_JSX_PREFIX: &str = "plasmic-managed-jsx/";

/// Leads the block appended when a file could not be merged.
pub const MANUAL_MERGE_NOTICE: &str = "// Please perform merge with the following JSX manually.";

/// Body of a comment without its delimiters.
fn comment_body(text: &str) -> &str {
    if let Some(line) = text.strip_prefix("//") {
        return line;
    }
    text.strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(text)
}

/// The managed markup of a component file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedJsx {
    pub revision: u64,
    /// The `plasmic-managed-jsx/<n>` comment.
    pub marker: SyntaxId,
    /// The `return` or assignment statement following the marker.
    pub statement: SyntaxId,
    /// The returned or assigned expression.
    pub expr: SyntaxId,
}

/// A parsed component file.
#[derive(Debug, Clone)]
pub struct ComponentFile {
    tree: SyntaxTree,
}

impl ComponentFile {
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        Ok(Self {
            tree: SyntaxTree::parse(text)?,
        })
    }

    pub fn text(&self) -> &str {
        self.tree.source()
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Locate the managed markup: the first marker comment directly followed
    /// by a `return` statement or an assignment.
    pub fn managed_jsx(&self) -> Option<ManagedJsx> {
        let tree = &self.tree;
        tree.descendants(tree.root())
            .into_iter()
            .filter(|&n| tree.kind(n) == "comment")
            .find_map(|marker| {
                let caps = MANAGED_JSX_MARKER.captures(comment_body(tree.text(marker)))?;
                let revision = caps[1].parse().ok()?;
                let statement = self.next_statement(marker)?;
                let expr = match tree.kind(statement) {
                    "return_statement" => tree.named_children(statement).next()?,
                    "expression_statement" => {
                        let assignment = tree
                            .named_children(statement)
                            .next()
                            .filter(|&a| tree.kind(a) == "assignment_expression")?;
                        tree.child_by_field(assignment, "right")?
                    }
                    _ => return None,
                };
                Some(ManagedJsx {
                    revision,
                    marker,
                    statement,
                    expr,
                })
            })
    }

    fn next_statement(&self, comment: SyntaxId) -> Option<SyntaxId> {
        let tree = &self.tree;
        let parent = tree.parent(comment)?;
        tree.children(parent)
            .iter()
            .copied()
            .skip_while(|&c| c != comment)
            .skip(1)
            .find(|&c| tree.node(c).named && tree.kind(c) != "comment")
    }

    /// Revision of the managed markup, if the file has any.
    pub fn revision(&self) -> Option<u64> {
        self.managed_jsx().map(|m| m.revision)
    }

    /// Byte range between the managed start and end comments.
    pub fn managed_statements(&self) -> Option<Range<usize>> {
        let tree = &self.tree;
        let comments: Vec<SyntaxId> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&n| tree.kind(n) == "comment")
            .collect();
        let start = comments
            .iter()
            .position(|&c| comment_body(tree.text(c)).trim() == MANAGED_START)?;
        let end = comments[start + 1..]
            .iter()
            .find(|&&c| comment_body(tree.text(c)).trim() == MANAGED_END)?;
        Some(tree.range(comments[start]).end..tree.range(*end).start)
    }

    /// The marker comment through the end of the managed statement, as
    /// handed to a developer for merging by hand.
    pub fn managed_block(&self) -> Option<&str> {
        let managed = self.managed_jsx()?;
        let start = self.tree.range(managed.marker).start;
        let end = self.tree.range(managed.statement).end;
        Some(&self.text()[start..end])
    }

    /// Names declared at the top level, keyed per declaration.
    pub fn top_level_declarations(&self) -> Vec<(Vec<String>, SyntaxId)> {
        let tree = &self.tree;
        tree.named_children(tree.root())
            .filter_map(|statement| {
                let names = declared_names(tree, statement);
                (!names.is_empty()).then_some((names, statement))
            })
            .collect()
    }
}

fn declared_names(tree: &SyntaxTree, statement: SyntaxId) -> Vec<String> {
    match tree.kind(statement) {
        "function_declaration"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "type_alias_declaration"
        | "enum_declaration" => tree
            .child_by_field(statement, "name")
            .map(|n| vec![tree.text(n).to_string()])
            .unwrap_or_default(),
        "lexical_declaration" | "variable_declaration" => tree
            .named_children(statement)
            .filter(|&d| tree.kind(d) == "variable_declarator")
            .filter_map(|d| tree.child_by_field(d, "name"))
            .map(|n| tree.text(n).to_string())
            .collect(),
        "export_statement" => match tree.child_by_field(statement, "declaration") {
            Some(declaration) => declared_names(tree, declaration),
            // `export default X` and `export { a }` are keyed by their code.
            None => vec![format!("export:{}", tree.fingerprint(statement))],
        },
        _ => Vec::new(),
    }
}

/// Inputs for assembling a merged component file.
pub struct FileMerge<'a> {
    pub edited: &'a ComponentFile,
    pub new: &'a ComponentFile,
    pub base: &'a ComponentFile,
    pub merged_markup: &'a Syntax,
}

/// The edited file with its managed regions replaced by the merge result
/// and its imports and declarations brought up to date.
pub fn assemble(merge: FileMerge<'_>) -> Result<String, ParseError> {
    let FileMerge {
        edited,
        new,
        base,
        merged_markup,
    } = merge;
    let tree = edited.tree();
    let (Some(edited_jsx), Some(new_jsx)) = (edited.managed_jsx(), new.managed_jsx()) else {
        return Err(ParseError::NotAnExpression);
    };

    let mut edits = Vec::new();

    let expr = tree.unwrap_expression(edited_jsx.expr);
    edits.push(TextEdit {
        range: tree.range(expr),
        text: merged_markup.print(tree.line_indent(expr)),
    });

    let marker = tree.text(edited_jsx.marker);
    if let Some(pos) = marker.find(MANAGED_JSX_PREFIX) {
        let digits_from = pos + MANAGED_JSX_PREFIX.len();
        let digits = marker[digits_from..]
            .chars()
            .take_while(char::is_ascii_digit)
            .count();
        let rewritten = format!(
            "{}{}{}",
            &marker[..digits_from],
            new_jsx.revision,
            &marker[digits_from + digits..]
        );
        edits.push(TextEdit {
            range: tree.range(edited_jsx.marker),
            text: rewritten,
        });
    }

    if let (Some(ours), Some(theirs)) = (edited.managed_statements(), new.managed_statements()) {
        edits.push(TextEdit {
            range: ours,
            text: new.text()[theirs].to_string(),
        });
    }

    edits.extend(merge_imports(tree, new.tree()));

    let known: HashSet<String> = edited
        .top_level_declarations()
        .into_iter()
        .chain(base.top_level_declarations())
        .flat_map(|(names, _)| names)
        .collect();
    let appended: String = new
        .top_level_declarations()
        .into_iter()
        .filter(|(names, _)| names.iter().all(|n| !known.contains(n)))
        .map(|(names, statement)| {
            tracing::debug!(names = ?names, "appending generated declaration");
            format!("\n\n{}", new.tree().text(statement))
        })
        .collect();
    if !appended.is_empty() {
        let end = edited.text().trim_end().len();
        edits.push(TextEdit {
            range: end..end,
            text: appended,
        });
    }

    Ok(apply_edits(edited.text(), edits))
}

/// Apply non-overlapping edits, last first so earlier offsets stay valid.
pub fn apply_edits(text: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start).then(b.range.end.cmp(&a.range.end)));
    let mut out = text.to_string();
    for edit in edits {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

/// The edited file followed by the new managed markup for a developer to
/// merge by hand.
pub fn manual_merge_fallback(edited_text: &str, new: &ComponentFile) -> String {
    let block = new.managed_block().unwrap_or_else(|| new.text().trim());
    format!("{}\n\n{}\n`{}`\n", edited_text, MANUAL_MERGE_NOTICE, block)
}
