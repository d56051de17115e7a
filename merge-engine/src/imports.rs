//! Union of import declarations.
//!
//! Imports live outside the managed markup, so they are merged textually:
//! the developer's imports stay as written and only gain what the new
//! version needs on top of them.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::syntax::{SyntaxId, SyntaxTree};

/// `// plasmic-import: <id>[/<type>]` trailing a generated import.
static PLASMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"plasmic-import:\s+([\w-]+)(?:/(component|css|render|globalVariant|projectcss|defaultcss|icon))?",
    )
    .expect("Invalid plasmic-import regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSpecifier {
    Default(String),
    Named { imported: String, local: String },
    Namespace(String),
}

impl ImportSpecifier {
    fn render(&self) -> String {
        match self {
            ImportSpecifier::Default(local) => local.clone(),
            ImportSpecifier::Named { imported, local } if imported == local => imported.clone(),
            ImportSpecifier::Named { imported, local } => format!("{} as {}", imported, local),
            ImportSpecifier::Namespace(local) => format!("* as {}", local),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub statement: SyntaxId,
    /// Module source including its quotes.
    pub source: String,
    /// `(id, type)` of the trailing `plasmic-import` comment.
    pub plasmic_id: Option<(String, Option<String>)>,
    pub type_only: bool,
    pub specifiers: Vec<ImportSpecifier>,
    /// Where the declaration ends, including a trailing comment on its line.
    pub end: usize,
}

impl ImportDecl {
    fn matches(&self, other: &ImportDecl) -> bool {
        match (&self.plasmic_id, &other.plasmic_id) {
            (Some(a), Some(b)) => a == b,
            _ => self.source == other.source,
        }
    }
}

/// Top-level imports of a parsed module, in order.
pub fn collect_imports(tree: &SyntaxTree) -> Vec<ImportDecl> {
    let top: Vec<SyntaxId> = tree.children(tree.root()).to_vec();
    let mut out = Vec::new();
    for (i, &statement) in top.iter().enumerate() {
        if tree.kind(statement) != "import_statement" {
            continue;
        }
        let Some(source) = tree.child_by_field(statement, "source") else {
            continue;
        };

        let mut end = tree.range(statement).end;
        let mut plasmic_id = None;
        if let Some(&next) = top.get(i + 1) {
            let between = &tree.source()[end..tree.range(next).start];
            if tree.kind(next) == "comment" && !between.contains('\n') {
                end = tree.range(next).end;
                plasmic_id = PLASMIC_IMPORT.captures(tree.text(next)).map(|caps| {
                    (
                        caps[1].to_string(),
                        caps.get(2).map(|m| m.as_str().to_string()),
                    )
                });
            }
        }

        out.push(ImportDecl {
            statement,
            source: tree.text(source).to_string(),
            plasmic_id,
            type_only: tree.has_token(statement, "type"),
            specifiers: specifiers(tree, statement),
            end,
        });
    }
    out
}

fn specifiers(tree: &SyntaxTree, statement: SyntaxId) -> Vec<ImportSpecifier> {
    let mut out = Vec::new();
    let Some(clause) = tree
        .named_children(statement)
        .find(|&c| tree.kind(c) == "import_clause")
    else {
        return out;
    };
    for part in tree.named_children(clause) {
        match tree.kind(part) {
            "identifier" => out.push(ImportSpecifier::Default(tree.text(part).to_string())),
            "namespace_import" => {
                if let Some(local) = tree.named_children(part).next() {
                    out.push(ImportSpecifier::Namespace(tree.text(local).to_string()));
                }
            }
            "named_imports" => {
                for spec in tree
                    .named_children(part)
                    .filter(|&s| tree.kind(s) == "import_specifier")
                {
                    let Some(name) = tree.child_by_field(spec, "name") else {
                        continue;
                    };
                    let imported = tree.text(name).to_string();
                    let local = tree
                        .child_by_field(spec, "alias")
                        .map_or_else(|| imported.clone(), |a| tree.text(a).to_string());
                    out.push(ImportSpecifier::Named { imported, local });
                }
            }
            _ => {}
        }
    }
    out
}

/// `ours` plus whatever of `theirs` it lacks. Defaults compare by local
/// name, named specifiers by imported and local name.
fn union(ours: &[ImportSpecifier], theirs: &[ImportSpecifier]) -> Vec<ImportSpecifier> {
    let mut out = ours.to_vec();
    let has_default = ours.iter().any(|s| matches!(s, ImportSpecifier::Default(_)));
    let has_named = ours.iter().any(|s| matches!(s, ImportSpecifier::Named { .. }));
    let has_namespace = ours.iter().any(|s| matches!(s, ImportSpecifier::Namespace(_)));
    for spec in theirs {
        let add = match spec {
            ImportSpecifier::Default(_) => !has_default,
            ImportSpecifier::Named { .. } => !has_namespace && !out.contains(spec),
            // `* as x` cannot share a clause with named specifiers.
            ImportSpecifier::Namespace(_) => !has_namespace && !has_named && !has_default,
        };
        if add && !out.contains(spec) {
            out.push(spec.clone());
        }
    }
    out
}

fn render_import(decl: &ImportDecl, specifiers: &[ImportSpecifier]) -> String {
    // A default binding must lead the clause: `import D, * as x from`.
    let mut clause = Vec::new();
    let mut namespace = Vec::new();
    let mut named = Vec::new();
    for spec in specifiers {
        match spec {
            ImportSpecifier::Default(_) => clause.push(spec.render()),
            ImportSpecifier::Namespace(_) => namespace.push(spec.render()),
            ImportSpecifier::Named { .. } => named.push(spec.render()),
        }
    }
    clause.append(&mut namespace);
    if !named.is_empty() {
        if named.len() > 3 {
            clause.push(format!("{{\n  {}\n}}", named.join(",\n  ")));
        } else {
            clause.push(format!("{{ {} }}", named.join(", ")));
        }
    }
    let keyword = if decl.type_only { "import type" } else { "import" };
    format!("{} {} from {};", keyword, clause.join(", "), decl.source)
}

/// A text edit on the edited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

/// Edits that bring `edited`'s imports up to date with `new`'s.
pub fn merge_imports(edited: &SyntaxTree, new: &SyntaxTree) -> Vec<TextEdit> {
    let ours = collect_imports(edited);
    let theirs = collect_imports(new);
    let mut edits = Vec::new();

    for decl in &ours {
        let Some(other) = theirs.iter().find(|t| decl.matches(t)) else {
            continue;
        };
        let merged = union(&decl.specifiers, &other.specifiers);
        if merged.len() != decl.specifiers.len() {
            tracing::debug!(source = %decl.source, added = merged.len() - decl.specifiers.len(), "import specifiers added");
            edits.push(TextEdit {
                range: edited.range(decl.statement),
                text: render_import(decl, &merged),
            });
        }
    }

    let added: Vec<&ImportDecl> = theirs
        .iter()
        .filter(|t| !ours.iter().any(|o| o.matches(t)))
        .collect();
    if added.is_empty() {
        return edits;
    }
    let text: String = added
        .iter()
        .map(|decl| {
            let start = new.range(decl.statement).start;
            format!("\n{}", &new.source()[start..decl.end])
        })
        .collect();
    match ours.last() {
        Some(last) => edits.push(TextEdit {
            range: last.end..last.end,
            text,
        }),
        None => edits.push(TextEdit {
            range: 0..0,
            text: format!("{}\n", text.trim_start()),
        }),
    }
    edits
}
