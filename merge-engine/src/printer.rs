//! Output syntax and its printer.
//!
//! Merge results are assembled as a small owned tree: spans of original
//! source reproduced verbatim, plus the JSX constructs the merger rebuilds
//! (elements, fragments, attributes, containers). Printing lays rebuilt
//! elements out one child per line and re-indents verbatim spans so that
//! their relative indentation survives being moved to a different depth.

/// Column budget before an element's attributes are broken onto their own lines.
const MAX_INLINE_TAG_WIDTH: usize = 80;
const INDENT_STEP: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax {
    /// Original source text. `indent` is the indentation of the line the
    /// clone it belongs to started on; continuation lines are re-based
    /// against it when printed.
    Source { text: String, indent: usize },
    /// Concatenation of pieces, all re-based against the same origin.
    Seq(Vec<Syntax>),
    Element {
        name: String,
        attrs: Vec<Syntax>,
        children: Vec<Syntax>,
    },
    Fragment(Vec<Syntax>),
    /// `{inner}`
    Container(Box<Syntax>),
    /// `name` or `name=value`; `value` is already in attribute-value form.
    Attr {
        name: String,
        value: Option<Box<Syntax>>,
    },
    /// `{...inner}`
    Spread(Box<Syntax>),
    Logical {
        left: Box<Syntax>,
        op: &'static str,
        right: Box<Syntax>,
    },
    /// JSX text child.
    Text(String),
}

impl Syntax {
    /// Single-line generated code.
    pub fn code(text: impl Into<String>) -> Syntax {
        Syntax::Source {
            text: text.into(),
            indent: 0,
        }
    }

    pub fn empty() -> Syntax {
        Syntax::code("")
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Syntax::Source { text, .. } => text.is_empty(),
            Syntax::Seq(parts) => parts.iter().all(Syntax::is_empty),
            _ => false,
        }
    }

    pub fn container(inner: Syntax) -> Syntax {
        Syntax::Container(Box::new(inner))
    }

    pub fn and(left: Syntax, right: Syntax) -> Syntax {
        Syntax::Logical {
            left: Box::new(left),
            op: "&&",
            right: Box::new(right),
        }
    }

    /// Print starting on a line indented by `indent` columns.
    pub fn print(&self, indent: usize) -> String {
        let mut printer = Printer::new(indent);
        printer.emit(self, indent);
        printer.out
    }
}

impl std::fmt::Display for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.print(0))
    }
}

struct Printer {
    out: String,
    /// Indentation of the line printing started on, which `out` does not contain.
    start_indent: usize,
}

impl Printer {
    fn new(start_indent: usize) -> Self {
        Self {
            out: String::new(),
            start_indent,
        }
    }

    fn line_indent(&self) -> usize {
        match self.out.rfind('\n') {
            Some(pos) => {
                let line = &self.out[pos + 1..];
                line.len() - line.trim_start_matches([' ', '\t']).len()
            }
            None => self.start_indent,
        }
    }

    fn newline(&mut self, indent: usize) {
        self.out.push('\n');
        self.out.extend(std::iter::repeat_n(' ', indent));
    }

    fn emit(&mut self, syntax: &Syntax, target: usize) {
        match syntax {
            Syntax::Source { text, indent } => self.emit_source(text, *indent, target),
            Syntax::Seq(parts) => {
                for part in parts {
                    self.emit(part, target);
                }
            }
            Syntax::Text(text) => self.out.push_str(text),
            Syntax::Element {
                name,
                attrs,
                children,
            } => self.emit_element(name, attrs, children),
            Syntax::Fragment(children) => {
                let line = self.line_indent();
                self.out.push_str("<>");
                self.emit_children(children, line);
                self.out.push_str("</>");
            }
            Syntax::Container(inner) => {
                let line = self.line_indent();
                self.out.push('{');
                self.emit(inner, line);
                self.out.push('}');
            }
            Syntax::Attr { name, value } => {
                self.out.push_str(name);
                if let Some(value) = value {
                    let line = self.line_indent();
                    self.out.push('=');
                    self.emit(value, line);
                }
            }
            Syntax::Spread(inner) => {
                let line = self.line_indent();
                self.out.push_str("{...");
                self.emit(inner, line);
                self.out.push('}');
            }
            Syntax::Logical { left, op, right } => {
                let line = self.line_indent();
                self.emit(left, line);
                self.out.push(' ');
                self.out.push_str(op);
                self.out.push(' ');
                self.emit(right, line);
            }
        }
    }

    fn emit_source(&mut self, text: &str, base: usize, target: usize) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.out.push_str(first);
        }
        for line in lines {
            let content = line.trim_start_matches([' ', '\t']);
            if content.is_empty() {
                self.out.push('\n');
                continue;
            }
            let ws = line.len() - content.len();
            let relative = ws.saturating_sub(base);
            self.newline(target + relative);
            self.out.push_str(content);
        }
    }

    fn emit_element(&mut self, name: &str, attrs: &[Syntax], children: &[Syntax]) {
        let line = self.line_indent();
        let inline: Vec<String> = attrs.iter().map(|a| a.print(line)).collect();
        let width = line
            + name.len()
            + 3
            + inline.iter().map(|a| a.len() + 1).sum::<usize>();
        let multiline = attrs.len() > 1
            && (width > MAX_INLINE_TAG_WIDTH || inline.iter().any(|a| a.contains('\n')));

        self.out.push('<');
        self.out.push_str(name);
        if multiline {
            let attr_indent = line + INDENT_STEP;
            for attr in attrs {
                self.newline(attr_indent);
                self.emit(attr, attr_indent);
            }
            self.newline(line);
        } else {
            for attr in &inline {
                self.out.push(' ');
                self.out.push_str(attr);
            }
        }

        if children.is_empty() {
            self.out.push_str(if multiline { "/>" } else { " />" });
            return;
        }
        self.out.push('>');
        self.emit_children(children, line);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn emit_children(&mut self, children: &[Syntax], line: usize) {
        let child_indent = line + INDENT_STEP;
        let mut wrote = false;
        for child in children.iter().filter(|c| !c.is_empty()) {
            self.newline(child_indent);
            self.emit(child, child_indent);
            wrote = true;
        }
        if wrote {
            self.newline(line);
        }
    }
}
