//! The visitor protocol the AST exposes to back-end generators.
//!
//!     Back-ends (HTML, LaTeX, RTF, XML generators) are external collaborators;
//!     all they see of this crate is this trait plus [`Tree::accept`]. The
//!     source uses virtual calls on a `DocNode` base; here dispatch is a
//!     pattern match inside each visitor method against `tree.kind(id)`, but
//!     the pre/post order contract is identical so back-ends written against
//!     the source's traversal order keep working.

use super::{NodeId, Tree};

/// Depth-first pre/post order callbacks, one pair per traversed node.
///
/// Implementors only need the default no-op bodies they intend to override.
/// `wants_caption_first` replaces the source's `visitor->identity() == "HTML"`
/// string compare (flagged as an open question in DESIGN.md) with an explicit
/// capability flag: HTML-like back-ends want the caption before the table's
/// rows, everything else (LaTeX, RTF, DocBook) wants it after.
pub trait Visitor {
    fn visit_pre(&mut self, _tree: &Tree, _id: NodeId) {}
    fn visit_post(&mut self, _tree: &Tree, _id: NodeId) {}

    fn wants_caption_first(&self) -> bool {
        false
    }
}

/// A visitor that reconstructs the visible text of a tree, used to check
/// `parse_text`'s round-trip property (P5): whitespace outside preformatted
/// regions is collapsed to single spaces and entity symbols are substituted.
#[derive(Debug, Default)]
pub struct TextCollector {
    pub text: String,
}

impl Visitor for TextCollector {
    fn visit_pre(&mut self, tree: &Tree, id: NodeId) {
        use super::{Node, SymbolKind};
        match tree.kind(id) {
            Node::Word { text } => self.text.push_str(text),
            Node::WhiteSpace { chars } => {
                if tree.is_preformatted(id) {
                    self.text.push_str(chars);
                } else if !self.text.ends_with(' ') && !self.text.is_empty() {
                    self.text.push(' ');
                }
            }
            Node::Symbol { kind } => self.text.push_str(match kind {
                SymbolKind::Copy => "(C)",
                SymbolKind::Registered => "(R)",
                SymbolKind::Trademark => "(TM)",
                SymbolKind::Less => "<",
                SymbolKind::Greater => ">",
                SymbolKind::Amp => "&",
                SymbolKind::Dollar => "$",
                SymbolKind::Hash => "#",
                SymbolKind::DoubleColon => "::",
                SymbolKind::Percent => "%",
                SymbolKind::Pipe => "|",
                SymbolKind::Quot => "\"",
                SymbolKind::Minus => "-",
                SymbolKind::Ndash => "\u{2013}",
                SymbolKind::Mdash => "\u{2014}",
            }),
            Node::Url { url, .. } => self.text.push_str(url),
            Node::LineBreak => self.text.push('\n'),
            _ => {}
        }
    }
}

/// Counts nodes of each kind name — handy in tests that assert shape without
/// pinning down every field.
#[derive(Debug, Default)]
pub struct KindCounter {
    pub counts: std::collections::HashMap<&'static str, usize>,
}

impl Visitor for KindCounter {
    fn visit_pre(&mut self, tree: &Tree, id: NodeId) {
        *self.counts.entry(tree.kind(id).kind_name()).or_insert(0) += 1;
    }
}
