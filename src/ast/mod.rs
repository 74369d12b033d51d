//! AST node model (C2) — a tagged tree of document nodes plus visitor dispatch.
//!
//!     Following the design notes, the source's pointer-heavy, heterogeneous
//!     node hierarchy is reimplemented as one sum-typed `Node` enum whose
//!     instances live in an arena owned by `Tree`. Parent links and stack
//!     entries are `NodeId`s (arena indices) rather than references, which
//!     gives O(1) parent lookup without introducing reference cycles. A `Tree`
//!     is produced once by a parser, frozen, handed to back-end visitors, and
//!     dropped with its entire arena.

pub mod visitor;

pub use visitor::Visitor;

use serde::Serialize;

use crate::token::{Attrs, ParamDir};

/// Arena index into a [`Tree`]. Stable for the lifetime of the tree that
/// produced it; indices from one tree are meaningless against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

/// Inline style kinds recognized by the style engine (C5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Style {
    Bold,
    Italic,
    Code,
    Center,
    Small,
    Sub,
    Sup,
    Preformatted,
    Div,
    Span,
}

impl Style {
    /// The canonical tag name used in diagnostics (`<b>`, `<i>`, ...).
    pub fn tag_name(self) -> &'static str {
        match self {
            Style::Bold => "b",
            Style::Italic => "em",
            Style::Code => "code",
            Style::Center => "center",
            Style::Small => "small",
            Style::Sub => "sub",
            Style::Sup => "sup",
            Style::Preformatted => "pre",
            Style::Div => "div",
            Style::Span => "span",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HtmlListKind {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Copy,
    Registered,
    Trademark,
    Less,
    Greater,
    Amp,
    Dollar,
    Hash,
    DoubleColon,
    Percent,
    Pipe,
    Quot,
    Minus,
    /// Produced directly by the lexer for a literal `--` in text, distinct
    /// from `\--`'s two synthesized `Minus` symbols (see the open question on
    /// dash canonicalization in DESIGN.md).
    Ndash,
    /// Produced directly by the lexer for a literal `---` in text, distinct
    /// from `\---`'s three synthesized `Minus` symbols.
    Mdash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimpleSectKind {
    See,
    Return,
    Author,
    Authors,
    Version,
    Since,
    Date,
    Note,
    Warning,
    Pre,
    Post,
    Copyright,
    Invariant,
    Remark,
    Attention,
    User,
    Rcs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamSectKind {
    Param,
    RetVal,
    Exception,
    TemplateParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerbatimKind {
    Code,
    HtmlOnly,
    ManOnly,
    RtfOnly,
    LatexOnly,
    XmlOnly,
    DocbookOnly,
    Dot,
    Msc,
    PlantUML,
    Verbatim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncludeKind {
    Include,
    IncludeLineNo,
    DontInclude,
    HtmlInclude,
    LatexInclude,
    VerbInclude,
    Snippet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncOperatorKind {
    Line,
    SkipLine,
    Skip,
    Until,
}

/// Output-format selector carried by `\image`'s first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputKind {
    Html,
    Latex,
    Rtf,
    DocBook,
    Xml,
    All,
}

/// Every recognized document-node variant (spec.md §3.2).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    // Structural
    Root,
    Para,
    Section { level: u8, id: String, title: String },
    Title,
    Internal,
    IndexEntry { text: String },
    AutoList { indent: u16, enumerated: bool, depth: u16 },
    AutoListItem { indent: u16, number: Option<u32> },
    SimpleList,
    SimpleListItem,
    HtmlList { kind: HtmlListKind, attrs: Attrs },
    HtmlListItem { attrs: Attrs, number: Option<u32> },
    HtmlDescList,
    HtmlDescTitle,
    HtmlDescData,
    HtmlTable { attrs: Attrs, num_columns: usize },
    HtmlRow { attrs: Attrs },
    HtmlCell { attrs: Attrs, header: bool },
    HtmlCaption { attrs: Attrs },
    HtmlHeader { level: u8, attrs: Attrs },
    HtmlBlockQuote { attrs: Attrs },
    ParBlock,
    SecRefList,
    SecRefItem { target: String },

    // Inline
    Word { text: String },
    LinkedWord {
        reference: String,
        file: Option<String>,
        anchor: Option<String>,
        tooltip: Option<String>,
    },
    WhiteSpace { chars: String },
    Symbol { kind: SymbolKind },
    Url { url: String, is_email: bool },
    LineBreak,
    HorRuler,
    StyleChange { style: Style, enter: bool, position: usize, attrs: Attrs },
    Anchor { id: String, file: Option<String> },
    Ref {
        target: String,
        text: Option<String>,
        file: Option<String>,
        anchor: Option<String>,
        ref_to_section: bool,
        ref_to_anchor: bool,
        is_subpage: bool,
    },
    InternalRef { target: String },
    Link { target: String, text: String },
    Cite { target: String, text: String, file: Option<String>, anchor: Option<String> },
    Formula { id: String, text: String },
    XRefItem { list_id: String, key: String },
    Image { kind: OutputKind, name: String, attrs: Attrs, title: Option<String>, size: Option<String> },
    DotFile { name: String, title: Option<String>, size: Option<String> },
    MscFile { name: String, title: Option<String>, size: Option<String> },
    DiaFile { name: String, title: Option<String>, size: Option<String> },
    Verbatim { lang: Option<String>, body: String, kind: VerbatimKind },
    Include { kind: IncludeKind, file: String, block_id: Option<String>, text: Option<String> },
    IncOperator {
        kind: IncOperatorKind,
        pattern: Option<String>,
        text: Option<String>,
        first: bool,
        last: bool,
    },
    SimpleSect { kind: SimpleSectKind, title: Option<String> },
    ParamSect { kind: ParamSectKind, has_in_out: bool, has_type_specifier: bool },
    ParamList { kind: ParamSectKind, direction: ParamDir, types: Vec<String>, names: Vec<String> },
}

impl Node {
    /// Stable variant name, used in diagnostics and the treeviz demo format.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Root => "Root",
            Node::Para => "Para",
            Node::Section { .. } => "Section",
            Node::Title => "Title",
            Node::Internal => "Internal",
            Node::IndexEntry { .. } => "IndexEntry",
            Node::AutoList { .. } => "AutoList",
            Node::AutoListItem { .. } => "AutoListItem",
            Node::SimpleList => "SimpleList",
            Node::SimpleListItem => "SimpleListItem",
            Node::HtmlList { .. } => "HtmlList",
            Node::HtmlListItem { .. } => "HtmlListItem",
            Node::HtmlDescList => "HtmlDescList",
            Node::HtmlDescTitle => "HtmlDescTitle",
            Node::HtmlDescData => "HtmlDescData",
            Node::HtmlTable { .. } => "HtmlTable",
            Node::HtmlRow { .. } => "HtmlRow",
            Node::HtmlCell { .. } => "HtmlCell",
            Node::HtmlCaption { .. } => "HtmlCaption",
            Node::HtmlHeader { .. } => "HtmlHeader",
            Node::HtmlBlockQuote { .. } => "HtmlBlockQuote",
            Node::ParBlock => "ParBlock",
            Node::SecRefList => "SecRefList",
            Node::SecRefItem { .. } => "SecRefItem",
            Node::Word { .. } => "Word",
            Node::LinkedWord { .. } => "LinkedWord",
            Node::WhiteSpace { .. } => "WhiteSpace",
            Node::Symbol { .. } => "Symbol",
            Node::Url { .. } => "URL",
            Node::LineBreak => "LineBreak",
            Node::HorRuler => "HorRuler",
            Node::StyleChange { .. } => "StyleChange",
            Node::Anchor { .. } => "Anchor",
            Node::Ref { .. } => "Ref",
            Node::InternalRef { .. } => "InternalRef",
            Node::Link { .. } => "Link",
            Node::Cite { .. } => "Cite",
            Node::Formula { .. } => "Formula",
            Node::XRefItem { .. } => "XRefItem",
            Node::Image { .. } => "Image",
            Node::DotFile { .. } => "DotFile",
            Node::MscFile { .. } => "MscFile",
            Node::DiaFile { .. } => "DiaFile",
            Node::Verbatim { .. } => "Verbatim",
            Node::Include { .. } => "Include",
            Node::IncOperator { .. } => "IncOperator",
            Node::SimpleSect { .. } => "SimpleSect",
            Node::ParamSect { .. } => "ParamSect",
            Node::ParamList { .. } => "ParamList",
        }
    }

    /// Visible text this node directly contributes, ignoring children —
    /// used by `parse_text`'s text-reproduction property (P5).
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            Node::Word { text } => Some(text),
            Node::WhiteSpace { chars } => Some(chars),
            _ => None,
        }
    }
}

struct NodeData {
    kind: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    preformatted: bool,
}

/// Owning arena for one parse's worth of AST nodes.
///
/// Node 0 is always `Root`. A `Tree` is mutated only by its owning parser,
/// frozen once the entry point returns, and then consumed by back-end
/// visitors (invariant I1/§3.5).
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: vec![NodeData {
                kind: Node::Root,
                parent: None,
                children: Vec::new(),
                preformatted: false,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Allocate a new node as a detached node (not yet a child of anyone).
    /// `preformatted` is almost always `self.is_preformatted(parent) || force`;
    /// callers pass the resolved value explicitly per invariant I4.
    pub fn alloc(&mut self, kind: Node, preformatted: bool) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            preformatted,
        });
        id
    }

    /// Attach `child` to `parent`'s child list and set its parent link.
    /// A node must be appended exactly once; appending twice would violate I1.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0 as usize].parent = Some(parent);
        self.nodes[parent.0 as usize].children.push(child);
    }

    /// Convenience: allocate and immediately append under `parent`.
    pub fn push_child(&mut self, parent: NodeId, kind: Node) -> NodeId {
        let preformatted = self.is_preformatted(parent)
            || matches!(kind, Node::StyleChange { style: Style::Preformatted, enter: true, .. })
            || matches!(kind, Node::Verbatim { .. });
        let id = self.alloc(kind, preformatted);
        self.append_child(parent, id);
        id
    }

    pub fn kind(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0 as usize].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0 as usize].children
    }

    pub fn children_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        &mut self.nodes[id.0 as usize].children
    }

    pub fn is_preformatted(&self, id: NodeId) -> bool {
        self.nodes[id.0 as usize].preformatted
    }

    /// Depth of `id`, counting Root as depth 0. Used by the style engine's
    /// "position" bookkeeping (node-stack depth at StyleChange(enter)).
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            depth += 1;
            cur = p;
        }
        depth
    }

    /// Depth-first pre/post traversal, invoking `visitor` on `id` and its
    /// subtree. Children are visited in insertion order (ordering guarantee,
    /// §4.2), except `HtmlTable`'s caption: visited before rows when the
    /// visitor identifies as wanting "caption first", after rows otherwise.
    pub fn accept(&self, id: NodeId, visitor: &mut dyn Visitor) {
        visitor.visit_pre(self, id);
        let children = self.children(id);
        if let Node::HtmlTable { .. } = self.kind(id) {
            let (captions, rest): (Vec<NodeId>, Vec<NodeId>) =
                children.iter().partition(|c| matches!(self.kind(**c), Node::HtmlCaption { .. }));
            let order: Vec<NodeId> = if visitor.wants_caption_first() {
                captions.iter().chain(rest.iter()).copied().collect()
            } else {
                rest.iter().chain(captions.iter()).copied().collect()
            };
            for child in order {
                self.accept(child, visitor);
            }
        } else {
            for &child in children {
                self.accept(child, visitor);
            }
        }
        visitor.visit_post(self, id);
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_node_zero() {
        let tree = Tree::new();
        assert_eq!(tree.root(), NodeId(0));
        assert!(matches!(tree.kind(tree.root()), Node::Root));
    }

    #[test]
    fn append_sets_parent_and_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.push_child(root, Node::Para);
        let b = tree.push_child(root, Node::Para);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.depth(a), 1);
    }
}
