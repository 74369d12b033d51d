//! Command dispatcher (C6) — the central switch from command id to AST-building routine.
//!
//!     A command id is produced by a fixed string→id table (`COMMAND_TABLE`),
//!     built once via `once_cell`. Simple, self-contained commands (text
//!     substitutions, inline style, anchors/refs, media, misc) are built right
//!     here; commands whose grammar spans multiple tokens and nested structure
//!     (sections, auto-lists, tables, param sections, include operators) are
//!     implemented in [`crate::block`] and only looked up here.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::ast::{Node, NodeId, OutputKind, SymbolKind, Tree};

/// Every command/tag the dispatcher recognizes (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    // Text substitutions
    EscBackslash,
    EscAt,
    EscLt,
    EscGt,
    EscAmp,
    EscDollar,
    EscHash,
    EscPercent,
    EscPipe,
    EscDoubleColon,
    Ndash,
    Mdash,
    EscQuote,

    // Inline style
    Bold,
    Emphasis,
    InlineCode,

    // "Only" blocks
    HtmlOnly,
    ManOnly,
    RtfOnly,
    LatexOnly,
    XmlOnly,
    DocbookOnly,

    // Verbatim-family
    Verbatim,
    Code,
    Dot,
    Msc,
    PlantUml,

    // Anchors / refs
    Anchor,
    Ref,
    Subpage,
    InternalRef,
    Cite,
    Link,
    JavaLink,
    EndLink,

    // Sections
    Section,
    Subsection,
    Subsubsection,
    Paragraph,
    Page,

    // Simple sections
    Sa,
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
    Par,

    // Param sections
    Param,
    TParam,
    RetVal,
    Exception,

    // Cross-ref lists
    XRefItem,
    SecRefList,
    SecRefItem,
    EndSecRefList,

    // Includes
    Include,
    IncludeLineNo,
    DontInclude,
    HtmlInclude,
    LatexInclude,
    VerbInclude,
    Snippet,
    Line,
    Skip,
    SkipLine,
    Until,

    // Media
    Image,
    DotFile,
    MscFile,
    DiaFile,
    Formula,

    // Misc
    Internal,
    EndInternal,
    ParBlock,
    EndParBlock,
    AddIndex,
    Li,
    SetScope,
    InheritDoc,
    CopyDoc,
    CopyBrief,
    CopyDetails,

    Unknown,
}

static COMMAND_TABLE: Lazy<HashMap<&'static str, CommandId>> = Lazy::new(|| {
    use CommandId::*;
    HashMap::from([
        ("\\", EscBackslash),
        ("@", EscAt),
        ("<", EscLt),
        (">", EscGt),
        ("&", EscAmp),
        ("$", EscDollar),
        ("#", EscHash),
        ("%", EscPercent),
        ("|", EscPipe),
        ("::", EscDoubleColon),
        ("--", Ndash),
        ("---", Mdash),
        ("\"", EscQuote),
        ("b", Bold),
        ("e", Emphasis),
        ("em", Emphasis),
        ("c", InlineCode),
        ("htmlonly", HtmlOnly),
        ("manonly", ManOnly),
        ("rtfonly", RtfOnly),
        ("latexonly", LatexOnly),
        ("xmlonly", XmlOnly),
        ("docbookonly", DocbookOnly),
        ("verbatim", Verbatim),
        ("code", Code),
        ("dot", Dot),
        ("msc", Msc),
        ("startuml", PlantUml),
        ("anchor", Anchor),
        ("ref", Ref),
        ("subpage", Subpage),
        ("internalref", InternalRef),
        ("cite", Cite),
        ("link", Link),
        ("javalink", JavaLink),
        ("endlink", EndLink),
        ("section", Section),
        ("subsection", Subsection),
        ("subsubsection", Subsubsection),
        ("paragraph", Paragraph),
        ("page", Page),
        ("sa", Sa),
        ("return", Return),
        ("author", Author),
        ("authors", Authors),
        ("version", Version),
        ("since", Since),
        ("date", Date),
        ("note", Note),
        ("warning", Warning),
        ("pre", Pre),
        ("post", Post),
        ("copyright", Copyright),
        ("invariant", Invariant),
        ("remark", Remark),
        ("attention", Attention),
        ("par", Par),
        ("param", Param),
        ("tparam", TParam),
        ("retval", RetVal),
        ("exception", Exception),
        ("throw", Exception),
        ("xrefitem", XRefItem),
        ("secreflist", SecRefList),
        ("secrefitem", SecRefItem),
        ("endsecreflist", EndSecRefList),
        ("include", Include),
        ("includelineno", IncludeLineNo),
        ("dontinclude", DontInclude),
        ("htmlinclude", HtmlInclude),
        ("latexinclude", LatexInclude),
        ("verbinclude", VerbInclude),
        ("snippet", Snippet),
        ("line", Line),
        ("skip", Skip),
        ("skipline", SkipLine),
        ("until", Until),
        ("image", Image),
        ("dotfile", DotFile),
        ("mscfile", MscFile),
        ("diafile", DiaFile),
        ("formula", Formula),
        ("internal", Internal),
        ("endinternal", EndInternal),
        ("parblock", ParBlock),
        ("endparblock", EndParBlock),
        ("addindex", AddIndex),
        ("li", Li),
        ("setscope", SetScope),
        ("inheritdoc", InheritDoc),
        ("copydoc", CopyDoc),
        ("copybrief", CopyBrief),
        ("copydetails", CopyDetails),
    ])
});

/// Look up the command id for a bare command/tag name (sigil already
/// stripped by the lexer). Unknown commands dispatch to `Unknown`, whose
/// recovery (`UnknownCommand`, §7) is to emit a Word node with the raw text.
pub fn command_id(name: &str) -> CommandId {
    COMMAND_TABLE.get(name).copied().unwrap_or(CommandId::Unknown)
}

/// Build the node for a text-substitution escape command (`\\`, `\@`, ...),
/// appending it under `parent`. Returns `None` for ids that are not plain
/// escapes (the caller routes those elsewhere).
///
/// The `--`/`---` pair is intentionally asymmetric with the lexer's direct
/// `Sym_ndash`/`Sym_mdash` symbols (see DESIGN.md's open question): `\--`
/// appends two `Minus` symbols, `\---` appends three, exactly mirroring
/// `docparser.cpp`'s `CMD_NDASH`/`CMD_MDASH` handling.
pub fn build_escape(tree: &mut Tree, parent: NodeId, id: CommandId) -> Option<NodeId> {
    use CommandId::*;
    let sym = |k: SymbolKind| Node::Symbol { kind: k };
    match id {
        EscBackslash => Some(tree.push_child(parent, Node::Word { text: "\\".to_string() })),
        EscAt => Some(tree.push_child(parent, Node::Word { text: "@".to_string() })),
        EscLt => Some(tree.push_child(parent, sym(SymbolKind::Less))),
        EscGt => Some(tree.push_child(parent, sym(SymbolKind::Greater))),
        EscAmp => Some(tree.push_child(parent, sym(SymbolKind::Amp))),
        EscDollar => Some(tree.push_child(parent, sym(SymbolKind::Dollar))),
        EscHash => Some(tree.push_child(parent, sym(SymbolKind::Hash))),
        EscPercent => Some(tree.push_child(parent, sym(SymbolKind::Percent))),
        EscPipe => Some(tree.push_child(parent, sym(SymbolKind::Pipe))),
        EscDoubleColon => Some(tree.push_child(parent, sym(SymbolKind::DoubleColon))),
        EscQuote => Some(tree.push_child(parent, sym(SymbolKind::Quot))),
        Ndash => {
            tree.push_child(parent, sym(SymbolKind::Minus));
            Some(tree.push_child(parent, sym(SymbolKind::Minus)))
        }
        Mdash => {
            tree.push_child(parent, sym(SymbolKind::Minus));
            tree.push_child(parent, sym(SymbolKind::Minus));
            Some(tree.push_child(parent, sym(SymbolKind::Minus)))
        }
        _ => None,
    }
}

/// Parse `\image`'s leading format selector (`html`, `latex`, `rtf`,
/// `docbook`, `xml`) into an `OutputKind`; unrecognized selectors default to
/// `All` so the image still appears everywhere rather than being dropped.
pub fn parse_output_kind(word: &str) -> OutputKind {
    match word.to_ascii_lowercase().as_str() {
        "html" => OutputKind::Html,
        "latex" => OutputKind::Latex,
        "rtf" => OutputKind::Rtf,
        "docbook" => OutputKind::DocBook,
        "xml" => OutputKind::Xml,
        _ => OutputKind::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_commands_resolve() {
        assert_eq!(command_id("param"), CommandId::Param);
        assert_eq!(command_id("copydoc"), CommandId::CopyDoc);
        assert_eq!(command_id("nonexistent"), CommandId::Unknown);
    }

    #[test]
    fn ndash_and_mdash_have_different_symbol_counts() {
        let mut tree = Tree::new();
        let root = tree.root();
        build_escape(&mut tree, root, CommandId::Ndash);
        assert_eq!(tree.children(root).len(), 2);

        let mut tree2 = Tree::new();
        let root2 = tree2.root();
        build_escape(&mut tree2, root2, CommandId::Mdash);
        assert_eq!(tree2.children(root2).len(), 3);
    }
}
