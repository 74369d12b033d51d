//! Block grammar (C7) — paragraphs, sections, lists, tables, verbatim blocks,
//! param sections, and the include-operator cursor commands.
//!
//!     The source drives all of this from one giant `handleCommand`/
//!     `handleHtmlTag` switch returning a `RetVal_*` sentinel the enclosing
//!     `while` loop tests. Here each grammar rule is its own function and the
//!     sentinel set is a real sum type (`BlockEnd`) a caller matches
//!     exhaustively on. `parse_inline_run` additionally hands back the token
//!     that triggered the stop — the lexer has no "unread" operation, so
//!     whatever token ended a run (a `ListItem`'s indent, a section command's
//!     name) has to travel with the sentinel instead of being re-fetched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{
    HtmlListKind, IncOperatorKind, IncludeKind, Node, NodeId, ParamSectKind, SimpleSectKind, Style,
    Tree, VerbatimKind,
};
use crate::context::{IncludeCursor, ParserContext};
use crate::diagnostics::DiagnosticSink;
use crate::dispatch::{self, CommandId};
use crate::token::{ParamDir, Token, TokenKind, TokenSource};
use crate::xref::{RawSymbolGraph, Resolver};

/// Trailing punctuation that ends a sentence or clause but isn't part of the
/// identifier a `LinkableWord` names (`Foo::bar.` should link `Foo::bar` and
/// leave the period as its own word).
static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,|()\[\]:;?]+$").unwrap());

/// Scope-widening name resolution (C4) for a plain reference, shared by
/// `LinkedWord` and `\ref`/`\subpage`. Returns `None` fields whenever there is
/// no symbol graph attached to this parse (the common case in this crate's
/// own tests) or autolinking is configured off — unresolved is never fatal,
/// the caller falls back to plain text either way.
fn resolve_member_or_compound(ctx: &ParserContext, name: &str) -> (Option<String>, Option<String>, Option<String>) {
    if !ctx.autolink_support {
        return (None, None, None);
    }
    let Some(graph) = ctx.graph.as_deref() else { return (None, None, None) };
    let resolver = Resolver::new(graph);
    let resolved = resolver.resolve_ref(&ctx.scope, name, ctx.in_see_block);
    if let Some(member) = &resolved.member {
        if let Some(info) = graph.lookup_member(member) {
            return (Some(info.file), Some(info.anchor), Some(member.clone()));
        }
    }
    if let Some(compound) = &resolved.compound {
        if let Some(info) = graph.lookup_compound(compound) {
            return (Some(info.file), None, Some(compound.clone()));
        }
    }
    (None, None, None)
}

fn push_linkable_word(tree: &mut Tree, parent: NodeId, ctx: &ParserContext, name: &str) {
    let (file, anchor, resolved_name) = resolve_member_or_compound(ctx, name);
    let tooltip = resolved_name.as_deref().and_then(|qualified| {
        ctx.graph
            .as_deref()
            .and_then(|g| g.lookup_docs(qualified))
            .map(|d| d.brief)
            .filter(|b| !b.is_empty())
    });
    if let Some(m) = TRAILING_PUNCT.find(name) {
        let (head, tail) = name.split_at(m.start());
        tree.push_child(
            parent,
            Node::LinkedWord { reference: head.to_string(), file, anchor, tooltip },
        );
        tree.push_child(parent, Node::Word { text: tail.to_string() });
    } else {
        tree.push_child(
            parent,
            Node::LinkedWord { reference: name.to_string(), file, anchor, tooltip },
        );
    }
}

/// `\ref`/`\subpage` target resolution: a named section is tried first (a
/// `\ref` most commonly targets a `\section`/`\anchor` id), falling back to
/// the same member/compound scope-widening `LinkedWord` uses.
fn resolve_ref_target(ctx: &ParserContext, target: &str) -> (Option<String>, Option<String>, bool, bool) {
    if !ctx.autolink_support {
        return (None, None, false, false);
    }
    let Some(graph) = ctx.graph.as_deref() else { return (None, None, false, false) };
    let resolver = Resolver::new(graph);
    if let Some(section) = resolver.find_section(target) {
        return (Some(section.file), Some(section.id), true, false);
    }
    let (file, anchor, _) = resolve_member_or_compound(ctx, target);
    let ref_to_anchor = anchor.is_some();
    (file, anchor, false, ref_to_anchor)
}

/// `\inheritdoc`: unlike the `\copydoc` family, which splices raw comment
/// text in before tokenization even starts (crate::copy), this one is
/// resolved here, at the point the dispatcher actually sees it, because its
/// target isn't named in the command itself — it's whatever member the
/// current one reimplements, which only the symbol graph knows.
fn inherit_doc(ctx: &mut ParserContext, tree: &mut Tree, diagnostics: &mut DiagnosticSink, parent: NodeId, tok: &Token) {
    let Some(owner) = ctx.owning_member.clone() else {
        diagnostics.warn_doc_error(&ctx.file_name, tok.line, "\\inheritdoc used outside a documented member".to_string());
        return;
    };
    let Some(graph) = ctx.graph.clone() else {
        diagnostics.warn_doc_error(&ctx.file_name, tok.line, "unresolved `\\inheritdoc`".to_string());
        return;
    };
    let Some(base) = graph.reimplemented_member(&owner) else {
        diagnostics.warn_doc_error(&ctx.file_name, tok.line, "unresolved `\\inheritdoc`".to_string());
        return;
    };
    if ctx.copy_stack.iter().any(|k| k == &base) {
        diagnostics.error_doc(&ctx.file_name, tok.line, format!("cyclic \\inheritdoc: `{base}` is already being expanded"));
        return;
    }
    let Some(doc) = graph.lookup_docs(&base) else {
        diagnostics.warn_doc_error(&ctx.file_name, tok.line, format!("\\inheritdoc target `{base}` has no docs"));
        return;
    };
    let text = if doc.brief.is_empty() {
        doc.detailed
    } else if doc.detailed.is_empty() {
        doc.brief
    } else {
        format!("{} {}", doc.brief, doc.detailed)
    };
    if text.trim().is_empty() {
        return;
    }

    // No lexer ships in this crate (every other entry point takes a
    // pre-tokenized stream); a plain word/whitespace split is enough to
    // splice inherited prose into the current paragraph, same as any other
    // inline run.
    let tokens = crate::testing::words(&text.split_whitespace().collect::<Vec<_>>());
    let mut sub_src = crate::testing::StaticTokenSource::from_tokens(tokens);
    ctx.copy_stack.push(base);
    parse_inline_run(&mut sub_src, ctx, tree, diagnostics, parent);
    ctx.copy_stack.pop();
}

/// Why a paragraph-level consumer stopped. Mirrors the source's `RetVal_*`
/// constants one-for-one; see DESIGN.md for the name mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEnd {
    Eof,
    NewParagraph,
    Section(u8),
    SimpleSection,
    ParamSection,
    ListItem,
    EndList,
    Internal,
    EndInternal,
    ParBlock,
    EndParBlock,
    CloseXml,
    TableRow,
    TableCell,
    EndSecRefList,
    StructuralTag,
    EndLink,
}

/// A `BlockEnd` paired with the token that triggered it.
pub type RunEnd = (BlockEnd, Token);

fn symbol_kind_from_text(text: &str) -> Option<crate::ast::SymbolKind> {
    use crate::ast::SymbolKind::*;
    match text {
        "<" => Some(Less),
        ">" => Some(Greater),
        "&" => Some(Amp),
        "$" => Some(Dollar),
        "#" => Some(Hash),
        "::" => Some(DoubleColon),
        "%" => Some(Percent),
        "|" => Some(Pipe),
        "\"" => Some(Quot),
        "-" => Some(Minus),
        "--" => Some(Ndash),
        "---" => Some(Mdash),
        "(C)" | "(c)" => Some(Copy),
        "(R)" | "(r)" => Some(Registered),
        "(TM)" | "(tm)" => Some(Trademark),
        _ => None,
    }
}

/// Consume one inline run (a paragraph's contents, or the text portion of a
/// simple/param section/title) until a block-ending token or command is seen.
///
/// `parent` is the node new inline children are appended to (normally a
/// freshly-pushed `Node::Para`, but callers building a section title or a
/// list-item's text also point it at their own node).
pub fn parse_inline_run(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
) -> RunEnd {
    loop {
        let tok = src.next();
        let Some(kind) = tok.kind else { continue };
        match kind {
            TokenKind::End => return (BlockEnd::Eof, tok),
            TokenKind::NewPara => return (BlockEnd::NewParagraph, tok),
            TokenKind::Word => {
                tree.push_child(parent, Node::Word { text: tok.name.clone() });
            }
            TokenKind::LinkableWord => {
                push_linkable_word(tree, parent, ctx, &tok.name);
            }
            TokenKind::WhiteSpace => {
                // Leading whitespace is suppressed (§4.7, invariant I3): a
                // paragraph whose first real content is whitespace, or one
                // that has only just reopened styles carried over a
                // paragraph break, gets no `WhiteSpace` child for it. Inside
                // a preformatted/verbatim ancestor every character is
                // significant, so the suppression doesn't apply there.
                let at_leading_position = tree
                    .children(parent)
                    .iter()
                    .all(|&c| matches!(tree.kind(c), Node::StyleChange { enter: true, .. }));
                if tree.is_preformatted(parent) || !at_leading_position {
                    tree.push_child(parent, Node::WhiteSpace { chars: tok.chars.clone() });
                }
            }
            TokenKind::Symbol => {
                if let Some(k) = symbol_kind_from_text(&tok.chars) {
                    tree.push_child(parent, Node::Symbol { kind: k });
                } else {
                    diagnostics.warn_doc_error(&ctx.file_name, tok.line, format!("unrecognized symbol `{}`", tok.chars));
                }
            }
            TokenKind::Url => {
                tree.push_child(parent, Node::Url { url: tok.name.clone(), is_email: tok.is_email });
            }
            TokenKind::ListItem => return (BlockEnd::ListItem, tok),
            TokenKind::EndList => return (BlockEnd::EndList, tok),
            TokenKind::RcsTag => {
                tree.push_child(parent, Node::Word { text: tok.chars.clone() });
            }
            TokenKind::VerbatimBody => {
                tree.push_child(parent, Node::Word { text: tok.verb.clone() });
            }
            TokenKind::HtmlTag => {
                if let Some(end) = handle_html_tag(src, ctx, tree, diagnostics, parent, &tok) {
                    return end;
                }
            }
            TokenKind::Command => {
                if let Some(end) = handle_command(src, ctx, tree, diagnostics, parent, &tok) {
                    return end;
                }
            }
        }
    }
}

/// HTML tags that open/close a structural container rather than inline
/// style; seeing one while inside a paragraph ends that paragraph so the
/// caller's block loop can start the matching container grammar.
fn is_structural_tag(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "ul" | "ol" | "li" | "dl" | "dt" | "dd" | "table" | "tr" | "td" | "th" | "caption"
            | "blockquote" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "p"
    )
}

fn handle_html_tag(
    _src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    tok: &Token,
) -> Option<RunEnd> {
    if tok.name.eq_ignore_ascii_case("br") {
        tree.push_child(parent, Node::LineBreak);
        return None;
    }
    if tok.name.eq_ignore_ascii_case("hr") {
        tree.push_child(parent, Node::HorRuler);
        return None;
    }
    if is_structural_tag(&tok.name) {
        return Some((BlockEnd::StructuralTag, tok.clone()));
    }
    if tok.empty_tag {
        crate::style::check_empty_element(&tok.name, diagnostics, &ctx.file_name, tok.line);
        return None;
    }
    if let Some(style) = crate::style::style_for_tag(&tok.name) {
        if tok.end_tag {
            let file = ctx.file_name.clone();
            crate::style::leave_style(ctx, tree, parent, style, diagnostics, &file, tok.line);
        } else {
            crate::style::enter_style(ctx, tree, parent, style, tok.attribs.clone());
        }
        return None;
    }
    diagnostics.warn_doc_error(&ctx.file_name, tok.line, format!("unsupported HTML tag `<{}>`", tok.name));
    None
}

fn handle_command(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    tok: &Token,
) -> Option<RunEnd> {
    let id = dispatch::command_id(&tok.name);
    use CommandId::*;
    match id {
        EscBackslash | EscAt | EscLt | EscGt | EscAmp | EscDollar | EscHash | EscPercent
        | EscPipe | EscDoubleColon | EscQuote | Ndash | Mdash => {
            dispatch::build_escape(tree, parent, id);
            None
        }
        Bold | Emphasis | InlineCode => {
            let style = match id {
                Bold => Style::Bold,
                InlineCode => Style::Code,
                _ => Style::Italic,
            };
            apply_single_word_style(src, tree, parent, style);
            None
        }
        HtmlOnly | ManOnly | RtfOnly | LatexOnly | XmlOnly | DocbookOnly | Verbatim | Code
        | Dot | Msc | PlantUml => {
            let kind = match id {
                HtmlOnly => VerbatimKind::HtmlOnly,
                ManOnly => VerbatimKind::ManOnly,
                RtfOnly => VerbatimKind::RtfOnly,
                LatexOnly => VerbatimKind::LatexOnly,
                XmlOnly => VerbatimKind::XmlOnly,
                DocbookOnly => VerbatimKind::DocbookOnly,
                Verbatim => VerbatimKind::Verbatim,
                Dot => VerbatimKind::Dot,
                Msc => VerbatimKind::Msc,
                _ => VerbatimKind::PlantUML,
            };
            parse_verbatim(src, ctx, diagnostics, tree, parent, kind);
            None
        }
        Anchor => {
            let body = src.next();
            tree.push_child(parent, Node::Anchor { id: body.name, file: Some(ctx.file_name.clone()) });
            None
        }
        Ref | Subpage | InternalRef => {
            let body = src.next();
            if matches!(id, InternalRef) {
                tree.push_child(parent, Node::InternalRef { target: body.name });
            } else {
                let (file, anchor, ref_to_section, ref_to_anchor) = resolve_ref_target(ctx, &body.name);
                tree.push_child(
                    parent,
                    Node::Ref {
                        target: body.name,
                        text: None,
                        file,
                        anchor,
                        ref_to_section,
                        ref_to_anchor,
                        is_subpage: matches!(id, Subpage),
                    },
                );
            }
            None
        }
        Cite => {
            let body = src.next();
            let mut text = String::new();
            let mut file = None;
            let mut anchor = None;
            if ctx.autolink_support {
                if let Some(graph) = ctx.graph.as_deref() {
                    if let Some(info) = Resolver::new(graph).find_cite(&body.name) {
                        text = info.text;
                        // Every citation lands on the one generated
                        // bibliography page, addressed by its key.
                        file = Some("citelist".to_string());
                        anchor = Some(body.name.clone());
                    }
                }
            }
            tree.push_child(parent, Node::Cite { target: body.name, text, file, anchor });
            None
        }
        Link | JavaLink => {
            let target = src.next();
            if ctx.autolink_support {
                if let Some(graph) = ctx.graph.as_deref() {
                    let resolved = Resolver::new(graph).resolve_ref(&ctx.scope, &target.name, ctx.in_see_block);
                    if resolved.member.is_none() && resolved.compound.is_none() {
                        diagnostics.warn_doc_error(&ctx.file_name, tok.line, format!("\\link target `{}` not found", target.name));
                    }
                }
            }
            let node = tree.push_child(parent, Node::Link { target: target.name, text: String::new() });
            ctx.push_node(node);
            let (end, end_tok) = parse_inline_run(src, ctx, tree, diagnostics, node);
            ctx.pop_node();
            match end {
                BlockEnd::EndLink => None,
                _ => Some((end, end_tok)),
            }
        }
        EndLink => Some((BlockEnd::EndLink, tok.clone())),
        Section | Subsection | Subsubsection | Paragraph | Page => {
            let level = match id {
                Section => 1,
                Subsection => 2,
                Subsubsection => 3,
                Paragraph => 4,
                _ => 0,
            };
            Some((BlockEnd::Section(level), tok.clone()))
        }
        Sa | Return | Author | Authors | Version | Since | Date | Note | Warning | Pre | Post
        | Copyright | Invariant | Remark | Attention | Par => Some((BlockEnd::SimpleSection, tok.clone())),
        Param | TParam | RetVal | Exception => Some((BlockEnd::ParamSection, tok.clone())),
        XRefItem => {
            let list_id = src.next();
            let key = src.next();
            tree.push_child(parent, Node::XRefItem { list_id: list_id.name, key: key.name });
            None
        }
        SecRefList => {
            let node = tree.push_child(parent, Node::SecRefList);
            ctx.push_node(node);
            let result = loop {
                let item = src.next();
                match item.kind {
                    Some(TokenKind::End) => break Some((BlockEnd::Eof, item)),
                    Some(TokenKind::Command) if dispatch::command_id(&item.name) == SecRefItem => {
                        tree.push_child(node, Node::SecRefItem { target: item.id.clone() });
                    }
                    Some(TokenKind::Command) if dispatch::command_id(&item.name) == EndSecRefList => {
                        break None;
                    }
                    _ => {}
                }
            };
            ctx.pop_node();
            result
        }
        SecRefItem | EndSecRefList => None,
        Include | IncludeLineNo | DontInclude | HtmlInclude | LatexInclude | VerbInclude | Snippet => {
            let file_tok = src.next();
            let kind = match id {
                Include => IncludeKind::Include,
                IncludeLineNo => IncludeKind::IncludeLineNo,
                DontInclude => IncludeKind::DontInclude,
                HtmlInclude => IncludeKind::HtmlInclude,
                LatexInclude => IncludeKind::LatexInclude,
                VerbInclude => IncludeKind::VerbInclude,
                _ => IncludeKind::Snippet,
            };
            if matches!(kind, IncludeKind::DontInclude) {
                ctx.include_buffer = Some(IncludeCursor::new(""));
            }
            tree.push_child(
                parent,
                Node::Include { kind, file: file_tok.name, block_id: None, text: None },
            );
            None
        }
        Line | Skip | SkipLine | Until => {
            parse_include_operator(ctx, tree, diagnostics, parent, id, &tok.chars, tok.line);
            None
        }
        Image => {
            let fmt_tok = src.next();
            let name_tok = src.next();
            tree.push_child(
                parent,
                Node::Image {
                    kind: dispatch::parse_output_kind(&fmt_tok.name),
                    name: name_tok.name,
                    attrs: tok.attribs.clone(),
                    title: None,
                    size: None,
                },
            );
            None
        }
        DotFile | MscFile | DiaFile => {
            let name_tok = src.next();
            let node = match id {
                DotFile => Node::DotFile { name: name_tok.name, title: None, size: None },
                MscFile => Node::MscFile { name: name_tok.name, title: None, size: None },
                _ => Node::DiaFile { name: name_tok.name, title: None, size: None },
            };
            tree.push_child(parent, node);
            None
        }
        Formula => {
            let body = src.next();
            tree.push_child(parent, Node::Formula { id: body.id.clone(), text: body.chars });
            None
        }
        Internal => Some((BlockEnd::Internal, tok.clone())),
        EndInternal => Some((BlockEnd::EndInternal, tok.clone())),
        ParBlock => Some((BlockEnd::ParBlock, tok.clone())),
        EndParBlock => Some((BlockEnd::EndParBlock, tok.clone())),
        AddIndex => {
            let body = src.next();
            tree.push_child(parent, Node::IndexEntry { text: body.name });
            None
        }
        Li => Some((BlockEnd::ListItem, tok.clone())),
        SetScope => {
            let body = src.next();
            ctx.scope = body.name;
            None
        }
        InheritDoc => {
            inherit_doc(ctx, tree, diagnostics, parent, tok);
            None
        }
        CopyDoc | CopyBrief | CopyDetails => {
            // The textual splice runs as a preprocessing pass (crate::copy)
            // before tokens reach the block grammar; seeing one of these here
            // means the splice target could not be resolved.
            diagnostics.warn_doc_error(&ctx.file_name, tok.line, format!("unresolved `\\{}`", tok.name));
            None
        }
        Unknown => {
            diagnostics.warn_doc_error(&ctx.file_name, tok.line, format!("unknown command `\\{}`", tok.name));
            tree.push_child(parent, Node::Word { text: format!("\\{}", tok.name) });
            None
        }
    }
}

fn apply_single_word_style(src: &mut dyn TokenSource, tree: &mut Tree, parent: NodeId, style: Style) {
    tree.push_child(parent, Node::StyleChange { style, enter: true, position: 0, attrs: Vec::new() });
    let word = src.next();
    if word.kind == Some(TokenKind::Word) {
        tree.push_child(parent, Node::Word { text: word.name });
    } else {
        tree.push_child(parent, Node::Word { text: word.chars });
    }
    tree.push_child(parent, Node::StyleChange { style, enter: false, position: 0, attrs: Vec::new() });
}

/// Consume a verbatim-family body: the token source is expected to return a
/// single `VerbatimBody` token carrying the whole block in `verb` once placed
/// in the matching lexer state (spec.md's verbatim grammar collapses this to
/// one token rather than a char-by-char loop).
/// The `"<kind> section ended without end marker"` label used when a
/// verbatim-family block runs off the end of input before its closing tag.
fn verbatim_section_label(kind: VerbatimKind) -> &'static str {
    match kind {
        VerbatimKind::Code => "code",
        VerbatimKind::HtmlOnly => "htmlonly",
        VerbatimKind::ManOnly => "manonly",
        VerbatimKind::RtfOnly => "rtfonly",
        VerbatimKind::LatexOnly => "latexonly",
        VerbatimKind::XmlOnly => "xmlonly",
        VerbatimKind::DocbookOnly => "docbookonly",
        VerbatimKind::Verbatim => "verbatim",
        VerbatimKind::Dot => "dot",
        VerbatimKind::Msc => "msc",
        VerbatimKind::PlantUML => "startuml",
    }
}

fn parse_verbatim(
    src: &mut dyn TokenSource,
    ctx: &ParserContext,
    diagnostics: &mut DiagnosticSink,
    tree: &mut Tree,
    parent: NodeId,
    kind: VerbatimKind,
) {
    let body = src.next();
    if body.unterminated {
        diagnostics.warn_doc_error(
            &ctx.file_name,
            body.line,
            format!("{} section ended without end marker", verbatim_section_label(kind)),
        );
    }
    tree.push_child(parent, Node::Verbatim { lang: None, body: body.verb, kind });
}

/// `\line`/`\skip`/`\skipline`/`\until`, driven off `ctx.include_buffer`
/// (populated by a prior `\dontinclude`). A missing buffer (no preceding
/// `\dontinclude`) is a no-op with a diagnostic, matching the source's
/// defensive check.
fn parse_include_operator(
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    id: CommandId,
    pattern: &str,
    line: u32,
) {
    let Some(cursor) = ctx.include_buffer.as_mut() else {
        diagnostics.warn_doc_error(&ctx.file_name, line, "include-operator command without a preceding \\dontinclude");
        return;
    };
    let kind = match id {
        CommandId::Line => IncOperatorKind::Line,
        CommandId::Skip => IncOperatorKind::Skip,
        CommandId::SkipLine => IncOperatorKind::SkipLine,
        _ => IncOperatorKind::Until,
    };
    let first = cursor.pos == 0;
    let text = match kind {
        IncOperatorKind::Line => {
            let line_text = cursor.current_line().map(str::to_string);
            cursor.advance();
            line_text
        }
        IncOperatorKind::Skip => {
            if let Some(at) = cursor.find_from_cursor(pattern) {
                cursor.seek_past(at);
            }
            None
        }
        IncOperatorKind::SkipLine | IncOperatorKind::Until => {
            cursor.find_from_cursor(pattern).map(|at| cursor.collect_through(at))
        }
    };
    let last = cursor.at_end();
    tree.push_child(
        parent,
        Node::IncOperator { kind, pattern: Some(pattern.to_string()), text, first, last },
    );
}

/// `\section`/`\subsection`/`\subsubsection`/`\paragraph` (invariant I8:
/// levels only ever increase by exactly one as the document nests; a level
/// that skips ahead is accepted but flagged).
pub fn parse_section(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    level: u8,
    prev_level: Option<u8>,
) -> (NodeId, RunEnd) {
    let id_tok = src.next();
    let section = tree.push_child(parent, Node::Section { level, id: id_tok.name.clone(), title: String::new() });
    if let Some(prev) = prev_level {
        if level > prev + 1 {
            diagnostics.warn_doc_error(
                &ctx.file_name,
                id_tok.line,
                format!("section level jumps from {prev} to {level}, skipping intermediate levels"),
            );
        }
    }
    ctx.sections.insert(
        id_tok.name.clone(),
        crate::xref::SectionInfo { id: id_tok.name, title: String::new(), level, file: ctx.file_name.clone() },
    );
    let title_holder = tree.push_child(section, Node::Title);
    ctx.push_node(title_holder);
    let end = parse_inline_run(src, ctx, tree, diagnostics, title_holder);
    ctx.pop_node();
    (section, end)
}

/// `\sa`/`\return`/`\author`/... simple sections: a fixed kind plus a free
/// text run, `\par` additionally carrying a title before the body.
pub fn parse_simple_section(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    command: &str,
) -> (NodeId, RunEnd) {
    let kind = match dispatch::command_id(command) {
        CommandId::Sa => SimpleSectKind::See,
        CommandId::Return => SimpleSectKind::Return,
        CommandId::Author => SimpleSectKind::Author,
        CommandId::Authors => SimpleSectKind::Authors,
        CommandId::Version => SimpleSectKind::Version,
        CommandId::Since => SimpleSectKind::Since,
        CommandId::Date => SimpleSectKind::Date,
        CommandId::Note => SimpleSectKind::Note,
        CommandId::Warning => SimpleSectKind::Warning,
        CommandId::Pre => SimpleSectKind::Pre,
        CommandId::Post => SimpleSectKind::Post,
        CommandId::Copyright => SimpleSectKind::Copyright,
        CommandId::Invariant => SimpleSectKind::Invariant,
        CommandId::Remark => SimpleSectKind::Remark,
        CommandId::Attention => SimpleSectKind::Attention,
        _ => SimpleSectKind::User,
    };
    if matches!(kind, SimpleSectKind::Return) {
        ctx.has_return_command = true;
    }
    let title = if command == "par" {
        Some(src.next().name)
    } else {
        None
    };
    let node = tree.push_child(parent, Node::SimpleSect { kind, title });
    ctx.push_node(node);
    let end = parse_inline_run(src, ctx, tree, diagnostics, node);
    ctx.pop_node();
    (node, end)
}

/// `\param`/`\tparam`/`\retval`/`\exception`: a parameter-name list (possibly
/// `[in]`/`[out]`/`[in,out]`-qualified) followed by its description.
pub fn parse_param_section(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    command: &str,
) -> (NodeId, RunEnd) {
    let kind = match dispatch::command_id(command) {
        CommandId::TParam => ParamSectKind::TemplateParam,
        CommandId::RetVal => ParamSectKind::RetVal,
        CommandId::Exception => ParamSectKind::Exception,
        _ => ParamSectKind::Param,
    };
    if matches!(kind, ParamSectKind::Param) {
        ctx.has_param_command = true;
    }
    let name_tok = src.next();
    let direction = name_tok.param_dir;
    let has_type_specifier = name_tok.name.starts_with('#');
    let types = if has_type_specifier { vec![name_tok.name.trim_start_matches('#').to_string()] } else { Vec::new() };
    let names = vec![name_tok.name.clone()];
    if matches!(kind, ParamSectKind::Param) {
        ctx.params_found.insert(name_tok.name);
    }
    let sect = tree.push_child(
        parent,
        Node::ParamSect { kind, has_in_out: !matches!(direction, ParamDir::Unspecified), has_type_specifier },
    );
    tree.push_child(sect, Node::ParamList { kind, direction, types, names });
    ctx.push_node(sect);
    let end = parse_inline_run(src, ctx, tree, diagnostics, sect);
    ctx.pop_node();
    (sect, end)
}

/// Auto-detected (`-`/`1.` style, indent-driven) lists — spec.md's `AutoList`
/// grammar. Nesting is driven by indent comparison: a deeper indent starts a
/// nested list, a shallower one closes enclosing lists until the indents
/// realign. One loop owns the token stream end to end (the lexer has no way
/// to "unread" a `ListItem` token), so nesting is tracked with an explicit
/// stack of open `AutoList` nodes rather than recursive descent.
pub fn parse_auto_list(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    first_item: &Token,
) -> RunEnd {
    src.begin_auto_list();
    let mut levels: Vec<(NodeId, u16)> = Vec::new();
    let top_list = tree.push_child(
        parent,
        Node::AutoList { indent: first_item.indent, enumerated: first_item.is_enum_list, depth: 1 },
    );
    ctx.push_node(top_list);
    levels.push((top_list, first_item.indent));

    let mut item_tok = first_item.clone();
    let end = 'outer: loop {
        // Close levels shallower than the current item before placing it.
        while item_tok.indent < levels.last().unwrap().1 {
            ctx.pop_node();
            levels.pop();
            if levels.is_empty() {
                break 'outer (BlockEnd::EndList, item_tok);
            }
        }
        // Open nested levels for a deeper item.
        if item_tok.indent > levels.last().unwrap().1 {
            let (parent_list, _) = *levels.last().unwrap();
            let nested = tree.push_child(
                parent_list,
                Node::AutoList { indent: item_tok.indent, enumerated: item_tok.is_enum_list, depth: levels.len() as u16 + 1 },
            );
            ctx.push_node(nested);
            levels.push((nested, item_tok.indent));
        }

        let (list, _) = *levels.last().unwrap();
        let item = tree.push_child(list, Node::AutoListItem { indent: item_tok.indent, number: None });
        ctx.push_node(item);
        let (item_end, end_tok) = parse_inline_run(src, ctx, tree, diagnostics, item);
        ctx.pop_node();
        match item_end {
            BlockEnd::ListItem => {
                item_tok = end_tok;
                continue;
            }
            BlockEnd::EndList | BlockEnd::NewParagraph => break (BlockEnd::EndList, end_tok),
            other => break (other, end_tok),
        }
    };
    while !levels.is_empty() {
        ctx.pop_node();
        levels.pop();
    }
    src.end_auto_list();
    end
}

/// `<ul>`/`<ol>` HTML lists: unlike the auto-list grammar, nesting is
/// explicit (another `<ul>`/`<ol>` before the enclosing `</ul>`/`</ol>`)
/// rather than indent-inferred.
pub fn parse_html_list(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    kind: HtmlListKind,
    attrs: crate::token::Attrs,
) -> BlockEnd {
    let list = tree.push_child(parent, Node::HtmlList { kind, attrs });
    ctx.push_node(list);
    let end = loop {
        let tok = src.next();
        match tok.kind {
            Some(TokenKind::End) => break BlockEnd::Eof,
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("li") && !tok.end_tag => {
                let item = tree.push_child(list, Node::HtmlListItem { attrs: tok.attribs.clone(), number: None });
                ctx.push_node(item);
                let (item_end, _) = parse_inline_run(src, ctx, tree, diagnostics, item);
                ctx.pop_node();
                if matches!(item_end, BlockEnd::Eof) {
                    break BlockEnd::Eof;
                }
            }
            Some(TokenKind::HtmlTag) if (tok.name.eq_ignore_ascii_case("ul") || tok.name.eq_ignore_ascii_case("ol")) && tok.end_tag => {
                break BlockEnd::EndList;
            }
            _ => {}
        }
    };
    ctx.pop_node();
    end
}

/// `<table>`: resolves `num_columns` from the widest row seen (invariant I7
/// — later narrower rows are padded by the back-end, not here; a row wider
/// than the running maximum updates it).
pub fn parse_html_table(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
    attrs: crate::token::Attrs,
) -> BlockEnd {
    let table = tree.push_child(parent, Node::HtmlTable { attrs, num_columns: 0 });
    ctx.push_node(table);
    let mut max_columns = 0usize;
    let end = loop {
        let tok = src.next();
        match tok.kind {
            Some(TokenKind::End) => break BlockEnd::Eof,
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("table") && tok.end_tag => break BlockEnd::Eof,
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("caption") && !tok.end_tag => {
                let caption = tree.push_child(table, Node::HtmlCaption { attrs: tok.attribs.clone() });
                ctx.push_node(caption);
                parse_inline_run(src, ctx, tree, diagnostics, caption);
                ctx.pop_node();
            }
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("tr") && !tok.end_tag => {
                let (row_columns, row_end) = parse_html_row(src, ctx, tree, diagnostics, table, tok.attribs.clone());
                max_columns = max_columns.max(row_columns);
                if matches!(row_end, BlockEnd::Eof) {
                    break BlockEnd::Eof;
                }
            }
            _ => {}
        }
    };
    ctx.pop_node();
    if let Node::HtmlTable { num_columns, .. } = tree.kind_mut(table) {
        *num_columns = max_columns;
    }
    end
}

fn parse_html_row(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    table: NodeId,
    attrs: crate::token::Attrs,
) -> (usize, BlockEnd) {
    let row = tree.push_child(table, Node::HtmlRow { attrs });
    ctx.push_node(row);
    let mut columns = 0usize;
    let end = loop {
        let tok = src.next();
        match tok.kind {
            Some(TokenKind::End) => break BlockEnd::Eof,
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("tr") && tok.end_tag => break BlockEnd::TableRow,
            Some(TokenKind::HtmlTag)
                if (tok.name.eq_ignore_ascii_case("td") || tok.name.eq_ignore_ascii_case("th")) && !tok.end_tag =>
            {
                columns += 1;
                let header = tok.name.eq_ignore_ascii_case("th");
                let cell = tree.push_child(row, Node::HtmlCell { attrs: tok.attribs.clone(), header });
                ctx.push_node(cell);
                let (cell_end, _) = parse_inline_run(src, ctx, tree, diagnostics, cell);
                ctx.pop_node();
                if matches!(cell_end, BlockEnd::Eof) {
                    break BlockEnd::Eof;
                }
            }
            _ => {}
        }
    };
    ctx.pop_node();
    (columns, end)
}

/// `<dl>` description lists: alternating `<dt>`/`<dd>` pairs.
pub fn parse_desc_list(
    src: &mut dyn TokenSource,
    ctx: &mut ParserContext,
    tree: &mut Tree,
    diagnostics: &mut DiagnosticSink,
    parent: NodeId,
) -> BlockEnd {
    let list = tree.push_child(parent, Node::HtmlDescList);
    ctx.push_node(list);
    let end = loop {
        let tok = src.next();
        match tok.kind {
            Some(TokenKind::End) => break BlockEnd::Eof,
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("dl") && tok.end_tag => break BlockEnd::EndList,
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("dt") && !tok.end_tag => {
                let title = tree.push_child(list, Node::HtmlDescTitle);
                ctx.push_node(title);
                parse_inline_run(src, ctx, tree, diagnostics, title);
                ctx.pop_node();
            }
            Some(TokenKind::HtmlTag) if tok.name.eq_ignore_ascii_case("dd") && !tok.end_tag => {
                let data = tree.push_child(list, Node::HtmlDescData);
                ctx.push_node(data);
                let (data_end, _) = parse_inline_run(src, ctx, tree, diagnostics, data);
                ctx.pop_node();
                if matches!(data_end, BlockEnd::Eof) {
                    break BlockEnd::Eof;
                }
            }
            _ => {}
        }
    };
    ctx.pop_node();
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticTokenSource;

    #[test]
    fn words_and_whitespace_collect_into_para() {
        let mut src = StaticTokenSource::from_tokens(vec![
            Token::word("hello", 1),
            Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 1) },
            Token::word("world", 1),
            Token::end(1),
        ]);
        let mut tree = Tree::new();
        let root = tree.root();
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();
        let (end, _) = parse_inline_run(&mut src, &mut ctx, &mut tree, &mut diag, root);
        assert_eq!(end, BlockEnd::Eof);
        assert_eq!(tree.children(root).len(), 3);
    }

    #[test]
    fn section_records_level_and_id() {
        let mut src = StaticTokenSource::from_tokens(vec![
            Token::word("overview", 1),
            Token::word("Overview", 1),
            Token::end(1),
        ]);
        let mut tree = Tree::new();
        let root = tree.root();
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();
        let (node, _) = parse_section(&mut src, &mut ctx, &mut tree, &mut diag, root, 1, None);
        assert!(matches!(tree.kind(node), Node::Section { level: 1, .. }));
        assert!(ctx.sections.contains_key("overview"));
    }

    #[test]
    fn skip_line_operator_consumes_through_match() {
        let mut tree = Tree::new();
        let root = tree.root();
        let mut ctx = ParserContext::new("a.h");
        ctx.include_buffer = Some(IncludeCursor::new("one\ntwo\nthree"));
        let mut diag = DiagnosticSink::new();
        parse_include_operator(&mut ctx, &mut tree, &mut diag, root, CommandId::SkipLine, "two", 1);
        assert_eq!(ctx.include_buffer.as_ref().unwrap().pos, 2);
        assert!(matches!(tree.kind(tree.children(root)[0]), Node::IncOperator { .. }));
    }

    #[test]
    fn nested_auto_list_indents_produce_nested_nodes() {
        let mut src = StaticTokenSource::from_tokens(vec![
            Token::word("outer", 1),
            Token::end(1),
        ]);
        let first = Token { indent: 0, ..Token::new(TokenKind::ListItem, 1) };
        let mut tree = Tree::new();
        let root = tree.root();
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();
        let (end, _) = parse_auto_list(&mut src, &mut ctx, &mut tree, &mut diag, root, &first);
        assert_eq!(end, BlockEnd::Eof);
        assert!(matches!(tree.kind(tree.children(root)[0]), Node::AutoList { .. }));
    }

    #[test]
    fn linkable_word_sheds_trailing_punctuation() {
        let mut tree = Tree::new();
        let root = tree.root();
        let ctx = ParserContext::new("a.h");
        push_linkable_word(&mut tree, root, &ctx, "Foo::bar.");
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        assert!(matches!(tree.kind(children[0]), Node::LinkedWord { reference, .. } if reference == "Foo::bar"));
        assert!(matches!(tree.kind(children[1]), Node::Word { text } if text == "."));
    }

    #[test]
    fn linkable_word_without_punctuation_is_a_single_node() {
        let mut tree = Tree::new();
        let root = tree.root();
        let ctx = ParserContext::new("a.h");
        push_linkable_word(&mut tree, root, &ctx, "Foo::bar");
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn unterminated_code_block_is_flagged() {
        let mut src = StaticTokenSource::from_tokens(vec![
            Token {
                kind: Some(TokenKind::VerbatimBody),
                verb: "int x = 1;\n".into(),
                unterminated: true,
                ..Token::new(TokenKind::VerbatimBody, 1)
            },
            Token::end(2),
        ]);
        let mut tree = Tree::new();
        let root = tree.root();
        let ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();
        parse_verbatim(&mut src, &ctx, &mut diag, &mut tree, root, VerbatimKind::Code);
        assert!(matches!(tree.kind(tree.children(root)[0]), Node::Verbatim { kind: VerbatimKind::Code, .. }));
        assert!(diag.iter().any(|d| d.message == "code section ended without end marker"));
    }
}
