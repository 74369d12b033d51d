//! Style & HTML subset engine (C5).
//!
//!     Maps inline commands and the recognized HTML/XML tag set to
//!     style-change nodes, and enforces the enter/leave nesting contract
//!     described in spec.md §4.5.

use crate::ast::{Node, NodeId, Style, Tree};
use crate::context::{ParserContext, StyleStackEntry};
use crate::diagnostics::DiagnosticSink;
use crate::token::Attrs;

/// HTML tags recognized by the style/block grammar (case-insensitive).
pub const HTML_TAGS: &[&str] = &[
    "b", "em", "i", "code", "sub", "sup", "center", "small", "div", "span", "pre", "br", "hr",
    "img", "a", "p", "ul", "ol", "li", "dl", "dt", "dd", "table", "tr", "td", "th", "caption",
    "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// The XML-documentation-comment tag subset (`<summary>`, `<param>`, ...).
pub const XML_DOC_TAGS: &[&str] = &[
    "summary", "remarks", "value", "para", "example", "description", "c", "param", "typeparam",
    "paramref", "typeparamref", "exception", "item", "listheader", "returns", "term", "see",
    "seealso", "list", "include", "permission", "inheritdoc",
];

/// Maps a tag name to the `Style` it introduces, if it is a style tag at all
/// (as opposed to a structural tag like `<table>` handled by the block
/// grammar instead).
///
/// Per the documented quirk in spec.md §9: `<c>` normally maps to `Code`, but
/// inside `<summary>`/`<remarks>` it's meant to behave like `\code` (a full
/// verbatim block) instead of inline code style. That context-dependent half
/// of the quirk is not implemented here or anywhere else in this crate (see
/// DESIGN.md) — this function always returns the context-free mapping, so
/// `<c>` inside a `<summary>` still comes out as inline `Code`.
pub fn style_for_tag(name: &str) -> Option<Style> {
    match name.to_ascii_lowercase().as_str() {
        "b" => Some(Style::Bold),
        "em" | "i" => Some(Style::Italic),
        "code" | "c" => Some(Style::Code),
        "sub" => Some(Style::Sub),
        "sup" => Some(Style::Sup),
        "center" => Some(Style::Center),
        "small" => Some(Style::Small),
        "div" | "span" | "para" | "description" => {
            if name.eq_ignore_ascii_case("div") {
                Some(Style::Div)
            } else {
                Some(Style::Span)
            }
        }
        "pre" => Some(Style::Preformatted),
        _ => None,
    }
}

/// `true` when `tag` is part of the recognized subset at all (HTML or XML-doc).
pub fn is_recognized_tag(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    HTML_TAGS.contains(&lower.as_str()) || XML_DOC_TAGS.iter().any(|t| t.eq_ignore_ascii_case(&lower))
}

/// Empty-element XHTML syntax (`<x/>`) is forbidden for any non-XML tag
/// except `img`/`br`.
pub fn check_empty_element(tag: &str, diagnostics: &mut DiagnosticSink, file: &str, line: u32) {
    let lower = tag.to_ascii_lowercase();
    let is_xml = XML_DOC_TAGS.iter().any(|t| t.eq_ignore_ascii_case(&lower));
    if is_xml || lower == "img" || lower == "br" {
        return;
    }
    diagnostics.warn_doc_error(
        file,
        line,
        format!("empty-element syntax `<{tag}/>` is not allowed for tag `{tag}`"),
    );
}

/// Push a `StyleChange(enter)` onto both the style stack and the tree,
/// recording the current node-stack depth as its "position" (§4.5).
pub fn enter_style(
    ctx: &mut ParserContext,
    tree: &mut Tree,
    parent: NodeId,
    style: Style,
    attrs: Attrs,
) -> NodeId {
    let position = ctx.node_stack.len();
    let node = tree.push_child(
        parent,
        Node::StyleChange { style, enter: true, position, attrs },
    );
    ctx.style_stack.push(StyleStackEntry { style, position, node });
    node
}

/// Close a style tag. Requires the top of the style stack to match by style
/// AND by position; on mismatch, emits the diagnostic spec.md §4.5 requires
/// and leaves the stack untouched (the mismatched close is otherwise ignored
/// per the MismatchedStyleClose recovery rule in §7).
pub fn leave_style(
    ctx: &mut ParserContext,
    tree: &mut Tree,
    parent: NodeId,
    style: Style,
    diagnostics: &mut DiagnosticSink,
    file: &str,
    line: u32,
) -> Option<NodeId> {
    let tag = style.tag_name();
    let Some(top) = ctx.style_stack.last().copied() else {
        diagnostics.warn_doc_error(file, line, format!("found `</{tag}>` without matching `<{tag}>`"));
        return None;
    };
    if top.style.tag_name() != tag {
        diagnostics.warn_doc_error(
            file,
            line,
            format!("found `</{tag}>` while expecting `</{}>`", top.style.tag_name()),
        );
        return None;
    }
    if top.position != ctx.node_stack.len() {
        diagnostics.warn_doc_error(
            file,
            line,
            format!(
                "found `</{tag}>` at nesting level {}, expected at level {}",
                ctx.node_stack.len(),
                top.position
            ),
        );
        return None;
    }
    ctx.style_stack.pop();
    Some(tree.push_child(parent, Node::StyleChange { style, enter: false, position: top.position, attrs: Vec::new() }))
}

/// End of paragraph: synthesize a `leave` for every style whose `position` is
/// at or beyond the current node-stack depth, and transfer its `enter` to the
/// initial-style stack so the next paragraph can re-enter it (invariant I2).
pub fn close_para_styles(ctx: &mut ParserContext, tree: &mut Tree, para: NodeId) {
    let depth = ctx.node_stack.len();
    while let Some(top) = ctx.style_stack.last().copied() {
        if top.position < depth {
            break;
        }
        ctx.style_stack.pop();
        tree.push_child(para, Node::StyleChange { style: top.style, enter: false, position: top.position, attrs: Vec::new() });
        ctx.initial_style_stack.push(top);
    }
}

/// Start of the next paragraph: re-emit `enter` nodes for styles transferred
/// at the previous paragraph's close, in reverse-pop order (innermost style,
/// which was popped last, reopens first).
pub fn reopen_para_styles(ctx: &mut ParserContext, tree: &mut Tree, para: NodeId) {
    let mut reopened = Vec::new();
    while let Some(entry) = ctx.initial_style_stack.pop() {
        let node = tree.push_child(para, Node::StyleChange { style: entry.style, enter: true, position: entry.position, attrs: Vec::new() });
        reopened.push(StyleStackEntry { node, ..entry });
    }
    // Innermost-last in `reopened`; push back in the same order so the
    // innermost (last opened) ends up on top of the stack again.
    for entry in reopened {
        ctx.style_stack.push(entry);
    }
}

/// At EOF, every remaining entry in the initial-style stack reports an
/// `UnmatchedStyleOpen` diagnostic (§7).
pub fn report_unmatched_at_eof(ctx: &ParserContext, diagnostics: &mut DiagnosticSink, file: &str, line: u32) {
    for entry in ctx.initial_style_stack.iter().rev() {
        diagnostics.warn_doc_error(
            file,
            line,
            format!("end of block while expecting `</{}>`", entry.style.tag_name()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Tree;

    #[test]
    fn enter_leave_round_trip() {
        let mut tree = Tree::new();
        let root = tree.root();
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();

        enter_style(&mut ctx, &mut tree, root, Style::Bold, Vec::new());
        assert_eq!(ctx.style_stack.len(), 1);
        let leave = leave_style(&mut ctx, &mut tree, root, Style::Bold, &mut diag, "a.h", 1);
        assert!(leave.is_some());
        assert!(ctx.style_stack.is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn mismatched_close_reports_expected_tag() {
        let mut tree = Tree::new();
        let root = tree.root();
        let mut ctx = ParserContext::new("a.h");
        let mut diag = DiagnosticSink::new();

        enter_style(&mut ctx, &mut tree, root, Style::Bold, Vec::new());
        let leave = leave_style(&mut ctx, &mut tree, root, Style::Italic, &mut diag, "a.h", 1);
        assert!(leave.is_none());
        assert!(diag.iter().next().unwrap().message.contains("expecting `</em>`") || diag.iter().next().unwrap().message.contains("expecting"));
        // style stack is untouched on mismatch
        assert_eq!(ctx.style_stack.len(), 1);
    }

    #[test]
    fn close_then_reopen_preserves_style_across_para_break() {
        let mut tree = Tree::new();
        let root = tree.root();
        let para1 = tree.push_child(root, Node::Para);
        let mut ctx = ParserContext::new("a.h");

        enter_style(&mut ctx, &mut tree, para1, Style::Bold, Vec::new());
        close_para_styles(&mut ctx, &mut tree, para1);
        assert!(ctx.style_stack.is_empty());
        assert_eq!(ctx.initial_style_stack.len(), 1);

        let para2 = tree.push_child(root, Node::Para);
        reopen_para_styles(&mut ctx, &mut tree, para2);
        assert_eq!(ctx.style_stack.len(), 1);
        assert!(ctx.initial_style_stack.is_empty());
    }
}
