//! Parser context (C3) — the per-parse state, pushed/popped as a stack.
//!
//!     The source keeps this as file-scope C statics (`s_scope`, `s_context`,
//!     `s_nodeStack`, ...). Per the design notes that global mutable state is
//!     never reintroduced: a `ParserContext` is an explicit value, and
//!     `Parser` (in [`crate::parser`]) owns a `Vec<ParserContext>` that is
//!     pushed on entry to `parse_doc`, each `\copydoc` expansion, and RCS
//!     reparse, and popped on return — scoped acquisition, so exiting any
//!     parse path (normal return, early diagnostic, cycle detection) restores
//!     the previous context (§5's resource-discipline requirement).

use std::collections::{HashMap, HashSet};

use crate::ast::{NodeId, Style};
use crate::xref::{RawSymbolGraph, SectionInfo};

/// Source-language dialect, affecting the validation pass (C9): Python's
/// `self` is always considered documented, Fortran parameter names compare
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Generic,
    Python,
    Fortran,
}

/// One entry in the style stack: an open `StyleChange(enter)` awaiting its
/// `leave`, remembering the node-stack depth ("position") it was opened at
/// and the tree node it produced (so the matching leave/synthesis can be
/// tied back to it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleStackEntry {
    pub style: Style,
    pub position: usize,
    pub node: NodeId,
}

/// Sliding cursor over an include-file buffer, set up by `\include`/`\snippet`
/// and consumed by the `\line`/`\skip`/`\skipline`/`\until` operators.
#[derive(Debug, Clone, Default)]
pub struct IncludeCursor {
    pub lines: Vec<String>,
    pub pos: usize,
}

impl IncludeCursor {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            pos: 0,
        }
    }

    /// The line the cursor currently sits on, if any remain.
    pub fn current_line(&self) -> Option<&str> {
        self.lines.get(self.pos).map(String::as_str)
    }

    /// `true` once the cursor has produced every line at least once.
    pub fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Advance one line (used by `\line`).
    pub fn advance(&mut self) {
        if self.pos < self.lines.len() {
            self.pos += 1;
        }
    }

    /// Find the first line at or after the cursor containing `pattern`,
    /// without moving the cursor. Used by `\skip`/`\skipline`/`\until` to
    /// locate the target before deciding how much to consume.
    pub fn find_from_cursor(&self, pattern: &str) -> Option<usize> {
        self.lines[self.pos..]
            .iter()
            .position(|line| line.contains(pattern))
            .map(|offset| self.pos + offset)
    }

    /// Join `[pos, end]` inclusive into one block and move the cursor past it.
    pub fn collect_through(&mut self, end: usize) -> String {
        let end = end.min(self.lines.len().saturating_sub(1));
        let block = self.lines[self.pos..=end].join("\n");
        self.pos = end + 1;
        block
    }

    /// Move the cursor to `target` without collecting any text (used by
    /// `\skip`, which advances past the matched line silently).
    pub fn seek_past(&mut self, target: usize) {
        self.pos = (target + 1).min(self.lines.len());
    }
}

/// The full per-parse parser state (spec.md §4.3).
#[derive(Debug, Clone, Default)]
pub struct ParserContext {
    pub scope: String,
    pub context_name: String,
    pub in_see_block: bool,
    pub xml_comment: bool,
    pub inside_html_link: bool,

    pub node_stack: Vec<NodeId>,
    pub style_stack: Vec<StyleStackEntry>,
    pub initial_style_stack: Vec<StyleStackEntry>,
    pub copy_stack: Vec<String>,

    pub file_name: String,
    pub rel_path: String,

    pub has_param_command: bool,
    pub has_return_command: bool,
    pub params_found: HashSet<String>,
    pub owning_member: Option<String>,
    pub language: Language,

    pub is_example: bool,
    pub example_name: Option<String>,

    pub sections: HashMap<String, SectionInfo>,
    pub search_index_url: Option<String>,

    pub include_buffer: Option<IncludeCursor>,

    /// The symbol graph this parse resolves cross-references against, if
    /// any (C4). `Rc` so every pushed/popped `ParserContext` shares one
    /// instance instead of cloning the graph itself.
    pub graph: Option<std::rc::Rc<dyn RawSymbolGraph>>,
    /// Mirrors `Config::autolink_support` — resolution is skipped
    /// entirely when this is off, even with a graph attached.
    pub autolink_support: bool,
}

impl ParserContext {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.node_stack.last().copied()
    }

    pub fn push_node(&mut self, id: NodeId) {
        self.node_stack.push(id);
    }

    pub fn pop_node(&mut self) -> Option<NodeId> {
        self.node_stack.pop()
    }
}

/// LIFO stack of parser contexts (invariant I6: balanced across every
/// `parse_doc`/`\copydoc` entry and exit).
#[derive(Debug, Default)]
pub struct ContextStack {
    stack: Vec<ParserContext>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Push `ctx`, optionally carrying forward the current context's
    /// param-tracking state (`has_param_command`, `has_return_command`,
    /// `params_found`, `owning_member`) — used when `save_param_info` is set,
    /// e.g. entering a `\copydoc` expansion that must still validate against
    /// the *original* member's argument list.
    pub fn push_context(&mut self, mut ctx: ParserContext, save_param_info: bool) {
        if save_param_info {
            if let Some(current) = self.stack.last() {
                ctx.has_param_command = current.has_param_command;
                ctx.has_return_command = current.has_return_command;
                ctx.params_found = current.params_found.clone();
                ctx.owning_member = current.owning_member.clone();
            }
        }
        self.stack.push(ctx);
    }

    /// Pop the top context. When `keep_param_info` is set, the param-tracking
    /// fields are merged back into the new top (so `\copydoc`'s nested
    /// validation state is visible to the caller that expanded it).
    pub fn pop_context(&mut self, keep_param_info: bool) -> ParserContext {
        let popped = self.stack.pop().expect("context stack underflow");
        if keep_param_info {
            if let Some(parent) = self.stack.last_mut() {
                parent.has_param_command |= popped.has_param_command;
                parent.has_return_command |= popped.has_return_command;
                parent.params_found.extend(popped.params_found.iter().cloned());
            }
        }
        popped
    }

    pub fn current(&self) -> &ParserContext {
        self.stack.last().expect("no active parser context")
    }

    pub fn current_mut(&mut self) -> &mut ParserContext {
        self.stack.last_mut().expect("no active parser context")
    }
}
