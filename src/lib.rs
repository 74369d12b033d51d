//! A token-driven parser and arena AST for multi-dialect documentation
//! comments (Doxygen/DoxyPress-family `\command`/`@command` markup, the XML
//! doc-comment subset, and the embedded HTML subset both dialects allow).
//!
//!     The crate takes a pre-tokenized stream (see [`token`]) and turns it
//!     into a [`ast::Tree`] plus a list of [`diagnostics::Diagnostic`]s.
//!     Nothing here ever fails outright: lexical and grammatical problems are
//!     recorded as diagnostics and the parser keeps building the best tree it
//!     can, so a caller always gets a complete, visitable tree back from
//!     [`parser::Parser::parse_doc`].
//!
//!     Module layout mirrors the grammar's own decomposition:
//!     - [`token`] — the lexer-facing interface (C1)
//!     - [`ast`] — the node model and visitor protocol (C2)
//!     - [`context`] — per-parse parser state (C3)
//!     - [`xref`] — cross-reference resolution (C4)
//!     - [`style`] — inline style / HTML subset engine (C5)
//!     - [`dispatch`] — the command table (C6)
//!     - [`block`] — paragraph/section/list/table/param grammars (C7)
//!     - [`copy`] — `\copydoc`-family textual splicing (C8)
//!     - [`validate`] — post-parse `\param` cross-checking (C9)
//!     - [`parser`] — the three public entry points (C10)

pub mod ast;
pub mod block;
pub mod config;
pub mod context;
pub mod copy;
pub mod diagnostics;
pub mod dispatch;
pub mod parser;
pub mod style;
pub mod token;
pub mod testing;
pub mod validate;
pub mod xref;

pub use ast::{Node, NodeId, Tree, Visitor};
pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use parser::{ParseRequest, Parser};
pub use token::{Token, TokenKind, TokenSource};
