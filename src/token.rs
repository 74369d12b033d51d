//! Token interface (C1) — the abstraction boundary over the lexer.
//!
//!     The lexer itself is an external collaborator: a pull-source of tagged
//!     tokens with pushdown lexical states, line tracking, and push-back. The
//!     parser never inspects lexer internals, only the `Token` shape and the
//!     `TokenSource` trait below. A real lexer implements `TokenSource`; tests
//!     in this crate use [`crate::testing::StaticTokenSource`], which replays a
//!     pre-built `Vec<Token>` and is otherwise indistinguishable to the parser.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a single token, mirroring the lexer's token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    LinkableWord,
    Symbol,
    Url,
    Command,
    HtmlTag,
    WhiteSpace,
    NewPara,
    ListItem,
    EndList,
    RcsTag,
    VerbatimBody,
    End,
}

/// Direction of a `\param[in]`/`\param[out]`/`\param[in,out]` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParamDir {
    #[default]
    Unspecified,
    In,
    Out,
    InOut,
}

/// One (key, value) attribute pair on an HTML/XML tag, in source order.
pub type Attrs = Vec<(String, String)>;

/// A single token handed from the lexer to the parser.
///
/// Field population is kind-dependent, exactly as in the source lexer: most
/// fields are irrelevant for most kinds, but the parser never needs to know
/// which — it just reads the field(s) that matter for whichever grammar rule
/// it is currently running.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Token {
    pub kind: Option<TokenKind>,
    pub name: String,
    pub chars: String,
    pub attribs: Attrs,
    pub end_tag: bool,
    pub empty_tag: bool,
    pub is_email: bool,
    pub verb: String,
    pub id: String,
    pub section_id: String,
    pub indent: u16,
    pub param_dir: ParamDir,
    pub is_enum_list: bool,
    pub simple_sect_name: String,
    pub simple_sect_text: String,
    pub line: u32,
    /// For `VerbatimBody`: `true` when the lexer hit `End` before finding the
    /// matching `\end...` marker, so `verb` holds whatever was captured up to
    /// EOF rather than a properly closed block.
    pub unterminated: bool,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32) -> Self {
        Self {
            kind: Some(kind),
            line,
            ..Default::default()
        }
    }

    pub fn word(text: impl Into<String>, line: u32) -> Self {
        Self {
            name: text.into(),
            ..Self::new(TokenKind::Word, line)
        }
    }

    pub fn command(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            ..Self::new(TokenKind::Command, line)
        }
    }

    pub fn end(line: u32) -> Self {
        Self::new(TokenKind::End, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(TokenKind::Word) | Some(TokenKind::LinkableWord) => write!(f, "{}", self.name),
            Some(TokenKind::Command) => write!(f, "\\{}", self.name),
            Some(TokenKind::WhiteSpace) => write!(f, "{}", self.chars),
            other => write!(f, "<{other:?} {}>", self.name),
        }
    }
}

/// Pushdown lexical states the token source can be placed into. Each state
/// changes which lexical rules are active — e.g. in `Code` state the lexer
/// returns the entire body in `verb` until the matching end marker or EOF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Para,
    Title,
    Ref,
    Link,
    Anchor,
    InternalRef,
    Cite,
    Param,
    Snippet,
    Pattern,
    File,
    SkipTitle,
    SetScope,
    XRefItem,
    Code,
    HtmlOnly,
    ManOnly,
    RtfOnly,
    LatexOnly,
    XmlOnly,
    DocbookOnly,
    Verbatim,
    Dot,
    Msc,
    PlantUML,
    XmlCode,
    Text,
    TitleAttrValue,
    AutoList,
}

/// Everything the parser is allowed to ask of the lexer.
pub trait TokenSource {
    /// Reset the source onto a new input buffer, as a fresh lex starting at
    /// line 1 of `filename` — used between independent parses of the same
    /// underlying lexer/reader rather than constructing a new one each time.
    fn init(&mut self, input: &str, filename: &str);
    fn next(&mut self) -> Token;
    fn push_state(&mut self, state: LexState);
    fn pop_state(&mut self);
    fn set_state(&mut self, state: LexState);
    fn push_back_tag(&mut self, name: &str);
    fn begin_auto_list(&mut self);
    fn end_auto_list(&mut self);
    fn set_inside_pre(&mut self, inside: bool);
    fn current_line(&self) -> u32;
}
