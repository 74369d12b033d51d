//! Test-only token source and sample-input builders.
//!
//!     No real lexer ships in this crate (out of scope, spec.md §1); every
//!     test instead builds a [`StaticTokenSource`] by hand or with the
//!     `tokens![]`-style helpers below, exactly standing in for the lexer
//!     through the `TokenSource` trait boundary.

use crate::token::{LexState, Token, TokenKind, TokenSource};

/// Replays a pre-built `Vec<Token>`. `push_back_tag` rewinds one slot so a
/// caller that peeked an HTML tag and decided it belongs to an enclosing
/// grammar can hand it back; this only works one token deep, matching how
/// every caller in this crate actually uses it (look at one token, maybe
/// push it back, never more than once in a row).
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    tokens: Vec<Token>,
    pos: usize,
    state_stack: Vec<LexState>,
    in_auto_list: bool,
    inside_pre: bool,
    rewound_tag: Option<String>,
}

impl StaticTokenSource {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            state_stack: vec![LexState::Para],
            in_auto_list: false,
            inside_pre: false,
            rewound_tag: None,
        }
    }

    pub fn current_state(&self) -> LexState {
        *self.state_stack.last().unwrap_or(&LexState::Para)
    }
}

impl TokenSource for StaticTokenSource {
    /// No-op: a `StaticTokenSource` already holds its whole replay buffer
    /// up front, there is no underlying reader to repoint at `input`.
    fn init(&mut self, _input: &str, _filename: &str) {}

    fn next(&mut self) -> Token {
        if let Some(name) = self.rewound_tag.take() {
            return Token {
                name,
                ..Token::new(TokenKind::HtmlTag, self.current_line())
            };
        }
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                tok.clone()
            }
            None => Token::end(self.current_line()),
        }
    }

    fn push_state(&mut self, state: LexState) {
        self.state_stack.push(state);
    }

    fn pop_state(&mut self) {
        if self.state_stack.len() > 1 {
            self.state_stack.pop();
        }
    }

    fn set_state(&mut self, state: LexState) {
        if let Some(top) = self.state_stack.last_mut() {
            *top = state;
        } else {
            self.state_stack.push(state);
        }
    }

    fn push_back_tag(&mut self, name: &str) {
        self.rewound_tag = Some(name.to_string());
    }

    fn begin_auto_list(&mut self) {
        self.in_auto_list = true;
    }

    fn end_auto_list(&mut self) {
        self.in_auto_list = false;
    }

    fn set_inside_pre(&mut self, inside: bool) {
        self.inside_pre = inside;
    }

    fn current_line(&self) -> u32 {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.line)
            .unwrap_or(0)
    }
}

/// A short word/whitespace/word run ending in `End`, the minimal fixture
/// most dispatcher/block tests start from.
pub fn words(parts: &[&str]) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            tokens.push(Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 1) });
        }
        tokens.push(Token::word(*part, 1));
    }
    tokens.push(Token::end(1));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_tokens_then_ends() {
        let mut src = StaticTokenSource::from_tokens(vec![Token::word("hi", 1)]);
        assert_eq!(src.next().name, "hi");
        assert_eq!(src.next().kind, Some(TokenKind::End));
        assert_eq!(src.next().kind, Some(TokenKind::End));
    }

    #[test]
    fn push_back_tag_is_replayed_next() {
        let mut src = StaticTokenSource::from_tokens(vec![Token::word("hi", 1)]);
        src.push_back_tag("ul");
        let tok = src.next();
        assert_eq!(tok.kind, Some(TokenKind::HtmlTag));
        assert_eq!(tok.name, "ul");
        assert_eq!(src.next().name, "hi");
    }
}
