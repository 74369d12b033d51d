//! Ad-hoc inspection tool: feed it a JSON array of [`docparser::Token`] and
//! it prints the resulting AST, the same shape `Tree::accept` back-ends
//! consume, as JSON or as an indented tree dump.
//!
//!     No real lexer ships with this crate, so this binary is a harness, not
//!     a doc-comment-to-HTML tool — it exists to let a developer see what a
//!     hand-built token stream parses into without writing a test.

use std::fs;
use std::path::PathBuf;

use clap::{Parser as ClapParser, ValueEnum};
use docparser::parser::ParseRequest;
use docparser::{Config, Node, NodeId, Parser, Token, Tree};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Tree,
    Json,
}

/// Parse a token stream and inspect the resulting AST.
#[derive(ClapParser, Debug)]
#[command(name = "docparser-cli", version, about)]
struct Cli {
    /// Path to a JSON file containing an array of tokens.
    tokens: PathBuf,

    /// How to print the parsed tree.
    #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
    format: OutputFormat,

    /// Treat the input as a single line (stop at the first blank paragraph).
    #[arg(long)]
    single_line: bool,
}

struct ReplayingSource {
    tokens: Vec<Token>,
    pos: usize,
    state_stack: Vec<docparser::token::LexState>,
    rewound: Option<String>,
}

impl docparser::TokenSource for ReplayingSource {
    fn init(&mut self, _input: &str, _filename: &str) {}

    fn next(&mut self) -> Token {
        if let Some(name) = self.rewound.take() {
            return Token { name, ..Token::new(docparser::TokenKind::HtmlTag, self.current_line()) };
        }
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                tok.clone()
            }
            None => Token::end(self.current_line()),
        }
    }
    fn push_state(&mut self, state: docparser::token::LexState) {
        self.state_stack.push(state);
    }
    fn pop_state(&mut self) {
        if self.state_stack.len() > 1 {
            self.state_stack.pop();
        }
    }
    fn set_state(&mut self, state: docparser::token::LexState) {
        if let Some(top) = self.state_stack.last_mut() {
            *top = state;
        }
    }
    fn push_back_tag(&mut self, name: &str) {
        self.rewound = Some(name.to_string());
    }
    fn begin_auto_list(&mut self) {}
    fn end_auto_list(&mut self) {}
    fn set_inside_pre(&mut self, _inside: bool) {}
    fn current_line(&self) -> u32 {
        self.tokens.get(self.pos.saturating_sub(1)).map(|t| t.line).unwrap_or(0)
    }
}

fn print_tree(tree: &Tree, id: NodeId, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{}", describe(tree.kind(id)));
    for &child in tree.children(id) {
        print_tree(tree, child, depth + 1);
    }
}

fn describe(node: &Node) -> String {
    match node.literal_text() {
        Some(text) => format!("{} {text:?}", node.kind_name()),
        None => node.kind_name().to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let raw = fs::read_to_string(&cli.tokens)?;
    let tokens: Vec<Token> = serde_json::from_str(&raw)?;

    let mut source = ReplayingSource {
        tokens,
        pos: 0,
        state_stack: vec![docparser::token::LexState::Para],
        rewound: None,
    };

    let mut parser = Parser::new(Config::default());
    let request = ParseRequest {
        file: cli.tokens.display().to_string(),
        single_line: cli.single_line,
        ..Default::default()
    };
    let tree = parser.parse_doc(request, &mut source);

    match cli.format {
        OutputFormat::Tree => print_tree(&tree, tree.root(), 0),
        OutputFormat::Json => {
            // The arena itself isn't serialized (its shape is an
            // implementation detail); this walks the same way
            // `Tree::accept` would and emits a nested JSON tree instead.
            let value = to_json(&tree, tree.root());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    for diagnostic in parser.diagnostics().iter() {
        eprintln!("{diagnostic}");
    }

    Ok(())
}

fn to_json(tree: &Tree, id: NodeId) -> serde_json::Value {
    serde_json::json!({
        "node": tree.kind(id),
        "children": tree.children(id).iter().map(|c| to_json(tree, *c)).collect::<Vec<_>>(),
    })
}
