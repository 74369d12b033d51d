//! A snapshot test of a parsed tree's shape, exercised end to end (section +
//! paragraph + inline style) rather than field-by-field assertions.

use docparser::ast::{Node, NodeId, Tree, Visitor};
use docparser::parser::ParseRequest;
use docparser::testing::StaticTokenSource;
use docparser::token::{Token, TokenKind};
use docparser::{Config, Parser};

fn html_tag(name: &str, end_tag: bool, line: u32) -> Token {
    Token { name: name.to_string(), end_tag, ..Token::new(TokenKind::HtmlTag, line) }
}

#[derive(Default)]
struct TraceVisitor {
    steps: Vec<String>,
}

impl Visitor for TraceVisitor {
    fn visit_pre(&mut self, tree: &Tree, id: NodeId) {
        let node = tree.kind(id);
        let step = match node.literal_text() {
            Some(text) => format!("{}({text:?})", node.kind_name()),
            None => node.kind_name().to_string(),
        };
        self.steps.push(step);
    }
}

#[test]
fn section_and_styled_paragraph_trace_matches_known_shape() {
    let tokens = vec![
        Token::command("section", 1),
        Token::word("intro", 1),
        Token::word("Overview", 1),
        Token::new(TokenKind::NewPara, 1),
        Token::word("Hello", 2),
        Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 2) },
        html_tag("b", false, 2),
        Token::word("world", 2),
        html_tag("b", true, 2),
        Token::end(2),
    ];
    let mut parser = Parser::new(Config::default());
    let mut src = StaticTokenSource::from_tokens(tokens);
    let tree = parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);

    let mut trace = TraceVisitor::default();
    tree.accept(tree.root(), &mut trace);
    let rendered = trace.steps.join(" > ");

    insta::assert_snapshot!(rendered, @r#"Root > Section > Title > Word("Overview") > Para > Word("Hello") > WhiteSpace(" ") > StyleChange > Word("world") > StyleChange"#);

    assert!(parser.into_diagnostics().is_empty());
}
