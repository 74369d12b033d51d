//! Property-based and table-driven tests for the invariants documented
//! alongside the grammar (style balance, table column counts, section level
//! monotonicity, text round-tripping, and run-to-run determinism).

use proptest::prelude::*;
use rstest::rstest;

use docparser::ast::{Node, NodeId, Tree, Visitor};
use docparser::parser::ParseRequest;
use docparser::testing::StaticTokenSource;
use docparser::token::{Token, TokenKind};
use docparser::{Config, Parser};

fn html_tag(name: &str, end_tag: bool, line: u32) -> Token {
    Token { name: name.to_string(), end_tag, ..Token::new(TokenKind::HtmlTag, line) }
}

#[derive(Debug, Clone, Copy)]
enum StyleEvent {
    Word,
    Open(u8),
    Close(u8),
    Break,
}

fn style_event_strategy() -> impl Strategy<Value = StyleEvent> {
    prop_oneof![
        3 => Just(StyleEvent::Word),
        2 => (0u8..2).prop_map(StyleEvent::Open),
        2 => (0u8..2).prop_map(StyleEvent::Close),
        1 => Just(StyleEvent::Break),
    ]
}

fn tag_name(idx: u8) -> &'static str {
    match idx {
        0 => "b",
        _ => "i",
    }
}

fn events_to_tokens(events: &[StyleEvent]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line = 1u32;
    for event in events {
        match event {
            StyleEvent::Word => tokens.push(Token::word("w", line)),
            StyleEvent::Open(i) => tokens.push(html_tag(tag_name(*i), false, line)),
            StyleEvent::Close(i) => tokens.push(html_tag(tag_name(*i), true, line)),
            StyleEvent::Break => tokens.push(Token::new(TokenKind::NewPara, line)),
        }
        line += 1;
    }
    tokens.push(Token::end(line));
    tokens
}

#[derive(Default)]
struct StyleCounter {
    enters: usize,
    leaves: usize,
}

impl Visitor for StyleCounter {
    fn visit_pre(&mut self, tree: &Tree, id: NodeId) {
        if let Node::StyleChange { enter, .. } = tree.kind(id) {
            if *enter {
                self.enters += 1;
            } else {
                self.leaves += 1;
            }
        }
    }
}

proptest! {
    /// P1: every `StyleChange(enter)` either has a matching `StyleChange(leave)`
    /// somewhere in the tree (a real close, or one synthesized at a paragraph
    /// break and reopened in the next) or is reported as an `UnmatchedStyleOpen`
    /// diagnostic at EOF — never both, never neither.
    #[test]
    fn p1_style_enters_balance_against_leaves_and_eof_diagnostics(
        events in prop::collection::vec(style_event_strategy(), 1..24)
    ) {
        let tokens = events_to_tokens(&events);
        let mut parser = Parser::new(Config::default());
        let mut src = StaticTokenSource::from_tokens(tokens);
        let tree = parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);

        let mut counter = StyleCounter::default();
        tree.accept(tree.root(), &mut counter);

        let diagnostics = parser.into_diagnostics();
        let unmatched = diagnostics
            .iter()
            .filter(|d| d.message.starts_with("end of block while expecting"))
            .count();

        prop_assert_eq!(counter.enters, counter.leaves + unmatched);
    }

    /// P4: an HTML table's recorded `num_columns` is the widest row actually
    /// seen, regardless of how many narrower rows came before or after it.
    #[test]
    fn p4_table_column_count_is_the_widest_row(
        widths in prop::collection::vec(1usize..6, 1..5)
    ) {
        let mut tokens = vec![html_tag("table", false, 1)];
        let mut line = 1u32;
        for &width in &widths {
            tokens.push(html_tag("tr", false, line));
            for _ in 0..width {
                tokens.push(html_tag("td", false, line));
                tokens.push(Token::word("x", line));
                tokens.push(html_tag("td", true, line));
            }
            tokens.push(html_tag("tr", true, line));
            line += 1;
        }
        tokens.push(html_tag("table", true, line));
        tokens.push(Token::end(line));

        let mut parser = Parser::new(Config::default());
        let mut src = StaticTokenSource::from_tokens(tokens);
        let tree = parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);

        let table = *tree
            .children(tree.root())
            .iter()
            .find(|n| matches!(tree.kind(**n), Node::HtmlTable { .. }))
            .expect("table node");
        let Node::HtmlTable { num_columns, .. } = tree.kind(table) else { unreachable!() };
        prop_assert_eq!(*num_columns, widths.iter().copied().max().unwrap());
    }

    /// P5: plain word/whitespace runs round-trip through `parse_text` and
    /// `TextCollector` as a single-space-joined string — no entity expansion
    /// or tag handling muddies a text-only run.
    #[test]
    fn p5_plain_word_runs_round_trip_through_text_collector(
        words in prop::collection::vec("[a-z]{1,8}", 1..12)
    ) {
        let mut tokens = Vec::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                tokens.push(Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 1) });
            }
            tokens.push(Token::word(word.clone(), 1));
        }
        tokens.push(Token::end(1));

        let mut parser = Parser::new(Config::default());
        let mut src = StaticTokenSource::from_tokens(tokens);
        let tree = parser.parse_text(&mut src);

        let mut collector = docparser::ast::visitor::TextCollector::default();
        tree.accept(tree.root(), &mut collector);
        prop_assert_eq!(collector.text, words.join(" "));
    }

    /// P2: leading whitespace at the start of a paragraph is suppressed —
    /// whatever the run of leading `WhiteSpace` tokens looks like, the
    /// paragraph's first child is never a `WhiteSpace` node.
    #[test]
    fn p2_leading_whitespace_is_never_retained(
        leading_spaces in 0usize..4,
        trailing_spaces in 1usize..4,
    ) {
        let mut tokens = Vec::new();
        for _ in 0..leading_spaces {
            tokens.push(Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 1) });
        }
        tokens.push(Token::word("w", 1));
        for _ in 0..trailing_spaces {
            tokens.push(Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 1) });
        }
        tokens.push(Token::word("x", 1));
        tokens.push(Token::end(1));

        let mut parser = Parser::new(Config::default());
        let mut src = StaticTokenSource::from_tokens(tokens);
        let tree = parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);

        let para = tree.children(tree.root())[0];
        let children = tree.children(para);
        prop_assert!(!children.is_empty());
        prop_assert!(!matches!(tree.kind(children[0]), Node::WhiteSpace { .. }));
    }

    /// P9: parsing the same token stream twice, independently, produces the
    /// same shape (by node-kind counts) and the same visible text — the
    /// parser carries no hidden state across calls.
    #[test]
    fn p9_parsing_is_deterministic_across_independent_runs(
        events in prop::collection::vec(style_event_strategy(), 1..24)
    ) {
        let tokens = events_to_tokens(&events);

        let run_once = |tokens: Vec<Token>| {
            let mut parser = Parser::new(Config::default());
            let mut src = StaticTokenSource::from_tokens(tokens);
            let tree = parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);
            let mut counter = docparser::ast::visitor::KindCounter::default();
            tree.accept(tree.root(), &mut counter);
            let mut collector = docparser::ast::visitor::TextCollector::default();
            tree.accept(tree.root(), &mut collector);
            (counter.counts, collector.text)
        };

        let first = run_once(tokens.clone());
        let second = run_once(tokens);
        prop_assert_eq!(first, second);
    }
}

/// P2 regression: a paragraph that opens with only a reopened style
/// (carried over a paragraph break) still suppresses the whitespace that
/// follows the reopen — `at_leading_position` must not stop being true just
/// because the paragraph already has one child.
#[test]
fn p2_leading_whitespace_after_reopened_style_is_also_suppressed() {
    let tokens = vec![
        Token::word("start", 1),
        html_tag("b", false, 1),
        Token::word("bold", 1),
        Token::new(TokenKind::NewPara, 2),
        Token { chars: " ".into(), ..Token::new(TokenKind::WhiteSpace, 3) },
        Token::word("after", 3),
        html_tag("b", true, 3),
        Token::end(3),
    ];
    let mut parser = Parser::new(Config::default());
    let mut src = StaticTokenSource::from_tokens(tokens);
    let tree = parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);

    let paras = tree.children(tree.root());
    assert_eq!(paras.len(), 2);
    let second = tree.children(paras[1]);
    // [StyleChange(enter), Word("after"), StyleChange(leave)] — no leading WhiteSpace.
    assert_eq!(second.len(), 3);
    assert!(matches!(tree.kind(second[0]), Node::StyleChange { enter: true, .. }));
    assert!(matches!(tree.kind(second[1]), Node::Word { text } if text == "after"));
    assert!(matches!(tree.kind(second[2]), Node::StyleChange { enter: false, .. }));
}

fn count_level_jump_diagnostics(commands: &[&str]) -> usize {
    let mut tokens = Vec::new();
    for (i, command) in commands.iter().enumerate() {
        let line = i as u32 + 1;
        tokens.push(Token::command(*command, line));
        tokens.push(Token::word(format!("id{i}"), line));
        tokens.push(Token::word(format!("Title{i}"), line));
        if i + 1 < commands.len() {
            tokens.push(Token::new(TokenKind::NewPara, line));
        }
    }
    tokens.push(Token::end(commands.len() as u32 + 1));

    let mut parser = Parser::new(Config::default());
    let mut src = StaticTokenSource::from_tokens(tokens);
    parser.parse_doc(ParseRequest { file: "a.h".into(), ..Default::default() }, &mut src);
    parser
        .into_diagnostics()
        .iter()
        .filter(|d| d.message.contains("skipping intermediate levels"))
        .count()
}

/// P3: a `\section`/`\subsection`/`\subsubsection`/`\paragraph` whose level is
/// more than one deeper than the previous section is flagged; stepping down,
/// staying level, or advancing by exactly one never is.
#[rstest]
#[case(&["section", "subsection"], 0)]
#[case(&["section", "subsubsection"], 1)]
#[case(&["section", "subsection", "paragraph"], 1)]
#[case(&["subsection"], 0)]
#[case(&["section", "subsection", "subsubsection", "paragraph"], 0)]
#[case(&["subsubsection", "section"], 0)]
fn p3_section_level_jumps_are_flagged_only_when_skipping(#[case] commands: &[&str], #[case] expected_jumps: usize) {
    assert_eq!(count_level_jump_diagnostics(commands), expected_jumps);
}
