//! Property tests: the parser is total, deterministic, and respects its
//! structural invariants on arbitrary input.

use blockmark::{Options, Token, parse_blocks, parse_blocks_with_options};
use proptest::prelude::*;

/// Deepest chain of nested block quotes anywhere in the tree.
fn quote_depth(token: &Token<()>) -> usize {
    match token {
        Token::BlockQuote { children } => {
            1 + children.iter().map(quote_depth).max().unwrap_or(0)
        }
        _ => token
            .children()
            .map(|c| c.iter().map(quote_depth).max().unwrap_or(0))
            .unwrap_or(0),
    }
}

proptest! {
    #[test]
    fn parse_never_panics(input in "(?s).{0,400}") {
        let _ = parse_blocks::<()>(&input);
    }

    #[test]
    fn parse_is_deterministic(input in "(?s).{0,400}") {
        let first = parse_blocks::<()>(&input).into_parts();
        let second = parse_blocks::<()>(&input).into_parts();
        prop_assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn options_never_panic(input in "[a-z>#` \n-]{0,200}", max in 1usize..5) {
        let options = Options {
            max_nested_level: max,
            ..Options::default()
        };
        let _ = parse_blocks_with_options::<()>(&input, options);
    }

    /// With no block markers in the alphabet, the output is an alternation
    /// of paragraphs and blank lines, and the paragraphs reproduce the
    /// non-blank line runs of the input exactly.
    #[test]
    fn plain_lines_round_trip(input in "[a-z\n]{0,300}") {
        let (tokens, _env) = parse_blocks::<()>(&input).into_parts();

        let mut expected: Vec<String> = Vec::new();
        let mut run = String::new();
        for line in input.split_inclusive('\n') {
            if line == "\n" {
                if !run.is_empty() {
                    expected.push(std::mem::take(&mut run));
                }
            } else {
                run.push_str(line);
            }
        }
        if !run.is_empty() {
            expected.push(run);
        }

        let mut got: Vec<&str> = Vec::new();
        for token in &tokens {
            match token {
                Token::Paragraph { content } => {
                    got.push(content.as_text().unwrap_or_default());
                }
                Token::BlankLine => {}
                other => prop_assert!(false, "unexpected token {other:?}"),
            }
        }
        prop_assert_eq!(got, expected);

        // runs collapse, so two alike tokens never sit side by side
        for pair in tokens.windows(2) {
            let same = matches!(
                (&pair[0], &pair[1]),
                (Token::Paragraph { .. }, Token::Paragraph { .. })
                    | (Token::BlankLine, Token::BlankLine)
            );
            prop_assert!(!same, "adjacent twin tokens: {pair:?}");
        }
    }

    /// Quote nesting stops at the configured cap no matter how many
    /// markers the input stacks up.
    #[test]
    fn quote_nesting_is_bounded(input in "[>a \n]{0,300}") {
        let (tokens, _env) = parse_blocks::<()>(&input).into_parts();
        let deepest = tokens.iter().map(quote_depth).max().unwrap_or(0);
        prop_assert!(deepest <= 6, "nested {deepest} levels: {tokens:?}");
    }

    /// The walk yields exactly one (transformed) token per top-level token.
    #[test]
    fn walk_preserves_top_level_shape(input in "(?s).{0,300}") {
        let doc = parse_blocks::<String>(&input);
        let top = doc.tokens().len();
        let walked = doc.into_tokens(|text, _env| vec![text.to_string()]);
        prop_assert_eq!(walked.len(), top);
    }
}
