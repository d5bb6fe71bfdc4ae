//! Transformer property tests
//!
//! Exercise the pure transformers through their public API only.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use textdesk::transform::{pattern, range, TextRange};

fn line_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-zé日 ]{0,8}", 1..6)
}

fn byte_at_col(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn zero_matches_leave_text_identical(text in "[a-z\n ]{0,64}") {
        let outcome = pattern::apply(&text, "[0-9]+", "N").unwrap();
        prop_assert_eq!(outcome.match_count, 0);
        prop_assert_eq!(outcome.text, text);
    }

    #[test]
    fn literal_pattern_matches_str_replace(
        text in "[abcx\n]{0,64}",
        needle in "[abc]{1,2}",
        replacement in "[xyz]{0,3}",
    ) {
        let outcome = pattern::apply(&text, &regex::escape(&needle), &replacement).unwrap();
        prop_assert_eq!(outcome.match_count, text.matches(needle.as_str()).count());
        prop_assert_eq!(outcome.text, text.replace(needle.as_str(), &replacement));
    }

    #[test]
    fn full_range_replaced_by_itself_is_identity(lines in line_strategy()) {
        let text = lines.join("\n");
        let result = range::apply(&text, &TextRange::full(&text), &text).unwrap();
        prop_assert_eq!(result, text);
    }

    #[test]
    fn range_replacement_keeps_prefix_and_suffix(
        lines in line_strategy(),
        picks in (any::<usize>(), any::<usize>(), any::<usize>(), any::<usize>()),
        replacement in "[A-Z]{0,4}",
    ) {
        let (a, b, c, d) = picks;
        let text = lines.join("\n");
        let count = lines.len();

        let start_line = a % count + 1;
        let end_line = start_line + b % (count - start_line + 1);
        let start_len = lines[start_line - 1].chars().count();
        let end_len = lines[end_line - 1].chars().count();
        let start_col = c % (start_len + 1) + 1;
        let min_end = if start_line == end_line { start_col - 1 } else { 0 };
        let end_col = min_end + d % (end_len - min_end + 1);

        let line_start = |line: usize| -> usize {
            lines[..line - 1].iter().map(|l| l.len() + 1).sum()
        };
        let start = line_start(start_line) + byte_at_col(&lines[start_line - 1], start_col - 1);
        let end = line_start(end_line) + byte_at_col(&lines[end_line - 1], end_col);

        let result = range::apply(
            &text,
            &TextRange::new(start_line, start_col, end_line, end_col),
            &replacement,
        )
        .unwrap();
        prop_assert_eq!(result, format!("{}{}{}", &text[..start], replacement, &text[end..]));
    }
}
