//! Token estimation and budget-bounded truncation.
//!
//! Model inputs are metered in tokens, but the pipeline works with plain
//! text. The estimator here is a cheap proxy: characters outside ASCII
//! (Japanese review text, mostly) cost about one token each, ASCII text
//! about one token per four characters. The estimate is monotonically
//! non-decreasing in prefix length, which is what makes the binary search
//! in [`truncate_to_token_budget`] correct.

/// Approximate the token cost of `text`.
///
/// Counts characters with a code point above 127 at one token each and the
/// remaining characters at a quarter token each (integer division).
pub fn estimate_tokens(text: &str) -> usize {
    let wide = text.chars().filter(|c| (*c as u32) > 127).count();
    let ascii = text.chars().count() - wide;
    wide + ascii / 4
}

/// Truncate `text` to the longest prefix whose estimate fits `max_tokens`.
///
/// Returns the input unchanged when it is already within budget. Otherwise
/// binary-searches over the character prefix length, using
/// [`estimate_tokens`] as the predicate. Truncation happens on character
/// boundaries, never mid-codepoint.
pub fn truncate_to_token_budget(text: &str, max_tokens: usize) -> &str {
    if estimate_tokens(text) <= max_tokens {
        return text;
    }

    // Prefix sums let the search evaluate any prefix in O(1).
    let mut byte_ends = Vec::new();
    let mut wide_counts = Vec::new();
    let mut wide_so_far = 0usize;
    for (offset, c) in text.char_indices() {
        if (c as u32) > 127 {
            wide_so_far += 1;
        }
        byte_ends.push(offset + c.len_utf8());
        wide_counts.push(wide_so_far);
    }

    let estimate_prefix = |chars: usize| -> usize {
        if chars == 0 {
            return 0;
        }
        let wide = wide_counts[chars - 1];
        wide + (chars - wide) / 4
    };

    let mut low = 0usize;
    let mut high = byte_ends.len();
    while low < high {
        let mid = (low + high + 1) / 2;
        if estimate_prefix(mid) <= max_tokens {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    if low == 0 {
        ""
    } else {
        &text[..byte_ends[low - 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ascii_counts_quarter_token_per_char() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefg"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }

    #[test]
    fn wide_chars_count_one_token_each() {
        assert_eq!(estimate_tokens("日本語"), 3);
        // 3 wide + 4 ascii
        assert_eq!(estimate_tokens("日本語test"), 4);
    }

    #[test]
    fn empty_text_is_free() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(truncate_to_token_budget("", 0), "");
    }

    #[test]
    fn within_budget_is_identity() {
        let text = "a short review";
        assert_eq!(truncate_to_token_budget(text, 100), text);
    }

    #[test]
    fn zero_budget_keeps_only_free_prefix() {
        // Three ASCII chars estimate to zero tokens, so they survive a
        // zero budget; a wide char does not.
        let truncated = truncate_to_token_budget("日本語", 0);
        assert_eq!(truncated, "");
        let ascii = truncate_to_token_budget("abcdefgh", 0);
        assert!(estimate_tokens(ascii) == 0);
    }

    #[test]
    fn truncation_lands_on_char_boundary() {
        let text = "五キロ走のテストで感触を確かめた";
        let truncated = truncate_to_token_budget(text, 5);
        assert_eq!(truncated.chars().count(), 5);
        assert!(text.starts_with(truncated));
    }

    proptest! {
        #[test]
        fn truncated_estimate_never_exceeds_budget(
            text in ".{0,400}",
            budget in 0usize..2000,
        ) {
            let truncated = truncate_to_token_budget(&text, budget);
            prop_assert!(estimate_tokens(truncated) <= budget);
            prop_assert!(text.starts_with(truncated));
        }

        #[test]
        fn noop_when_already_within_budget(text in ".{0,400}") {
            let budget = estimate_tokens(&text);
            prop_assert_eq!(truncate_to_token_budget(&text, budget), text.as_str());
        }

        #[test]
        fn result_is_longest_fitting_prefix(
            text in "[a-zあいうえお]{1,120}",
            budget in 0usize..100,
        ) {
            let truncated = truncate_to_token_budget(&text, budget);
            if truncated.len() < text.len() {
                // Adding one more character must break the budget.
                let next = text[truncated.len()..].chars().next().unwrap();
                let mut longer = truncated.to_string();
                longer.push(next);
                prop_assert!(estimate_tokens(&longer) > budget);
            }
        }
    }
}
