//! Token counting and budget trimming traits

use anyhow::Result;

pub mod tiktoken;

/// Trait for counting tokens in a string.
pub trait CountToken {
    fn count_token(&self, string: &str) -> usize;
}

/// Blanket impl of CountToken for Fn(&str) -> usize.
impl<F> CountToken for F where F: Fn(&str) -> usize {
    fn count_token(&self, string: &str) -> usize {
        self(string)
    }
}

/// Count the number of tokens in a string by the length of the string.
#[inline]
pub fn count_tokens_by_len(string: &str) -> usize {
    string.len()
}

/// Outcome of trimming a text to a token budget.
///
/// Invariant: `truncated` implies `token_count == cap` for the cap the text was trimmed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedText {
    pub text: String,
    pub token_count: usize,
    pub truncated: bool,
}

/// Trait for tokenizers that can cut a text down to a token budget.
///
/// Trimming operates on the tokenized representation, not on raw characters, so the
/// shortened text never ends mid-token.
pub trait BudgetTokens: CountToken {
    /// Trim `text` so that it holds at most `max_tokens` tokens.
    ///
    /// Text already within the budget is returned unchanged with `truncated == false`.
    /// Otherwise the token sequence is cut to exactly `max_tokens` and decoded back,
    /// with `truncated == true`.
    fn trim_to_budget(&self, text: &str, max_tokens: usize) -> Result<TrimmedText>;
}

#[cfg(test)]
mod test_token {
    use super::CountToken;

    #[test]
    fn test_str_len_impl() {
        let counter = str::len;
        let size = counter.count_token("");
        assert_eq!(0, size);
    }
}
