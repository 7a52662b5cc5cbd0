use std::collections::HashMap;
use anyhow::Result;
pub use tiktoken_rs::{get_bpe_from_model, CoreBPE};

use crate::utils::token::{BudgetTokens, CountToken, TrimmedText};
use lazy_static::lazy_static;

lazy_static! {
    /// const map from model name to max tokens.
    /// TODO: when `LazyCell` is stabilized, use that instead
    pub static ref MODEL_TO_MAX_TOKENS: HashMap<&'static str, usize> = HashMap::from([
        ("gpt-4", 8192),
        ("gpt-4-0613", 8192),
        ("gpt-4-turbo", 128000),
        ("gpt-4-32k", 32768),
        ("gpt-4-32k-0613", 32768),
        ("gpt-3.5-turbo", 4096),
        ("gpt-3.5-turbo-16k", 16384),
        ("gpt-3.5-turbo-0613", 4096),
        ("gpt-3.5-turbo-16k-0613", 16384),
    ]);
}

/// Tokenizer using the Tiktoken BPE for a given model.
#[derive(Clone)]
#[readonly::make]
pub struct Tiktoken {
    /// The model name of the tokenizer. read-only.
    pub model: String,
    /// The tokenizer. read-only.
    pub bpe: CoreBPE,
}

impl Tiktoken {
    /// Create a new Tiktoken tokenizer for an API model id.
    /// Returns an error if the model is not in [MODEL_TO_MAX_TOKENS].
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        if !MODEL_TO_MAX_TOKENS.contains_key(model.as_str()) {
            anyhow::bail!("model {} is not supported", model);
        }
        // the BPE is resolved by model family; the validated id is kept so max_tokens()
        // reports the ceiling of the exact model
        let family = if model.starts_with("gpt-4-32k") {
            "gpt-4-32k"
        } else if model.starts_with("gpt-4") {
            "gpt-4"
        } else {
            "gpt-3.5-turbo"
        };
        get_bpe_from_model(family).map(|bpe| Tiktoken { model, bpe })
    }

    /// The maximum context size of the model this tokenizer was built for.
    pub fn max_tokens(&self) -> usize {
        *MODEL_TO_MAX_TOKENS.get(self.model.as_str()).unwrap()
    }
}

impl CountToken for Tiktoken {
    fn count_token(&self, string: &str) -> usize {
        self.bpe.encode_with_special_tokens(string).len()
    }
}

impl BudgetTokens for Tiktoken {
    fn trim_to_budget(&self, text: &str, max_tokens: usize) -> Result<TrimmedText> {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= max_tokens {
            return Ok(TrimmedText {
                text: text.to_string(),
                token_count: tokens.len(),
                truncated: false,
            });
        }
        let kept = tokens[..max_tokens].to_vec();
        let text = self.bpe.decode(kept)?;
        Ok(TrimmedText {
            text,
            token_count: max_tokens,
            truncated: true,
        })
    }
}

#[cfg(test)]
mod test_tiktoken {
    use crate::utils::token::{BudgetTokens, CountToken};
    use super::Tiktoken;

    #[test]
    fn test_unknown_model_is_an_error() {
        assert!(Tiktoken::new("text-davinci-003").is_err());
    }

    #[test]
    fn test_max_tokens_matches_table_for_exact_model() {
        use super::MODEL_TO_MAX_TOKENS;
        let tokenizer = Tiktoken::new("gpt-4-turbo").unwrap();
        assert_eq!("gpt-4-turbo", tokenizer.model);
        assert_eq!(MODEL_TO_MAX_TOKENS["gpt-4-turbo"], tokenizer.max_tokens());

        let tokenizer = Tiktoken::new("gpt-3.5-turbo-16k").unwrap();
        assert_eq!(16384, tokenizer.max_tokens());
    }

    #[test]
    fn test_count_and_trim_within_budget() {
        let tokenizer = Tiktoken::new("gpt-3.5-turbo").unwrap();
        let text = "Hello world";
        let count = tokenizer.count_token(text);
        let trimmed = tokenizer.trim_to_budget(text, count + 5).unwrap();
        assert_eq!(trimmed.text, text);
        assert_eq!(trimmed.token_count, count);
        assert!(!trimmed.truncated);
    }

    #[test]
    fn test_trim_over_budget_hits_cap_exactly() {
        let tokenizer = Tiktoken::new("gpt-3.5-turbo").unwrap();
        // plenty of tokens: one word per token at minimum
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa \
                    lambda mu nu xi omicron pi rho sigma tau upsilon";
        assert!(tokenizer.count_token(text) > 10);
        let trimmed = tokenizer.trim_to_budget(text, 10).unwrap();
        assert!(trimmed.truncated);
        assert_eq!(trimmed.token_count, 10);
        assert!(text.starts_with(&trimmed.text));
        assert!(trimmed.text.len() < text.len());
    }
}
