// src/chunk.rs

//! Description chunking and tokenization.
//!
//! Long descriptions cannot be tokenized in one pass under the per-unit
//! token budget, so the text is split into consecutive word-count chunks
//! and each chunk is tokenized independently. Chunk boundaries never
//! reorder words; concatenating the per-chunk token sequences preserves
//! original text order.

use crate::error::{AppError, Result};

/// Tokenizer capability injected into the preprocessing stage.
pub trait TextTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

/// HuggingFace tokenizer wrapper.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load a pretrained tokenizer by model name.
    pub fn from_pretrained(model: &str) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_pretrained(model, None)
            .map_err(|e| AppError::tokenize(format!("loading {model}: {e}")))?;
        Ok(Self { inner })
    }
}

impl TextTokenizer for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| AppError::tokenize(e))?;
        Ok(encoding.get_tokens().to_vec())
    }
}

/// Cheap token-count estimate avoiding a tokenizer pass: one token per
/// three characters.
pub fn estimate_token_count(text: &str) -> usize {
    text.chars().count() / 3
}

/// Words per chunk for a given token budget: two tokens budgeted per word,
/// then a 10% safety margin.
pub fn words_per_chunk(max_tokens: usize) -> usize {
    ((max_tokens / 2) as f64 * 0.9) as usize
}

/// Split text into consecutive chunks of `words_per_chunk` whitespace-
/// delimited words. No overlap; the last chunk may be shorter.
pub fn chunk_by_word_count(text: &str, words_per_chunk: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(words_per_chunk)
        .map(|chunk| chunk.join(" "))
        .collect()
}

/// Tokenize text under a per-pass token budget.
///
/// If the estimate fits the budget the whole text is tokenized once;
/// otherwise each word-count chunk is tokenized independently and the
/// sequences are concatenated in original order.
pub fn tokenize_bounded(
    tokenizer: &dyn TextTokenizer,
    text: &str,
    max_tokens: usize,
) -> Result<Vec<String>> {
    let estimated = estimate_token_count(text);
    if estimated <= max_tokens {
        return tokenizer.tokenize(text);
    }

    let per_chunk = words_per_chunk(max_tokens);
    if per_chunk == 0 {
        return Err(AppError::validation(format!(
            "token budget {max_tokens} leaves no room for even one word per chunk"
        )));
    }

    let chunks = chunk_by_word_count(text, per_chunk);
    log::debug!(
        "Text estimated at {} tokens exceeds budget {}, dividing into {} chunks of {} words",
        estimated,
        max_tokens,
        chunks.len(),
        per_chunk
    );

    let mut all_tokens = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let tokens = tokenizer.tokenize(chunk)?;
        if tokens.len() > max_tokens {
            log::warn!(
                "Chunk {} produced {} tokens, exceeding the budget of {}",
                index + 1,
                tokens.len(),
                max_tokens
            );
        }
        all_tokens.extend(tokens);
    }

    Ok(all_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Splits on whitespace and counts invocations.
    struct WhitespaceTokenizer {
        calls: Mutex<usize>,
    }

    impl WhitespaceTokenizer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl TextTokenizer for WhitespaceTokenizer {
        fn tokenize(&self, text: &str) -> Result<Vec<String>> {
            *self.calls.lock().unwrap() += 1;
            Ok(text.split_whitespace().map(str::to_string).collect())
        }
    }

    fn text_of_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_estimate_is_chars_over_three() {
        assert_eq!(estimate_token_count(""), 0);
        assert_eq!(estimate_token_count("abcdef"), 2);
        assert_eq!(estimate_token_count("abcdefg"), 2);
    }

    #[test]
    fn test_words_per_chunk_applies_margin() {
        assert_eq!(words_per_chunk(512), 230);
        assert_eq!(words_per_chunk(100), 45);
        assert_eq!(words_per_chunk(4), 1);
        assert_eq!(words_per_chunk(2), 0);
    }

    #[test]
    fn test_chunk_reconstruction_is_lossless() {
        let text = text_of_words(1200);
        let chunks = chunk_by_word_count(&text, 230);

        assert_eq!(chunks.len(), 6);
        assert_eq!(chunks[5].split_whitespace().count(), 50);
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_short_text_tokenized_in_one_pass() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens = tokenize_bounded(&tokenizer, "just a few words", 512).unwrap();

        assert_eq!(tokens, vec!["just", "a", "few", "words"]);
        assert_eq!(tokenizer.calls(), 1);
    }

    #[test]
    fn test_long_text_tokenized_per_chunk() {
        // 1200 six-or-more-char words: the estimate far exceeds 512 tokens.
        let text = text_of_words(1200);
        let tokenizer = WhitespaceTokenizer::new();
        let tokens = tokenize_bounded(&tokenizer, &text, 512).unwrap();

        // One call per chunk, order preserved across chunk seams.
        assert_eq!(tokenizer.calls(), 6);
        assert_eq!(tokens.len(), 1200);
        assert_eq!(tokens[0], "word0");
        assert_eq!(tokens[229], "word229");
        assert_eq!(tokens[230], "word230");
        assert_eq!(tokens[1199], "word1199");
    }

    #[test]
    fn test_total_tokens_equal_sum_of_chunks() {
        let text = text_of_words(500);
        let per_chunk = words_per_chunk(128);
        let chunks = chunk_by_word_count(&text, per_chunk);

        let tokenizer = WhitespaceTokenizer::new();
        let total = tokenize_bounded(&tokenizer, &text, 128).unwrap().len();
        let sum: usize = chunks
            .iter()
            .map(|c| c.split_whitespace().count())
            .sum();
        assert_eq!(total, sum);
    }

    #[test]
    fn test_zero_capacity_budget_is_rejected() {
        // A budget of 2 estimates over for any 7+ char text and chunks to 0.
        let tokenizer = WhitespaceTokenizer::new();
        let result = tokenize_bounded(&tokenizer, "something long enough", 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_text_yields_no_tokens() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens = tokenize_bounded(&tokenizer, "", 512).unwrap();
        assert!(tokens.is_empty());
    }
}
