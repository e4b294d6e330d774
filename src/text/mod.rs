pub mod normalize;
pub mod sentence;
pub mod tokenizer;

pub use normalize::normalize_word;
pub use sentence::{FALLBACK_CONTEXT_CHARS, find_sentence, split_sentences};
pub use tokenizer::{Token, is_word_like, tokenize, tokenize_article};
