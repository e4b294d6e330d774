use once_cell::sync::Lazy;
use regex::Regex;

// 单词：字母/组合符号/数字，内部可用撇号或连字符连接（don't、well-known）
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+|[\p{L}\p{M}\p{N}]+(?:['’\-‐][\p{L}\p{M}\p{N}]+)*|[^\s\p{L}\p{M}\p{N}]+")
        .expect("token pattern is valid")
});

static LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").expect("letter pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub word_like: bool,
}

// 至少包含一个 Unicode 字母即视为单词
pub fn is_word_like(token: &str) -> bool {
    LETTER_RE.is_match(token)
}

pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .find_iter(line)
        .map(|m| Token {
            text: m.as_str(),
            word_like: is_word_like(m.as_str()),
        })
        .collect()
}

// 按行分词，每一行对应渲染时的一个段落
pub fn tokenize_article(text: &str) -> Vec<Vec<Token<'_>>> {
    text.split('\n').map(tokenize).collect()
}
