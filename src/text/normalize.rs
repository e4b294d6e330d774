use once_cell::sync::Lazy;
use regex::Regex;

static STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{M}'’\-]").expect("strip pattern is valid"));

// 去掉字母、组合符号、撇号、连字符以外的所有字符；结果为空时返回 `None`
pub fn normalize_word(raw: &str) -> Option<String> {
    let word = STRIP_RE.replace_all(raw, "");
    if word.is_empty() {
        None
    } else {
        Some(word.into_owned())
    }
}
