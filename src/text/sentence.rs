// 找不到句子时回退使用的文档前缀长度（字符数）
pub const FALLBACK_CONTEXT_CHARS: usize = 200;

const TERMINATORS: [char; 4] = ['.', '!', '?', '…'];

// 在句末标点后的空白处断句（启发式，不追求语法准确）
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && prev.is_some_and(|p| TERMINATORS.contains(&p)) {
            if i > start {
                sentences.push(&text[start..i]);
            }
            // 跳过整段空白
            let mut end = i + c.len_utf8();
            while let Some(&(j, w)) = chars.peek() {
                if !w.is_whitespace() {
                    break;
                }
                end = j + w.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

// 返回第一个包含该单词（不区分大小写）的句子，找不到时返回文档前 200 个字符
pub fn find_sentence<'a>(document: &'a str, word: &str) -> &'a str {
    let needle = word.to_lowercase();
    split_sentences(document)
        .into_iter()
        .find(|s| s.to_lowercase().contains(&needle))
        .unwrap_or_else(|| prefix_chars(document, FALLBACK_CONTEXT_CHARS))
}

fn prefix_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_after_terminal_punctuation() {
        let text = "Я йду до банку. Там багато людей! Чому? Бо сьогодні… п'ятниця";
        assert_eq!(
            split_sentences(text),
            vec!["Я йду до банку.", "Там багато людей!", "Чому?", "Бо сьогодні…", "п'ятниця"]
        );
    }

    #[test]
    fn does_not_split_without_following_whitespace() {
        assert_eq!(split_sentences("v1.2 is out. Yes"), vec!["v1.2 is out.", "Yes"]);
    }

    #[test]
    fn collapses_whitespace_runs_and_newlines() {
        assert_eq!(split_sentences("One.\n\n  Two.  "), vec!["One.", "Two."]);
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn finds_sentence_case_insensitively() {
        let doc = "The river was calm. We sat on the Bank and waited.";
        assert_eq!(find_sentence(doc, "bank"), "We sat on the Bank and waited.");
    }

    #[test]
    fn returns_first_matching_sentence() {
        let doc = "A bank opened. Another bank closed.";
        assert_eq!(find_sentence(doc, "bank"), "A bank opened.");
    }

    #[test]
    fn falls_back_to_document_prefix() {
        let doc = "ї".repeat(300);
        let context = find_sentence(&doc, "банк");
        assert_eq!(context.chars().count(), FALLBACK_CONTEXT_CHARS);

        assert_eq!(find_sentence("Short text.", "missing"), "Short text.");
        assert_eq!(find_sentence("", "missing"), "");
    }

    proptest! {
        #[test]
        fn context_is_bounded_and_non_empty(doc in "\\PC{1,400}", word in "[a-zа-я]{1,8}") {
            let context = find_sentence(&doc, &word);
            prop_assert!(!context.is_empty() || doc.chars().all(char::is_whitespace));
            if !context.to_lowercase().contains(&word.to_lowercase()) {
                prop_assert!(context.chars().count() <= FALLBACK_CONTEXT_CHARS);
                prop_assert!(!context.is_empty());
            }
        }
    }
}
