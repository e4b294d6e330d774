use serde::{Deserialize, Deserializer, Serialize};

// 单词注释（点击单词后显示的信息）
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WordAnnotation {
    pub surface: String,
    pub lemma: String,
    pub pos: String,
    pub definition_en: String,
    pub morphology: Morphology,
    pub notes: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Morphology {
    #[serde(deserialize_with = "lenient_string")]
    pub case: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub tense: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub aspect: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub person: Option<String>,
}

impl Morphology {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }

    /// 按固定顺序列出所有形态字段
    pub fn fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("case", self.case.as_deref()),
            ("number", self.number.as_deref()),
            ("gender", self.gender.as_deref()),
            ("tense", self.tense.as_deref()),
            ("aspect", self.aspect.as_deref()),
            ("person", self.person.as_deref()),
        ]
    }
}

impl WordAnnotation {
    /// 查询失败时的降级注释
    pub fn degraded(word: &str, reason: impl std::fmt::Display) -> Self {
        let mut notes = reason.to_string();
        if notes.trim().is_empty() {
            notes = "查询失败".to_string();
        }
        WordAnnotation {
            surface: word.to_string(),
            lemma: word.to_string(),
            pos: "unknown".to_string(),
            definition_en: String::new(),
            morphology: Morphology::default(),
            notes,
        }
    }
}

// 模型有时会把 person 写成数字 3，有时写成 "3"
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// 文章生成请求（同时也是阅读器的设置）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub include_vocab: bool,
    #[serde(default)]
    pub include_questions: bool,
}

impl Default for ArticleRequest {
    fn default() -> Self {
        Self {
            language: "Ukrainian".to_string(),
            level: "B1".to_string(),
            topics: Some("startups, travel, running".to_string()),
            length: Some("medium".to_string()),
            style: Some("simple, vivid, natural".to_string()),
            include_vocab: true,
            include_questions: true,
        }
    }
}

fn non_empty<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

impl ArticleRequest {
    pub fn topics_or_default(&self) -> &str {
        non_empty(&self.topics, "general")
    }

    pub fn length_or_default(&self) -> &str {
        non_empty(&self.length, "medium")
    }

    pub fn style_or_default(&self) -> &str {
        non_empty(&self.style, "clear, engaging, natural")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Article {
    pub title: String,
    pub article: String,
    pub vocabulary: Vec<VocabEntry>,
    pub questions: Vec<String>,
}

impl Article {
    /// 模型输出无法解析时，把原文整体当作文章正文
    pub fn from_raw_text(text: &str) -> Self {
        Article {
            article: text.to_string(),
            ..Article::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct VocabEntry {
    pub term: String,
    pub gloss: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WordInfoRequest {
    pub language: String,
    pub level: Option<String>,
    pub word: String,
    pub sentence: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SpeechRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_parses_wire_format() {
        let json = r#"{
            "surface": "банку",
            "lemma": "банк",
            "pos": "noun",
            "definition_en": "bank",
            "morphology": {"case": "accusative", "number": "singular", "gender": "masculine",
                           "tense": null, "aspect": null, "person": 3},
            "notes": "Accusative after a verb of motion."
        }"#;
        let ann: WordAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.lemma, "банк");
        assert_eq!(ann.morphology.case.as_deref(), Some("accusative"));
        assert_eq!(ann.morphology.tense, None);
        assert_eq!(ann.morphology.person.as_deref(), Some("3"));
    }

    #[test]
    fn annotation_tolerates_missing_fields() {
        let ann: WordAnnotation = serde_json::from_str(r#"{"surface": "ciao"}"#).unwrap();
        assert_eq!(ann.surface, "ciao");
        assert!(ann.definition_en.is_empty());
        assert!(ann.morphology.is_empty());
    }

    #[test]
    fn degraded_annotation_shape() {
        let ann = WordAnnotation::degraded("тест", "网络请求失败: timeout");
        assert_eq!(ann.surface, "тест");
        assert_eq!(ann.lemma, "тест");
        assert_eq!(ann.pos, "unknown");
        assert_eq!(ann.definition_en, "");
        assert!(ann.morphology.is_empty());
        assert!(!ann.notes.is_empty());
    }

    #[test]
    fn degraded_annotation_never_has_empty_notes() {
        let ann = WordAnnotation::degraded("x", "");
        assert!(!ann.notes.is_empty());
    }

    #[test]
    fn article_request_uses_camel_case_and_fallbacks() {
        let req: ArticleRequest = serde_json::from_str(
            r#"{"language": "Italian", "level": "A2", "topics": "", "includeVocab": true}"#,
        )
        .unwrap();
        assert!(req.include_vocab);
        assert!(!req.include_questions);
        assert_eq!(req.topics_or_default(), "general");
        assert_eq!(req.length_or_default(), "medium");
        assert_eq!(req.style_or_default(), "clear, engaging, natural");

        let json = serde_json::to_value(ArticleRequest::default()).unwrap();
        assert_eq!(json["includeQuestions"], true);
    }
}
