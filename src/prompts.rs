use crate::cache::CacheKey;
use crate::models::ArticleRequest;

pub const JSON_ONLY_SYSTEM_PROMPT: &str = "Return valid JSON only. No markdown fences.";

// 文章生成提示词
pub fn build_article_prompt(req: &ArticleRequest) -> String {
    let language = &req.language;
    let level = &req.level;
    format!(
        r#"
You are a helpful language tutor and writer.

Write an original article in {language} at roughly {level} reading level.
Topics/interests: {topics}.
Length: {length}.
Style: {style}.

Requirements:
- Output must be in {language} (except vocab glosses if requested).
- Use vocabulary appropriate to {level}. Avoid overly advanced constructions.
- Use short paragraphs and a title.

If includeVocab=true, include a "Vocabulary" section with 10-15 key words/phrases from the article + English gloss.
If includeQuestions=true, include 5 comprehension questions in {language}.
includeVocab={include_vocab}
includeQuestions={include_questions}

Return as JSON with keys:
{{ "title": "...", "article": "...", "vocabulary": [{{"term":"...","gloss":"..."}}], "questions":[...] }}
If vocab/questions not requested, return empty arrays.
"#,
        topics = req.topics_or_default(),
        length = req.length_or_default(),
        style = req.style_or_default(),
        include_vocab = req.include_vocab,
        include_questions = req.include_questions,
    )
    .trim()
    .to_string()
}

// 单词信息提示词
pub fn build_word_info_prompt(key: &CacheKey) -> String {
    let level = if key.level.trim().is_empty() { "unknown" } else { key.level.as_str() };
    format!(
        r#"
You are a linguistics helper for language learners.

Given:
- language: {language}
- learner level: {level}
- clicked word: "{word}"
- sentence context: "{sentence}"

Return valid JSON only with:
{{
  "surface": "...",
  "lemma": "...",
  "pos": "...",
  "definition_en": "...",
  "morphology": {{
    "case": null | "nominative" | "genitive" | "dative" | "accusative" | "instrumental" | "locative" | "vocative",
    "number": null | "singular" | "plural",
    "gender": null | "masculine" | "feminine" | "neuter",
    "tense": null | "past" | "present" | "future",
    "aspect": null | "perfective" | "imperfective",
    "person": null | "1" | "2" | "3"
  }},
  "notes": "1-2 short sentences for the learner"
}}

Rules:
- If language is not Ukrainian or morphology is not applicable, keep fields as null.
- If the clicked token is punctuation or not a real word, still return JSON but set pos="punctuation" and definition_en="".
- If uncertain, be honest in notes and keep morphology fields null.
"#,
        language = key.language,
        word = key.word,
        sentence = key.sentence,
    )
    .trim()
    .to_string()
}
