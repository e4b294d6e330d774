//! 模型输出的 JSON 修复（尽力而为）

use serde::de::DeserializeOwned;

/// 去掉 markdown 代码块标记，截取第一个 `{` 到最后一个 `}` 之间的内容
pub fn extract_json_object(content: &str) -> &str {
    let trimmed = strip_code_fence(content.trim());
    let json_start = trimmed.find('{').unwrap_or(0);
    let json_end = trimmed.rfind('}').map(|i| i + 1).unwrap_or(trimmed.len());
    if json_start < json_end {
        &trimmed[json_start..json_end]
    } else {
        trimmed
    }
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // 跳过语言标记（```json）
    let body = rest.find('\n').map(|i| &rest[i + 1..]).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// 先按原文解析，失败后再解析截取出的 JSON 对象
pub fn parse_model_json<T: DeserializeOwned>(content: &str) -> Result<T, serde_json::Error> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            let extracted = extract_json_object(content);
            if extracted == content {
                return Err(first_error);
            }
            serde_json::from_str(extracted)
        }
    }
}
