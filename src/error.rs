use thiserror::Error;

// 单词查询失败的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("网络请求失败: {0}")]
    Network(String),

    #[error("查询请求失败 (状态码: {status}): {body}")]
    Status { status: u16, body: String },

    #[error("响应格式无效: {0}")]
    Malformed(String),

    #[error("查询服务错误: {0}")]
    Service(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LookupError::Malformed(e.to_string())
        } else {
            LookupError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::Malformed(e.to_string())
    }
}
