use anyhow::Error as AnyError;
use dropbox_http::{ResponseError, StatusCode};
use serde::Deserialize;
use serde_json::{Error as JsonError, Value};
use std::fmt::{self, Display};
use thiserror::Error;

/// API 调用错误
///
/// 每次调用只会返回其中一种错误
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// 序列化请求参数失败，未发送任何请求
    #[error("Failed to encode request input: {0}")]
    Encode(#[source] JsonError),

    /// 构建请求失败，未发送任何请求
    #[error("Failed to build request: {0}")]
    Build(#[source] AnyError),

    /// HTTP 传输失败
    #[error("Transport error: {0}")]
    Transport(#[from] ResponseError),

    /// 服务器返回的错误响应体无法解析
    #[error("Failed to decode response body with status code {status_code}: {source}")]
    Decode {
        /// HTTP 状态码
        status_code: u16,
        /// 解析错误
        #[source]
        source: JsonError,
        /// 响应体样本
        body_sample: Vec<u8>,
    },

    /// 服务器返回的 API 错误
    #[error(transparent)]
    Api(#[from] ApiError),

    /// 调用被取消
    #[error("Request was canceled")]
    Canceled,
}

impl Error {
    /// 使用错误信息创建构建请求失败的错误
    #[inline]
    pub(crate) fn build_with_msg(msg: impl Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Build(AnyError::msg(msg))
    }

    /// 是否为服务器返回的 API 错误
    #[inline]
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// 获取服务器返回的 API 错误
    #[inline]
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// 调用是否被取消
    #[inline]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// 获取响应体样本
    #[inline]
    pub fn body_sample(&self) -> Option<&[u8]> {
        match self {
            Self::Decode { body_sample, .. } => Some(body_sample),
            _ => None,
        }
    }
}

/// 服务器返回的 API 错误
///
/// 状态码大于等于 400 的响应都会被转换为该错误，
/// 其中 409 通常用于携带具体接口定义的业务错误，可以通过 [`ApiError::error`] 进一步解析。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{status_code} {status}] {summary}")]
pub struct ApiError {
    status: String,
    status_code: u16,
    summary: String,
    error: Option<Value>,
}

impl ApiError {
    pub(crate) fn new(status_code: StatusCode, summary: String, error: Option<Value>) -> Self {
        Self {
            status: status_code.canonical_reason().unwrap_or_default().to_owned(),
            status_code: status_code.as_u16(),
            summary,
            error,
        }
    }

    /// 获取 HTTP 状态描述
    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// 获取 HTTP 状态码
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// 获取错误摘要
    #[inline]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// 获取错误详情
    ///
    /// 纯文本错误响应没有错误详情
    #[inline]
    pub fn error(&self) -> Option<&Value> {
        self.error.as_ref()
    }

    /// 转换为错误详情
    #[inline]
    pub fn into_error(self) -> Option<Value> {
        self.error
    }
}

/// JSON 格式的错误响应体
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ErrorDocument {
    #[serde(default)]
    pub(crate) error_summary: String,
    #[serde(default)]
    pub(crate) error: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_carries_status_text() {
        let err = ApiError::new(StatusCode::CONFLICT, "path/not_found/".to_owned(), None);
        assert_eq!(err.status(), "Conflict");
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.summary(), "path/not_found/");
        assert_eq!(err.to_string(), "[409 Conflict] path/not_found/");

        let err = Error::from(err);
        assert!(err.is_api_error());
        assert_eq!(err.as_api_error().map(|err| err.status_code()), Some(409));
    }

    #[test]
    fn test_decode_error_document_with_missing_fields() -> anyhow::Result<()> {
        let document: ErrorDocument = serde_json::from_str(r#"{"error":{".tag":"other"}}"#)?;
        assert_eq!(document.error_summary, "");
        assert_eq!(document.error, Some(serde_json::json!({".tag": "other"})));

        let document: ErrorDocument = serde_json::from_str("{}")?;
        assert!(document.error.is_none());
        Ok(())
    }
}
