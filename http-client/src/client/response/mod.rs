mod error;

use dropbox_http::{HeaderMap, ResponseError, ResponseErrorKind, StatusCode, SyncResponse, SyncResponseBody};
use serde::de::DeserializeOwned;
use std::{
    io::{Error as IoError, Read, Result as IoResult},
    mem::take,
};

pub use error::{ApiError, Error};
pub(super) use error::ErrorDocument;

/// API 调用结果
pub type ApiResult<T> = Result<T, Error>;

/// 错误样本的最大长度
pub(super) const RESPONSE_BODY_SAMPLE_LEN_LIMIT: usize = 1024;

/// API 调用成功的响应
///
/// 响应体的所有权转移给调用者，调用者负责读取并释放
#[derive(Debug)]
pub struct ApiResponse {
    status_code: StatusCode,
    headers: HeaderMap,
    content_length: i64,
    body: SyncResponseBody,
}

impl ApiResponse {
    pub(super) fn new(mut response: SyncResponse) -> Self {
        let status_code = response.status_code();
        let content_length = response.content_length();
        let headers = take(response.headers_mut());
        Self {
            status_code,
            headers,
            content_length,
            body: response.into_body(),
        }
    }

    /// 获取 HTTP 状态码
    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// 获取 HTTP Headers
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 获取响应体长度
    ///
    /// 长度未知时返回 `-1`
    #[inline]
    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    /// 获取响应体的可变引用
    #[inline]
    pub fn body_mut(&mut self) -> &mut SyncResponseBody {
        &mut self.body
    }

    /// 转换为响应体
    #[inline]
    pub fn into_body(self) -> SyncResponseBody {
        self.body
    }

    /// 读取全部响应体
    pub fn bytes(mut self) -> IoResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.content_length.clamp(0, 1 << 20) as usize);
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// 读取全部响应体并解析为 JSON
    pub fn parse_json<T: DeserializeOwned>(self) -> ApiResult<T> {
        let status_code = self.status_code.as_u16();
        let body = self
            .bytes()
            .map_err(|err| Error::Transport(read_body_error(err)))?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            status_code,
            source,
            body_sample: sample_of(&body),
        })
    }
}

impl Read for ApiResponse {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.body.read(buf)
    }
}

#[inline]
pub(super) fn read_body_error(err: IoError) -> ResponseError {
    ResponseError::builder(ResponseErrorKind::ReceiveError, err).build()
}

#[inline]
pub(super) fn sample_of(body: &[u8]) -> Vec<u8> {
    body[..body.len().min(RESPONSE_BODY_SAMPLE_LEN_LIMIT)].to_vec()
}
