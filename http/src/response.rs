use super::{ResponseError, SyncResponseBody};
use assert_impl::assert_impl;
use http::{
    header::{AsHeaderName, HeaderMap, HeaderValue, IntoHeaderName, CONTENT_LENGTH},
    status::StatusCode,
    Extensions, Version,
};
use std::{
    fmt::Debug,
    io::Read,
    mem::take,
};

/// 阻塞 HTTP 响应
///
/// 封装 HTTP 响应相关字段
#[derive(Debug, Default)]
pub struct SyncResponse {
    status_code: StatusCode,
    version: Version,
    headers: HeaderMap,
    extensions: Extensions,
    body: SyncResponseBody,
}

impl SyncResponse {
    /// 创建 HTTP 响应构建器
    #[inline]
    pub fn builder() -> SyncResponseBuilder {
        SyncResponseBuilder::default()
    }

    /// 获取 HTTP 状态码
    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// 获取 HTTP 版本
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// 获取 HTTP Headers
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 获取 HTTP Headers 的可变引用
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// 获取 HTTP 响应 Header
    #[inline]
    pub fn header<K: AsHeaderName>(&self, header_name: K) -> Option<&HeaderValue> {
        self.headers.get(header_name)
    }

    /// 获取扩展信息
    #[inline]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// 获取扩展信息的可变引用
    #[inline]
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// 获取响应体长度
    ///
    /// 服务器未返回 `Content-Length` 或其值非法时返回 `-1`
    pub fn content_length(&self) -> i64 {
        self.header(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|&length| length >= 0)
            .unwrap_or(-1)
    }

    /// 获取响应体
    #[inline]
    pub fn body(&self) -> &SyncResponseBody {
        &self.body
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

    #[allow(dead_code)]
    fn assert() {
        assert_impl!(Send: Self);
    }
}

/// HTTP 响应构建器
#[derive(Debug, Default)]
pub struct SyncResponseBuilder {
    inner: SyncResponse,
}

impl SyncResponseBuilder {
    /// 设置 HTTP 状态码
    #[inline]
    pub fn status_code(&mut self, status_code: StatusCode) -> &mut Self {
        self.inner.status_code = status_code;
        self
    }

    /// 设置 HTTP 版本
    #[inline]
    pub fn version(&mut self, version: Version) -> &mut Self {
        self.inner.version = version;
        self
    }

    /// 设置 HTTP Headers
    #[inline]
    pub fn headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.inner.headers = headers;
        self
    }

    /// 添加 HTTP Header
    #[inline]
    pub fn header(&mut self, header_name: impl IntoHeaderName, header_value: HeaderValue) -> &mut Self {
        self.inner.headers.append(header_name, header_value);
        self
    }

    /// 设置扩展信息
    #[inline]
    pub fn extensions(&mut self, extensions: Extensions) -> &mut Self {
        self.inner.extensions = extensions;
        self
    }

    /// 设置响应体
    #[inline]
    pub fn body(&mut self, body: SyncResponseBody) -> &mut Self {
        self.inner.body = body;
        self
    }

    /// 使用输入流设置响应体
    #[inline]
    pub fn stream_as_body(&mut self, body: impl Read + Debug + Send + 'static) -> &mut Self {
        self.inner.body = SyncResponseBody::from_reader(body);
        self
    }

    /// 使用二进制数据设置响应体
    #[inline]
    pub fn bytes_as_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.inner.body = SyncResponseBody::from_bytes(body.into());
        self
    }

    /// 构建 HTTP 响应，同时构建器被重置
    #[inline]
    pub fn build(&mut self) -> SyncResponse {
        take(&mut self.inner)
    }
}

/// 阻塞 HTTP 响应结果
pub type SyncResponseResult = Result<SyncResponse, ResponseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length() -> anyhow::Result<()> {
        let response = SyncResponse::builder()
            .status_code(StatusCode::OK)
            .header(CONTENT_LENGTH, HeaderValue::from_static("1048576"))
            .build();
        assert_eq!(response.content_length(), 1048576);

        let response = SyncResponse::builder().status_code(StatusCode::OK).build();
        assert_eq!(response.content_length(), -1);

        let response = SyncResponse::builder()
            .header(CONTENT_LENGTH, HeaderValue::from_static("not-a-number"))
            .build();
        assert_eq!(response.content_length(), -1);
        Ok(())
    }

    #[test]
    fn test_read_body() -> anyhow::Result<()> {
        let mut response = SyncResponse::builder()
            .status_code(StatusCode::CONFLICT)
            .bytes_as_body(b"{\"error_summary\":\"path/not_found/..\"}".to_vec())
            .build();
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        let mut body = String::new();
        response.body_mut().read_to_string(&mut body)?;
        assert_eq!(body, "{\"error_summary\":\"path/not_found/..\"}");
        Ok(())
    }
}
