use super::SyncRequestBody;
use assert_impl::assert_impl;
use http::{
    header::{HeaderMap, HeaderValue, IntoHeaderName},
    method::Method,
    uri::Uri,
    Extensions, Version,
};
use once_cell::sync::Lazy;
use std::mem::take;

static FULL_USER_AGENT: Lazy<Box<str>> = Lazy::new(|| {
    format!(
        "DropboxRust/dropbox-http-{}/rust-{}",
        env!("CARGO_PKG_VERSION"),
        rustc_version_runtime::version(),
    )
    .into()
});

/// 阻塞 HTTP 请求
///
/// 封装 HTTP 请求相关字段
#[derive(Debug, Default)]
pub struct SyncRequest<'r> {
    method: Method,
    url: Uri,
    version: Version,
    headers: HeaderMap,
    extensions: Extensions,
    appended_user_agent: String,
    body: SyncRequestBody<'r>,
}

impl<'r> SyncRequest<'r> {
    /// 创建 HTTP 请求构建器
    #[inline]
    pub fn builder() -> SyncRequestBuilder<'r> {
        SyncRequestBuilder::default()
    }

    /// 获取 HTTP 请求 URL
    #[inline]
    pub fn url(&self) -> &Uri {
        &self.url
    }

    /// 获取 HTTP 请求 URL 的可变引用
    #[inline]
    pub fn url_mut(&mut self) -> &mut Uri {
        &mut self.url
    }

    /// 获取请求 HTTP 方法
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// 获取请求 HTTP 方法的可变引用
    #[inline]
    pub fn method_mut(&mut self) -> &mut Method {
        &mut self.method
    }

    /// 获取请求 HTTP 版本
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// 获取请求 HTTP Headers
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 获取请求 HTTP Headers 的可变引用
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
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

    /// 获取 UserAgent
    #[inline]
    pub fn user_agent(&self) -> String {
        let mut user_agent = String::from(FULL_USER_AGENT.as_ref());
        user_agent.push_str(&self.appended_user_agent);
        user_agent
    }

    /// 获取追加的 UserAgent
    #[inline]
    pub fn appended_user_agent(&self) -> &str {
        &self.appended_user_agent
    }

    /// 获取请求体
    #[inline]
    pub fn body(&self) -> &SyncRequestBody<'r> {
        &self.body
    }

    /// 获取请求体的可变引用
    #[inline]
    pub fn body_mut(&mut self) -> &mut SyncRequestBody<'r> {
        &mut self.body
    }

    #[allow(dead_code)]
    fn assert() {
        assert_impl!(Send: Self);
    }
}

/// HTTP 请求构建器
#[derive(Debug, Default)]
pub struct SyncRequestBuilder<'r> {
    inner: SyncRequest<'r>,
}

impl<'r> SyncRequestBuilder<'r> {
    /// 设置请求 HTTP 方法
    #[inline]
    pub fn method(&mut self, method: Method) -> &mut Self {
        self.inner.method = method;
        self
    }

    /// 设置请求 URL
    #[inline]
    pub fn url(&mut self, url: Uri) -> &mut Self {
        self.inner.url = url;
        self
    }

    /// 设置请求 HTTP 版本
    #[inline]
    pub fn version(&mut self, version: Version) -> &mut Self {
        self.inner.version = version;
        self
    }

    /// 设置请求 HTTP Headers
    #[inline]
    pub fn headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.inner.headers = headers;
        self
    }

    /// 插入请求 HTTP Header
    #[inline]
    pub fn header(&mut self, header_name: impl IntoHeaderName, header_value: HeaderValue) -> &mut Self {
        self.inner.headers.insert(header_name, header_value);
        self
    }

    /// 设置扩展信息
    #[inline]
    pub fn extensions(&mut self, extensions: Extensions) -> &mut Self {
        self.inner.extensions = extensions;
        self
    }

    /// 添加扩展信息
    #[inline]
    pub fn add_extension<T: Send + Sync + 'static>(&mut self, extension: T) -> &mut Self {
        self.inner.extensions.insert(extension);
        self
    }

    /// 设置追加的 UserAgent
    #[inline]
    pub fn appended_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.inner.appended_user_agent = user_agent.into();
        self
    }

    /// 设置请求体
    #[inline]
    pub fn body(&mut self, body: SyncRequestBody<'r>) -> &mut Self {
        self.inner.body = body;
        self
    }

    /// 构建 HTTP 请求，同时构建器被重置
    #[inline]
    pub fn build(&mut self) -> SyncRequest<'r> {
        take(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use std::io::Read;

    #[test]
    fn test_build_request() -> anyhow::Result<()> {
        let mut request = SyncRequest::builder()
            .method(Method::POST)
            .url("https://api.dropboxapi.com/2/users/get_current_account".parse()?)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .appended_user_agent("/dropbox-test")
            .body(SyncRequestBody::from_referenced_bytes(b"null"))
            .build();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().host(), Some("api.dropboxapi.com"));
        assert_eq!(request.url().path(), "/2/users/get_current_account");
        assert_eq!(request.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(request.user_agent().starts_with("DropboxRust/dropbox-http-"));
        assert!(request.user_agent().ends_with("/dropbox-test"));

        let mut body = String::new();
        request.body_mut().read_to_string(&mut body)?;
        assert_eq!(body, "null");
        Ok(())
    }

    #[test]
    fn test_builder_is_reset_after_build() -> anyhow::Result<()> {
        let mut builder = SyncRequest::builder();
        builder.method(Method::POST).url("https://example.com/a".parse()?);
        let first = builder.build();
        let second = builder.build();
        assert_eq!(first.method(), Method::POST);
        assert_eq!(second.method(), Method::GET);
        assert_eq!(second.url(), "/");
        Ok(())
    }
}
