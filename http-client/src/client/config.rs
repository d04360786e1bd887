use super::{
    request::{DEFAULT_API_ENDPOINT, DEFAULT_CONTENT_ENDPOINT},
    ApiResult, Error, RetryPolicy,
};
use assert_impl::assert_impl;
use dropbox_http::HttpCaller;
use std::{
    fmt::{self, Debug},
    mem::take,
    sync::Arc,
};
use url::Url;

/// 客户端配置
///
/// 创建后不可修改，克隆的开销很小，可以在线程间共享
#[derive(Clone)]
pub struct Config {
    inner: Arc<ConfigInner>,
}

struct ConfigInner {
    access_token: String,
    http_caller: Arc<dyn HttpCaller>,
    api_endpoint: Url,
    content_endpoint: Url,
    retry_policy: RetryPolicy,
    appended_user_agent: String,
}

impl Config {
    /// 使用默认的 HTTP 客户端创建配置
    #[inline]
    #[cfg(feature = "ureq")]
    #[cfg_attr(feature = "docs", doc(cfg(feature = "ureq")))]
    pub fn new(access_token: impl Into<String>) -> ApiResult<Self> {
        Self::builder(access_token).build()
    }

    /// 创建配置构建器
    #[inline]
    pub fn builder(access_token: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(access_token.into())
    }

    /// 获取访问令牌
    #[inline]
    pub fn access_token(&self) -> &str {
        &self.inner.access_token
    }

    /// 获取 HTTP 客户端
    #[inline]
    pub fn http_caller(&self) -> &dyn HttpCaller {
        self.inner.http_caller.as_ref()
    }

    /// 获取 RPC 接口域名
    #[inline]
    pub fn api_endpoint(&self) -> &Url {
        &self.inner.api_endpoint
    }

    /// 获取内容接口域名
    #[inline]
    pub fn content_endpoint(&self) -> &Url {
        &self.inner.content_endpoint
    }

    /// 获取重试策略
    #[inline]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy
    }

    /// 获取追加的 UserAgent
    #[inline]
    pub fn appended_user_agent(&self) -> &str {
        &self.inner.appended_user_agent
    }

    #[allow(dead_code)]
    fn assert() {
        assert_impl!(Send: Self);
        assert_impl!(Sync: Self);
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"[REDACTED]")
            .field("http_caller", &self.inner.http_caller)
            .field("api_endpoint", &self.inner.api_endpoint.as_str())
            .field("content_endpoint", &self.inner.content_endpoint.as_str())
            .field("retry_policy", &self.inner.retry_policy)
            .field("appended_user_agent", &self.inner.appended_user_agent)
            .finish()
    }
}

/// 客户端配置构建器
#[derive(Default)]
pub struct ConfigBuilder {
    access_token: String,
    http_caller: Option<Arc<dyn HttpCaller>>,
    api_endpoint: Option<String>,
    content_endpoint: Option<String>,
    retry_policy: RetryPolicy,
    appended_user_agent: String,
}

impl ConfigBuilder {
    #[inline]
    fn new(access_token: String) -> Self {
        Self {
            access_token,
            ..Default::default()
        }
    }

    /// 设置 HTTP 客户端
    #[inline]
    pub fn http_caller(&mut self, http_caller: impl HttpCaller + 'static) -> &mut Self {
        self.http_caller = Some(Arc::new(http_caller));
        self
    }

    /// 设置 RPC 接口域名
    ///
    /// 默认为 `https://api.dropboxapi.com`
    #[inline]
    pub fn api_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    /// 设置内容接口域名
    ///
    /// 默认为 `https://content.dropboxapi.com`
    #[inline]
    pub fn content_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.content_endpoint = Some(endpoint.into());
        self
    }

    /// 设置重试策略
    #[inline]
    pub fn retry_policy(&mut self, retry_policy: RetryPolicy) -> &mut Self {
        self.retry_policy = retry_policy;
        self
    }

    /// 设置追加的 UserAgent
    #[inline]
    pub fn appended_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.appended_user_agent = user_agent.into();
        self
    }

    /// 构建客户端配置
    ///
    /// 访问令牌为空，或域名非法时返回 [`Error::Build`]
    pub fn build(&mut self) -> ApiResult<Config> {
        if self.access_token.is_empty() {
            return Err(Error::build_with_msg("access token must not be empty"));
        }
        let api_endpoint = parse_endpoint(self.api_endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT))?;
        let content_endpoint =
            parse_endpoint(self.content_endpoint.as_deref().unwrap_or(DEFAULT_CONTENT_ENDPOINT))?;
        let http_caller = match self.http_caller.take() {
            Some(http_caller) => http_caller,
            None => default_http_caller()?,
        };
        Ok(Config {
            inner: Arc::new(ConfigInner {
                access_token: take(&mut self.access_token),
                http_caller,
                api_endpoint,
                content_endpoint,
                retry_policy: self.retry_policy,
                appended_user_agent: take(&mut self.appended_user_agent),
            }),
        })
    }
}

impl Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("access_token", &"[REDACTED]")
            .field("http_caller", &self.http_caller)
            .field("api_endpoint", &self.api_endpoint)
            .field("content_endpoint", &self.content_endpoint)
            .field("retry_policy", &self.retry_policy)
            .field("appended_user_agent", &self.appended_user_agent)
            .finish()
    }
}

fn parse_endpoint(endpoint: &str) -> ApiResult<Url> {
    let url = Url::parse(endpoint).map_err(|err| Error::Build(err.into()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::build_with_msg(format!("invalid endpoint: {endpoint}")));
    }
    Ok(url)
}

#[cfg(feature = "ureq")]
fn default_http_caller() -> ApiResult<Arc<dyn HttpCaller>> {
    use once_cell::sync::Lazy;

    static DEFAULT_HTTP_CALLER: Lazy<Arc<dyn HttpCaller>> = Lazy::new(|| {
        let http_caller: Arc<dyn HttpCaller> = Arc::new(dropbox_ureq::Client::default());
        http_caller
    });

    Ok(DEFAULT_HTTP_CALLER.to_owned())
}

#[cfg(not(feature = "ureq"))]
fn default_http_caller() -> ApiResult<Arc<dyn HttpCaller>> {
    Err(Error::build_with_msg(
        "no default http caller is enabled, please set one with ConfigBuilder::http_caller()",
    ))
}
