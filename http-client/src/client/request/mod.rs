mod builder;

use super::CancellationToken;
use dropbox_http::SyncRequestBody;
use serde::Serialize;
use serde_json::Error as JsonError;

pub(super) use builder::build_request;
pub use builder::escape_non_ascii;

/// RPC 接口默认域名
pub const DEFAULT_API_ENDPOINT: &str = "https://api.dropboxapi.com";

/// 内容接口默认域名
pub const DEFAULT_CONTENT_ENDPOINT: &str = "https://content.dropboxapi.com";

/// 接口类型
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndpointKind {
    /// RPC 接口，请求参数与响应均为 JSON
    Rpc,

    /// 内容接口，请求参数通过 `Dropbox-API-Arg` 传递，请求体或响应体为二进制数据
    Content,
}

/// API 调用
///
/// 请求参数在创建时即被序列化，序列化失败会在调用时以 [`super::Error::Encode`] 返回
#[derive(Debug)]
#[must_use]
pub struct Call<'a> {
    kind: EndpointKind,
    path: String,
    input: Result<String, JsonError>,
    payload: Option<SyncRequestBody<'a>>,
    cancellation: CancellationToken,
}

impl<'a> Call<'a> {
    /// 创建 RPC 接口调用
    #[inline]
    pub fn rpc(path: impl Into<String>, input: &(impl Serialize + ?Sized)) -> Self {
        Self::new(EndpointKind::Rpc, path.into(), input)
    }

    /// 创建内容接口调用
    #[inline]
    pub fn content(path: impl Into<String>, input: &(impl Serialize + ?Sized)) -> Self {
        Self::new(EndpointKind::Content, path.into(), input)
    }

    fn new(kind: EndpointKind, path: String, input: &(impl Serialize + ?Sized)) -> Self {
        Self {
            kind,
            path,
            input: serde_json::to_string(input),
            payload: None,
            cancellation: Default::default(),
        }
    }

    /// 设置上传的二进制数据
    ///
    /// 仅内容接口可以携带二进制数据
    #[inline]
    pub fn payload(mut self, payload: SyncRequestBody<'a>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// 设置取消信号
    #[inline]
    pub fn cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// 获取接口类型
    #[inline]
    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// 获取接口路径
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取取消信号
    #[inline]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}
