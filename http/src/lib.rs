#![cfg_attr(feature = "docs", feature(doc_cfg))]
#![deny(
    absolute_paths_not_starting_with_crate,
    anonymous_parameters,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    meta_variable_misuse,
    non_ascii_idents,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes
)]

//! # dropbox-http
//!
//! ## Dropbox HTTP 接口
//!
//! 为更高层的 Dropbox 客户端提供基础 HTTP 类型与 [`HttpCaller`] 接口，
//! 不包含任何具体的 HTTP 客户端实现。
//!
//! 实现 [`HttpCaller`] 即可将任意 HTTP 客户端接入 Dropbox SDK，
//! 默认实现参见 `dropbox-ureq`。

mod body;
mod error;
mod request;
mod response;

use auto_impl::auto_impl;
use std::fmt::Debug;

pub use body::{Reset, SyncRequestBody, SyncResponseBody};
pub use error::{Error as ResponseError, ErrorBuilder as ResponseErrorBuilder, ErrorKind as ResponseErrorKind};
pub use http::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    method::Method,
    status::StatusCode,
    uri::Uri,
    Extensions, Version,
};
pub use request::{SyncRequest, SyncRequestBuilder};
pub use response::{SyncResponse, SyncResponseBuilder, SyncResponseResult};

/// HTTP 请求处理接口
///
/// 实现该接口，即可处理所有 Dropbox SDK 发送的 HTTP 请求。
///
/// 每次调用只进行一次 HTTP 往返。
/// 服务器返回的任何状态码（包括 4xx / 5xx）都应作为正常响应返回，
/// 只有传输层本身的故障（连接失败、TLS 失败、读取响应头失败等）才返回 [`ResponseError`]。
#[auto_impl(&, Box, Arc)]
pub trait HttpCaller: Debug + Send + Sync {
    /// 阻塞发送 HTTP 请求
    fn call(&self, request: &mut SyncRequest<'_>) -> SyncResponseResult;
}
