#![cfg_attr(feature = "docs", feature(doc_cfg))]
#![deny(
    single_use_lifetimes,
    missing_debug_implementations,
    absolute_paths_not_starting_with_crate,
    anonymous_parameters,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_docs,
    non_ascii_idents,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes
)]

//! # dropbox-http-client
//!
//! ## Dropbox HTTP 客户端
//!
//! 负责将 API 调用转换为 HTTP 请求并发送，对 429 与 5xx 响应进行退避重试，
//! 并将最终响应分类为成功结果、API 错误或传输错误。
//!
//! ### 接口类型
//!
//! - RPC 接口：请求参数以 JSON 作为请求体发送到 `https://api.dropboxapi.com/2<path>`
//! - 内容接口：请求参数以 JSON 放入 `Dropbox-API-Arg` 发送到 `https://content.dropboxapi.com/2<path>`，
//!   请求体或响应体为二进制数据
//!
//! ### 代码示例
//!
//! ```no_run
//! use dropbox_http_client::{Client, Config};
//! use serde_json::{json, Value};
//!
//! # fn example() -> dropbox_http_client::ApiResult<()> {
//! let client = Client::new(Config::new("<access token>")?);
//! let account: Value = client.rpc("/users/get_current_account", &())?.parse_json()?;
//! let file = client.content("/files/download", &json!({"path": "/a.bin"}), None)?;
//! println!("{} {}", account, file.content_length());
//! # Ok(())
//! # }
//! ```

mod client;
mod pool;

#[cfg(test)]
mod test_utils;

pub use client::{
    escape_non_ascii, execute, ApiError, ApiResponse, ApiResult, Call, CancellationToken, Client, ClientBuilder,
    Config, ConfigBuilder, EndpointKind, Error, RetryDecision, RetryPolicy, RetryPolicyBuilder, RetryState,
    DEFAULT_API_ENDPOINT, DEFAULT_CONTENT_ENDPOINT,
};
pub use pool::WorkerPool;

pub use dropbox_http as http;

#[cfg(feature = "ureq")]
#[cfg_attr(feature = "docs", doc(cfg(feature = "ureq")))]
pub use dropbox_ureq as ureq;
