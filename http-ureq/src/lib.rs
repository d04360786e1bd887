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

//! # dropbox-ureq
//!
//! ## Dropbox Ureq HTTP 客户端实现
//!
//! 基于 Ureq 库提供 [`dropbox_http::HttpCaller`] 接口实现，仅提供阻塞接口的实现。
//!
//! 服务器返回的 4xx / 5xx 状态码都作为正常响应返回，由上层决定是否重试。

mod client;
mod extensions;

pub use client::Client;
pub use extensions::*;

pub use dropbox_http as http;
pub use ureq;
