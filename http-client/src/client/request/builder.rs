use super::{
    super::{ApiResult, CancellationToken, Config, Error},
    Call, EndpointKind,
};
use dropbox_http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method, SyncRequest, SyncRequestBody, Uri,
};
use std::{borrow::Cow, fmt::Write};
use url::Url;

const DROPBOX_API_ARG: &str = "dropbox-api-arg";

/// 将请求转换为 HTTP 请求
///
/// 该过程不会产生任何网络请求
pub(in super::super) fn build_request<'a>(
    config: &Config,
    call: Call<'a>,
) -> ApiResult<(SyncRequest<'a>, CancellationToken)> {
    let Call {
        kind,
        path,
        input,
        payload,
        cancellation,
    } = call;
    let input = input.map_err(Error::Encode)?;

    let mut builder = SyncRequest::builder();
    builder
        .method(Method::POST)
        .appended_user_agent(config.appended_user_agent())
        .header(AUTHORIZATION, authorization(config.access_token())?);

    match kind {
        EndpointKind::Rpc => {
            if payload.is_some() {
                return Err(Error::build_with_msg(format!(
                    "rpc call {path} can not carry a binary payload"
                )));
            }
            builder
                .url(make_url(config.api_endpoint(), &path)?)
                .header(CONTENT_TYPE, header_value(mime::APPLICATION_JSON.as_ref())?)
                .body(SyncRequestBody::from_bytes(input.into_bytes()));
        }
        EndpointKind::Content => {
            builder
                .url(make_url(config.content_endpoint(), &path)?)
                .header(
                    HeaderName::from_static(DROPBOX_API_ARG),
                    header_value(&escape_non_ascii(&input))?,
                );
            if let Some(payload) = payload {
                builder
                    .header(CONTENT_TYPE, header_value(mime::APPLICATION_OCTET_STREAM.as_ref())?)
                    .body(payload);
            }
        }
    }
    Ok((builder.build(), cancellation))
}

fn authorization(access_token: &str) -> ApiResult<HeaderValue> {
    let mut value = header_value(&format!("Bearer {access_token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

#[inline]
fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| Error::Build(err.into()))
}

/// 拼接接口 URL
///
/// 接口路径必须以 `/` 开头，最终 URL 为 `<endpoint>/2<path>`
pub(super) fn make_url(endpoint: &Url, path: &str) -> ApiResult<Uri> {
    if !path.starts_with('/') {
        return Err(Error::build_with_msg(format!(
            "path must start with '/', but got {path:?}"
        )));
    }
    let mut url = endpoint.to_owned();
    url.set_path(&format!("{}/2{}", endpoint.path().trim_end_matches('/'), path));
    url.as_str().parse::<Uri>().map_err(|err| Error::Build(err.into()))
}

/// 转义 JSON 中的非 ASCII 字符
///
/// 非 ASCII 字符与 DEL 被转义为 `\uXXXX`，超出基本多文种平面的字符被转义为 UTF-16 代理对，
/// 转义后的 JSON 与原始 JSON 等价，可以作为 HTTP Header 的值
pub fn escape_non_ascii(json: &str) -> Cow<'_, str> {
    if json.bytes().all(|b| b.is_ascii() && b != 0x7f) {
        return Cow::Borrowed(json);
    }
    let mut escaped = String::with_capacity(json.len() + 16);
    for c in json.chars() {
        if c.is_ascii() && c != '\x7f' {
            escaped.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                // 写入 String 不会失败
                write!(escaped, "\\u{unit:04x}").ok();
            }
        }
    }
    Cow::Owned(escaped)
}
