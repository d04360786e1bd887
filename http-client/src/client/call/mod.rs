mod send_http_request;

use super::{
    request::build_request,
    response::{sample_of, ErrorDocument},
    ApiError, ApiResponse, ApiResult, Call, Config, Error,
};
use dropbox_http::{header::CONTENT_TYPE, ResponseError, ResponseErrorKind, StatusCode, SyncRequest, SyncResponse};
use log::{debug, error};
use send_http_request::send_http_request;
use std::io::Read;

/// 执行 API 调用
///
/// 阻塞直到得到最终结果。状态码小于 400 的响应作为成功结果返回，响应体的所有权转移给调用者；
/// 其他响应的响应体会被读完，并转换为 [`Error::Api`] 或 [`Error::Decode`]。
///
/// 5xx 响应的重试次数受 [`RetryPolicy`](super::RetryPolicy) 的退避上限限制，429 响应则会一直按照
/// `Retry-After` 重试，需要限制总耗时时请为调用设置 [`CancellationToken::with_timeout`](super::CancellationToken::with_timeout)。
pub fn execute(config: &Config, call: Call<'_>) -> ApiResult<ApiResponse> {
    let (mut http_request, cancellation) = build_request(config, call)?;
    let response = send_http_request(config, &mut http_request, &cancellation)?;
    classify(&http_request, response)
}

fn classify(http_request: &SyncRequest<'_>, mut response: SyncResponse) -> ApiResult<ApiResponse> {
    let status_code = response.status_code();
    if status_code.as_u16() < 400 {
        return Ok(ApiResponse::new(response));
    }

    let mut body = Vec::new();
    response.body_mut().read_to_end(&mut body).map_err(|err| {
        Error::Transport(
            ResponseError::builder(ResponseErrorKind::ReceiveError, err)
                .uri(http_request.url())
                .build(),
        )
    })?;

    let api_error = if is_plain_text(&response) {
        ApiError::new(status_code, String::from_utf8_lossy(&body).into_owned(), None)
    } else {
        match serde_json::from_slice::<ErrorDocument>(&body) {
            Ok(document) => ApiError::new(status_code, document.error_summary, document.error),
            Err(source) => {
                error!(
                    "URL: {} - Method: {} - Status code: {} - Failed to decode error body: {}",
                    http_request.url(),
                    http_request.method(),
                    status_code,
                    source
                );
                return Err(Error::Decode {
                    status_code: status_code.as_u16(),
                    source,
                    body_sample: sample_of(&body),
                });
            }
        }
    };
    log_api_error(http_request, &api_error);
    Err(Error::Api(api_error))
}

fn is_plain_text(response: &SyncResponse) -> bool {
    response
        .header(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |content_type| {
            content_type.contains(mime::TEXT_PLAIN.essence_str())
        })
}

fn log_api_error(http_request: &SyncRequest<'_>, api_error: &ApiError) {
    if api_error.status_code() == StatusCode::CONFLICT.as_u16() {
        debug!(
            "URL: {} - Method: {} - Status code: {} - Summary: {}",
            http_request.url(),
            http_request.method(),
            api_error.status_code(),
            api_error.summary()
        );
    } else {
        error!(
            "URL: {} - Method: {} - Status code: {} - Summary: {}",
            http_request.url(),
            http_request.method(),
            api_error.status_code(),
            api_error.summary()
        );
    }
}
