use super::super::{ApiResult, CancellationToken, Config, Error, RetryDecision, RetryState};
use dropbox_http::{Reset, SyncRequest, SyncResponse};
use log::{debug, error, warn};
use std::io::{copy as io_copy, sink};

/// 发送 HTTP 请求，直到得到不需要重试的响应
///
/// 仅 429 与 5xx 响应会被重试，传输层错误不会被重试
pub(super) fn send_http_request(
    config: &Config,
    http_request: &mut SyncRequest<'_>,
    cancellation: &CancellationToken,
) -> ApiResult<SyncResponse> {
    let mut retry_state = RetryState::new(config.retry_policy());
    loop {
        if cancellation.is_cancelled() {
            return Err(Error::Canceled);
        }
        retry_state.record_attempt();
        let response = config.http_caller().call(http_request).map_err(|err| {
            error!(
                "URL: {} - Method: {} - Transport error: {}",
                http_request.url(),
                http_request.method(),
                err
            );
            Error::Transport(err)
        })?;
        match retry_state.decide(&response) {
            RetryDecision::Done => return Ok(response),
            RetryDecision::RetryAfter(delay) => {
                if let Err(err) = http_request.body_mut().reset() {
                    warn!(
                        "Failed to reset http request body, will not retry status code {}: {}",
                        response.status_code(),
                        err
                    );
                    return Ok(response);
                }
                let status_code = response.status_code();
                discard(response);
                warn!(
                    "Received status code {} from {} (attempt {}), sleeping for {:?}",
                    status_code,
                    http_request.url(),
                    retry_state.attempts(),
                    delay,
                );
                if cancellation.wait(delay) {
                    return Err(Error::Canceled);
                }
            }
        }
    }
}

/// 读完并释放响应体，以便连接可以被复用
fn discard(mut response: SyncResponse) {
    if let Err(err) = io_copy(response.body_mut(), &mut sink()) {
        debug!("Failed to drain response body: {}", err);
    }
}
