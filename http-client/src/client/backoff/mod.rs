use super::{ApiResult, Error};
use dropbox_http::{header::RETRY_AFTER, StatusCode, SyncResponse};
use std::time::Duration;

/// 重试策略
///
/// 429 响应按照 `Retry-After` 等待，5xx 响应按照指数退避等待，
/// 退避时长达到上限后不再重试。
///
/// 429 响应不受退避上限的限制，服务器持续返回 429 时调用会一直等待重试，
/// 需要限制总耗时的调用者应当使用 [`crate::CancellationToken::with_timeout`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RetryPolicy {
    initial_backoff: Duration,
    multiplier: f64,
    max_backoff: Duration,
    default_retry_after: Duration,
}

impl RetryPolicy {
    /// 创建重试策略构建器
    #[inline]
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// 获取初始退避时长
    #[inline]
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// 获取退避时长倍数
    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// 获取退避时长上限
    #[inline]
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// 获取 `Retry-After` 缺失或非法时的等待时长
    #[inline]
    pub fn default_retry_after(&self) -> Duration {
        self.default_retry_after
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            multiplier: 1.5,
            max_backoff: Duration::from_secs(300),
            default_retry_after: Duration::from_secs(60),
        }
    }
}

/// 重试策略构建器
#[derive(Debug, Default, Clone)]
pub struct RetryPolicyBuilder {
    inner: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// 设置初始退避时长
    #[inline]
    pub fn initial_backoff(&mut self, initial_backoff: Duration) -> &mut Self {
        self.inner.initial_backoff = initial_backoff;
        self
    }

    /// 设置退避时长倍数
    #[inline]
    pub fn multiplier(&mut self, multiplier: f64) -> &mut Self {
        self.inner.multiplier = multiplier;
        self
    }

    /// 设置退避时长上限
    #[inline]
    pub fn max_backoff(&mut self, max_backoff: Duration) -> &mut Self {
        self.inner.max_backoff = max_backoff;
        self
    }

    /// 设置 `Retry-After` 缺失或非法时的等待时长
    #[inline]
    pub fn default_retry_after(&mut self, default_retry_after: Duration) -> &mut Self {
        self.inner.default_retry_after = default_retry_after;
        self
    }

    /// 构建重试策略
    ///
    /// 初始退避时长必须大于 0，倍数必须是大于 1 的有限值，退避时长上限不能小于初始退避时长，
    /// 否则返回 [`Error::Build`]
    pub fn build(&self) -> ApiResult<RetryPolicy> {
        let policy = self.inner;
        if policy.initial_backoff.is_zero() {
            return Err(Error::build_with_msg("initial backoff must be greater than zero"));
        }
        if !policy.multiplier.is_finite() || policy.multiplier <= 1.0 {
            return Err(Error::build_with_msg(format!(
                "backoff multiplier must be a finite number greater than 1, but got {}",
                policy.multiplier
            )));
        }
        if policy.max_backoff < policy.initial_backoff {
            return Err(Error::build_with_msg(format!(
                "max backoff {:?} is less than initial backoff {:?}",
                policy.max_backoff, policy.initial_backoff
            )));
        }
        Ok(policy)
    }
}

/// 重试决定
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// 不再重试，响应交由调用方处理
    Done,

    /// 等待指定时长后重试
    RetryAfter(Duration),
}

/// 单次调用的重试状态
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    backoff: f64,
    attempts: usize,
}

impl RetryState {
    /// 创建重试状态
    #[inline]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            backoff: policy.initial_backoff.as_secs_f64(),
            attempts: 0,
            policy,
        }
    }

    /// 获取当前的退避时长
    #[inline]
    pub fn backoff(&self) -> Duration {
        Duration::try_from_secs_f64(self.backoff).unwrap_or(Duration::MAX)
    }

    /// 获取已经发送的次数
    #[inline]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// 记录一次发送
    #[inline]
    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// 根据响应做出重试决定
    pub fn decide(&mut self, response: &SyncResponse) -> RetryDecision {
        let status_code = response.status_code();
        if status_code == StatusCode::TOO_MANY_REQUESTS {
            RetryDecision::RetryAfter(retry_after(response).unwrap_or(self.policy.default_retry_after))
        } else if status_code.is_server_error() {
            if self.backoff >= self.policy.max_backoff.as_secs_f64() {
                return RetryDecision::Done;
            }
            let delay = self.backoff();
            self.backoff *= self.policy.multiplier;
            RetryDecision::RetryAfter(delay)
        } else {
            RetryDecision::Done
        }
    }
}

fn retry_after(response: &SyncResponse) -> Option<Duration> {
    response
        .header(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
