use std::time::Duration;

/// 超时时长扩展
///
/// 添加到请求的扩展信息中，即可为单个请求设置超时时长
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeoutExtension(Duration);

impl TimeoutExtension {
    /// 创建超时时长扩展
    #[inline]
    pub fn new(timeout: Duration) -> Self {
        Self(timeout)
    }

    /// 获取超时时长
    #[inline]
    pub fn get(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for TimeoutExtension {
    #[inline]
    fn from(timeout: Duration) -> Self {
        Self::new(timeout)
    }
}
