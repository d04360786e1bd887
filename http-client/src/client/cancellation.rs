use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// 取消信号
///
/// 可以被克隆，任意一个克隆调用 [`CancellationToken::cancel`] 后所有克隆都会观察到取消。
/// 设置了截止时间的取消信号在截止时间到达后等同于被取消。
#[derive(Debug, Clone)]
pub struct CancellationToken {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// 创建取消信号
    #[inline]
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
            deadline: None,
        }
    }

    /// 创建带有截止时间的取消信号
    #[inline]
    pub fn with_deadline(deadline: Instant) -> Self {
        let mut token = Self::new();
        token.deadline = Some(deadline);
        token
    }

    /// 创建在指定时长后到期的取消信号
    #[inline]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// 获取截止时间
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 取消
    ///
    /// 重复调用没有额外效果
    pub fn cancel(&self) {
        // 断开连接即为广播
        self.trigger.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// 是否已经取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    /// 阻塞等待指定时长
    ///
    /// 如果等待期间被取消或到达截止时间，立即返回 `true`，否则等满时长后返回 `false`
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        let timeout = match self.deadline {
            Some(deadline) => duration.min(deadline.saturating_duration_since(Instant::now())),
            None => duration,
        };
        select! {
            recv(self.signal) -> _ => true,
            default(timeout) => self.is_cancelled(),
        }
    }

    /// 取消时断开连接的接收端
    #[inline]
    pub(crate) fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}

impl Default for CancellationToken {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
