use super::{execute, ApiResponse, ApiResult, Call, Config, Error};
use crossbeam_channel::{at, bounded, never, select, Sender};
use log::{debug, warn};
use once_cell::sync::OnceCell;
use std::{
    sync::{Arc, Mutex, PoisonError},
    thread::{Builder as ThreadBuilder, JoinHandle},
};

type Job = Box<dyn FnOnce() + Send + 'static>;

const DEFAULT_WORKERS: usize = 2;
const DEFAULT_QUEUE_CAPACITY: usize = 64;

static GLOBAL_POOL: OnceCell<WorkerPool> = OnceCell::new();

/// 工作线程池
///
/// 用于限制同时发出的 HTTP 请求数量。调用者提交请求后阻塞等待结果，
/// 请求由固定数量的工作线程从有界队列中取出并执行，不改变单次调用的语义。
#[derive(Debug, Clone)]
pub struct WorkerPool {
    inner: Arc<WorkerPoolInner>,
}

#[derive(Debug)]
struct WorkerPoolInner {
    queue: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// 创建工作线程池
    ///
    /// 工作线程数量必须大于 0
    pub fn new(workers: usize, capacity: usize) -> ApiResult<Self> {
        if workers == 0 {
            return Err(Error::build_with_msg("worker pool needs at least one worker"));
        }
        let (tx, rx) = bounded::<Job>(capacity);
        let handles = (0..workers)
            .map(|i| {
                let rx = rx.to_owned();
                ThreadBuilder::new()
                    .name(format!("dropbox-worker-{i}"))
                    .spawn(move || {
                        // 队列关闭且清空后退出
                        for job in rx.iter() {
                            job();
                        }
                        debug!("dropbox-worker-{} exits", i);
                    })
                    .map_err(|err| Error::Build(err.into()))
            })
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(Self {
            inner: Arc::new(WorkerPoolInner {
                queue: Mutex::new(Some(tx)),
                workers: Mutex::new(handles),
            }),
        })
    }

    /// 获取全局工作线程池
    ///
    /// 首次调用时创建，默认 2 个工作线程，队列容量为 64
    pub fn global() -> ApiResult<&'static Self> {
        GLOBAL_POOL.get_or_try_init(|| Self::new(DEFAULT_WORKERS, DEFAULT_QUEUE_CAPACITY))
    }

    /// 通过工作线程执行 API 调用
    ///
    /// 阻塞直到得到最终结果。在队列中等待或执行期间取消，立即返回 [`Error::Canceled`]，
    /// 尚未发出的请求不会再被发出
    pub fn submit(&self, config: &Config, call: Call<'static>) -> ApiResult<ApiResponse> {
        let cancellation = call.cancellation_token().to_owned();
        let expired = cancellation.deadline().map_or_else(never, at);
        let (reply_tx, reply_rx) = bounded(1);
        let config = config.to_owned();
        let job: Job = Box::new(move || {
            reply_tx.send(execute(&config, call)).ok();
        });
        let queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .cloned()
            .ok_or_else(shutdown_error)?;
        select! {
            send(queue, job) -> sent => sent.map_err(|_| shutdown_error())?,
            recv(cancellation.signal()) -> _ => return Err(Error::Canceled),
            recv(expired) -> _ => return Err(Error::Canceled),
        }
        drop(queue);

        select! {
            recv(reply_rx) -> reply => reply.map_err(|_| Error::build_with_msg("worker exited before replying"))?,
            recv(cancellation.signal()) -> _ => reply_rx.try_recv().unwrap_or(Err(Error::Canceled)),
            recv(expired) -> _ => reply_rx.try_recv().unwrap_or(Err(Error::Canceled)),
        }
    }

    /// 工作线程池是否已经关闭
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// 关闭工作线程池
    ///
    /// 已经提交的请求仍会被执行，所有工作线程退出后返回。之后提交的请求都会返回 [`Error::Build`]
    pub fn shutdown(&self) {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let handles = std::mem::take(&mut *self.inner.workers.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in handles {
            if handle.join().is_err() {
                warn!("dropbox worker panicked");
            }
        }
    }
}

#[inline]
fn shutdown_error() -> Error {
    Error::build_with_msg("worker pool is shut down")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{FakeHttpCaller, FakeReply},
        RetryPolicy,
    };
    use crate::CancellationToken;
    use crossbeam_channel::Receiver;
    use dropbox_http::{HttpCaller, StatusCode, SyncRequest, SyncResponse, SyncResponseResult};
    use std::{
        sync::atomic::{AtomicUsize, Ordering::SeqCst},
        thread::{sleep, spawn},
        time::{Duration, Instant},
    };

    /// 收到放行信号后才返回响应的 HTTP 客户端
    #[derive(Debug)]
    struct GatedHttpCaller {
        gate: Receiver<()>,
        calls: AtomicUsize,
    }

    impl HttpCaller for GatedHttpCaller {
        fn call(&self, _request: &mut SyncRequest<'_>) -> SyncResponseResult {
            self.calls.fetch_add(1, SeqCst);
            self.gate.recv().ok();
            Ok(SyncResponse::builder().status_code(StatusCode::OK).build())
        }
    }

    fn make_config(fake: &Arc<FakeHttpCaller>) -> anyhow::Result<Config> {
        Ok(Config::builder("test-token")
            .http_caller(fake.to_owned())
            .retry_policy(
                RetryPolicy::builder()
                    .initial_backoff(Duration::from_millis(1))
                    .max_backoff(Duration::from_millis(10))
                    .build()?,
            )
            .build()?)
    }

    #[test]
    fn test_submit() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let fake = Arc::new(FakeHttpCaller::new([
            FakeReply::new(StatusCode::INTERNAL_SERVER_ERROR),
            FakeReply::new(StatusCode::OK).body(r#"{"used":1}"#),
        ]));
        let config = make_config(&fake)?;
        let pool = WorkerPool::new(2, 4)?;
        let response = pool.submit(&config, Call::rpc("/users/get_space_usage", &()))?;
        assert_eq!(response.bytes()?, br#"{"used":1}"#);
        assert_eq!(fake.requests().len(), 2);
        pool.shutdown();
        Ok(())
    }

    #[test]
    fn test_concurrent_submit() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let fake = Arc::new(FakeHttpCaller::new([FakeReply::new(StatusCode::OK).body("{}")]));
        let config = make_config(&fake)?;
        let pool = WorkerPool::new(2, 1)?;
        let handles = (0..8)
            .map(|_| {
                let pool = pool.to_owned();
                let config = config.to_owned();
                spawn(move || pool.submit(&config, Call::rpc("/users/get_current_account", &())))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            let response = handle.join().unwrap()?;
            assert_eq!(response.status_code(), StatusCode::OK);
        }
        assert_eq!(fake.requests().len(), 8);
        pool.shutdown();
        Ok(())
    }

    #[test]
    fn test_submit_after_shutdown() -> anyhow::Result<()> {
        let fake = Arc::new(FakeHttpCaller::new([FakeReply::new(StatusCode::OK)]));
        let config = make_config(&fake)?;
        let pool = WorkerPool::new(1, 1)?;
        assert!(!pool.is_shutdown());
        pool.shutdown();
        assert!(pool.is_shutdown());
        pool.shutdown();

        let result = pool.submit(&config, Call::rpc("/users/get_current_account", &()));
        assert!(matches!(result, Err(Error::Build(_))));
        assert!(fake.requests().is_empty());
        Ok(())
    }

    #[test]
    fn test_cancel_while_queued() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let (release, gate) = bounded(0);
        let caller = Arc::new(GatedHttpCaller {
            gate,
            calls: AtomicUsize::new(0),
        });
        let config = Config::builder("test-token").http_caller(caller.to_owned()).build()?;
        let pool = WorkerPool::new(1, 4)?;

        let busy = {
            let pool = pool.to_owned();
            let config = config.to_owned();
            spawn(move || pool.submit(&config, Call::rpc("/users/get_current_account", &())))
        };
        // 等待唯一的工作线程被占用
        while caller.calls.load(SeqCst) == 0 {
            sleep(Duration::from_millis(5));
        }

        let token = CancellationToken::new();
        let canceler = {
            let token = token.to_owned();
            spawn(move || {
                sleep(Duration::from_millis(50));
                token.cancel();
            })
        };
        let begin = Instant::now();
        let result = pool.submit(
            &config,
            Call::rpc("/users/get_space_usage", &()).cancellation(token),
        );
        assert!(matches!(result, Err(Error::Canceled)));
        assert!(begin.elapsed() < Duration::from_secs(5));
        canceler.join().unwrap();

        let deadline = Call::rpc("/users/get_space_usage", &())
            .cancellation(CancellationToken::with_timeout(Duration::from_millis(20)));
        assert!(matches!(pool.submit(&config, deadline), Err(Error::Canceled)));

        release.send(())?;
        assert_eq!(busy.join().unwrap()?.status_code(), StatusCode::OK);
        pool.shutdown();

        // 被取消的请求不会被发出
        assert_eq!(caller.calls.load(SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_zero_workers() {
        assert!(matches!(WorkerPool::new(0, 1), Err(Error::Build(_))));
    }

    #[test]
    fn test_global_pool_is_created_once() -> anyhow::Result<()> {
        let first = WorkerPool::global()?;
        let second = WorkerPool::global()?;
        assert!(Arc::ptr_eq(&first.inner, &second.inner));
        Ok(())
    }
}
