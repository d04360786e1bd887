use super::{execute, ApiResponse, ApiResult, Call, Config};
use crate::WorkerPool;
use dropbox_http::SyncRequestBody;
use serde::Serialize;

/// Dropbox 客户端
///
/// 默认在调用者线程中直接发送请求，设置工作线程池后由线程池发送请求
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    worker_pool: Option<WorkerPool>,
}

impl Client {
    /// 创建客户端
    #[inline]
    pub fn new(config: Config) -> Self {
        Self::builder(config).build()
    }

    /// 创建客户端构建器
    #[inline]
    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder {
            inner: Self {
                config,
                worker_pool: None,
            },
        }
    }

    /// 获取客户端配置
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 调用 RPC 接口
    #[inline]
    pub fn rpc(&self, path: impl Into<String>, input: &(impl Serialize + ?Sized)) -> ApiResult<ApiResponse> {
        self.execute(Call::rpc(path, input))
    }

    /// 调用内容接口
    ///
    /// 上传时传入二进制数据，下载时传入 [`None`]
    pub fn content(
        &self,
        path: impl Into<String>,
        input: &(impl Serialize + ?Sized),
        payload: Option<SyncRequestBody<'static>>,
    ) -> ApiResult<ApiResponse> {
        let mut call = Call::content(path, input);
        if let Some(payload) = payload {
            call = call.payload(payload);
        }
        self.execute(call)
    }

    /// 执行 API 调用
    ///
    /// 设置了工作线程池时由线程池发送请求，因此请求体不能借用调用者的数据，
    /// 需要借用时使用 [`Client::execute_direct`]
    pub fn execute(&self, call: Call<'static>) -> ApiResult<ApiResponse> {
        match &self.worker_pool {
            Some(worker_pool) => worker_pool.submit(&self.config, call),
            None => execute(&self.config, call),
        }
    }

    /// 在调用者线程中执行 API 调用，不经过工作线程池
    #[inline]
    pub fn execute_direct(&self, call: Call<'_>) -> ApiResult<ApiResponse> {
        execute(&self.config, call)
    }
}

/// Dropbox 客户端构建器
#[derive(Debug)]
pub struct ClientBuilder {
    inner: Client,
}

impl ClientBuilder {
    /// 设置工作线程池
    ///
    /// 可以使用 [`WorkerPool::global`] 获取全局工作线程池
    #[inline]
    pub fn worker_pool(&mut self, worker_pool: WorkerPool) -> &mut Self {
        self.inner.worker_pool = Some(worker_pool);
        self
    }

    /// 构建客户端
    #[inline]
    pub fn build(&self) -> Client {
        self.inner.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{super::Error, *};
    use crate::test_utils::{FakeHttpCaller, FakeReply};
    use dropbox_http::StatusCode;
    use serde_json::json;
    use std::{io::Read, sync::Arc};

    #[test]
    fn test_direct_dispatch() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let fake = Arc::new(FakeHttpCaller::new([
            FakeReply::new(StatusCode::OK).body(r#"{"account_id":"abc"}"#),
            FakeReply::new(StatusCode::OK)
                .header("content-length", "3")
                .body("abc"),
        ]));
        let client = Client::new(Config::builder("token").http_caller(fake.to_owned()).build()?);

        let account: serde_json::Value = client.rpc("/users/get_current_account", &())?.parse_json()?;
        assert_eq!(account, json!({"account_id": "abc"}));

        let mut response = client.content("/files/download", &json!({"path": "/a.txt"}), None)?;
        assert_eq!(response.content_length(), 3);
        let mut body = String::new();
        response.read_to_string(&mut body)?;
        assert_eq!(body, "abc");

        let requests = fake.requests();
        assert_eq!(requests[0].url.host(), Some("api.dropboxapi.com"));
        assert_eq!(requests[1].url.host(), Some("content.dropboxapi.com"));
        Ok(())
    }

    #[test]
    fn test_dispatch_through_worker_pool() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let fake = Arc::new(FakeHttpCaller::new([FakeReply::new(StatusCode::CONFLICT)
            .header("content-type", "application/json")
            .body(r#"{"error_summary":"to/conflict/file/..","error":{".tag":"to"}}"#)]));
        let pool = WorkerPool::new(1, 4)?;
        let client = Client::builder(Config::builder("token").http_caller(fake.to_owned()).build()?)
            .worker_pool(pool.to_owned())
            .build();

        let err = client
            .content(
                "/files/upload",
                &json!({"path": "/a.txt"}),
                Some(SyncRequestBody::from_bytes(b"abc".to_vec())),
            )
            .unwrap_err();
        assert!(matches!(&err, Error::Api(api_error) if api_error.summary() == "to/conflict/file/.."));
        assert_eq!(fake.requests()[0].body, b"abc");

        pool.shutdown();
        assert!(matches!(
            client.rpc("/users/get_current_account", &()),
            Err(Error::Build(_))
        ));
        Ok(())
    }

    #[test]
    fn test_execute_direct_with_borrowed_payload() -> anyhow::Result<()> {
        env_logger::builder().is_test(true).try_init().ok();

        let fake = Arc::new(FakeHttpCaller::new([FakeReply::new(StatusCode::OK).body(r#"{"size":5}"#)]));
        let pool = WorkerPool::new(1, 4)?;
        let client = Client::builder(Config::builder("token").http_caller(fake.to_owned()).build()?)
            .worker_pool(pool.to_owned())
            .build();
        // 线程池已经关闭也不影响直接发送
        pool.shutdown();

        let content = String::from("hello");
        let call = Call::content("/files/upload", &json!({"path": "/hello.txt"}))
            .payload(SyncRequestBody::from_referenced_bytes(content.as_bytes()));
        let response = client.execute_direct(call)?;
        assert_eq!(response.bytes()?, br#"{"size":5}"#);
        assert_eq!(fake.requests()[0].body, b"hello");
        Ok(())
    }
}
