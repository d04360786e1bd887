use dropbox_http::{
    HeaderMap, HeaderName, HeaderValue, HttpCaller, Method, ResponseError, ResponseErrorKind, StatusCode,
    SyncRequest, SyncResponse, SyncResponseResult, Uri,
};
use std::{
    collections::VecDeque,
    io::{Cursor, Read, Result as IoResult},
    sync::{
        atomic::{AtomicBool, Ordering::SeqCst},
        Arc, Mutex,
    },
};

/// 预设的响应
#[derive(Debug, Clone)]
pub(crate) enum FakeReply {
    Response {
        status_code: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    },
    Error(ResponseErrorKind),
}

impl FakeReply {
    pub(crate) fn new(status_code: StatusCode) -> Self {
        Self::Response {
            status_code,
            headers: Default::default(),
            body: Default::default(),
        }
    }

    pub(crate) fn error(kind: ResponseErrorKind) -> Self {
        Self::Error(kind)
    }

    pub(crate) fn header(mut self, name: &'static str, value: &'static str) -> Self {
        if let Self::Response { headers, .. } = &mut self {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        self
    }

    pub(crate) fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        if let Self::Response { body, .. } = &mut self {
            *body = bytes.into();
        }
        self
    }
}

/// 被记录的请求
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) url: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

/// 按顺序返回预设响应的 HTTP 客户端
///
/// 预设响应用完后重复返回最后一个
#[derive(Debug, Default)]
pub(crate) struct FakeHttpCaller {
    replies: Mutex<VecDeque<FakeReply>>,
    last_reply: Mutex<Option<FakeReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    drained: Mutex<Vec<Arc<AtomicBool>>>,
}

impl FakeHttpCaller {
    pub(crate) fn new(replies: impl IntoIterator<Item = FakeReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().to_owned()
    }

    /// 每个返回的响应体是否都被读完
    pub(crate) fn drained(&self) -> Vec<bool> {
        self.drained
            .lock()
            .unwrap()
            .iter()
            .map(|drained| drained.load(SeqCst))
            .collect()
    }

    fn next_reply(&self) -> FakeReply {
        let mut last_reply = self.last_reply.lock().unwrap();
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            *last_reply = Some(reply);
        }
        last_reply.to_owned().unwrap_or_else(|| FakeReply::new(StatusCode::OK))
    }
}

impl HttpCaller for FakeHttpCaller {
    fn call(&self, request: &mut SyncRequest<'_>) -> SyncResponseResult {
        let mut body = Vec::new();
        request
            .body_mut()
            .read_to_end(&mut body)
            .map_err(|err| ResponseError::builder(ResponseErrorKind::LocalIoError, err).build())?;
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().to_owned(),
            url: request.url().to_owned(),
            headers: request.headers().to_owned(),
            body,
        });

        match self.next_reply() {
            FakeReply::Response {
                status_code,
                headers,
                body,
            } => {
                let drained = Arc::new(AtomicBool::new(false));
                self.drained.lock().unwrap().push(drained.to_owned());
                Ok(SyncResponse::builder()
                    .status_code(status_code)
                    .headers(headers)
                    .stream_as_body(TrackedBody {
                        cursor: Cursor::new(body),
                        drained,
                    })
                    .build())
            }
            FakeReply::Error(kind) => Err(ResponseError::builder_with_msg(kind, "fake transport error")
                .uri(request.url())
                .build()),
        }
    }
}

/// 读到末尾时记录下来的响应体
#[derive(Debug)]
struct TrackedBody {
    cursor: Cursor<Vec<u8>>,
    drained: Arc<AtomicBool>,
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        let n = self.cursor.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.drained.store(true, SeqCst);
        }
        Ok(n)
    }
}
