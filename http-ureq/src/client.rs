use super::extensions::TimeoutExtension;
use dropbox_http::{
    header::{CONTENT_LENGTH, USER_AGENT},
    HeaderName, HeaderValue, HttpCaller, ResponseError, ResponseErrorKind, StatusCode, SyncRequest, SyncResponse,
    SyncResponseBody, SyncResponseResult, Version,
};
use std::{
    fmt::{self, Debug, Display},
    io::{Read, Result as IoResult},
    mem::take,
};
use ureq::{Agent, Error as UreqError, ErrorKind as UreqErrorKind, Request as UreqRequest, Response as UreqResponse};

const USER_AGENT_SUFFIX: &str = "/dropbox-ureq";

/// Ureq 客户端
///
/// 任何状态码的响应都作为正常响应返回，只有传输层错误才返回 [`ResponseError`]
#[derive(Debug, Clone)]
pub struct Client {
    agent: Agent,
}

impl Client {
    /// 使用指定的 Ureq Agent 创建客户端
    #[inline]
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

impl From<Agent> for Client {
    #[inline]
    fn from(agent: Agent) -> Self {
        Self::new(agent)
    }
}

impl Default for Client {
    #[inline]
    fn default() -> Self {
        Self::new(ureq::agent())
    }
}

impl HttpCaller for Client {
    fn call(&self, request: &mut SyncRequest<'_>) -> SyncResponseResult {
        let ureq_request = to_ureq_request(&self.agent, request)?;
        let ureq_response = match ureq_request.send(request.body_mut()) {
            Ok(response) | Err(UreqError::Status(_, response)) => response,
            Err(UreqError::Transport(transport)) => {
                let kind = error_kind_of(transport.kind());
                return Err(ResponseError::builder(kind, transport).uri(request.url()).build());
            }
        };
        from_ureq_response(ureq_response, request)
    }
}

/// 未知长度的请求体不设置 `Content-Length`，由 Ureq 使用分块传输
fn to_ureq_request(agent: &Agent, request: &SyncRequest<'_>) -> Result<UreqRequest, ResponseError> {
    let mut ureq_request = agent.request(request.method().as_str(), &request.url().to_string());
    for (name, value) in request.headers() {
        ureq_request = ureq_request.set(name.as_str(), header_str(request, name, value)?);
    }
    let user_agent = request.user_agent() + USER_AGENT_SUFFIX;
    ureq_request = ureq_request.set(USER_AGENT.as_str(), &user_agent);
    if let Some(size) = request.body().size() {
        ureq_request = ureq_request.set(CONTENT_LENGTH.as_str(), &size.to_string());
    }
    if let Some(timeout) = request.extensions().get::<TimeoutExtension>() {
        ureq_request = ureq_request.timeout(timeout.get());
    }
    Ok(ureq_request)
}

fn header_str<'v>(
    request: &SyncRequest<'_>,
    name: &HeaderName,
    value: &'v HeaderValue,
) -> Result<&'v str, ResponseError> {
    value
        .to_str()
        .map_err(|err| invalid(request, ResponseErrorKind::InvalidHeader, format!("header {name}: {err}")))
}

fn from_ureq_response(ureq_response: UreqResponse, request: &mut SyncRequest<'_>) -> SyncResponseResult {
    let status_code = StatusCode::from_u16(ureq_response.status()).map_err(|err| {
        invalid(
            request,
            ResponseErrorKind::InvalidRequestResponse,
            format!("status code {}: {err}", ureq_response.status()),
        )
    })?;
    let version = version_of(ureq_response.http_version()).ok_or_else(|| {
        invalid(
            request,
            ResponseErrorKind::InvalidRequestResponse,
            format!("http version {}", ureq_response.http_version()),
        )
    })?;

    let mut builder = SyncResponse::builder();
    builder
        .status_code(status_code)
        .version(version)
        .extensions(take(request.extensions_mut()));
    let mut names = ureq_response.headers_names();
    names.sort_unstable();
    names.dedup();
    for name in names {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| invalid(request, ResponseErrorKind::InvalidHeader, format!("header {name}: {err}")))?;
        for value in ureq_response.all(&name) {
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                invalid(request, ResponseErrorKind::InvalidHeader, format!("header {name}: {err}"))
            })?;
            builder.header(header_name.to_owned(), header_value);
        }
    }
    builder.body(SyncResponseBody::from_reader(UreqBody(ureq_response.into_reader())));
    Ok(builder.build())
}

fn version_of(version: &str) -> Option<Version> {
    Some(match version {
        "HTTP/0.9" => Version::HTTP_09,
        "HTTP/1.0" => Version::HTTP_10,
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/2.0" => Version::HTTP_2,
        "HTTP/3.0" => Version::HTTP_3,
        _ => return None,
    })
}

fn invalid(
    request: &SyncRequest<'_>,
    kind: ResponseErrorKind,
    msg: impl Display + Debug + Send + Sync + 'static,
) -> ResponseError {
    ResponseError::builder_with_msg(kind, msg).uri(request.url()).build()
}

fn error_kind_of(kind: UreqErrorKind) -> ResponseErrorKind {
    match kind {
        UreqErrorKind::InvalidUrl | UreqErrorKind::UnknownScheme => ResponseErrorKind::InvalidUrl,
        UreqErrorKind::Dns => ResponseErrorKind::UnknownHostError,
        UreqErrorKind::ConnectionFailed => ResponseErrorKind::ConnectError,
        UreqErrorKind::TooManyRedirects => ResponseErrorKind::TooManyRedirect,
        UreqErrorKind::BadStatus => ResponseErrorKind::InvalidRequestResponse,
        UreqErrorKind::BadHeader => ResponseErrorKind::InvalidHeader,
        UreqErrorKind::Io => ResponseErrorKind::SendError,
        UreqErrorKind::InvalidProxyUrl | UreqErrorKind::ProxyConnect | UreqErrorKind::ProxyUnauthorized => {
            ResponseErrorKind::ProxyError
        }
        UreqErrorKind::InsecureRequestHttpsOnly => ResponseErrorKind::SslError,
        _ => ResponseErrorKind::UnknownError,
    }
}

struct UreqBody(Box<dyn Read + Send + Sync + 'static>);

impl Read for UreqBody {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.0.read(buf)
    }
}

impl Debug for UreqBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UreqBody")
    }
}
