mod backoff;
mod call;
mod cancellation;
mod client;
mod config;
mod request;
mod response;

pub use backoff::{RetryDecision, RetryPolicy, RetryPolicyBuilder, RetryState};
pub use call::execute;
pub use cancellation::CancellationToken;
pub use client::{Client, ClientBuilder};
pub use config::{Config, ConfigBuilder};
pub use request::{escape_non_ascii, Call, EndpointKind, DEFAULT_API_ENDPOINT, DEFAULT_CONTENT_ENDPOINT};
pub use response::{ApiError, ApiResponse, ApiResult, Error};
