//! Locator grammar, transport, and the HTTP/1.1 fetch pipeline.

pub mod client;
pub mod http;
pub mod locator;
pub mod redirect;
pub mod tls;
pub mod transport;

pub use client::FetchClient;
pub use client::Fetched;
pub use http::HeaderMap;
pub use http::Response;
pub use http::StatusCode;
pub use locator::Locator;
pub use locator::NetworkAddress;
pub use locator::NetworkScheme;
pub use locator::Resource;
pub use redirect::Fetch;
pub use redirect::fetch_following_redirect;

/// User agent offered on every outbound request.
pub const USER_AGENT: &str = "Nimbus/0.1";
