//! Scheme dispatch and the single-exchange HTTP/1.1 client.

use crate::USER_AGENT;
use crate::http::HeaderMap;
use crate::http::Response;
use crate::http::StatusCode;
use crate::locator::Locator;
use crate::locator::NetworkAddress;
use crate::locator::Resource;
use crate::tls::RustlsTlsConnector;
use crate::tls::TlsConnector;
use crate::tls::handshake_config_for;
use crate::transport::BoxedIoStream;
use crate::transport::DnsResolver;
use crate::transport::SystemDnsResolver;
use crate::transport::TcpTransport;
use crate::transport::Transport;
use nb_core::NimbusError;
use nb_core::NimbusResult;
use percent_encoding::percent_decode_str;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::time::Duration;

const MAX_RESPONSE_HEAD_BYTES: usize = 128 * 1024;

/// Raw fetch result before redirect handling. Network exchanges carry a full
/// response; file, data, and blank locators yield body text alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Network(Response),
    Content(String),
}

/// Fetch client with pluggable resolver, transport, and TLS backend.
///
/// Every network fetch is a single request-response exchange on a fresh
/// connection: `Connection: close` is always sent and the socket is dropped
/// on every exit path. There is no pooling, pipelining, or keep-alive.
pub struct FetchClient<R = SystemDnsResolver, T = TcpTransport, C = RustlsTlsConnector>
where
    R: DnsResolver,
    T: Transport,
    C: TlsConnector,
{
    dns: R,
    transport: T,
    tls: C,
    connect_timeout: Duration,
}

impl FetchClient {
    pub fn new() -> Self {
        Self::with_parts(SystemDnsResolver, TcpTransport, RustlsTlsConnector)
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, T, C> FetchClient<R, T, C>
where
    R: DnsResolver,
    T: Transport,
    C: TlsConnector,
{
    pub fn with_parts(dns: R, transport: T, tls: C) -> Self {
        Self {
            dns,
            transport,
            tls,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Retrieves the content a locator points at.
    pub fn fetch(&self, locator: &Locator) -> NimbusResult<Fetched> {
        match &locator.resource {
            Resource::Network(address) => self.exchange(address).map(Fetched::Network),
            Resource::File { path } => read_local_file(path).map(Fetched::Content),
            Resource::Data { payload } => decode_inline_payload(payload).map(Fetched::Content),
            Resource::Blank => Ok(Fetched::Content(String::new())),
        }
    }

    fn exchange(&self, address: &NetworkAddress) -> NimbusResult<Response> {
        log::debug!(
            "GET {}://{}{} ({}:{})",
            address.scheme.as_str(),
            address.host,
            address.path,
            address.host,
            address.port
        );

        let addresses = self.dns.resolve(&address.host, address.port)?;
        let stream = connect_first_available(&self.transport, &addresses, self.connect_timeout)?;

        let mut stream: BoxedIoStream = match handshake_config_for(address) {
            Some(handshake) => self.tls.connect_tls(stream, &handshake)?,
            None => Box::new(stream),
        };

        write_request(&mut *stream, address)?;
        read_response(&mut *stream)
    }
}

fn connect_first_available<T: Transport>(
    transport: &T,
    addresses: &[SocketAddr],
    timeout: Duration,
) -> NimbusResult<TcpStream> {
    let mut last_error: Option<NimbusError> = None;

    for address in addresses {
        match transport.connect(*address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                last_error = Some(error);
            }
        }
    }

    match last_error {
        Some(error) => Err(error),
        None => Err(NimbusError::new(
            "net.transport.no_addresses",
            "no addresses available to open a connection",
        )),
    }
}

fn encode_get_request(address: &NetworkAddress) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nUser-Agent: {}\r\n\r\n",
        address.path, address.host, USER_AGENT
    )
}

fn write_request(stream: &mut dyn Write, address: &NetworkAddress) -> NimbusResult<()> {
    let request = encode_get_request(address);

    stream.write_all(request.as_bytes()).map_err(|error| {
        NimbusError::new(
            "net.http.write_failed",
            format!("failed to write request bytes: {error}"),
        )
    })?;
    stream.flush().map_err(|error| {
        NimbusError::new(
            "net.http.flush_failed",
            format!("failed to flush request bytes: {error}"),
        )
    })?;

    Ok(())
}

/// Reads one close-delimited response: status line, header lines up to the
/// blank line, then the remainder of the stream as the body.
fn read_response(stream: &mut dyn Read) -> NimbusResult<Response> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).map_err(|error| {
            NimbusError::new(
                "net.http.read_head_failed",
                format!("failed while reading response head: {error}"),
            )
        })?;

        if read == 0 {
            return Err(NimbusError::new(
                "net.http.unexpected_eof",
                "connection closed before the response head completed",
            ));
        }

        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > MAX_RESPONSE_HEAD_BYTES {
            return Err(NimbusError::new(
                "net.http.head_too_large",
                format!("response head exceeds {MAX_RESPONSE_HEAD_BYTES} bytes"),
            ));
        }

        if let Some(end) = find_header_end(&buffer) {
            break end;
        }
    };

    let head_text = std::str::from_utf8(&buffer[..header_end]).map_err(|error| {
        NimbusError::new(
            "net.http.head_invalid_utf8",
            format!("response head is not valid UTF-8 text: {error}"),
        )
    })?;

    let mut lines = head_text.split("\r\n");
    let status_line = lines.next().ok_or_else(|| {
        NimbusError::new("net.http.status_line_missing", "missing HTTP status line")
    })?;
    let status = parse_status_line(status_line)?;

    let mut headers = HeaderMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (name, value) = line.split_once(':').ok_or_else(|| {
            NimbusError::new(
                "net.http.header_invalid",
                format!("invalid header line `{line}`"),
            )
        })?;
        headers.insert(name, value);
    }

    // Compressed or specially framed bodies are rejected outright, before
    // any body bytes are consumed.
    for name in ["transfer-encoding", "content-encoding"] {
        if headers.contains(name) {
            return Err(NimbusError::new(
                "net.http.framing_unsupported",
                format!("response declares `{name}`, which this client does not decode"),
            ));
        }
    }

    let mut body_bytes = buffer[header_end..].to_vec();
    stream.read_to_end(&mut body_bytes).map_err(|error| {
        NimbusError::new(
            "net.http.read_body_failed",
            format!("failed while reading response body: {error}"),
        )
    })?;

    let (body, _, _) = encoding_rs::UTF_8.decode(&body_bytes);

    Ok(Response {
        status,
        headers,
        body: body.into_owned(),
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|idx| idx + 4)
}

/// Splits `<version> <status> <explanation>` on the first two spaces; the
/// explanation is free text and may be absent.
fn parse_status_line(line: &str) -> NimbusResult<StatusCode> {
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().unwrap_or_default();
    if version.is_empty() {
        return Err(NimbusError::new(
            "net.http.status_line_invalid",
            format!("missing HTTP version in status line `{line}`"),
        ));
    }

    let code_text = parts.next().ok_or_else(|| {
        NimbusError::new(
            "net.http.status_line_invalid",
            format!("missing status code in status line `{line}`"),
        )
    })?;

    let code = code_text.parse::<u16>().map_err(|error| {
        NimbusError::new(
            "net.http.status_line_invalid",
            format!("invalid status code `{code_text}`: {error}"),
        )
    })?;

    StatusCode::new(code)
}

fn read_local_file(path: &str) -> NimbusResult<String> {
    std::fs::read_to_string(path).map_err(|error| {
        NimbusError::new(
            "io.file.read_failed",
            format!("failed to read `{path}`: {error}"),
        )
    })
}

fn decode_inline_payload(payload: &str) -> NimbusResult<String> {
    percent_decode_str(payload)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|error| {
            NimbusError::new(
                "net.data.payload_invalid_utf8",
                format!("inline payload is not valid UTF-8 after percent-decoding: {error}"),
            )
        })
}
