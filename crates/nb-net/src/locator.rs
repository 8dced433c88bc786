//! Locator grammar: classifying raw address strings.

use nb_core::NimbusError;
use nb_core::NimbusResult;

/// Network schemes carried over a TCP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkScheme {
    Http,
    Https,
}

impl NetworkScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    pub fn is_secure(self) -> bool {
        matches!(self, Self::Https)
    }
}

/// Address of a resource served over HTTP(S).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddress {
    pub scheme: NetworkScheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl NetworkAddress {
    /// Host, with the port appended only when it differs from the scheme
    /// default.
    pub fn authority(&self) -> String {
        if self.port == self.scheme.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme.as_str(), self.authority())
    }
}

/// Scheme-specific address payload. One variant per scheme family keeps
/// invalid field combinations unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Network(NetworkAddress),
    File { path: String },
    Data { payload: String },
    Blank,
}

/// Canonical locator used by the fetch pipeline. Immutable once built; a
/// redirect hop constructs a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub resource: Resource,
    pub view_source: bool,
}

impl Locator {
    /// Classifies a raw address string.
    ///
    /// The primary `scheme://...` grammar covers `http`, `https`, and `file`,
    /// with an optional `view-source:` prefix on the scheme token. Input the
    /// primary grammar cannot place falls through to the data/blank stage
    /// instead of failing the caller. The one hard error is a malformed or
    /// zero explicit port.
    pub fn parse(raw: &str) -> NimbusResult<Self> {
        if let Some(locator) = parse_primary(raw)? {
            return Ok(locator);
        }

        Ok(Self {
            resource: parse_fallback(raw),
            view_source: false,
        })
    }

    pub fn blank() -> Self {
        Self {
            resource: Resource::Blank,
            view_source: false,
        }
    }
}

fn parse_primary(raw: &str) -> NimbusResult<Option<Locator>> {
    let Some((scheme_token, remainder)) = raw.split_once("://") else {
        return Ok(None);
    };

    let (view_source, scheme_token) = match scheme_token.strip_prefix("view-source:") {
        Some(stripped) => (true, stripped),
        None => (false, scheme_token),
    };

    let resource = match scheme_token {
        "http" => Resource::Network(parse_network(NetworkScheme::Http, remainder)?),
        "https" => Resource::Network(parse_network(NetworkScheme::Https, remainder)?),
        "file" => {
            // The authority segment of a file locator is ignored; only the
            // path is kept.
            let (_, path) = split_authority_path(remainder);
            Resource::File { path }
        }
        _ => return Ok(None),
    };

    Ok(Some(Locator {
        resource,
        view_source,
    }))
}

fn parse_network(scheme: NetworkScheme, remainder: &str) -> NimbusResult<NetworkAddress> {
    let (authority, path) = split_authority_path(remainder);

    let (host, port) = match authority.split_once(':') {
        Some((host, port_text)) => (host.to_owned(), parse_explicit_port(port_text)?),
        None => (authority, scheme.default_port()),
    };

    Ok(NetworkAddress {
        scheme,
        host,
        port,
        path,
    })
}

/// Splits `host[:port][/path]` into authority and `/`-prefixed path. A bare
/// authority normalizes to path `/`.
fn split_authority_path(remainder: &str) -> (String, String) {
    match remainder.split_once('/') {
        Some((authority, path)) => (authority.to_owned(), format!("/{path}")),
        None => (remainder.to_owned(), "/".to_owned()),
    }
}

fn parse_explicit_port(port_text: &str) -> NimbusResult<u16> {
    let port = port_text.parse::<u16>().map_err(|error| {
        NimbusError::new(
            "net.locator.port_invalid",
            format!("invalid explicit port `{port_text}`: {error}"),
        )
    })?;

    if port == 0 {
        return Err(NimbusError::new(
            "net.locator.port_invalid",
            "explicit port 0 is not connectable",
        ));
    }

    Ok(port)
}

/// Fallback stage: strings starting with the literal token `data` carry an
/// inline payload after the first comma; everything else is the blank
/// sentinel. Either split failing also degrades to blank.
fn parse_fallback(raw: &str) -> Resource {
    if !raw.starts_with("data") {
        return Resource::Blank;
    }

    let Some((_, after_slash)) = raw.split_once('/') else {
        return Resource::Blank;
    };
    let Some((_, payload)) = after_slash.split_once(',') else {
        return Resource::Blank;
    };

    Resource::Data {
        payload: payload.to_owned(),
    }
}
