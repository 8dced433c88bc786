//! Single-hop redirect policy layered over the fetch client.

use crate::client::FetchClient;
use crate::client::Fetched;
use crate::http::Response;
use crate::locator::Locator;
use crate::locator::NetworkAddress;
use crate::locator::Resource;
use crate::tls::TlsConnector;
use crate::transport::DnsResolver;
use crate::transport::Transport;
use nb_core::NimbusResult;
use nb_text::escape_markup;

/// Fetch abstraction so the redirect policy can be exercised with doubles.
pub trait Fetch {
    fn fetch(&self, locator: &Locator) -> NimbusResult<Fetched>;
}

impl<R, T, C> Fetch for FetchClient<R, T, C>
where
    R: DnsResolver,
    T: Transport,
    C: TlsConnector,
{
    fn fetch(&self, locator: &Locator) -> NimbusResult<Fetched> {
        FetchClient::fetch(self, locator)
    }
}

/// Fetches `locator` and returns the final body text, following at most one
/// `301 Moved Permanently` hop.
///
/// The hop's response is final whatever its status: a redirect target that is
/// itself a redirect is not chased further. Non-network fetches never
/// redirect. When the original locator is in view-source mode, the final body
/// has its angle brackets escaped; this happens after any redirect, never
/// before.
pub fn fetch_following_redirect(fetcher: &impl Fetch, locator: &Locator) -> NimbusResult<String> {
    let body = match fetcher.fetch(locator)? {
        Fetched::Content(body) => body,
        Fetched::Network(response) => match redirect_target(locator, &response)? {
            Some(next) => {
                match fetcher.fetch(&next)? {
                    Fetched::Network(second) => second.body,
                    Fetched::Content(body) => body,
                }
            }
            None => response.body,
        },
    };

    if locator.view_source {
        return Ok(escape_markup(&body));
    }

    Ok(body)
}

/// The locator for the single permitted hop, or `None` when the response is
/// final. A 301 without a `location` header is served as-is.
fn redirect_target(locator: &Locator, response: &Response) -> NimbusResult<Option<Locator>> {
    if !response.status.is_moved_permanently() {
        return Ok(None);
    }

    let Resource::Network(address) = &locator.resource else {
        return Ok(None);
    };
    let Some(location) = response.headers.get("location") else {
        return Ok(None);
    };

    let absolute = resolve_location(address, location);
    log::debug!("301 from {} to {absolute}", address.origin());
    Locator::parse(&absolute).map(Some)
}

/// A location starting with `/` is relative to the original origin; anything
/// else is taken as already absolute.
fn resolve_location(address: &NetworkAddress, location: &str) -> String {
    if location.starts_with('/') {
        format!("{}{}", address.origin(), location)
    } else {
        location.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::Fetch;
    use super::fetch_following_redirect;
    use crate::client::Fetched;
    use crate::http::HeaderMap;
    use crate::http::Response;
    use crate::http::StatusCode;
    use crate::locator::Locator;
    use crate::locator::Resource;
    use nb_core::NimbusError;
    use nb_core::NimbusResult;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedFetch {
        responses: RefCell<VecDeque<Fetched>>,
        requested: RefCell<Vec<Locator>>,
    }

    impl ScriptedFetch {
        fn new(responses: Vec<Fetched>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<Locator> {
            self.requested.borrow().clone()
        }
    }

    impl Fetch for ScriptedFetch {
        fn fetch(&self, locator: &Locator) -> NimbusResult<Fetched> {
            self.requested.borrow_mut().push(locator.clone());
            match self.responses.borrow_mut().pop_front() {
                Some(fetched) => Ok(fetched),
                None => Err(NimbusError::new(
                    "test.fetch.exhausted",
                    "no scripted response left",
                )),
            }
        }
    }

    fn status(code: u16) -> StatusCode {
        match StatusCode::new(code) {
            Ok(status) => status,
            Err(error) => panic!("{error}"),
        }
    }

    fn network(code: u16, location: Option<&str>, body: &str) -> Fetched {
        let mut headers = HeaderMap::new();
        if let Some(location) = location {
            headers.insert("Location", location);
        }

        Fetched::Network(Response {
            status: status(code),
            headers,
            body: body.to_owned(),
        })
    }

    fn locator(raw: &str) -> Locator {
        match Locator::parse(raw) {
            Ok(locator) => locator,
            Err(error) => panic!("{error}"),
        }
    }

    fn network_path(locator: &Locator) -> (String, String, u16) {
        match &locator.resource {
            Resource::Network(address) => {
                (address.host.clone(), address.path.clone(), address.port)
            }
            other => panic!("expected network locator, got {other:?}"),
        }
    }

    #[test]
    fn follows_a_relative_location_exactly_once() {
        let fetcher = ScriptedFetch::new(vec![
            network(301, Some("/new"), "moved"),
            network(200, None, "landed"),
        ]);

        let body = fetch_following_redirect(&fetcher, &locator("http://h/old"));
        assert_eq!(body, Ok("landed".to_owned()));

        let requested = fetcher.requested();
        assert_eq!(requested.len(), 2);
        assert_eq!(
            network_path(&requested[1]),
            ("h".to_owned(), "/new".to_owned(), 80)
        );
    }

    #[test]
    fn second_redirect_is_not_chased() {
        let fetcher = ScriptedFetch::new(vec![
            network(301, Some("/a"), "first hop"),
            network(301, Some("/b"), "second hop body"),
        ]);

        let body = fetch_following_redirect(&fetcher, &locator("http://h/old"));
        assert_eq!(body, Ok("second hop body".to_owned()));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[test]
    fn absolute_location_is_taken_verbatim() {
        let fetcher = ScriptedFetch::new(vec![
            network(301, Some("http://other:8080/abs"), "moved"),
            network(200, None, "elsewhere"),
        ]);

        let body = fetch_following_redirect(&fetcher, &locator("https://h/old"));
        assert_eq!(body, Ok("elsewhere".to_owned()));
        assert_eq!(
            network_path(&fetcher.requested()[1]),
            ("other".to_owned(), "/abs".to_owned(), 8080)
        );
    }

    #[test]
    fn relative_location_keeps_a_non_default_origin_port() {
        let fetcher = ScriptedFetch::new(vec![
            network(301, Some("/new"), "moved"),
            network(200, None, "landed"),
        ]);

        let body = fetch_following_redirect(&fetcher, &locator("http://h:8080/old"));
        assert_eq!(body, Ok("landed".to_owned()));
        assert_eq!(
            network_path(&fetcher.requested()[1]),
            ("h".to_owned(), "/new".to_owned(), 8080)
        );
    }

    #[test]
    fn non_redirect_statuses_pass_through() {
        let fetcher = ScriptedFetch::new(vec![network(302, Some("/found"), "not chased")]);
        let body = fetch_following_redirect(&fetcher, &locator("http://h/"));
        assert_eq!(body, Ok("not chased".to_owned()));
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[test]
    fn redirect_without_location_is_served_as_is() {
        let fetcher = ScriptedFetch::new(vec![network(301, None, "no destination")]);
        let body = fetch_following_redirect(&fetcher, &locator("http://h/"));
        assert_eq!(body, Ok("no destination".to_owned()));
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[test]
    fn content_fetches_never_redirect() {
        let fetcher = ScriptedFetch::new(vec![Fetched::Content("local text".to_owned())]);
        let body = fetch_following_redirect(&fetcher, &locator("file:///tmp/page.html"));
        assert_eq!(body, Ok("local text".to_owned()));
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[test]
    fn view_source_escapes_the_final_body() {
        let fetcher = ScriptedFetch::new(vec![network(200, None, "<b>hi</b>")]);
        let body = fetch_following_redirect(&fetcher, &locator("view-source:http://h/"));
        assert_eq!(body, Ok("&lt;b&gt;hi&lt;/b&gt;".to_owned()));
    }

    #[test]
    fn view_source_escaping_applies_after_the_redirect() {
        let fetcher = ScriptedFetch::new(vec![
            network(301, Some("/new"), "<a>moved</a>"),
            network(200, None, "<p>final</p>"),
        ]);

        let body = fetch_following_redirect(&fetcher, &locator("view-source:http://h/old"));
        assert_eq!(body, Ok("&lt;p&gt;final&lt;/p&gt;".to_owned()));
    }

    #[test]
    fn fetch_errors_surface_unchanged() {
        let fetcher = ScriptedFetch::new(Vec::new());
        let body = fetch_following_redirect(&fetcher, &locator("http://h/"));
        assert!(body.is_err());
    }
}
