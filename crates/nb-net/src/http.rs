//! HTTP/1.1 response contracts.

use nb_core::NimbusError;
use nb_core::NimbusResult;
use std::collections::HashMap;

/// Response header map.
///
/// Names are case-folded and values trimmed on insert; re-inserting a name
/// replaces the earlier value, so the last occurrence of a duplicate header
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: HashMap<String, String>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.entries
            .insert(name.to_ascii_lowercase(), value.trim().to_owned());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// HTTP status code wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    pub fn new(code: u16) -> NimbusResult<Self> {
        if (100..=599).contains(&code) {
            return Ok(Self(code));
        }

        Err(NimbusError::new(
            "net.http.status_invalid",
            format!("status code must be 100-599, got `{code}`"),
        ))
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn is_success(self) -> bool {
        (200..=299).contains(&self.0)
    }

    /// The one status the redirect policy acts on.
    pub fn is_moved_permanently(self) -> bool {
        self.0 == 301
    }
}

/// Decoded response from a single HTTP exchange. Lives for the duration of
/// one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::HeaderMap;
    use super::StatusCode;

    #[test]
    fn header_names_are_case_folded() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn header_values_are_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("Location", "  /new  ");
        assert_eq!(headers.get("location"), Some("/new"));
    }

    #[test]
    fn duplicate_header_keeps_the_last_value() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Token", "first");
        headers.insert("x-token", "second");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-token"), Some("second"));
    }

    #[test]
    fn status_code_range_is_enforced() {
        assert!(StatusCode::new(200).is_ok());
        assert!(StatusCode::new(99).is_err());
        assert!(StatusCode::new(600).is_err());
    }

    #[test]
    fn only_301_triggers_the_redirect_policy() {
        let moved = match StatusCode::new(301) {
            Ok(status) => status,
            Err(error) => panic!("{error}"),
        };
        let found = match StatusCode::new(302) {
            Ok(status) => status,
            Err(error) => panic!("{error}"),
        };

        assert!(moved.is_moved_permanently());
        assert!(!found.is_moved_permanently());
    }
}
