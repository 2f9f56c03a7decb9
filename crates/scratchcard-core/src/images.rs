//! Remote image allowlist.
//!
//! Images are only loaded from hosts matching one of the configured
//! `RemotePattern`s. Hostname patterns support a leading `*.` (exactly one
//! extra label) and `**.` (any number of extra labels); pathname patterns
//! support `*` (one segment) and `**` (any remaining segments).

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    pub hostname: String,
    /// Empty string means the URL must not carry an explicit port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
}

impl RemotePattern {
    /// Pattern admitting any path on `hostname` over https
    pub fn https(hostname: impl Into<String>) -> Self {
        Self {
            protocol: Some("https".to_string()),
            hostname: hostname.into(),
            port: None,
            pathname: None,
        }
    }

    pub fn matches(&self, url: &Url) -> bool {
        if let Some(ref protocol) = self.protocol {
            if protocol.trim_end_matches(':') != url.scheme() {
                return false;
            }
        }

        let host = match url.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return false,
        };
        if !hostname_matches(&self.hostname.to_ascii_lowercase(), &host) {
            return false;
        }

        if let Some(ref port) = self.port {
            let actual = url.port().map(|p| p.to_string()).unwrap_or_default();
            if *port != actual {
                return false;
            }
        }

        match self.pathname {
            Some(ref pattern) => pathname_matches(pattern, url.path()),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePolicy {
    #[serde(default)]
    pub remote_patterns: Vec<RemotePattern>,
}

impl ImagePolicy {
    pub fn new(remote_patterns: Vec<RemotePattern>) -> Self {
        Self { remote_patterns }
    }

    /// Check whether an image URL may be loaded
    pub fn is_allowed(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(url, error = %e, "Rejecting unparseable image URL");
                return false;
            }
        };
        self.remote_patterns.iter().any(|p| p.matches(&parsed))
    }
}

fn hostname_matches(pattern: &str, host: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix("**.") {
        host.len() > suffix.len() + 1
            && host.ends_with(suffix)
            && host[..host.len() - suffix.len()].ends_with('.')
    } else if let Some(suffix) = pattern.strip_prefix("*.") {
        match host.split_once('.') {
            Some((label, rest)) => !label.is_empty() && rest == suffix,
            None => false,
        }
    } else {
        pattern == host
    }
}

fn pathname_matches(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = pattern.trim_start_matches('/').split('/').collect();
    let path: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    segments_match(&pattern, &path)
}

fn segments_match(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| segments_match(rest, &path[skip..])),
        Some((&"*", rest)) => match path.split_first() {
            Some((segment, tail)) => !segment.is_empty() && segments_match(rest, tail),
            None => false,
        },
        Some((literal, rest)) => match path.split_first() {
            Some((segment, tail)) => segment == literal && segments_match(rest, tail),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(pattern: RemotePattern) -> ImagePolicy {
        ImagePolicy::new(vec![pattern])
    }

    #[test]
    fn test_exact_hostname() {
        let policy = policy(RemotePattern::https("cdn.example.com"));

        assert!(policy.is_allowed("https://cdn.example.com/cards/gold.png"));
        assert!(policy.is_allowed("https://CDN.example.com/a.png"));
        assert!(!policy.is_allowed("https://img.example.com/a.png"));
        assert!(!policy.is_allowed("http://cdn.example.com/a.png"));
    }

    #[test]
    fn test_single_label_wildcard() {
        let policy = policy(RemotePattern::https("*.example.com"));

        assert!(policy.is_allowed("https://img.example.com/a.png"));
        assert!(!policy.is_allowed("https://a.b.example.com/a.png"));
        assert!(!policy.is_allowed("https://example.com/a.png"));
    }

    #[test]
    fn test_multi_label_wildcard() {
        let policy = policy(RemotePattern::https("**.example.com"));

        assert!(policy.is_allowed("https://img.example.com/a.png"));
        assert!(policy.is_allowed("https://a.b.example.com/a.png"));
        assert!(!policy.is_allowed("https://example.com/a.png"));
        assert!(!policy.is_allowed("https://badexample.com/a.png"));
    }

    #[test]
    fn test_port_constraint() {
        let mut pattern = RemotePattern::https("localhost");
        pattern.protocol = None;
        pattern.port = Some("3000".to_string());
        let policy = policy(pattern);

        assert!(policy.is_allowed("http://localhost:3000/a.png"));
        assert!(!policy.is_allowed("http://localhost:4000/a.png"));
        assert!(!policy.is_allowed("http://localhost/a.png"));
    }

    #[test]
    fn test_empty_port_requires_default() {
        let mut pattern = RemotePattern::https("cdn.example.com");
        pattern.port = Some(String::new());
        let policy = policy(pattern);

        assert!(policy.is_allowed("https://cdn.example.com/a.png"));
        assert!(!policy.is_allowed("https://cdn.example.com:8443/a.png"));
    }

    #[test]
    fn test_pathname_globs() {
        let mut pattern = RemotePattern::https("cdn.example.com");
        pattern.pathname = Some("/uploads/**".to_string());
        let deep = policy(pattern.clone());

        assert!(deep.is_allowed("https://cdn.example.com/uploads/2024/05/card.png"));
        assert!(!deep.is_allowed("https://cdn.example.com/private/card.png"));

        pattern.pathname = Some("/avatars/*".to_string());
        let shallow = policy(pattern);

        assert!(shallow.is_allowed("https://cdn.example.com/avatars/u1.png"));
        assert!(!shallow.is_allowed("https://cdn.example.com/avatars/u1/big.png"));
    }

    #[test]
    fn test_rejects_invalid_urls_and_empty_policy() {
        let policy = policy(RemotePattern::https("cdn.example.com"));
        assert!(!policy.is_allowed("not a url"));
        assert!(!policy.is_allowed("data:image/png;base64,AAAA"));

        assert!(!ImagePolicy::default().is_allowed("https://cdn.example.com/a.png"));
    }
}
