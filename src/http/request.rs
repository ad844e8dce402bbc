//! Request interpretation: first-line parsing and downgrade rewriting.
//!
//! # Responsibilities
//! - Parse the request line of the first received chunk
//! - Extract target host, port, and path
//! - Classify the session (direct-forward vs downgrade-tunnel)
//! - Produce the exact bytes to send to the origin
//!
//! # Design Decisions
//! - The whole request line and headers are assumed to arrive in the first
//!   receive; there is no incremental parsing of partial lines. Known
//!   limitation carried over deliberately.
//! - `Proxy-` header filtering is a case-sensitive prefix match.

use thiserror::Error;

/// Error type for request interpretation.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Request line had fewer than two whitespace-separated tokens.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Target named a port that does not parse as an integer.
    #[error("invalid port in target: {0:?}")]
    InvalidPort(String),
}

/// How the session will be carried to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Plain HTTP request forwarded after scheme substitution.
    DirectForward,

    /// CONNECT to port 443, downgraded: plaintext toward the client, a TLS
    /// handshake toward the origin, and a synthesized GET on the wire.
    DowngradeTunnel,
}

/// Everything the connection handler needs from the initial request.
///
/// Derived once per session and not retained past handler setup.
#[derive(Debug)]
pub struct ParsedRequest {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub kind: SessionKind,
    /// The request bytes to send to the origin once connected.
    pub origin_bytes: Vec<u8>,
}

impl ParsedRequest {
    /// Interpret the raw bytes of a session's first receive.
    pub fn parse(raw: &[u8]) -> Result<Self, RequestError> {
        let text = String::from_utf8_lossy(raw);
        let request_line = text.lines().next().unwrap_or("");

        let mut tokens = request_line.split_whitespace();
        let method = tokens
            .next()
            .ok_or_else(|| RequestError::MalformedRequestLine(request_line.to_string()))?;
        let target = tokens
            .next()
            .ok_or_else(|| RequestError::MalformedRequestLine(request_line.to_string()))?;

        let target = strip_scheme(target);
        let (host, port, path) = split_target(target)?;

        let kind = if method == "CONNECT" && request_line.contains(":443") {
            SessionKind::DowngradeTunnel
        } else {
            SessionKind::DirectForward
        };

        let origin_bytes = match kind {
            SessionKind::DowngradeTunnel => synthesize_tunnel_get(&text, &path),
            // CONNECT to a non-443 port cannot be forwarded verbatim (the
            // CONNECT line is not a resource request); rewrite it to a plain
            // GET the way a 443 tunnel would be, minus the TLS leg.
            SessionKind::DirectForward if method == "CONNECT" => {
                synthesize_plain_get(&text, &host)
            }
            SessionKind::DirectForward => text.replace("https://", "http://").into_bytes(),
        };

        Ok(Self {
            host,
            port,
            path,
            kind,
            origin_bytes,
        })
    }
}

/// Drop a leading `scheme://` from the target, if present.
fn strip_scheme(target: &str) -> &str {
    match target.find("://") {
        Some(pos) => &target[pos + 3..],
        None => target,
    }
}

/// Split a scheme-less target into host, port, and path.
///
/// Port defaults to 80 when the host part carries no `:`; path defaults
/// to `/` when the target has no `/` at all.
fn split_target(target: &str) -> Result<(String, u16, String), RequestError> {
    let host_end = target.find('/').unwrap_or(target.len());
    let path = if host_end < target.len() {
        target[host_end..].to_string()
    } else {
        "/".to_string()
    };

    match target[..host_end].find(':') {
        None => Ok((target[..host_end].to_string(), 80, path)),
        Some(colon) => {
            let port = target[colon + 1..host_end]
                .parse::<u16>()
                .map_err(|_| RequestError::InvalidPort(target.to_string()))?;
            Ok((target[..colon].to_string(), port, path))
        }
    }
}

/// Build the GET request sent over the origin TLS stream for a downgrade
/// tunnel. Header lines from the original request are carried verbatim,
/// except those with the `Proxy-` prefix; the original request line and any
/// body are discarded.
fn synthesize_tunnel_get(request: &str, path: &str) -> Vec<u8> {
    let mut out = format!("GET {} HTTP/1.1\r\n", path);
    for line in request.lines().skip(1) {
        if line.trim().is_empty() || line.starts_with("Proxy-") {
            continue;
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.into_bytes()
}

/// Rewrite a CONNECT aimed at a non-443 port into a plaintext `GET /`
/// with a `Host:` header naming the target.
fn synthesize_plain_get(request: &str, host: &str) -> Vec<u8> {
    let mut out = format!("GET / HTTP/1.1\r\nHost: {}\r\n", host);
    for line in request.lines().skip(1) {
        if line.trim().is_empty() || line.to_lowercase().starts_with("host:") {
            continue;
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_with_port_and_path() {
        let (host, port, path) = split_target("example.com:8443/path").unwrap();
        assert_eq!(host, "example.com");
        assert_eq!(port, 8443);
        assert_eq!(path, "/path");
    }

    #[test]
    fn target_without_port_defaults_to_80() {
        let (host, port, path) = split_target("example.com/path").unwrap();
        assert_eq!(host, "example.com");
        assert_eq!(port, 80);
        assert_eq!(path, "/path");
    }

    #[test]
    fn target_without_path_defaults_to_root() {
        let (host, port, path) = split_target("example.com").unwrap();
        assert_eq!(host, "example.com");
        assert_eq!(port, 80);
        assert_eq!(path, "/");
    }

    #[test]
    fn unparseable_port_is_rejected() {
        assert!(matches!(
            split_target("example.com:http/"),
            Err(RequestError::InvalidPort(_))
        ));
    }

    #[test]
    fn absolute_url_target_is_stripped() {
        let parsed =
            ParsedRequest::parse(b"GET http://example.com/index.html HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.port, 80);
        assert_eq!(parsed.path, "/index.html");
        assert_eq!(parsed.kind, SessionKind::DirectForward);
    }

    #[test]
    fn connect_to_443_is_a_downgrade_tunnel() {
        let parsed = ParsedRequest::parse(
            b"CONNECT secure.example.com:443 HTTP/1.1\r\nHost: secure.example.com\r\n\r\n",
        )
        .unwrap();
        assert_eq!(parsed.kind, SessionKind::DowngradeTunnel);
        assert_eq!(parsed.host, "secure.example.com");
        assert_eq!(parsed.port, 443);
        assert_eq!(
            parsed.origin_bytes,
            b"GET / HTTP/1.1\r\nHost: secure.example.com\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn tunnel_get_drops_proxy_headers_and_keeps_the_rest() {
        let parsed = ParsedRequest::parse(
            b"CONNECT secure.example.com:443 HTTP/1.1\r\n\
              Host: secure.example.com\r\n\
              Proxy-Connection: keep-alive\r\n\
              User-Agent: Mozilla/4.0 (compatible; MSIE 4.0)\r\n\r\n",
        )
        .unwrap();
        let get = String::from_utf8(parsed.origin_bytes).unwrap();
        assert!(get.starts_with("GET / HTTP/1.1\r\n"));
        assert!(get.contains("Host: secure.example.com\r\n"));
        assert!(get.contains("User-Agent: Mozilla/4.0 (compatible; MSIE 4.0)\r\n"));
        assert!(!get.contains("Proxy-Connection"));
        assert!(get.ends_with("\r\n\r\n"));
    }

    #[test]
    fn direct_forward_substitutes_scheme_everywhere() {
        let raw = b"GET http://example.com/ HTTP/1.1\r\n\
                    Host: example.com\r\n\
                    Referer: https://old.example.com/page\r\n\r\n";
        let parsed = ParsedRequest::parse(raw).unwrap();
        let expected = String::from_utf8_lossy(raw).replace("https://", "http://");
        assert_eq!(parsed.origin_bytes, expected.into_bytes());
    }

    #[test]
    fn connect_to_non_443_port_becomes_a_plain_get() {
        let parsed = ParsedRequest::parse(
            b"CONNECT example.com:8080 HTTP/1.1\r\nProxy-Connection: keep-alive\r\n\r\n",
        )
        .unwrap();
        assert_eq!(parsed.kind, SessionKind::DirectForward);
        assert_eq!(parsed.port, 8080);
        let get = String::from_utf8(parsed.origin_bytes).unwrap();
        assert!(get.starts_with("GET / HTTP/1.1\r\nHost: example.com\r\n"));
    }

    #[test]
    fn malformed_request_line_is_rejected() {
        assert!(matches!(
            ParsedRequest::parse(b"GARBAGE\r\n\r\n"),
            Err(RequestError::MalformedRequestLine(_))
        ));
        assert!(matches!(
            ParsedRequest::parse(b""),
            Err(RequestError::MalformedRequestLine(_))
        ));
    }
}
