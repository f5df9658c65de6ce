use std::collections::HashMap;
use std::io::BufRead;

use crate::errors::ServerError;
use crate::utils::{read_exact_n, read_line};


pub const CONTENT_LENGTH: &str = "Content-Length";


/// One parsed HTTP request. Built fresh per connection and immutable once it
/// reaches the router. `query_string` is empty exactly when the raw URL
/// carried no `?`; `body` is non-empty only for POST.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub url_path: String,
    pub query_string: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Response under construction. `headers`/`body` are filled for static pages
/// and the 404 page; `cgi_output` is the pre-formatted blob a CGI child wrote
/// (its own header block, blank line and body). The serializer emits one or
/// the other, never both.
pub struct Response {
    pub code: u16,
    pub desc: &'static str,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub cgi_output: Option<Vec<u8>>,
}

impl Response {
    pub fn new(code: u16, desc: &'static str) -> Response {
        Response {
            code,
            desc,
            headers: HashMap::new(),
            body: Vec::new(),
            cgi_output: None,
        }
    }
}


/// Read one HTTP message off the stream: start line, URL split, header block,
/// then exactly Content-Length body bytes for POST. A single framing failure
/// aborts the whole request; nothing is retried.
pub fn read_one_request<R: BufRead>(stream: &mut R) -> Result<Request, ServerError> {
    let first_line = read_line(stream)
        .map_err(|_| ServerError::MalformedStartLine(String::new()))?;
    let (method, url) = parse_start_line(&first_line)?;
    let (url_path, query_string) = parse_url(&url);

    let mut headers = HashMap::new();
    loop {
        let header_line = read_line(stream)
            .map_err(|_| ServerError::MalformedHeader(String::new()))?;
        // the blank line ends the header block
        if header_line.is_empty() {
            break;
        }
        let (key, value) = parse_header_line(&header_line)?;
        headers.insert(key, value);
    }

    let mut body = Vec::new();
    if method == "POST" {
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or(ServerError::MissingContentLength)?;
        body = read_exact_n(stream, content_length).map_err(|_| ServerError::TruncatedBody)?;
    }

    Ok(Request { method, url, url_path, query_string, headers, body })
}

/// `METHOD SP URL SP VERSION`, runs of spaces compressed. The version token
/// must contain the literal `HTTP`.
fn parse_start_line(line: &str) -> Result<(String, String), ServerError> {
    let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.len() != 3 || !tokens[2].contains("HTTP") {
        return Err(ServerError::MalformedStartLine(line.to_string()));
    }
    Ok((tokens[0].to_string(), tokens[1].to_string()))
}

/// Split the raw URL at the first `?`. No `?` means an empty query string.
fn parse_url(url: &str) -> (String, String) {
    match url.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (url.to_string(), String::new()),
    }
}

/// `Key: Value` with the value starting two bytes past the colon. A line
/// without a colon, or without a value byte at that offset, is malformed.
/// Duplicate keys overwrite at the caller: last one wins.
fn parse_header_line(line: &str) -> Result<(String, String), ServerError> {
    let pos = line
        .find(':')
        .ok_or_else(|| ServerError::MalformedHeader(line.to_string()))?;
    if pos + 2 >= line.len() || !line.is_char_boundary(pos + 2) {
        return Err(ServerError::MalformedHeader(line.to_string()));
    }
    Ok((line[..pos].to_string(), line[pos + 2..].to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &[u8]) -> Result<Request, ServerError> {
        read_one_request(&mut Cursor::new(raw))
    }

    #[test]
    fn get_with_query_round_trips_method_path_and_query() {
        let req = parse(b"GET /add?a=3&b=4 HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.url, "/add?a=3&b=4");
        assert_eq!(req.url_path, "/add");
        assert_eq!(req.query_string, "a=3&b=4");
        assert!(req.body.is_empty());
    }

    #[test]
    fn url_without_question_mark_has_an_empty_query_string() {
        let req = parse(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.url_path, "/index.html");
        assert_eq!(req.query_string, "");
    }

    #[test]
    fn start_line_with_wrong_token_count_is_rejected() {
        assert!(matches!(
            parse(b"GET /index.html\r\n\r\n"),
            Err(ServerError::MalformedStartLine(_))
        ));
        assert!(matches!(
            parse(b"GET / HTTP/1.1 extra\r\n\r\n"),
            Err(ServerError::MalformedStartLine(_))
        ));
    }

    #[test]
    fn version_token_must_contain_http() {
        assert!(matches!(
            parse(b"GET / FTP/1.0\r\n\r\n"),
            Err(ServerError::MalformedStartLine(_))
        ));
    }

    #[test]
    fn runs_of_spaces_in_the_start_line_are_compressed() {
        let req = parse(b"GET  /a   HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.url, "/a");
    }

    #[test]
    fn mixed_line_terminators_are_tolerated() {
        let req = parse(b"GET / HTTP/1.1\nHost: a\r\nX-One: 1\rX-Two: 2\r\n\n").unwrap();
        assert_eq!(req.headers.get("Host").unwrap(), "a");
        assert_eq!(req.headers.get("X-One").unwrap(), "1");
        assert_eq!(req.headers.get("X-Two").unwrap(), "2");
    }

    #[test]
    fn duplicate_header_keys_keep_the_last_value() {
        let req = parse(b"GET / HTTP/1.1\r\nX-Key: first\r\nX-Key: second\r\n\r\n").unwrap();
        assert_eq!(req.headers.get("X-Key").unwrap(), "second");
    }

    #[test]
    fn header_without_a_colon_is_rejected() {
        assert!(matches!(
            parse(b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n"),
            Err(ServerError::MalformedHeader(_))
        ));
    }

    #[test]
    fn header_without_a_value_is_rejected() {
        assert!(matches!(
            parse(b"GET / HTTP/1.1\r\nHost:\r\n\r\n"),
            Err(ServerError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse(b"GET / HTTP/1.1\r\nHost: \r\n\r\n"),
            Err(ServerError::MalformedHeader(_))
        ));
    }

    #[test]
    fn post_body_is_exactly_the_declared_length() {
        let req = parse(b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").unwrap();
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn post_body_stops_at_the_declared_length() {
        let req = parse(b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello trailing").unwrap();
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn post_without_content_length_fails_before_any_body_read() {
        assert!(matches!(
            parse(b"POST /submit HTTP/1.1\r\nHost: a\r\n\r\nhello"),
            Err(ServerError::MissingContentLength)
        ));
    }

    #[test]
    fn post_with_unparseable_content_length_is_rejected() {
        assert!(matches!(
            parse(b"POST /submit HTTP/1.1\r\nContent-Length: five\r\n\r\nhello"),
            Err(ServerError::MissingContentLength)
        ));
    }

    #[test]
    fn post_with_a_short_body_reports_truncation() {
        assert!(matches!(
            parse(b"POST /submit HTTP/1.1\r\nContent-Length: 10\r\n\r\nhi"),
            Err(ServerError::TruncatedBody)
        ));
    }

    #[test]
    fn get_never_reads_a_body() {
        // even with a declared length, GET stops after the header block
        let mut stream = Cursor::new(&b"GET / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello"[..]);
        let req = read_one_request(&mut stream).unwrap();
        assert!(req.body.is_empty());
        assert_eq!(stream.position() as usize, b"GET / HTTP/1.1\r\nContent-Length: 5\r\n\r\n".len());
    }
}
