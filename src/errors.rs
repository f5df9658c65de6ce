use std::io;

use thiserror::Error;


/// Everything that can go wrong between reading a request off the socket and
/// producing a response. The connection handler converts any of these into
/// the canned 404 page; the detail only ever reaches the log.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Start line did not split into `METHOD URL VERSION`, or the version
    /// token does not mention HTTP.
    #[error("malformed start line `{0}`")]
    MalformedStartLine(String),

    /// Header line without a colon, or without a value after `: `.
    #[error("malformed header line `{0}`")]
    MalformedHeader(String),

    /// POST request without a usable Content-Length header.
    #[error("POST request without a usable Content-Length")]
    MissingContentLength,

    /// Stream closed before the declared Content-Length was read.
    #[error("stream closed before the declared body length was read")]
    TruncatedBody,

    #[error("unsupported method `{0}`")]
    UnsupportedMethod(String),

    #[error("cannot read static file `{0}`: {1}")]
    StaticRead(String, io::Error),

    /// Spawn, pipe or reap failure in the CGI gateway.
    #[error("CGI gateway failure for `{0}`: {1}")]
    Cgi(String, io::Error),
}
