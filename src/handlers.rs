use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cgi::process_cgi;
use crate::config::Config;
use crate::context::Context;
use crate::errors::ServerError;
use crate::request::{Request, Response, CONTENT_LENGTH};


pub const HTTP_200: u16 = 200;
pub const HTTP_404: u16 = 404;

pub const PROTOCOL: &str = "HTTP/1.1";

const INDEX_FILE: &str = "index.html";

const NOT_FOUND_PAGE: &str = "<html><head>\
<meta http-equiv=\"content-type\" content=\"text/html;charset=utf-8\">\
</head><body><h1>404 Not Found</h1>\
<p>The page you asked for is not here.</p></body></html>";


#[derive(Debug, PartialEq)]
pub enum Route {
    StaticFile,
    Cgi,
}

/// Pure classification of a request: plain GET is a static page, GET with a
/// query string or any POST goes through the CGI gateway, everything else is
/// rejected.
pub fn route(req: &Request) -> Result<Route, ServerError> {
    if req.method == "GET" && req.query_string.is_empty() {
        Ok(Route::StaticFile)
    } else if req.method == "GET" || req.method == "POST" {
        Ok(Route::Cgi)
    } else {
        Err(ServerError::UnsupportedMethod(req.method.clone()))
    }
}

pub fn handle_request(req: &Request, cfg: &Config, ctx: &Context) -> Result<Response, ServerError> {
    let mut resp = Response::new(HTTP_200, "OK");
    match route(req)? {
        Route::StaticFile => process_static_file(req, cfg, &mut resp)?,
        Route::Cgi => process_cgi(req, cfg, ctx, &mut resp)?,
    }
    Ok(resp)
}

/// Map a URL path to a filesystem path under the document root. A directory
/// resolves to its `index.html`; the same rule picks the executable for CGI
/// requests.
pub fn resolve_path(doc_root: &str, url_path: &str) -> PathBuf {
    let mut file_path = format!("{}{}", doc_root, url_path);
    if Path::new(&file_path).is_dir() {
        if !file_path.ends_with('/') {
            file_path.push('/');
        }
        file_path.push_str(INDEX_FILE);
    }
    PathBuf::from(file_path)
}

fn process_static_file(req: &Request, cfg: &Config, resp: &mut Response) -> Result<(), ServerError> {
    let file_path = resolve_path(&cfg.doc_root, &req.url_path);
    let body = fs::read(&file_path)
        .map_err(|e| ServerError::StaticRead(file_path.display().to_string(), e))?;
    resp.headers.insert(CONTENT_LENGTH.to_string(), body.len().to_string());
    resp.body = body;
    Ok(())
}

/// The one response every failure collapses into; no error detail reaches
/// the client.
pub fn process_404() -> Response {
    let mut resp = Response::new(HTTP_404, "Not Found");
    resp.headers.insert(CONTENT_LENGTH.to_string(), NOT_FOUND_PAGE.len().to_string());
    resp.body = NOT_FOUND_PAGE.as_bytes().to_vec();
    resp
}

/// Render the response into wire format: status line, then either the header
/// map, blank line and body, or the CGI blob verbatim (it already carries its
/// own header block and body). Exactly one of the two branches runs.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("{} {} {}\r\n", PROTOCOL, resp.code, resp.desc).as_bytes());
    match &resp.cgi_output {
        Some(passthrough) => out.extend_from_slice(passthrough),
        None => {
            for (key, value) in &resp.headers {
                out.extend_from_slice(format!("{}: {}\r\n", key, value).as_bytes());
            }
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&resp.body);
        }
    }
    out
}

/// Serialize and write the whole response in one operation, then log the
/// outcome for this connection.
pub fn respond<W: Write>(stream: &mut W, resp: &Response, ctx: &mut Context) -> io::Result<()> {
    let payload = serialize_response(resp);
    let result = stream.write_all(&payload);
    ctx.fix();
    info!(
        "Respond [qid={}]: time: {}ms; status: {}; sent: {} bytes",
        ctx.qid, ctx.time_ms(), resp.code, payload.len()
    );
    result
}
