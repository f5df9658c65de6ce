use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::config::Config;
use crate::context::Context;
use crate::errors::ServerError;
use crate::handlers::resolve_path;
use crate::request::{Request, Response};


const MODULE: &str = "CGI";


/// Run the executable the URL path resolves to and capture whatever it wrote
/// to stdout as the response's pass-through blob. The child is expected to
/// emit a complete header block, blank line and body; nothing inspects it.
pub fn process_cgi(req: &Request, cfg: &Config, ctx: &Context, resp: &mut Response) -> Result<(), ServerError> {
    let program = resolve_path(&cfg.doc_root, &req.url_path);
    resp.cgi_output = Some(run_gateway(&program, req, ctx)?);
    Ok(())
}

/// The gateway protocol: request metadata goes to the child as environment
/// variables set on the spawn call itself (REQUEST_METHOD always,
/// QUERY_STRING for GET, CONTENT_LENGTH for POST), the body goes down a pipe
/// to the child's stdin, and the child's stdout is drained to EOF. The child
/// is reaped on every path, success or failure, and dropping the pipe
/// handles closes them.
fn run_gateway(program: &Path, req: &Request, ctx: &Context) -> Result<Vec<u8>, ServerError> {
    let mut cmd = Command::new(program);
    cmd.env("REQUEST_METHOD", &req.method)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped());
    if req.method == "GET" {
        cmd.env("QUERY_STRING", &req.query_string);
    } else if req.method == "POST" {
        cmd.env("CONTENT_LENGTH", req.body.len().to_string());
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| ServerError::Cgi(program.display().to_string(), e))?;

    // Feed the body from its own thread while this one drains stdout, so a
    // child writing a large response while we are still writing a large body
    // cannot deadlock on full pipe buffers. Dropping the handle closes the
    // child's stdin; a child that never reads it is not an error.
    let feeder = child.stdin.take().map(|mut pipe| {
        let body = req.body.clone();
        thread::spawn(move || {
            let _ = pipe.write_all(&body);
        })
    });

    let read_result = match child.stdout.take() {
        Some(mut pipe) => {
            let mut output = Vec::new();
            pipe.read_to_end(&mut output).map(|_| output)
        }
        None => Ok(Vec::new()),
    };

    if let Some(handle) = feeder {
        let _ = handle.join();
    }
    // reap before reporting any read failure: no zombies on the error path
    let wait_result = child.wait();

    let output = read_result.map_err(|e| ServerError::Cgi(program.display().to_string(), e))?;
    let status = wait_result.map_err(|e| ServerError::Cgi(program.display().to_string(), e))?;
    if !status.success() {
        warn!(
            "[{}] Program `{}` exited with {} [qid={}]",
            MODULE, program.display(), status, ctx.qid
        );
    }
    Ok(output)
}
