#[macro_use] extern crate log;

pub mod cgi;
pub mod config;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod request;
pub mod utils;

use std::io::BufReader;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use clap::Parser;

use crate::config::Config;
use crate::context::Context;
use crate::handlers::{handle_request, process_404, respond};
use crate::request::read_one_request;
use crate::utils::ResultV;


const MODULE: &str = "MAIN";

/// Static file server with a CGI gateway for parameterized requests
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to the configurational file
    config_fn: String,
}

/// One connection end-to-end: parse, route, serialize, close. Any failure up
/// to the serializer collapses into the canned 404 page; the connection and
/// everything it owns is released when this returns.
fn handle_connection(mut stream: TcpStream, cfg: Arc<Config>, mut ctx: Context) {
    let peer = match ctx.peer {
        Some(addr) => addr.to_string(),
        None => "unknown".to_string(),
    };
    info!("New connection [qid={}] from {}", ctx.qid, peer);

    let resp = {
        let mut reader = BufReader::new(&stream);
        match read_one_request(&mut reader) {
            Ok(req) => {
                debug!(
                    "Request [qid={}]: {} {}; path: {}; query: `{}`; headers: {:?}; body: {} bytes",
                    ctx.qid, req.method, req.url, req.url_path, req.query_string,
                    req.headers, req.body.len()
                );
                match handle_request(&req, &cfg, &ctx) {
                    Ok(resp) => resp,
                    Err(e) => {
                        error!("[{}] Failed to handle request [qid={}]: {}", MODULE, ctx.qid, e);
                        process_404()
                    }
                }
            }
            Err(e) => {
                error!("[{}] Failed to parse request [qid={}]: {}", MODULE, ctx.qid, e);
                process_404()
            }
        }
    };

    if let Err(e) = respond(&mut stream, &resp, &mut ctx) {
        error!("[{}] Failed to write response [qid={}]: {}", MODULE, ctx.qid, e);
    }
}

fn main() -> ResultV {
    let args = Args::parse();
    let cfg = Config::load(&args.config_fn)?;
    logger::init_logger(&cfg)?;

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = TcpListener::bind(&addr).map_err(|e| {
        error!("[{}] Could not bind {}: {}", MODULE, addr, e);
        "bind error"
    })?;

    info!(
        "[{}] Starting webgate at {}; doc_root: `{}`; workers: {}",
        MODULE, addr, cfg.doc_root, cfg.workers
    );

    let pool = threadpool::ThreadPool::new(cfg.workers);
    let cfg_arc = Arc::new(cfg);
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                error!("[{}] Accept failed: {}", MODULE, e);
                continue;
            }
        };
        let ctx = Context::new(stream.peer_addr().ok());
        let cfg_ = cfg_arc.clone();
        pool.execute(move || {
            handle_connection(stream, cfg_, ctx);
        });
    }
    Ok(())
}
