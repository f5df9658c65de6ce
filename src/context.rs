use std::net::SocketAddr;

use crate::utils::{generate_hex_id, time_us};


const QID_LENGTH: u32 = 8;


/// Working set of one accepted connection. Created by the listener, owned by
/// exactly one handler for the connection's lifetime; the qid ties together
/// every log line this connection produces.
pub struct Context {
    pub qid: String,
    pub peer: Option<SocketAddr>,
    pub start_time_us: u128,
    pub finish_time_us: u128,
}

impl Context {
    pub fn new(peer: Option<SocketAddr>) -> Context {
        Context {
            qid: generate_hex_id(QID_LENGTH),
            peer,
            start_time_us: time_us(),
            finish_time_us: 0,
        }
    }

    pub fn fix(&mut self) {
        self.finish_time_us = time_us();
    }

    pub fn time_ms(&self) -> f32 {
        ((self.finish_time_us - self.start_time_us) as f32) / 1000.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qid_is_eight_hex_chars() {
        let ctx = Context::new(None);
        assert_eq!(ctx.qid.len(), QID_LENGTH as usize);
        assert!(ctx.qid.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn fix_records_a_finish_time_after_the_start() {
        let mut ctx = Context::new(None);
        ctx.fix();
        assert!(ctx.finish_time_us >= ctx.start_time_us);
        assert!(ctx.time_ms() >= 0.0);
    }
}
