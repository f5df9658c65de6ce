use rand::Rng;
use std::io::{self, BufRead, Read};
use std::time::{Duration, SystemTime, UNIX_EPOCH};


const QID_CHARSET: &[u8] = b"0123456789abcdef";

pub type ErrorStr = &'static str;
pub type Result<T> = std::result::Result<T, ErrorStr>;
pub type ResultV = Result<()>;


pub fn generate_hex_id(length: u32) -> String {
    let mut rng = rand::thread_rng();

    (0..length).map(
        |_| {
            let idx = rng.gen_range(0..QID_CHARSET.len());
            QID_CHARSET[idx] as char
        }
    ).collect()
}


fn current_duration() -> Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("Time went backwards")
}

pub fn time_us() -> u128 {
    current_duration().as_micros()
}


/// Read one line from the stream. A line ends at `\n`, `\r` or `\r\n`;
/// the terminator is consumed but not included in the returned string.
/// A stream that closes before any terminator is an error.
pub fn read_line<R: BufRead>(stream: &mut R) -> io::Result<String> {
    let mut line: Vec<u8> = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        let read_size = stream.read(&mut byte)?;
        if read_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream closed before end of line",
            ));
        }
        let mut c = byte[0];
        if c == b'\r' {
            // a lone \r terminates too; swallow the \n of a \r\n pair
            if stream.fill_buf()?.first() == Some(&b'\n') {
                stream.consume(1);
            }
            c = b'\n';
        }
        if c == b'\n' {
            break;
        }
        line.push(c);
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Read exactly `len` bytes from the stream.
pub fn read_exact_n<R: Read>(stream: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}
