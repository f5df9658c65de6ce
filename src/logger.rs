use std::fs::OpenOptions;

use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use crate::config::Config;
use crate::utils::ResultV;


pub fn init_logger(cfg: &Config) -> ResultV {
    match cfg.log_type.as_str() {
        "console" => init_term_logger(cfg.log_level),
        "file"    => init_file_logger(cfg.log_level, &cfg.log_file),
        other     => {
            eprintln!(
                "Unsupported log type: {}, only `file` and `console` are supported. Use `console` by default",
                other
            );
            init_term_logger(cfg.log_level)
        }
    }
}

fn init_term_logger(level: LevelFilter) -> ResultV {
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ).map_err(|_| "logger already initialized")
}

fn init_file_logger(level: LevelFilter, filename: &str) -> ResultV {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)
        .map_err(|e| {
            eprintln!("Could not open log file `{}`: {}", filename, e);
            "log file open error"
        })?;
    WriteLogger::init(level, simplelog::Config::default(), file)
        .map_err(|_| "logger already initialized")
}
