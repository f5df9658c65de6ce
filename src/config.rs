use log::LevelFilter;

use crate::utils::Result;


const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 9090;
const DEFAULT_WORKERS: usize = 64;
const DEFAULT_DOC_ROOT: &str = "./wwwroot";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
const DEFAULT_LOG_TYPE: &str = "console";


pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub doc_root: String,
    pub log_type: String,
    pub log_level: LevelFilter,
    pub log_file: String,
}


impl Config {
    /// Load settings from a TOML/YAML/JSON file; every key falls back to its
    /// default when absent.
    pub fn load(path: &str) -> Result<Config> {
        let file = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .build()
            .map_err(|e| {
                eprintln!("Could not load config from `{}`: {}", path, e);
                "config load error"
            })?;

        let log_level = match file.get::<String>("log.level") {
            Ok(s) => s.parse::<LevelFilter>().unwrap_or(DEFAULT_LOG_LEVEL),
            Err(_) => DEFAULT_LOG_LEVEL,
        };

        Ok(Config {
            host: file.get("server.host").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: file.get("server.port").unwrap_or(DEFAULT_PORT),
            workers: file.get("server.workers").unwrap_or(DEFAULT_WORKERS),
            doc_root: file.get("server.doc_root").unwrap_or_else(|_| DEFAULT_DOC_ROOT.to_string()),
            log_type: file.get("log.type").unwrap_or_else(|_| DEFAULT_LOG_TYPE.to_string()),
            log_level,
            log_file: file.get("log.file").unwrap_or_default(),
        })
    }
}
