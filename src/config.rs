use clap::Parser;

use crate::codec::Limits;
use crate::resp::inline::DEFAULT_MAX_INLINE_LEN;
use crate::resp::tokenizer::DEFAULT_MAX_BULK_LEN;

const PORT: u16 = 6379;

/// Server settings, read from the command line or the environment.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "redlite", about = "A small Redis protocol server", long_about = None)]
pub struct Config {
    /// The address to listen on
    #[arg(short, long, env = "REDLITE_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// The port to listen on
    #[arg(short, long, env = "REDLITE_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Largest bulk string accepted in a request, in bytes
    #[arg(long, env = "REDLITE_MAX_BULK_LEN", default_value_t = DEFAULT_MAX_BULK_LEN)]
    pub max_bulk_len: i64,

    /// Largest inline request accepted, in bytes
    #[arg(long, env = "REDLITE_MAX_INLINE_LEN", default_value_t = DEFAULT_MAX_INLINE_LEN)]
    pub max_inline_len: usize,
}

impl Config {
    pub fn limits(&self) -> Limits {
        Limits {
            max_bulk_len: self.max_bulk_len,
            max_inline_len: self.max_inline_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["redlite"]).unwrap();

        assert_eq!(config.port, 6379);
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn flags() {
        let config = Config::try_parse_from([
            "redlite",
            "--bind",
            "0.0.0.0",
            "-p",
            "7000",
            "--max-bulk-len",
            "1024",
        ])
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 7000);
        assert_eq!(config.limits().max_bulk_len, 1024);
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(Config::try_parse_from(["redlite", "--port", "http"]).is_err());
    }
}
