use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::peer::DEFAULT_PEER_ID_PREFIX;

const TRACING_LEVEL: tracing::Level = tracing::Level::INFO;
const LISTENING_PORT: u16 = 6881;
const TRACKER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub tracing_level: tracing::Level,
    pub listening_port: u16,
    pub peer_id_prefix: String,
    pub numwant: Option<u32>,
    pub tracker_timeout_secs: u64,
    pub json: bool,
    pub show_help: bool,
    pub torrent_path: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> ClientOptions {
        ClientOptions {
            tracing_level: TRACING_LEVEL,
            listening_port: LISTENING_PORT,
            peer_id_prefix: DEFAULT_PEER_ID_PREFIX.to_string(),
            numwant: None,
            tracker_timeout_secs: TRACKER_TIMEOUT_SECS,
            json: false,
            show_help: false,
            torrent_path: None,
        }
    }
}

impl ClientOptions {
    /// Parses the arguments that follow the program name.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<ClientOptions> {
        let mut options = ClientOptions::default();

        let mut args_iter = args.into_iter();
        while let Some(arg) = args_iter.next() {
            match arg.as_str() {
                "--help" | "-h" => options.show_help = true,
                "--json" => options.json = true,
                "--tracing-level" => {
                    let value = next_value(&mut args_iter, &arg)?;
                    options.tracing_level = parse_tracing_level(&value)?;
                }
                "--port" => {
                    let value = next_value(&mut args_iter, &arg)?;
                    options.listening_port = value
                        .parse::<u16>()
                        .with_context(|| format!("invalid port '{value}'"))?;
                }
                "--peer-id-prefix" => {
                    options.peer_id_prefix = next_value(&mut args_iter, &arg)?;
                }
                "--numwant" => {
                    let value = next_value(&mut args_iter, &arg)?;
                    options.numwant = Some(
                        value
                            .parse::<u32>()
                            .with_context(|| format!("invalid numwant '{value}'"))?,
                    );
                }
                "--timeout" => {
                    let value = next_value(&mut args_iter, &arg)?;
                    options.tracker_timeout_secs = value
                        .parse::<u64>()
                        .with_context(|| format!("invalid timeout '{value}'"))?;
                }
                flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
                _ => {
                    if options.torrent_path.is_some() {
                        bail!("unexpected argument '{arg}', only one torrent file is accepted");
                    }
                    options.torrent_path = Some(arg);
                }
            }
        }

        Ok(options)
    }

    pub fn tracker_timeout(&self) -> Option<Duration> {
        match self.tracker_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn next_value(args_iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args_iter.next().ok_or_else(|| anyhow!("option '{flag}' expects a value"))
}

fn parse_tracing_level(value: &str) -> Result<tracing::Level> {
    match value {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => bail!("invalid tracing level '{value}'"),
    }
}

pub fn help_menu() -> String {
    [
        "Usage: tttorrent-announce [options] <file.torrent>",
        "Options:",
        "  --help                   print this help message and exit",
        "  --port <port>            listening port reported to the tracker (default 6881)",
        "  --peer-id-prefix <str>   client prefix of the generated peer id (default -TT0100-)",
        "  --numwant <count>        number of peers to ask the tracker for",
        "  --timeout <secs>         tracker request timeout, 0 disables it (default 30)",
        "  --tracing-level <level>  trace, debug, info, warn or error (default info)",
        "  --json                   print the announce result as JSON",
    ]
    .join("\n")
}

#[cfg(test)]
mod client_options_tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let options = ClientOptions::from_args(args(&["sample.torrent"])).unwrap();

        assert_eq!(options.listening_port, 6881);
        assert_eq!(options.peer_id_prefix, "-TT0100-");
        assert_eq!(options.tracing_level, tracing::Level::INFO);
        assert_eq!(options.tracker_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(options.numwant, None);
        assert!(!options.json);
        assert_eq!(options.torrent_path.as_deref(), Some("sample.torrent"));
    }

    #[test]
    fn test_all_options() {
        let options = ClientOptions::from_args(args(&[
            "--port", "51413",
            "--peer-id-prefix", "-XX0001-",
            "--numwant", "80",
            "--timeout", "0",
            "--tracing-level", "debug",
            "--json",
            "sample.torrent",
        ]))
        .unwrap();

        assert_eq!(options.listening_port, 51413);
        assert_eq!(options.peer_id_prefix, "-XX0001-");
        assert_eq!(options.numwant, Some(80));
        assert_eq!(options.tracker_timeout(), None);
        assert_eq!(options.tracing_level, tracing::Level::DEBUG);
        assert!(options.json);
    }

    #[test]
    fn test_help() {
        let options = ClientOptions::from_args(args(&["--help"])).unwrap();

        assert!(options.show_help);
        assert_eq!(options.torrent_path, None);
        assert!(help_menu().starts_with("Usage: tttorrent-announce"));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(ClientOptions::from_args(args(&["--port", "70000"])).is_err());
        assert!(ClientOptions::from_args(args(&["--port"])).is_err());
        assert!(ClientOptions::from_args(args(&["--tracing-level", "loud"])).is_err());
        assert!(ClientOptions::from_args(args(&["--seed"])).is_err());
        assert!(ClientOptions::from_args(args(&["a.torrent", "b.torrent"])).is_err());
    }
}
