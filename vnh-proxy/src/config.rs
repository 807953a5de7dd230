use crate::error::ConfigError;
use crate::mapping::{AddressMapper, CachedMapper, VnhFileMapper};
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::Level;

/// Where the table lives unless told otherwise: next to the process, as the table writer
/// leaves it.
pub const DEFAULT_VNH_FILE: &str = "virtual_nexthops";

/// How the mapping table is read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapperMode {
    /// Re-read the file on every lookup.
    Fresh,
    /// Keep a parsed copy and reload when the file changes.
    Cached,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProxyConfig {
    pub vnh_file: PathBuf,
    pub mapper_mode: MapperMode,
    pub workers: usize,
    pub log_level: Level,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            vnh_file: PathBuf::from(DEFAULT_VNH_FILE),
            mapper_mode: MapperMode::Fresh,
            workers: 1,
            log_level: Level::INFO,
        }
    }
}

impl ProxyConfig {
    pub fn app<'a, 'b>() -> App<'a, 'b> {
        App::new("vnh-proxy")
            .version("0.1")
            .author("VNH Proxy Contributors")
            .about("Answer ARP requests for virtual next-hops read from packet-in lines on stdin")
            .arg(
                Arg::with_name("vnh_file")
                    .short("f")
                    .long("vnh-file")
                    .value_name("FILE")
                    .help("Virtual next-hop table: one `IP<TAB>decimal MAC` per line")
                    .default_value(DEFAULT_VNH_FILE)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("cache")
                    .short("c")
                    .long("cache")
                    .help("Keep the table in memory and reload it when the file changes"),
            )
            .arg(
                Arg::with_name("workers")
                    .short("w")
                    .long("workers")
                    .value_name("N")
                    .help("Number of dispatch workers")
                    .default_value("1")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("log_level")
                    .short("l")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("One of error, warn, info, debug, trace")
                    .default_value("info")
                    .takes_value(true),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let defaults = ProxyConfig::default();

        let vnh_file = matches
            .value_of_os("vnh_file")
            .map(PathBuf::from)
            .unwrap_or(defaults.vnh_file);

        let mapper_mode = if matches.is_present("cache") {
            MapperMode::Cached
        } else {
            MapperMode::Fresh
        };

        let workers = match matches.value_of("workers") {
            Some(value) => match value.parse::<usize>() {
                Ok(workers) if workers > 0 => workers,
                _ => return Err(ConfigError::InvalidWorkers(value.to_string())),
            },
            None => defaults.workers,
        };

        let log_level = match matches.value_of("log_level") {
            Some(value) => value
                .parse::<Level>()
                .map_err(|_| ConfigError::InvalidLogLevel(value.to_string()))?,
            None => defaults.log_level,
        };

        Ok(ProxyConfig {
            vnh_file,
            mapper_mode,
            workers,
            log_level,
        })
    }

    /// Parses a full argument list, program name first. `--help` and `--version` come back as
    /// `ConfigError::Cli`; call `exit()` on the inner error to print them.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = ProxyConfig::app().get_matches_from_safe(args)?;
        ProxyConfig::from_matches(&matches)
    }

    pub fn build_mapper(&self) -> Box<dyn AddressMapper> {
        match self.mapper_mode {
            MapperMode::Fresh => Box::new(VnhFileMapper::new(&self.vnh_file)),
            MapperMode::Cached => Box::new(CachedMapper::new(&self.vnh_file)),
        }
    }
}
