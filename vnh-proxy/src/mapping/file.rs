use crate::error::MappingError;
use crate::mapping::{scan_for, AddressMapper};
use std::fs::File;
use std::io::BufReader;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tracing::debug;
use vnh_packets::MacAddr;

/// Reads the table from disk on every lookup.
///
/// Each call opens its own handle, so concurrent lookups never share a file position and edits
/// to the file are visible on the next request.
#[derive(Clone, Debug)]
pub struct VnhFileMapper {
    path: PathBuf,
}

impl VnhFileMapper {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        VnhFileMapper { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn scan(&self, ip: Ipv4Addr) -> Result<Option<MacAddr>, MappingError> {
        let file = File::open(&self.path)?;
        let entry = scan_for(BufReader::new(file), ip)?;
        Ok(entry
            .filter(|entry| entry.is_answerable())
            .map(|entry| entry.virtual_mac))
    }
}

impl AddressMapper for VnhFileMapper {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        match self.scan(ip) {
            Ok(mac) => mac,
            Err(err) => {
                debug!(path = %self.path.display(), "mapping table unavailable: {}", err);
                None
            }
        }
    }
}
