//! Virtual next-hop mappings: which IPs the controller answers for, and with which MAC.
//!
//! The table is a text file with one `virtualIP<TAB>virtualMACDecimal` pair per line. Columns
//! after the second are ignored. The first line whose IP matches wins.
use crate::error::MappingError;
use std::io::BufRead;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use vnh_packets::MacAddr;

mod file;
pub use self::file::*;

mod cached;
pub use self::cached::*;

/// Resolves an IPv4 address to the virtual MAC the controller answers with.
///
/// `None` is the ordinary "not virtual" outcome. Implementations fold read failures into `None`
/// instead of reporting them.
pub trait AddressMapper: Send + Sync {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr>;
}

impl<M: AddressMapper + ?Sized> AddressMapper for Box<M> {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        (**self).resolve(ip)
    }
}

impl<M: AddressMapper + ?Sized> AddressMapper for Arc<M> {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        (**self).resolve(ip)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MappingEntry {
    pub virtual_ip: Ipv4Addr,
    pub virtual_mac: MacAddr,
}

impl MappingEntry {
    /// A zero MAC never answers: it is how the table marks an IP as not mapped.
    pub fn is_answerable(&self) -> bool {
        !self.virtual_mac.is_zero()
    }
}

///
/// Parses one line of the table. `line_number` is 1-based and only used for errors.
///
/// Returns `Ok(None)` for blank lines and `#` comments. The IP column must be a canonical
/// dotted quad.
///
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<MappingEntry>, MappingError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let malformed = |reason| MappingError::MalformedLine {
        line: line_number,
        reason,
    };

    let mut fields = line.split('\t');
    let ip_field = fields.next().map(str::trim).unwrap_or_default();
    let mac_field = fields
        .next()
        .map(str::trim)
        .ok_or_else(|| malformed("expected two tab-separated fields"))?;

    let virtual_ip = ip_field
        .parse::<Ipv4Addr>()
        .map_err(|_| malformed("virtual IP is not a dotted-decimal IPv4 address"))?;
    let value = mac_field
        .parse::<u64>()
        .map_err(|_| malformed("virtual MAC is not a decimal integer"))?;
    let virtual_mac =
        MacAddr::from_u64(value).ok_or_else(|| malformed("virtual MAC does not fit in 48 bits"))?;

    Ok(Some(MappingEntry {
        virtual_ip,
        virtual_mac,
    }))
}

/// Entries of a table read from `reader`, in file order.
///
/// Lines are split on raw `\n` bytes and decoded lossily, so bytes that are not UTF-8 only spoil
/// the line they sit on. Malformed lines are logged and skipped. Only a failing read ends the
/// iteration with an error.
pub(crate) struct Entries<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
}

pub(crate) fn entries<R: BufRead>(reader: R) -> Entries<R> {
    Entries {
        reader,
        buf: vec![],
        line_number: 0,
    }
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = Result<MappingEntry, MappingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }
            self.line_number += 1;

            let line = String::from_utf8_lossy(&self.buf);
            match parse_line(line.trim_end_matches(&['\r', '\n'][..]), self.line_number) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(err) => debug!("skipping mapping line: {}", err),
            }
        }
    }
}

/// First entry matching `ip`. Stops reading as soon as it is found.
pub(crate) fn scan_for<R: BufRead>(
    reader: R,
    ip: Ipv4Addr,
) -> Result<Option<MappingEntry>, MappingError> {
    entries(reader)
        .find(|entry| match entry {
            Ok(entry) => entry.virtual_ip == ip,
            Err(_) => true,
        })
        .transpose()
}

/// An in-memory copy of the mapping table, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable::default()
    }

    pub fn from_entries(entries: Vec<MappingEntry>) -> Self {
        MappingTable { entries }
    }

    /// Parses table text, skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        // Reading from a byte slice cannot fail
        MappingTable::from_reader(text.as_bytes()).unwrap_or_default()
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, MappingError> {
        Ok(MappingTable {
            entries: entries(reader).collect::<Result<Vec<_>, _>>()?,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let file = std::fs::File::open(path)?;
        MappingTable::from_reader(std::io::BufReader::new(file))
    }

    /// First entry for `ip`, in file order.
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<&MappingEntry> {
        self.entries.iter().find(|entry| entry.virtual_ip == ip)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AddressMapper for MappingTable {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.lookup(ip)
            .filter(|entry| entry.is_answerable())
            .map(|entry| entry.virtual_mac)
    }
}
