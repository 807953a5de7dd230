use crate::error::MappingError;
use crate::mapping::{AddressMapper, MappingTable};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;
use tracing::{debug, info};
use vnh_packets::MacAddr;

struct CacheState {
    table: MappingTable,
    // Modification time of the file the table was loaded from, `None` if it could not be read
    loaded_mtime: Option<SystemTime>,
    valid: bool,
}

///
/// Keeps a parsed copy of the table and reloads it when the file's modification time changes
/// or after `invalidate`.
///
/// Every lookup still stats the file. Rewrites that leave the modification time unchanged (two
/// writes within the filesystem's timestamp granularity) are served from the stale copy until
/// `invalidate` is called.
///
pub struct CachedMapper {
    path: PathBuf,
    state: RwLock<CacheState>,
}

impl CachedMapper {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CachedMapper {
            path: path.into(),
            state: RwLock::new(CacheState {
                table: MappingTable::new(),
                loaded_mtime: None,
                valid: false,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forces the next lookup to re-read the file.
    pub fn invalidate(&self) {
        self.write_state().valid = false;
    }

    /// Re-reads the file now and returns the number of entries loaded. On error the cache is
    /// left empty, so lookups answer nothing until the file becomes readable.
    pub fn reload(&self) -> Result<usize, MappingError> {
        let (mtime, loaded) = self.load();
        let mut state = self.write_state();
        self.install(&mut state, mtime, loaded)
    }

    /// Reads the table without touching the lock. The modification time is taken before the
    /// read, so an edit that races it shows up as a newer time on the next lookup.
    fn load(&self) -> (Option<SystemTime>, Result<MappingTable, MappingError>) {
        let mtime = self.current_mtime();
        (mtime, MappingTable::load(&self.path))
    }

    fn install(
        &self,
        state: &mut CacheState,
        mtime: Option<SystemTime>,
        loaded: Result<MappingTable, MappingError>,
    ) -> Result<usize, MappingError> {
        state.loaded_mtime = mtime;
        state.valid = true;
        match loaded {
            Ok(table) => {
                info!(path = %self.path.display(), entries = table.len(), "loaded mapping table");
                state.table = table;
                Ok(state.table.len())
            }
            Err(err) => {
                state.table = MappingTable::new();
                Err(err)
            }
        }
    }

    fn current_mtime(&self) -> Option<SystemTime> {
        fs::metadata(&self.path)
            .and_then(|metadata| metadata.modified())
            .ok()
    }

    fn is_fresh(state: &CacheState, mtime: Option<SystemTime>) -> bool {
        state.valid && state.loaded_mtime == mtime
    }

    fn read_state(&self) -> RwLockReadGuard<CacheState> {
        // Poisoned state is still a complete table
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<CacheState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AddressMapper for CachedMapper {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        let mtime = self.current_mtime();
        {
            let state = self.read_state();
            if CachedMapper::is_fresh(&state, mtime) {
                return state.table.resolve(ip);
            }
        }

        let (mtime, loaded) = self.load();
        let mut state = self.write_state();
        // Another worker may have installed this version while we were reading
        if !CachedMapper::is_fresh(&state, mtime) {
            if let Err(err) = self.install(&mut state, mtime, loaded) {
                debug!(path = %self.path.display(), "mapping table unavailable: {}", err);
            }
        }
        state.table.resolve(ip)
    }
}
