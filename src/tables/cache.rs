//! On-disk table cache.
//!
//! One self-describing binary blob per table plus a small JSON manifest:
//! - blob: magic, format version, table name, entry width, entry count,
//!   FNV-1a checksum, then the dense contents as little-endian integers,
//! - `manifest.json`: format version and build metadata.
//!
//! The cache is a memoization boundary only. Loading never alters table
//! contents, and any mismatch — magic, version, name, size, checksum,
//! truncation, trailing bytes — counts as "absent", so
//! [`load_or_build`] rebuilds and replaces the cache wholesale. Files are
//! published with a temp-file + rename so a crashed writer cannot leave a
//! plausible-looking half-written table behind.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{
    CoordSpec, MoveTable, PruningTable, TableError, Tables, CORNER_PERM_SPEC, FLIP_SPEC,
    TWIST_SPEC, UDSLICE_SORTED_SPEC, UDSLICE_SPEC, UD_EDGE_SPEC,
};
use crate::coords;

const FORMAT_VERSION: u32 = 1;
const TABLE_MAGIC: [u8; 8] = *b"CUBETAB1";
const MANIFEST_FILENAME: &str = "manifest.json";

const MOVE_SPECS: [&CoordSpec; 6] = [
    &TWIST_SPEC,
    &FLIP_SPEC,
    &UDSLICE_SPEC,
    &CORNER_PERM_SPEC,
    &UD_EDGE_SPEC,
    &UDSLICE_SORTED_SPEC,
];

/// (name, first coordinate size, second coordinate size) of the four
/// pruning tables, matching [`Tables::pruning_tables`] order.
const PRUNE_SHAPES: [(&str, usize, usize); 4] = [
    ("twist_udslice_prune", coords::N_TWIST, coords::N_UDSLICE),
    ("flip_udslice_prune", coords::N_FLIP, coords::N_UDSLICE),
    (
        "corner_perm_udslice_prune",
        coords::N_CORNER_PERM,
        coords::N_UDSLICE_SORTED,
    ),
    (
        "ud_edge_udslice_prune",
        coords::N_UD_EDGE_PERM,
        coords::N_UDSLICE_SORTED,
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    format_version: u32,
    created_unix_secs: u64,
    tables: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    name: String,
    file: String,
    entries: u64,
    entry_width: u8,
}

/// Load the cache from `dir`; on any failure, build from scratch and
/// persist the result there. The numeric content of the returned tables is
/// identical either way.
pub fn load_or_build(dir: &Path) -> Result<Tables, TableError> {
    match load(dir) {
        Ok(tables) => {
            info!("loaded tables from {}", dir.display());
            Ok(tables)
        }
        Err(err) => {
            warn!("table cache at {} unusable ({err}); rebuilding", dir.display());
            let tables = Tables::build()?;
            tables.persist(dir)?;
            info!("persisted tables to {}", dir.display());
            Ok(tables)
        }
    }
}

pub fn load(dir: &Path) -> Result<Tables, TableError> {
    let manifest = read_manifest(dir)?;
    if manifest.format_version != FORMAT_VERSION {
        return Err(TableError::Corrupt {
            path: dir.join(MANIFEST_FILENAME).display().to_string(),
            reason: format!(
                "format_version {} (expected {FORMAT_VERSION})",
                manifest.format_version
            ),
        });
    }

    let entry_of: FxHashMap<&str, &ManifestEntry> = manifest
        .tables
        .iter()
        .map(|e| (e.name.as_str(), e))
        .collect();
    let file_of = |name: &'static str| -> Result<PathBuf, TableError> {
        let entry = entry_of.get(name).ok_or_else(|| TableError::Corrupt {
            path: dir.join(MANIFEST_FILENAME).display().to_string(),
            reason: format!("table {name} missing from manifest"),
        })?;
        Ok(dir.join(&entry.file))
    };

    let mut move_tables = Vec::with_capacity(MOVE_SPECS.len());
    for spec in MOVE_SPECS {
        let path = file_of(spec.name)?;
        let values = read_u16_blob(&path, spec.name, spec.size * spec.moves.len())?;
        move_tables.push(MoveTable::from_raw(
            spec,
            values,
            &path.display().to_string(),
        )?);
    }

    let mut pruning_tables = Vec::with_capacity(PRUNE_SHAPES.len());
    for &(name, a_size, b_size) in PRUNE_SHAPES.iter() {
        let path = file_of(name)?;
        let depths = read_u8_blob(&path, name, a_size * b_size)?;
        pruning_tables.push(PruningTable::from_raw(
            name,
            a_size,
            b_size,
            depths,
            &path.display().to_string(),
        )?);
    }

    let [twist_move, flip_move, udslice_move, corner_perm_move, ud_edge_move, udslice_sorted_move]: [MoveTable; 6] =
        move_tables
            .try_into()
            .expect("one table was read per move spec");
    let [twist_udslice_prune, flip_udslice_prune, corner_perm_udslice_prune, ud_edge_udslice_prune]: [PruningTable; 4] =
        pruning_tables
            .try_into()
            .expect("one table was read per prune shape");

    Ok(Tables {
        twist_move,
        flip_move,
        udslice_move,
        corner_perm_move,
        ud_edge_move,
        udslice_sorted_move,
        twist_udslice_prune,
        flip_udslice_prune,
        corner_perm_udslice_prune,
        ud_edge_udslice_prune,
    })
}

pub fn persist(tables: &Tables, dir: &Path) -> Result<(), TableError> {
    fs::create_dir_all(dir).map_err(|e| TableError::Io {
        stage: "cache_create_dir",
        path: dir.display().to_string(),
        error: e.to_string(),
    })?;

    let mut entries = Vec::new();

    for table in tables.move_tables() {
        let file = format!("{}.tab", table.name());
        let payload: Vec<u8> = table
            .values()
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        write_blob(&dir.join(&file), table.name(), 2, table.values().len(), &payload)?;
        entries.push(ManifestEntry {
            name: table.name().to_string(),
            file,
            entries: table.values().len() as u64,
            entry_width: 2,
        });
    }

    for table in tables.pruning_tables() {
        let file = format!("{}.tab", table.name());
        write_blob(&dir.join(&file), table.name(), 1, table.len(), table.depths())?;
        entries.push(ManifestEntry {
            name: table.name().to_string(),
            file,
            entries: table.len() as u64,
            entry_width: 1,
        });
    }

    let manifest = Manifest {
        format_version: FORMAT_VERSION,
        created_unix_secs: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        tables: entries,
    };
    write_manifest(dir, &manifest)
}

fn read_manifest(dir: &Path) -> Result<Manifest, TableError> {
    let path = dir.join(MANIFEST_FILENAME);
    let f = fs::File::open(&path).map_err(|e| TableError::Io {
        stage: "cache_manifest_open",
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    serde_json::from_reader(BufReader::new(f)).map_err(|e| TableError::Corrupt {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<(), TableError> {
    let path = dir.join(MANIFEST_FILENAME);
    let tmp = dir.join(format!("{MANIFEST_FILENAME}.tmp"));
    let f = fs::File::create(&tmp).map_err(|e| TableError::Io {
        stage: "cache_manifest_create",
        path: tmp.display().to_string(),
        error: e.to_string(),
    })?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, manifest).map_err(|e| TableError::Io {
        stage: "cache_manifest_serialize",
        path: tmp.display().to_string(),
        error: e.to_string(),
    })?;
    w.flush().map_err(|e| TableError::Io {
        stage: "cache_manifest_flush",
        path: tmp.display().to_string(),
        error: e.to_string(),
    })?;
    fs::rename(&tmp, &path).map_err(|e| TableError::Io {
        stage: "cache_manifest_publish",
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

fn write_blob(
    path: &Path,
    name: &str,
    entry_width: u8,
    entry_count: usize,
    payload: &[u8],
) -> Result<(), TableError> {
    let tmp = path.with_extension("tab.tmp");
    let io_err = |e: std::io::Error| TableError::Io {
        stage: "cache_blob_write",
        path: tmp.display().to_string(),
        error: e.to_string(),
    };

    let f = fs::File::create(&tmp).map_err(io_err)?;
    let mut w = BufWriter::new(f);
    w.write_all(&TABLE_MAGIC).map_err(io_err)?;
    w.write_all(&FORMAT_VERSION.to_le_bytes()).map_err(io_err)?;
    w.write_all(&(name.len() as u8).to_le_bytes()).map_err(io_err)?;
    w.write_all(name.as_bytes()).map_err(io_err)?;
    w.write_all(&[entry_width]).map_err(io_err)?;
    w.write_all(&(entry_count as u64).to_le_bytes()).map_err(io_err)?;
    w.write_all(&fnv1a64(payload).to_le_bytes()).map_err(io_err)?;
    w.write_all(payload).map_err(io_err)?;
    w.flush().map_err(io_err)?;
    drop(w);

    fs::rename(&tmp, path).map_err(|e| TableError::Io {
        stage: "cache_blob_publish",
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

fn read_blob(path: &Path, name: &str, entry_width: u8, entry_count: usize) -> Result<Vec<u8>, TableError> {
    let corrupt = |reason: String| TableError::Corrupt {
        path: path.display().to_string(),
        reason,
    };
    let io_err = |e: std::io::Error| TableError::Io {
        stage: "cache_blob_read",
        path: path.display().to_string(),
        error: e.to_string(),
    };

    let f = fs::File::open(path).map_err(io_err)?;
    let mut r = BufReader::new(f);

    let mut magic = [0u8; 8];
    r.read_exact(&mut magic)
        .map_err(|_| corrupt("truncated header".to_string()))?;
    if magic != TABLE_MAGIC {
        return Err(corrupt("wrong magic bytes".to_string()));
    }

    let version = read_u32(&mut r, path)?;
    if version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "format_version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let mut name_len = [0u8; 1];
    r.read_exact(&mut name_len)
        .map_err(|_| corrupt("truncated header".to_string()))?;
    let mut name_bytes = vec![0u8; name_len[0] as usize];
    r.read_exact(&mut name_bytes)
        .map_err(|_| corrupt("truncated header".to_string()))?;
    if name_bytes != name.as_bytes() {
        return Err(corrupt(format!(
            "contains table {:?}, expected {name:?}",
            String::from_utf8_lossy(&name_bytes)
        )));
    }

    let mut width = [0u8; 1];
    r.read_exact(&mut width)
        .map_err(|_| corrupt("truncated header".to_string()))?;
    if width[0] != entry_width {
        return Err(corrupt(format!(
            "entry width {} (expected {entry_width})",
            width[0]
        )));
    }

    let count = read_u64(&mut r, path)? as usize;
    if count != entry_count {
        return Err(corrupt(format!("{count} entries (expected {entry_count})")));
    }

    let checksum = read_u64(&mut r, path)?;

    let mut payload = vec![0u8; count * entry_width as usize];
    r.read_exact(&mut payload)
        .map_err(|_| corrupt("truncated payload".to_string()))?;

    let mut trailing = [0u8; 1];
    match r.read(&mut trailing) {
        Ok(0) => {}
        Ok(_) => return Err(corrupt("trailing bytes after payload".to_string())),
        Err(e) => return Err(io_err(e)),
    }

    if fnv1a64(&payload) != checksum {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    Ok(payload)
}

fn read_u16_blob(path: &Path, name: &str, entry_count: usize) -> Result<Vec<u16>, TableError> {
    let payload = read_blob(path, name, 2, entry_count)?;
    Ok(payload
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect())
}

fn read_u8_blob(path: &Path, name: &str, entry_count: usize) -> Result<Vec<u8>, TableError> {
    read_blob(path, name, 1, entry_count)
}

fn read_u32(r: &mut impl Read, path: &Path) -> Result<u32, TableError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|_| TableError::Corrupt {
        path: path.display().to_string(),
        reason: "truncated header".to_string(),
    })?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(r: &mut impl Read, path: &Path) -> Result<u64, TableError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(|_| TableError::Corrupt {
        path: path.display().to_string(),
        reason: "truncated header".to_string(),
    })?;
    Ok(u64::from_le_bytes(buf))
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv_distinguishes_payloads() {
        assert_ne!(fnv1a64(b"abc"), fnv1a64(b"abd"));
        assert_ne!(fnv1a64(b""), fnv1a64(b"\0"));
    }

    #[test]
    fn blob_round_trip_and_corruption() {
        let dir = std::env::temp_dir().join(format!("cube_solver_blob_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("small.tab");

        let payload = [1u8, 2, 3, 4];
        write_blob(&path, "small", 1, 4, &payload).unwrap();
        assert_eq!(read_blob(&path, "small", 1, 4).unwrap(), payload);

        // wrong name, width, count
        assert!(read_blob(&path, "other", 1, 4).is_err());
        assert!(read_blob(&path, "small", 2, 4).is_err());
        assert!(read_blob(&path, "small", 1, 5).is_err());

        // flipped payload byte fails the checksum
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(
            read_blob(&path, "small", 1, 4),
            Err(TableError::Corrupt { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
