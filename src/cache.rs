//! On-disk cache for one acquisition chunk's decoded complex matrix (C14).
//!
//! A file-driver-level convenience only; the core decoders never read or
//! write this format. `save_chunk_cache` writes a small fixed header (magic,
//! shape, a SHA-256 of the payload) followed by the raw row-major
//! `Complex<f32>` payload. `load_chunk_cache` is cache-miss-not-error: any
//! magic mismatch, shape mismatch, checksum mismatch, or I/O failure just
//! returns `None`, and the caller falls back to decoding from source.

use std::io::{Read, Write};
use std::path::Path;

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::Complex;

const MAGIC: &[u8; 4] = b"S1C1";

/// Cache file path for `chunk_id` next to `source_path`.
pub fn cache_path(source_path: &Path, chunk_id: u32) -> std::path::PathBuf {
    let stem = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = source_path.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}_c{chunk_id}.s1c"))
}

fn payload_bytes(matrix: &[Vec<Complex>]) -> Vec<u8> {
    let cols = matrix.first().map_or(0, Vec::len);
    let mut buf = Vec::with_capacity(matrix.len() * cols * 8);
    for row in matrix {
        for c in row {
            buf.extend_from_slice(&c.re.to_le_bytes());
            buf.extend_from_slice(&c.im.to_le_bytes());
        }
    }
    buf
}

/// Write `matrix` (one row per packet, `2 * num_quads` complex columns per
/// row) to `{stem}_c{chunk_id}.s1c` next to `source_path`.
pub fn save_chunk_cache(source_path: &Path, chunk_id: u32, matrix: &[Vec<Complex>]) -> crate::Result<()> {
    let rows = matrix.len() as u64;
    let cols = matrix.first().map_or(0, Vec::len) as u64;
    let payload = payload_bytes(matrix);
    let checksum = Sha256::digest(&payload);

    let path = cache_path(source_path, chunk_id);
    debug!("writing chunk cache {}", path.display());
    let mut f = std::fs::File::create(&path).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    f.write_all(MAGIC).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    f.write_all(&rows.to_le_bytes()).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    f.write_all(&cols.to_le_bytes()).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    f.write_all(&checksum).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    f.write_all(&payload).map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
    Ok(())
}

/// Read back a previously-cached chunk, verifying the magic, declared shape
/// against `expected_shape` (rows, cols), and checksum. Returns `None` on any
/// mismatch or I/O error — this is a cache miss, not a hard failure.
pub fn load_chunk_cache(
    source_path: &Path,
    chunk_id: u32,
    expected_shape: (usize, usize),
) -> Option<Vec<Vec<Complex>>> {
    let path = cache_path(source_path, chunk_id);
    let mut f = std::fs::File::open(&path).ok()?;

    let mut magic = [0u8; 4];
    f.read_exact(&mut magic).ok()?;
    if &magic != MAGIC {
        warn!("chunk cache {}: bad magic", path.display());
        return None;
    }

    let mut rows_buf = [0u8; 8];
    let mut cols_buf = [0u8; 8];
    f.read_exact(&mut rows_buf).ok()?;
    f.read_exact(&mut cols_buf).ok()?;
    let rows = u64::from_le_bytes(rows_buf) as usize;
    let cols = u64::from_le_bytes(cols_buf) as usize;
    if (rows, cols) != expected_shape {
        warn!(
            "chunk cache {}: shape {:?} != expected {:?}",
            path.display(),
            (rows, cols),
            expected_shape
        );
        return None;
    }

    let mut checksum = [0u8; 32];
    f.read_exact(&mut checksum).ok()?;

    let mut payload = Vec::new();
    f.read_to_end(&mut payload).ok()?;
    if payload.len() != rows * cols * 8 {
        warn!("chunk cache {}: truncated payload", path.display());
        return None;
    }
    if Sha256::digest(&payload).as_slice() != checksum {
        warn!("chunk cache {}: checksum mismatch", path.display());
        return None;
    }

    let mut matrix = Vec::with_capacity(rows);
    let mut it = payload.chunks_exact(8);
    for _ in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for _ in 0..cols {
            let chunk = it.next()?;
            let re = f32::from_le_bytes(chunk[0..4].try_into().ok()?);
            let im = f32::from_le_bytes(chunk[4..8].try_into().ok()?);
            row.push(Complex::new(re, im));
        }
        matrix.push(row);
    }
    Some(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: usize, cols: usize) -> Vec<Vec<Complex>> {
        (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| Complex::new(r as f32, c as f32))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn round_trips_a_saved_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.dat");
        let m = matrix(3, 4);
        save_chunk_cache(&source, 0, &m).unwrap();
        let loaded = load_chunk_cache(&source, 0, (3, 4)).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn missing_file_is_a_cache_miss_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.dat");
        assert!(load_chunk_cache(&source, 0, (3, 4)).is_none());
    }

    #[test]
    fn shape_mismatch_is_a_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.dat");
        let m = matrix(3, 4);
        save_chunk_cache(&source, 0, &m).unwrap();
        assert!(load_chunk_cache(&source, 0, (3, 5)).is_none());
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.dat");
        let m = matrix(2, 2);
        save_chunk_cache(&source, 0, &m).unwrap();
        let path = cache_path(&source, 0);
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();
        assert!(load_chunk_cache(&source, 0, (2, 2)).is_none());
    }
}
