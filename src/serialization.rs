//! Textual load/save of `ListDB`/`VectorDB`, one record per line:
//! `<count> <key1>:<value1> <key2>:<value2> ...`. Grounded on
//! `vectordb_load_from_file`/`vectordb_save_to_file` in the original source,
//! which use the same `%u` / `%u:%lf` line shape.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::data::{ListDB, SparseList, SparseVector, VectorDB};
use crate::error::{Error, Result};

fn parse_entry(token: &str, line_no: usize) -> Result<(u32, &str)> {
    let mut parts = token.splitn(2, ':');
    let key = parts.next().unwrap_or("");
    let value = parts.next().ok_or_else(|| Error::Input {
        line: line_no,
        message: format!("expected `key:value`, got `{}`", token),
    })?;
    let key: u32 = key.parse().map_err(|_| Error::Input {
        line: line_no,
        message: format!("invalid key `{}`", key),
    })?;
    Ok((key, value))
}

/// Loads a `ListDB` from `path`. `dim` on the returned database is set to
/// the number of records loaded (lists carry opaque ids, not coordinates
/// bounded by a dimensionality, so there is no "max key" to infer it from).
pub fn load_listdb<P: AsRef<Path>>(path: P) -> Result<ListDB> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut db = ListDB::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let _count: usize = tokens.next().ok_or_else(|| Error::Input {
            line: line_no,
            message: "missing entry count".to_string(),
        })?.parse().map_err(|_| Error::Input {
            line: line_no,
            message: "entry count is not an integer".to_string(),
        })?;

        let mut list = SparseList::new();
        for token in tokens {
            let (item, value) = parse_entry(token, line_no)?;
            let freq: u32 = value.parse().map_err(|_| Error::Input {
                line: line_no,
                message: format!("invalid frequency `{}`", value),
            })?;
            list.push(item, freq);
        }
        db.push(list);
    }

    db.dim = db.len() as u32;
    Ok(db)
}

/// Saves `db` to `path`, one line per list: `<count> <item>:<freq> ...`.
pub fn save_listdb<P: AsRef<Path>>(path: P, db: &ListDB) -> Result<()> {
    let mut file = File::create(path)?;
    for list in db.iter() {
        write!(file, "{}", list.len())?;
        for (item, freq) in list.iter() {
            write!(file, " {}:{}", item, freq)?;
        }
        writeln!(file)?;
    }
    Ok(())
}

/// Loads a `VectorDB` from `path`. `dim` is set to `1 + max(key)` seen
/// across all lines, since vector keys are coordinate indices.
pub fn load_vectordb<P: AsRef<Path>>(path: P) -> Result<VectorDB> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut db = VectorDB::new();
    let mut max_dim: i64 = -1;

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let _count: usize = tokens.next().ok_or_else(|| Error::Input {
            line: line_no,
            message: "missing entry count".to_string(),
        })?.parse().map_err(|_| Error::Input {
            line: line_no,
            message: "entry count is not an integer".to_string(),
        })?;

        let mut vector = SparseVector::new();
        for token in tokens {
            let (dim, value) = parse_entry(token, line_no)?;
            let value: f64 = value.parse().map_err(|_| Error::Input {
                line: line_no,
                message: format!("invalid value `{}`", value),
            })?;
            max_dim = max_dim.max(dim as i64);
            vector.push(dim, value);
        }
        db.push(vector);
    }

    db.dim = (max_dim + 1) as u32;
    Ok(db)
}

/// Saves `db` to `path`, one line per vector: `<count> <dim>:<value> ...`.
pub fn save_vectordb<P: AsRef<Path>>(path: P, db: &VectorDB) -> Result<()> {
    let mut file = File::create(path)?;
    for vector in db.iter() {
        write!(file, "{}", vector.len())?;
        for (dim, value) in vector.iter() {
            write!(file, " {}:{}", dim, value)?;
        }
        writeln!(file)?;
    }
    Ok(())
}
