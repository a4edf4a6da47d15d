use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid `capacity` (not a power of two), `tuple_size` exceeding the
    /// available bit space, or a non-positive `width`.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Every probe slot was visited without finding a match or an empty slot.
    #[error("hash table is full")]
    TableFull,
    /// A malformed line was encountered while loading a database from disk.
    #[error("input error at line {line}: {message}")]
    Input { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
