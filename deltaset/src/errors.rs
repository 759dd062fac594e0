use std::fmt::{self, Display, Formatter};
use std::io;
use std::result;

use crate::provenance::Provenance;

#[derive(Debug)]
pub enum Error {
    /// An I/O failure from the underlying storage.
    IO(io::Error),

    /// A stored object is not a usable dataset, or a handle cannot be used by
    /// the store it was given to.
    Load(String),

    /// The store has no object for the given handle.
    NotFound(Provenance),

    /// Operand datasets have incompatible variables, shapes, or coordinates.
    SchemaMismatch(String),

    /// A diff was requested against a source dataset with no recorded origin.
    MissingSource,

    /// A source attribute exists but cannot be decoded.
    CorruptProvenance(String),

    /// An integer difference or sum is not representable in 64 bits.
    Overflow(String),

    BadName(String),
    BadShape(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::IO(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::IO(err) => write!(f, "i/o error: {err}"),
            Self::Load(msg) => write!(f, "unable to load dataset: {msg}"),
            Self::NotFound(handle) => write!(f, "no stored dataset for {handle:?}"),
            Self::SchemaMismatch(msg) => {
                write!(f, "datasets have incompatible schemas: {msg}")
            }
            Self::MissingSource => write!(
                f,
                "the source dataset does not specify where it was loaded from; \
                 open it with deltaset::open() or record its origin with \
                 Dataset::set_source()"
            ),
            Self::CorruptProvenance(msg) => {
                write!(f, "stored source attribute cannot be decoded: {msg}")
            }
            Self::Overflow(msg) => write!(f, "difference out of range: {msg}"),
            Self::BadName(name) => write!(f, "bad name: {name}"),
            Self::BadShape(msg) => write!(f, "bad shape: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
