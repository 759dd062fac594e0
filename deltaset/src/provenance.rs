use std::io::{Cursor, Read};

use crate::dataset::{AttrValue, Dataset};
use crate::errors::{Error, Result};
use crate::extio::{ExtendedRead, ExtendedWrite};

/// The dataset attribute under which a source identifier is recorded.
pub const SOURCE_KEY: &str = "deltaset_source";

const MAGIC_NUMBER: u16 = 0xD1FE;
const FORMAT_VERSION: u32 = 0;

const TAG_PATH: u8 = 1;
const TAG_URL: u8 = 2;
const TAG_BYTES: u8 = 3;

/// An identifier for where a dataset's reconstruction source can be loaded
/// from.
///
/// What a handle means is up to the `Store` that resolves it. A handle
/// round-trips through a compact byte encoding so it can be embedded in a
/// dataset's attribute mapping, which only accepts primitives and flat integer
/// sequences.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Provenance {
    Path(String),
    Url(String),
    Bytes(Vec<u8>),
}

impl Provenance {
    pub fn path<S: Into<String>>(path: S) -> Self {
        Self::Path(path.into())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer: Vec<u8> = Vec::new();
        buffer.write_u16(MAGIC_NUMBER)?;
        buffer.write_u32(FORMAT_VERSION)?;
        match self {
            Self::Path(path) => {
                buffer.write_byte(TAG_PATH)?;
                buffer.write_string(path)?;
            }
            Self::Url(url) => {
                buffer.write_byte(TAG_URL)?;
                buffer.write_string(url)?;
            }
            Self::Bytes(bytes) => {
                buffer.write_byte(TAG_BYTES)?;
                buffer.write_bytes(bytes)?;
            }
        }

        Ok(buffer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(&mut Cursor::new(bytes)).map_err(|err| match err {
            corrupt @ Error::CorruptProvenance(_) => corrupt,
            other => Error::CorruptProvenance(other.to_string()),
        })
    }

    fn decode(stream: &mut impl Read) -> Result<Self> {
        let magic_number = stream.read_u16()?;
        if magic_number != MAGIC_NUMBER {
            return Err(Error::CorruptProvenance(format!(
                "bad magic number: {magic_number:#06x}"
            )));
        }
        let version = stream.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(Error::CorruptProvenance(format!(
                "unrecognized format version: {version}"
            )));
        }

        match stream.read_byte()? {
            TAG_PATH => Ok(Self::Path(stream.read_string()?)),
            TAG_URL => Ok(Self::Url(stream.read_string()?)),
            TAG_BYTES => Ok(Self::Bytes(stream.read_bytes()?)),
            tag => Err(Error::CorruptProvenance(format!("unknown tag: {tag}"))),
        }
    }
}

impl Dataset {
    /// Return the recorded source of this dataset, if any.
    ///
    /// `Ok(None)` means the dataset has no recorded source: it has never been
    /// diffed and was not opened through the loader. An attribute that exists
    /// but cannot be decoded is an error, never `None`.
    ///
    pub fn source(&self) -> Result<Option<Provenance>> {
        let value = match self.attrs.get(SOURCE_KEY) {
            None => return Ok(None),
            Some(value) => value,
        };
        let ints = match value {
            AttrValue::Ints(ints) => ints,
            other => {
                return Err(Error::CorruptProvenance(format!(
                    "expected an integer sequence, found {other:?}"
                )))
            }
        };

        let mut bytes = Vec::with_capacity(ints.len());
        for &n in ints {
            let byte = u8::try_from(n).map_err(|_| {
                Error::CorruptProvenance(format!("element out of byte range: {n}"))
            })?;
            bytes.push(byte);
        }

        Provenance::from_bytes(&bytes).map(Some)
    }

    /// Record `source` as the origin of this dataset.
    ///
    /// The handle is stored in the attribute mapping as a flat sequence of
    /// small integers, so it survives a save/load cycle through any store.
    ///
    pub fn set_source(&mut self, source: Provenance) -> Result<()> {
        let bytes = source.to_bytes()?;
        let ints = bytes.into_iter().map(i64::from).collect();
        self.attrs.insert(SOURCE_KEY.to_string(), AttrValue::Ints(ints));

        Ok(())
    }
}
