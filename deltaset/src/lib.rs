//! Bit-exact differential storage for labeled N-dimensional datasets.
//!
//! A diff dataset holds the elementwise arithmetic difference between two
//! revisions of a dataset, along with a record of where the base revision can
//! be loaded from. Opening a stored diff with `open` reconstructs the full
//! dataset transparently.
//!
mod dataset;
mod diff;
mod errors;
mod extio;
mod loader;
mod provenance;
mod store;

#[cfg(test)]
mod testing;

pub use dataset::ArrayData;
pub use dataset::AttrValue;
pub use dataset::Coordinate;
pub use dataset::Dataset;
pub use dataset::Kind;
pub use dataset::Variable;
pub use diff::diff;
pub use diff::patch;
pub use errors::Error;
pub use errors::Result;
pub use loader::open;
pub use provenance::Provenance;
pub use provenance::SOURCE_KEY;
pub use store::MemoryStore;
pub use store::Store;
