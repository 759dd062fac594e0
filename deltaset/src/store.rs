use std::collections::HashMap;
use std::io::Cursor;

use parking_lot::Mutex;

use crate::dataset::Dataset;
use crate::errors::{Error, Result};
use crate::provenance::Provenance;

/// A trait for loading and persisting datasets from arbitrary storage.
///
/// The loader is generic over this trait: anything that can resolve a
/// `Provenance` handle to a dataset can serve as a reconstruction backend.
///
pub trait Store {
    /// Load the dataset identified by `handle`.
    ///
    /// Should return `Error::NotFound` if there is no object for the handle.
    ///
    fn load(&self, handle: &Provenance) -> Result<Dataset>;

    /// Persist `dataset` under `handle`, replacing any previous object.
    ///
    fn save(&self, handle: &Provenance, dataset: &Dataset) -> Result<()>;
}

/// A `Store` implementation that keeps serialized datasets in RAM.
///
/// Objects go through the same binary codec as any other store, so attributes
/// survive a save/load cycle exactly as they would on disk.
///
pub struct MemoryStore {
    objects: Mutex<HashMap<Provenance, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn load(&self, handle: &Provenance) -> Result<Dataset> {
        let objects = self.objects.lock();
        let object = objects
            .get(handle)
            .ok_or_else(|| Error::NotFound(handle.clone()))?;

        Dataset::load_from(&mut Cursor::new(object))
    }

    fn save(&self, handle: &Provenance, dataset: &Dataset) -> Result<()> {
        let mut buffer: Vec<u8> = Vec::new();
        dataset.save_to(&mut buffer)?;
        self.objects.lock().insert(handle.clone(), buffer);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn save_load() -> Result<()> {
        let store = MemoryStore::new();
        let (dataset, _) = testing::revisions();

        store.save(&Provenance::path("obs.ds"), &dataset)?;
        let loaded = store.load(&Provenance::path("obs.ds"))?;

        assert_eq!(loaded, dataset);

        Ok(())
    }

    #[test]
    fn provenance_survives_save_load() -> Result<()> {
        let store = MemoryStore::new();
        let (mut dataset, _) = testing::revisions();
        dataset.set_source(Provenance::path("base.ds"))?;

        store.save(&Provenance::path("obs.ds"), &dataset)?;
        let loaded = store.load(&Provenance::path("obs.ds"))?;

        assert_eq!(loaded.source()?, Some(Provenance::path("base.ds")));

        Ok(())
    }

    #[test]
    fn not_found() {
        let store = MemoryStore::new();

        let result = store.load(&Provenance::path("nope.ds"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn save_replaces() -> Result<()> {
        let store = MemoryStore::new();
        let (first, second) = testing::revisions();

        store.save(&Provenance::path("obs.ds"), &first)?;
        store.save(&Provenance::path("obs.ds"), &second)?;

        assert_eq!(store.load(&Provenance::path("obs.ds"))?, second);

        Ok(())
    }
}
