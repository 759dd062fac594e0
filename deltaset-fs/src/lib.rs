//! A concrete implementation of the `deltaset::Store` interface for the
//! filesystem.
//!
//! Path handles are resolved beneath a root directory. Files whose names end
//! in `.gz` are gunzipped transparently on load and gzipped on save.
//!
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use log::debug;

use deltaset::{Dataset, Error, Provenance, Result, Store};

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a new `FsStore`
    ///
    /// # Arguments
    ///
    /// * `root` - The directory beneath which all path handles are resolved.
    ///
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, handle: &Provenance) -> Result<PathBuf> {
        match handle {
            Provenance::Path(path) => Ok(self.root.join(path)),
            other => Err(Error::Load(format!(
                "unsupported handle for a filesystem store: {other:?}"
            ))),
        }
    }

    fn is_gzipped(path: &Path) -> bool {
        path.extension().map_or(false, |extension| extension == "gz")
    }
}

impl Store for FsStore {
    fn load(&self, handle: &Provenance) -> Result<Dataset> {
        let path = self.resolve(handle)?;
        debug!("loading dataset from {}", path.display());

        let file = File::open(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::NotFound(handle.clone())
            } else {
                Error::IO(err)
            }
        })?;

        if Self::is_gzipped(&path) {
            Dataset::load_from(&mut GzDecoder::new(BufReader::new(file)))
        } else {
            Dataset::load_from(&mut BufReader::new(file))
        }
    }

    fn save(&self, handle: &Provenance, dataset: &Dataset) -> Result<()> {
        let path = self.resolve(handle)?;
        debug!("saving dataset to {}", path.display());

        let file = File::create(&path)?;
        if Self::is_gzipped(&path) {
            let mut stream = GzEncoder::new(BufWriter::new(file), Compression::default());
            dataset.save_to(&mut stream)?;
            let mut inner = stream.finish()?;
            inner.flush()?;
        } else {
            let mut stream = BufWriter::new(file);
            dataset.save_to(&mut stream)?;
            stream.flush()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{arr1, ArrayD, IxDyn};
    use tempfile::TempDir;

    use deltaset::open;

    fn dataset(temps: &[f32]) -> Dataset {
        let mut ds = Dataset::new();
        ds.add_coordinate("time", arr1(&[0_i64, 1, 2])).unwrap();
        ds.add_variable(
            "temperature",
            &["time"],
            ArrayD::from_shape_vec(IxDyn(&[3]), temps.to_vec()).unwrap(),
        )
        .unwrap();
        ds
    }

    fn store() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn save_load() -> Result<()> {
        let (_dir, store) = store();
        let ds = dataset(&[9.5, -8.25, 0.0]);

        store.save(&Provenance::path("obs.ds"), &ds)?;
        let loaded = store.load(&Provenance::path("obs.ds"))?;

        assert_eq!(loaded, ds);

        Ok(())
    }

    #[test]
    fn save_load_gzipped() -> Result<()> {
        let (dir, store) = store();
        let ds = dataset(&[9.5, -8.25, 0.0]);

        store.save(&Provenance::path("obs.ds.gz"), &ds)?;
        let loaded = store.load(&Provenance::path("obs.ds.gz"))?;
        assert_eq!(loaded, ds);

        // Spot check that the file on disk really is gzip.
        let raw = std::fs::read(dir.path().join("obs.ds.gz"))?;
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        Ok(())
    }

    #[test]
    fn not_found() {
        let (_dir, store) = store();

        let result = store.load(&Provenance::path("nope.ds"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn url_handles_are_rejected() {
        let (_dir, store) = store();

        let result = store.load(&Provenance::Url("https://example.com/obs.ds".into()));
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn open_with_explicit_source() -> Result<()> {
        let (_dir, store) = store();
        let base = dataset(&[9.5, -8.25, 0.0]);
        let mut revision = dataset(&[9.5, -8.0, 1.5]);

        store.save(&Provenance::path("base.ds"), &base)?;
        revision.set_source(Provenance::path("base.ds"))?;
        let diffed = base.diff(&revision)?;
        store.save(&Provenance::path("diff.ds"), &diffed)?;

        let opened = open(
            &store,
            &Provenance::path("diff.ds"),
            Some(&Provenance::path("base.ds")),
        )?;
        assert_eq!(opened.variables, revision.variables);

        Ok(())
    }

    #[test]
    fn open_with_embedded_source() -> Result<()> {
        let (_dir, store) = store();
        let base = dataset(&[9.5, -8.25, 0.0]);
        let mut revision = dataset(&[9.5, -8.0, 1.5]);

        store.save(&Provenance::path("base.ds.gz"), &base)?;
        revision.set_source(Provenance::path("base.ds.gz"))?;
        let diffed = base.diff(&revision)?;
        store.save(&Provenance::path("diff.ds.gz"), &diffed)?;

        let opened = open(&store, &Provenance::path("diff.ds.gz"), None)?;
        assert_eq!(opened.variables, revision.variables);
        assert_eq!(opened.source()?, None);

        Ok(())
    }

    #[test]
    fn open_standalone() -> Result<()> {
        let (_dir, store) = store();
        let base = dataset(&[9.5, -8.25, 0.0]);
        store.save(&Provenance::path("plain.ds"), &base)?;

        let opened = open(&store, &Provenance::path("plain.ds"), None)?;
        assert_eq!(opened.variables, base.variables);
        assert_eq!(opened.source()?, Some(Provenance::path("plain.ds")));

        Ok(())
    }
}
