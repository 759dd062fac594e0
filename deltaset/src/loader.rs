use log::debug;

use crate::dataset::Dataset;
use crate::errors::Result;
use crate::provenance::Provenance;
use crate::store::Store;

/// Open a stored dataset, reconstructing it from its source if it is a diff.
///
/// Exactly one of three strategies applies:
///
/// 1. `source` was given: the object at `handle` is treated as a diff against
///    the dataset at `source`.
/// 2. The object at `handle` carries a recorded source: the diff is patched
///    against that source automatically.
/// 3. Otherwise the object is a standalone dataset. It is returned as is,
///    with its own handle recorded as its source so it can serve as a
///    reconstruction base for future diffs.
///
/// Failures from the store propagate unmodified; a recorded source that fails
/// to load is an error, not a fallback to strategy 3.
///
pub fn open(
    store: &dyn Store,
    handle: &Provenance,
    source: Option<&Provenance>,
) -> Result<Dataset> {
    let target = store.load(handle)?;

    if let Some(source_handle) = source {
        debug!("opening {handle:?} as a diff against {source_handle:?}");
        let mut source_ds = store.load(source_handle)?;
        source_ds.set_source(source_handle.clone())?;

        return source_ds.patch(&target);
    }

    if let Some(recorded) = target.source()? {
        debug!("opening {handle:?} as a diff against recorded source {recorded:?}");
        let mut source_ds = store.load(&recorded)?;
        source_ds.set_source(recorded)?;

        return source_ds.patch(&target);
    }

    debug!("opening {handle:?} as a standalone dataset");
    let mut output = target;
    output.set_source(handle.clone())?;

    Ok(output)
}
