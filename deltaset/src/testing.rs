use ndarray::{arr1, ArrayD, IxDyn};

use crate::dataset::Dataset;

const SOURCE_TEMPS: [f32; 6] = [9.5, 8.25, -7.75, 0.0, 6.125, -3.375];
const SOURCE_COUNTS: [i32; 6] = [9, -8, 7, 0, 6, 6];
const TARGET_TEMPS: [f32; 6] = [9.5, 8.5, 7.75, -7.75, 0.0, 2.625];
const TARGET_COUNTS: [i32; 6] = [9, 8, -7, 7, 0, 2];

/// Two datasets sharing a schema: a base revision and a later revision.
///
pub(crate) fn revisions() -> (Dataset, Dataset) {
    (
        dataset(&SOURCE_TEMPS, &SOURCE_COUNTS),
        dataset(&TARGET_TEMPS, &TARGET_COUNTS),
    )
}

/// Like `revisions`, but with 64 bit variables.
///
pub(crate) fn wide_revisions() -> (Dataset, Dataset) {
    let widen = |ds: &Dataset| {
        let temps: Vec<f64> = ds.get("temperature").unwrap().data.as_f32().unwrap()
            .iter()
            .map(|&n| f64::from(n))
            .collect();
        let counts: Vec<i64> = ds.get("count").unwrap().data.as_i32().unwrap()
            .iter()
            .map(|&n| i64::from(n) * (1 << 40))
            .collect();

        let mut wide = Dataset::new();
        wide.add_coordinate("time", arr1(&[0_i64, 1, 2])).unwrap();
        wide.add_coordinate("site", arr1(&[10_i64, 20])).unwrap();
        wide.add_variable(
            "temperature",
            &["time", "site"],
            ArrayD::from_shape_vec(IxDyn(&[3, 2]), temps).unwrap(),
        )
        .unwrap();
        wide.add_variable(
            "count",
            &["time", "site"],
            ArrayD::from_shape_vec(IxDyn(&[3, 2]), counts).unwrap(),
        )
        .unwrap();
        wide
    };

    let (source, target) = revisions();
    (widen(&source), widen(&target))
}

pub(crate) fn dataset(temps: &[f32], counts: &[i32]) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_coordinate("time", arr1(&[0_i64, 1, 2])).unwrap();
    ds.add_coordinate("site", arr1(&[10_i64, 20])).unwrap();
    ds.add_variable(
        "temperature",
        &["time", "site"],
        ArrayD::from_shape_vec(IxDyn(&[3, 2]), temps.to_vec()).unwrap(),
    )
    .unwrap();
    ds.add_variable(
        "count",
        &["time", "site"],
        ArrayD::from_shape_vec(IxDyn(&[3, 2]), counts.to_vec()).unwrap(),
    )
    .unwrap();
    ds
}

/// A dataset with a single i32 variable over the standard schema.
///
pub(crate) fn int_dataset(counts: &[i32]) -> Dataset {
    int_dataset_with_times(&[0, 1, 2], counts)
}

pub(crate) fn int_dataset_with_times(times: &[i64], counts: &[i32]) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_coordinate("time", arr1(times)).unwrap();
    ds.add_coordinate("site", arr1(&[10_i64, 20])).unwrap();
    ds.add_variable(
        "count",
        &["time", "site"],
        ArrayD::from_shape_vec(IxDyn(&[times.len(), 2]), counts.to_vec()).unwrap(),
    )
    .unwrap();
    ds
}

/// A dataset with a single i64 variable along a two instant time axis.
///
pub(crate) fn long_dataset(values: &[i64]) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_coordinate("time", arr1(&[0_i64, 1])).unwrap();
    ds.add_variable(
        "total",
        &["time"],
        ArrayD::from_shape_vec(IxDyn(&[2]), values.to_vec()).unwrap(),
    )
    .unwrap();
    ds
}
