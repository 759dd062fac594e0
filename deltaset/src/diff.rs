//! The diff/patch transform.
//!
//! `diff` computes `source - target` elementwise and tags the result with the
//! source's recorded origin; `patch` computes `base + diff`. The two are exact
//! inverses: `patch(target, diff(target, source)) == source` for every
//! supported numeric kind.
//!
use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use num_traits::PrimInt;

use crate::dataset::{ArrayData, Dataset, Kind, Variable};
use crate::errors::{Error, Result};

/// Compute the difference between two datasets.
///
/// The source dataset must have a recorded origin (see `Dataset::set_source`);
/// its origin is copied onto the result so the loader can find the
/// reconstruction base later.
///
pub fn diff(target: &Dataset, source: &Dataset) -> Result<Dataset> {
    let provenance = source.source()?.ok_or(Error::MissingSource)?;
    check_schema(target, source)?;

    let mut variables = Vec::with_capacity(source.variables.len());
    for (s, t) in source.variables.iter().zip(&target.variables) {
        variables.push(Variable {
            name: s.name.clone(),
            dims: s.dims.clone(),
            data: subtract(&s.data, &t.data)?,
        });
    }

    let mut output = Dataset {
        coordinates: source.coordinates.clone(),
        variables,
        attrs: BTreeMap::new(),
    };
    output.set_source(provenance)?;

    Ok(output)
}

/// Reconstruct a dataset from a base and a diff.
///
/// The result never carries a source attribute: a patched dataset is not,
/// itself, a diff of anything.
///
pub fn patch(base: &Dataset, diff: &Dataset) -> Result<Dataset> {
    check_schema(base, diff)?;

    let mut variables = Vec::with_capacity(base.variables.len());
    for (b, d) in base.variables.iter().zip(&diff.variables) {
        variables.push(Variable {
            name: b.name.clone(),
            dims: b.dims.clone(),
            data: add(&b.data, &d.data)?,
        });
    }

    Ok(Dataset {
        coordinates: base.coordinates.clone(),
        variables,
        attrs: BTreeMap::new(),
    })
}

impl Dataset {
    /// Compute the difference between this dataset and `source`.
    ///
    /// See the free function `diff`; `self` is the target operand.
    ///
    pub fn diff(&self, source: &Dataset) -> Result<Dataset> {
        diff(self, source)
    }

    /// Reconstruct a dataset by applying `diff` to this one.
    ///
    pub fn patch(&self, diff: &Dataset) -> Result<Dataset> {
        patch(self, diff)
    }
}

fn check_schema(left: &Dataset, right: &Dataset) -> Result<()> {
    if left.coordinates.len() != right.coordinates.len() {
        return Err(Error::SchemaMismatch(format!(
            "{} coordinates vs {}",
            left.coordinates.len(),
            right.coordinates.len(),
        )));
    }
    for (l, r) in left.coordinates.iter().zip(&right.coordinates) {
        if l.name != r.name {
            return Err(Error::SchemaMismatch(format!(
                "coordinate {:?} vs {:?}",
                l.name, r.name,
            )));
        }
        if l.labels != r.labels {
            return Err(Error::SchemaMismatch(format!(
                "labels for coordinate {:?} differ",
                l.name,
            )));
        }
    }

    if left.variables.len() != right.variables.len() {
        return Err(Error::SchemaMismatch(format!(
            "{} variables vs {}",
            left.variables.len(),
            right.variables.len(),
        )));
    }
    for (l, r) in left.variables.iter().zip(&right.variables) {
        if l.name != r.name {
            return Err(Error::SchemaMismatch(format!(
                "variable {:?} vs {:?}",
                l.name, r.name,
            )));
        }
        if l.dims != r.dims {
            return Err(Error::SchemaMismatch(format!(
                "dimensions of variable {:?} differ",
                l.name,
            )));
        }
        if l.data.shape() != r.data.shape() {
            return Err(Error::SchemaMismatch(format!(
                "variable {:?} has shape {:?} vs {:?}",
                l.name,
                l.data.shape(),
                r.data.shape(),
            )));
        }
    }

    Ok(())
}

fn subtract(lhs: &ArrayData, rhs: &ArrayData) -> Result<ArrayData> {
    match (lhs, rhs) {
        (ArrayData::F32(l), ArrayData::F32(r)) => Ok(ArrayData::F32(l - r)),
        (ArrayData::F64(l), ArrayData::F64(r)) => Ok(ArrayData::F64(l - r)),
        (ArrayData::I32(l), ArrayData::I32(r)) => {
            narrow(lhs.shape(), combine(l, r, |a, b| a - b), Kind::I32)
        }
        (ArrayData::I64(l), ArrayData::I64(r)) => {
            narrow(lhs.shape(), combine(l, r, |a, b| a - b), Kind::I64)
        }
        _ => Err(kind_mismatch(lhs, rhs)),
    }
}

fn add(base: &ArrayData, diff: &ArrayData) -> Result<ArrayData> {
    match (base, diff) {
        (ArrayData::F32(b), ArrayData::F32(d)) => Ok(ArrayData::F32(b + d)),
        (ArrayData::F64(b), ArrayData::F64(d)) => Ok(ArrayData::F64(b + d)),
        (ArrayData::I32(b), ArrayData::I32(d)) => {
            narrow(base.shape(), combine(b, d, |a, b| a + b), Kind::I32)
        }
        // A diff of 32 bit integers widens to 64 bits when the differences
        // don't fit; the patched result narrows back below.
        (ArrayData::I32(b), ArrayData::I64(d)) => {
            narrow(base.shape(), combine(b, d, |a, b| a + b), Kind::I32)
        }
        (ArrayData::I64(b), ArrayData::I64(d)) => {
            narrow(base.shape(), combine(b, d, |a, b| a + b), Kind::I64)
        }
        _ => Err(kind_mismatch(base, diff)),
    }
}

/// Apply `op` elementwise with both operands promoted to 128 bits, so no
/// intermediate result can wrap.
///
fn combine<A, B>(
    lhs: &ArrayD<A>,
    rhs: &ArrayD<B>,
    op: impl Fn(i128, i128) -> i128,
) -> Vec<i128>
where
    A: PrimInt + Into<i128>,
    B: PrimInt + Into<i128>,
{
    lhs.iter()
        .zip(rhs.iter())
        .map(|(&l, &r)| op(l.into(), r.into()))
        .collect()
}

/// Narrow widened values back to `kind` when its range is provably
/// sufficient. 32 bit values that don't fit are stored as 64 bit; values
/// beyond 64 bits are an error.
///
fn narrow(shape: &[usize], values: Vec<i128>, kind: Kind) -> Result<ArrayData> {
    if kind == Kind::I32 && values.iter().all(|&n| i32::try_from(n).is_ok()) {
        let values = values.into_iter().map(|n| n as i32).collect();
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)
            .expect("shape and value count agree");
        return Ok(ArrayData::I32(data));
    }

    if values.iter().all(|&n| i64::try_from(n).is_ok()) {
        let values = values.into_iter().map(|n| n as i64).collect();
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)
            .expect("shape and value count agree");
        return Ok(ArrayData::I64(data));
    }

    Err(Error::Overflow(
        "values exceed the range of a 64 bit integer".into(),
    ))
}

fn kind_mismatch(lhs: &ArrayData, rhs: &ArrayData) -> Error {
    Error::SchemaMismatch(format!(
        "cannot combine {:?} data with {:?} data",
        lhs.kind(),
        rhs.kind(),
    ))
}
