use std::collections::BTreeMap;
use std::io::{Read, Write};

use ndarray::{Array1, ArrayD, IxDyn};
use paste::paste;

use crate::errors::{Error, Result};
use crate::extio::{ExtendedRead, ExtendedWrite, Serialize};

pub(crate) const MAGIC_NUMBER: u16 = 0xD1FF;
pub(crate) const FORMAT_VERSION: u32 = 0;

const TYPE_I32: i32 = -4;
const TYPE_I64: i32 = -8;
const TYPE_F32: i32 = 32;
const TYPE_F64: i32 = 64;

const ATTR_INT: u8 = 1;
const ATTR_FLOAT: u8 = 2;
const ATTR_TEXT: u8 = 3;
const ATTR_INTS: u8 = 4;

/// An ordered mapping of named N-dimensional arrays sharing a common set of
/// dimensions, plus free-form attributes.
///
/// Datasets are value-like. The arithmetic in `diff` and `patch` produces new
/// instances; an existing instance is only ever mutated through its attribute
/// mapping.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub coordinates: Vec<Coordinate>,
    pub variables: Vec<Variable>,
    pub attrs: BTreeMap<String, AttrValue>,
}

/// A named dimension together with its label array.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub name: String,
    pub labels: ArrayData,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Name of the variable, e.g. "precipitation"
    pub name: String,

    /// Names of the coordinates this variable's axes are labeled by, in axis
    /// order
    pub dims: Vec<String>,

    pub data: ArrayData,
}

/// The kind of numerical data stored in an array
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    I32,
    I64,
    F32,
    F64,
}

/// An N-dimensional array of one of the supported numeric kinds
///
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

macro_rules! array_data_kind {
    ($kind:ident, $prim:ident) => {
        paste! {
            impl From<ArrayD<$prim>> for ArrayData {
                fn from(data: ArrayD<$prim>) -> Self {
                    ArrayData::$kind(data)
                }
            }

            impl From<Array1<$prim>> for ArrayData {
                fn from(labels: Array1<$prim>) -> Self {
                    ArrayData::$kind(labels.into_dyn())
                }
            }

            impl ArrayData {
                pub fn [<as_ $prim>](&self) -> Option<&ArrayD<$prim>> {
                    match self {
                        ArrayData::$kind(data) => Some(data),
                        _ => None,
                    }
                }
            }
        }
    };
}

array_data_kind!(I32, i32);
array_data_kind!(I64, i64);
array_data_kind!(F32, f32);
array_data_kind!(F64, f64);

impl ArrayData {
    pub fn kind(&self) -> Kind {
        match self {
            Self::I32(_) => Kind::I32,
            Self::I64(_) => Kind::I64,
            Self::F32(_) => Kind::F32,
            Self::F64(_) => Kind::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::I32(data) => data.shape(),
            Self::I64(data) => data.shape(),
            Self::F32(data) => data.shape(),
            Self::F64(data) => data.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn type_code(&self) -> i32 {
        match self {
            Self::I32(_) => TYPE_I32,
            Self::I64(_) => TYPE_I64,
            Self::F32(_) => TYPE_F32,
            Self::F64(_) => TYPE_F64,
        }
    }
}

impl Serialize for ArrayData {
    fn write_to(&self, stream: &mut impl Write) -> Result<()> {
        stream.write_i32(self.type_code())?;
        stream.write_length(self.ndim())?;
        for dim in self.shape() {
            stream.write_length(*dim)?;
        }
        match self {
            Self::I32(data) => {
                for n in data {
                    stream.write_i32(*n)?;
                }
            }
            Self::I64(data) => {
                for n in data {
                    stream.write_i64(*n)?;
                }
            }
            Self::F32(data) => {
                for n in data {
                    stream.write_f32(*n)?;
                }
            }
            Self::F64(data) => {
                for n in data {
                    stream.write_f64(*n)?;
                }
            }
        }

        Ok(())
    }

    fn read_from(stream: &mut impl Read) -> Result<Self> {
        let type_code = stream.read_i32()?;
        let ndim = stream.read_length()?;
        let mut shape = Vec::with_capacity(ndim);
        for _ in 0..ndim {
            shape.push(stream.read_length()?);
        }
        let size = shape.iter().product();

        macro_rules! read_array {
            ($read:ident) => {{
                let mut values = Vec::with_capacity(size);
                for _ in 0..size {
                    values.push(stream.$read()?);
                }
                ArrayData::from(
                    ArrayD::from_shape_vec(IxDyn(&shape), values)
                        .map_err(|err| Error::Load(err.to_string()))?,
                )
            }};
        }

        let data = match type_code {
            TYPE_I32 => read_array!(read_i32),
            TYPE_I64 => read_array!(read_i64),
            TYPE_F32 => read_array!(read_f32),
            TYPE_F64 => read_array!(read_f64),
            code => return Err(Error::Load(format!("unknown data type: {code}"))),
        };

        Ok(data)
    }
}

/// An attribute value: a primitive scalar or a flat sequence of integers
///
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    Ints(Vec<i64>),
}

impl Serialize for AttrValue {
    fn write_to(&self, stream: &mut impl Write) -> Result<()> {
        match self {
            Self::Int(n) => {
                stream.write_byte(ATTR_INT)?;
                stream.write_i64(*n)?;
            }
            Self::Float(n) => {
                stream.write_byte(ATTR_FLOAT)?;
                stream.write_f64(*n)?;
            }
            Self::Text(text) => {
                stream.write_byte(ATTR_TEXT)?;
                stream.write_string(text)?;
            }
            Self::Ints(values) => {
                stream.write_byte(ATTR_INTS)?;
                stream.write_length(values.len())?;
                for n in values {
                    stream.write_i64(*n)?;
                }
            }
        }

        Ok(())
    }

    fn read_from(stream: &mut impl Read) -> Result<Self> {
        let value = match stream.read_byte()? {
            ATTR_INT => Self::Int(stream.read_i64()?),
            ATTR_FLOAT => Self::Float(stream.read_f64()?),
            ATTR_TEXT => Self::Text(stream.read_string()?),
            ATTR_INTS => {
                let length = stream.read_length()?;
                let mut values = Vec::with_capacity(length);
                for _ in 0..length {
                    values.push(stream.read_i64()?);
                }
                Self::Ints(values)
            }
            tag => return Err(Error::Load(format!("unknown attribute type: {tag}"))),
        };

        Ok(value)
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            coordinates: vec![],
            variables: vec![],
            attrs: BTreeMap::new(),
        }
    }

    /// Add a labeled dimension to the dataset.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the dimension, e.g. "time".
    /// * `labels` - A one dimensional array of coordinate labels, one per
    ///   position along the dimension.
    ///
    pub fn add_coordinate<S: Into<String>>(
        &mut self,
        name: S,
        labels: impl Into<ArrayData>,
    ) -> Result<()> {
        let name = name.into();
        let labels = labels.into();

        if self.coordinate(&name).is_some() {
            return Err(Error::BadName(format!("duplicate coordinate: {name}")));
        }
        if labels.ndim() != 1 {
            return Err(Error::BadShape(format!(
                "labels for coordinate {name:?} must be one dimensional"
            )));
        }

        self.coordinates.push(Coordinate { name, labels });

        Ok(())
    }

    /// Add a variable to the dataset.
    ///
    /// Each axis of `data` is checked against the named coordinate's label
    /// count.
    ///
    pub fn add_variable<S: Into<String>>(
        &mut self,
        name: S,
        dims: &[&str],
        data: impl Into<ArrayData>,
    ) -> Result<()> {
        let name = name.into();
        let data = data.into();

        if self.get(&name).is_some() {
            return Err(Error::BadName(format!("duplicate variable: {name}")));
        }
        if data.ndim() != dims.len() {
            return Err(Error::BadShape(format!(
                "variable {name:?} has {} dimensions but {} were named",
                data.ndim(),
                dims.len(),
            )));
        }
        for (dim, length) in dims.iter().zip(data.shape()) {
            let coordinate = self
                .coordinate(dim)
                .ok_or_else(|| Error::BadName(format!("no such coordinate: {dim}")))?;
            if coordinate.labels.len() != *length {
                return Err(Error::BadShape(format!(
                    "variable {name:?} has {length} positions along {dim:?} but the \
                     coordinate has {} labels",
                    coordinate.labels.len(),
                )));
            }
        }

        self.variables.push(Variable {
            name,
            dims: dims.iter().map(|dim| dim.to_string()).collect(),
            data,
        });

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    pub fn coordinate(&self, name: &str) -> Option<&Coordinate> {
        self.coordinates
            .iter()
            .find(|coordinate| coordinate.name == name)
    }

    /// Write this dataset to a stream in the deltaset binary format.
    ///
    pub fn save_to(&self, stream: &mut impl Write) -> Result<()> {
        self.write_to(stream)
    }

    /// Read a dataset from a stream in the deltaset binary format.
    ///
    pub fn load_from(stream: &mut impl Read) -> Result<Self> {
        Self::read_from(stream)
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Dataset {
    fn write_to(&self, stream: &mut impl Write) -> Result<()> {
        stream.write_u16(MAGIC_NUMBER)?;
        stream.write_u32(FORMAT_VERSION)?;

        stream.write_length(self.coordinates.len())?;
        for coordinate in &self.coordinates {
            stream.write_string(&coordinate.name)?;
            coordinate.labels.write_to(stream)?;
        }

        stream.write_length(self.variables.len())?;
        for variable in &self.variables {
            stream.write_string(&variable.name)?;
            stream.write_length(variable.dims.len())?;
            for dim in &variable.dims {
                stream.write_string(dim)?;
            }
            variable.data.write_to(stream)?;
        }

        stream.write_length(self.attrs.len())?;
        for (key, value) in &self.attrs {
            stream.write_string(key)?;
            value.write_to(stream)?;
        }

        Ok(())
    }

    fn read_from(stream: &mut impl Read) -> Result<Self> {
        let magic_number = stream.read_u16()?;
        if magic_number != MAGIC_NUMBER {
            return Err(Error::Load("not a deltaset file".into()));
        }
        let version = stream.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(Error::Load(format!("unrecognized format version: {version}")));
        }

        let n_coordinates = stream.read_length()?;
        let mut coordinates = Vec::with_capacity(n_coordinates);
        for _ in 0..n_coordinates {
            let name = stream.read_string()?;
            let labels = ArrayData::read_from(stream)?;
            coordinates.push(Coordinate { name, labels });
        }

        let n_variables = stream.read_length()?;
        let mut variables = Vec::with_capacity(n_variables);
        for _ in 0..n_variables {
            let name = stream.read_string()?;
            let n_dims = stream.read_length()?;
            let mut dims = Vec::with_capacity(n_dims);
            for _ in 0..n_dims {
                dims.push(stream.read_string()?);
            }
            let data = ArrayData::read_from(stream)?;
            variables.push(Variable { name, dims, data });
        }

        let n_attrs = stream.read_length()?;
        let mut attrs = BTreeMap::new();
        for _ in 0..n_attrs {
            let key = stream.read_string()?;
            let value = AttrValue::read_from(stream)?;
            attrs.insert(key, value);
        }

        Ok(Self {
            coordinates,
            variables,
            attrs,
        })
    }
}
