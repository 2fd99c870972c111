//! Extra dimensions, appended to each point record after the standard fields.
//!
//! Each extra dimension is described by a 192-byte entry in the extra bytes vlr:
//!
//! | Field | Bytes |
//! | ----- | ----- |
//! | reserved | 2 |
//! | data type | 1 |
//! | options | 1 |
//! | name | 32 |
//! | unused | 4 |
//! | no data | 24 |
//! | min | 24 |
//! | max | 24 |
//! | scale | 24 |
//! | offset | 24 |
//! | description | 32 |

use crate::{Error, Field, PointTable, Result, utils::las_string};
use byteorder::{LittleEndian, WriteBytesExt};
use num_traits::cast;
use std::{fmt, io::Write};

/// The size of one extra bytes vlr entry.
pub const DESCRIPTOR_LEN: usize = 192;

/// The storage type of an extra dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DataType {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    Int64,
    Float,
    Double,
}

impl DataType {
    /// Parses a type name.
    ///
    /// Accepts sized names (`uint8`, `int32`, `double`, ...) and the las names (`uchar`,
    /// `long`, `ulonglong`, ...).
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::extra_dims::DataType;
    /// assert_eq!(Some(DataType::Int32), DataType::from_name("long"));
    /// assert_eq!(Some(DataType::Int32), DataType::from_name("int32"));
    /// assert_eq!(None, DataType::from_name("int128"));
    /// ```
    pub fn from_name(name: &str) -> Option<DataType> {
        let data_type = match name.to_ascii_lowercase().as_str() {
            "uint8" | "uint8_t" | "uchar" | "unsigned char" => DataType::Uint8,
            "int8" | "int8_t" | "char" => DataType::Int8,
            "uint16" | "uint16_t" | "ushort" | "unsigned short" => DataType::Uint16,
            "int16" | "int16_t" | "short" => DataType::Int16,
            "uint32" | "uint32_t" | "ulong" | "unsigned long" => DataType::Uint32,
            "int32" | "int32_t" | "long" => DataType::Int32,
            "uint64" | "uint64_t" | "ulonglong" | "unsigned long long" => DataType::Uint64,
            "int64" | "int64_t" | "longlong" | "long long" => DataType::Int64,
            "float" | "float32" => DataType::Float,
            "double" | "float64" => DataType::Double,
            _ => return None,
        };
        Some(data_type)
    }

    /// The number of bytes a value takes in a point record.
    pub fn size(&self) -> usize {
        match self {
            DataType::Uint8 | DataType::Int8 => 1,
            DataType::Uint16 | DataType::Int16 => 2,
            DataType::Uint32 | DataType::Int32 | DataType::Float => 4,
            DataType::Uint64 | DataType::Int64 | DataType::Double => 8,
        }
    }

    /// The code for this type in the extra bytes vlr.
    pub fn las_code(&self) -> u8 {
        match self {
            DataType::Uint8 => 1,
            DataType::Int8 => 2,
            DataType::Uint16 => 3,
            DataType::Int16 => 4,
            DataType::Uint32 => 5,
            DataType::Int32 => 6,
            DataType::Uint64 => 7,
            DataType::Int64 => 8,
            DataType::Float => 9,
            DataType::Double => 10,
        }
    }

    /// Writes a value with this type's width, failing if it doesn't fit.
    pub(crate) fn write_value<W: Write>(&self, mut write: W, name: &str, value: f64) -> Result<()> {
        match self {
            DataType::Uint8 => write.write_u8(narrow(name, value)?)?,
            DataType::Int8 => write.write_i8(narrow(name, value)?)?,
            DataType::Uint16 => write.write_u16::<LittleEndian>(narrow(name, value)?)?,
            DataType::Int16 => write.write_i16::<LittleEndian>(narrow(name, value)?)?,
            DataType::Uint32 => write.write_u32::<LittleEndian>(narrow(name, value)?)?,
            DataType::Int32 => write.write_i32::<LittleEndian>(narrow(name, value)?)?,
            DataType::Uint64 => write.write_u64::<LittleEndian>(narrow(name, value)?)?,
            DataType::Int64 => write.write_i64::<LittleEndian>(narrow(name, value)?)?,
            DataType::Float => write.write_f32::<LittleEndian>(value as f32)?,
            DataType::Double => write.write_f64::<LittleEndian>(value)?,
        }
        Ok(())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Uint8 => "uint8",
            DataType::Int8 => "int8",
            DataType::Uint16 => "uint16",
            DataType::Int16 => "int16",
            DataType::Uint32 => "uint32",
            DataType::Int32 => "int32",
            DataType::Uint64 => "uint64",
            DataType::Int64 => "int64",
            DataType::Float => "float",
            DataType::Double => "double",
        };
        f.write_str(name)
    }
}

/// Converts a field value to the integer type of its slot.
pub(crate) fn narrow<T: num_traits::NumCast>(name: &str, value: f64) -> Result<T> {
    cast(value).ok_or_else(|| Error::FieldOutOfRange {
        field: name.to_string(),
        value,
    })
}

/// An extra dimension: a name, a type, and once prepared, the table field it reads from.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraDim {
    name: String,
    data_type: DataType,
    field: Option<Field>,
}

impl ExtraDim {
    /// Creates a new, unresolved extra dimension.
    pub fn new<S: Into<String>>(name: S, data_type: DataType) -> ExtraDim {
        ExtraDim {
            name: name.into(),
            data_type,
            field: None,
        }
    }

    /// Parses a comma-separated list of `name=type` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::extra_dims::{DataType, ExtraDim};
    /// let dims = ExtraDim::parse_list("Amplitude=uint16, Deviation = float").unwrap();
    /// assert_eq!("Deviation", dims[1].name());
    /// assert_eq!(DataType::Float, dims[1].data_type());
    /// assert!(ExtraDim::parse_list("Amplitude").is_err());
    /// ```
    pub fn parse_list(s: &str) -> Result<Vec<ExtraDim>> {
        s.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ExtraDim::parse)
            .collect()
    }

    fn parse(entry: &str) -> Result<ExtraDim> {
        let (name, data_type) = entry
            .split_once('=')
            .map(|(name, data_type)| (name.trim(), data_type.trim()))
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| Error::InvalidExtraDim(entry.to_string()))?;
        let data_type =
            DataType::from_name(data_type).ok_or_else(|| Error::UnknownExtraDimType {
                name: name.to_string(),
                data_type: data_type.to_string(),
            })?;
        Ok(ExtraDim::new(name, data_type))
    }

    /// The dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// The table field, once resolved.
    pub fn field(&self) -> Option<Field> {
        self.field
    }

    /// Finds this dimension's field in a table.
    pub fn resolve<T: PointTable + ?Sized>(&mut self, table: &T) -> Result<()> {
        let field = table
            .find_field(&self.name)
            .ok_or_else(|| Error::DimensionNotFound(self.name.clone()))?;
        self.field = Some(field);
        Ok(())
    }

    /// Writes this dimension's entry of the extra bytes vlr.
    pub fn write_descriptor<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&[0; 2])?;
        write.write_u8(self.data_type.las_code())?;
        // no_data, min, max, scale and offset are all unset
        write.write_u8(0)?;
        write.write_all(&las_string::<32>(&self.name))?;
        write.write_all(&[0; 4])?;
        write.write_all(&[0; 24 * 5])?;
        write.write_all(&las_string::<32>(""))?;
        Ok(())
    }
}

/// Returns the payload of the extra bytes vlr for these dimensions.
pub fn extra_bytes_payload(dims: &[ExtraDim]) -> Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(dims.len() * DESCRIPTOR_LEN);
    for dim in dims {
        dim.write_descriptor(&mut payload)?;
    }
    Ok(payload)
}

/// The total number of bytes the dimensions add to each point record.
pub fn extra_len(dims: &[ExtraDim]) -> usize {
    dims.iter().map(|dim| dim.data_type.size()).sum()
}
