//! Tables of points to be written.
//!
//! The writer never sees points as structs. It asks a [PointTable] for one field of one point
//! at a time, as an `f64`, and narrows the value to the width the point record needs.

use crate::SpatialReference;

/// One column of a point table.
///
/// The standard las fields have their own variants. Anything else the table carries is an
/// [Field::Extra], numbered by the table itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Field {
    X,
    Y,
    Z,
    Intensity,
    ReturnNumber,
    NumberOfReturns,
    ScanDirectionFlag,
    EdgeOfFlightLine,
    Classification,
    ScanAngleRank,
    UserData,
    PointSourceId,
    GpsTime,
    Red,
    Green,
    Blue,
    /// A non-standard field, identified by the table's own index.
    Extra(usize),
}

const STANDARD: [(Field, &str); 16] = [
    (Field::X, "X"),
    (Field::Y, "Y"),
    (Field::Z, "Z"),
    (Field::Intensity, "Intensity"),
    (Field::ReturnNumber, "ReturnNumber"),
    (Field::NumberOfReturns, "NumberOfReturns"),
    (Field::ScanDirectionFlag, "ScanDirectionFlag"),
    (Field::EdgeOfFlightLine, "EdgeOfFlightLine"),
    (Field::Classification, "Classification"),
    (Field::ScanAngleRank, "ScanAngleRank"),
    (Field::UserData, "UserData"),
    (Field::PointSourceId, "PointSourceId"),
    (Field::GpsTime, "GpsTime"),
    (Field::Red, "Red"),
    (Field::Green, "Green"),
    (Field::Blue, "Blue"),
];

impl Field {
    /// Returns the standard field with this name, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Field;
    /// assert_eq!(Some(Field::GpsTime), Field::standard("gpstime"));
    /// assert_eq!(None, Field::standard("Amplitude"));
    /// ```
    pub fn standard(name: &str) -> Option<Field> {
        STANDARD
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(field, _)| *field)
    }

    /// Returns the name of a standard field, or `None` for an extra field.
    pub fn name(&self) -> Option<&'static str> {
        STANDARD
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, name)| *name)
    }
}

/// A source of points for the writer.
pub trait PointTable {
    /// The number of points.
    fn len(&self) -> usize;

    /// Returns true if there are no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a field by name.
    fn find_field(&self, name: &str) -> Option<Field>;

    /// Does this table carry a value for the field?
    fn has_field(&self, field: Field) -> bool;

    /// Returns the value of the field for the point at `index`.
    ///
    /// Only called for fields where [PointTable::has_field] is true and indices below
    /// [PointTable::len].
    fn value(&self, field: Field, index: usize) -> f64;

    /// The spatial reference of the points, used when the writer isn't given one.
    fn spatial_reference(&self) -> Option<SpatialReference> {
        None
    }
}

#[derive(Clone, Debug)]
struct Column {
    field: Field,
    name: String,
    values: Vec<f64>,
}

/// A simple in-memory, column-oriented [PointTable].
///
/// # Examples
///
/// ```
/// use las_writer::{Field, PointBuffer, PointTable};
/// let mut buffer = PointBuffer::new();
/// let amplitude = buffer.add_field("Amplitude");
/// buffer.push([(Field::X, 1.), (Field::Y, 2.), (Field::Z, 3.), (amplitude, 42.)]);
/// assert_eq!(1, buffer.len());
/// assert_eq!(42., buffer.value(amplitude, 0));
/// assert!(!buffer.has_field(Field::Intensity));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PointBuffer {
    len: usize,
    columns: Vec<Column>,
    extra_count: usize,
    spatial_reference: Option<SpatialReference>,
}

impl PointBuffer {
    /// Creates an empty buffer.
    pub fn new() -> PointBuffer {
        PointBuffer::default()
    }

    /// Sets the spatial reference reported by this table.
    pub fn with_spatial_reference(mut self, spatial_reference: SpatialReference) -> PointBuffer {
        self.spatial_reference = Some(spatial_reference);
        self
    }

    /// Adds a column, returning its field.
    ///
    /// Standard names map to the standard fields. Existing points get zero for a new column.
    pub fn add_field(&mut self, name: &str) -> Field {
        if let Some(column) = self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            return column.field;
        }
        let field = match Field::standard(name) {
            Some(field) => field,
            None => {
                self.extra_count += 1;
                Field::Extra(self.extra_count - 1)
            }
        };
        self.columns.push(Column {
            field,
            name: name.to_string(),
            values: vec![0.; self.len],
        });
        field
    }

    /// Appends a point.
    ///
    /// Standard fields that don't have a column yet get one. Columns without a value for this
    /// point get zero. Extra fields must come from [PointBuffer::add_field]; others are
    /// ignored.
    pub fn push<I: IntoIterator<Item = (Field, f64)>>(&mut self, values: I) {
        for column in &mut self.columns {
            column.values.push(0.);
        }
        self.len += 1;
        for (field, value) in values {
            if self.column(field).is_none() {
                match field.name() {
                    Some(name) => {
                        let _ = self.add_field(name);
                    }
                    None => continue,
                }
            }
            if let Some(column) = self.columns.iter_mut().find(|c| c.field == field) {
                column.values[self.len - 1] = value;
            }
        }
    }

    fn column(&self, field: Field) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }
}

impl PointTable for PointBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn find_field(&self, name: &str) -> Option<Field> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.field)
    }

    fn has_field(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    fn value(&self, field: Field, index: usize) -> f64 {
        self.column(field)
            .and_then(|c| c.values.get(index))
            .copied()
            .unwrap_or(0.)
    }

    fn spatial_reference(&self) -> Option<SpatialReference> {
        self.spatial_reference.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_names() {
        assert_eq!(Some(Field::X), Field::standard("x"));
        assert_eq!(Some("NumberOfReturns"), Field::NumberOfReturns.name());
        assert_eq!(None, Field::Extra(0).name());
    }

    #[test]
    fn late_columns_backfill_zero() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::X, 1.)]);
        buffer.push([(Field::X, 2.), (Field::Intensity, 7.)]);
        assert!(buffer.has_field(Field::Intensity));
        assert_eq!(0., buffer.value(Field::Intensity, 0));
        assert_eq!(7., buffer.value(Field::Intensity, 1));
    }

    #[test]
    fn find_field() {
        let mut buffer = PointBuffer::new();
        let a = buffer.add_field("Amplitude");
        let b = buffer.add_field("Reflectance");
        assert_eq!(Field::Extra(0), a);
        assert_eq!(Field::Extra(1), b);
        assert_eq!(Some(a), buffer.find_field("amplitude"));
        assert_eq!(a, buffer.add_field("Amplitude"));
        assert_eq!(None, buffer.find_field("Z"));
        let _ = buffer.add_field("Z");
        assert_eq!(Some(Field::Z), buffer.find_field("Z"));
    }

    #[test]
    fn unknown_extra_ignored() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::Extra(3), 1.)]);
        assert!(!buffer.has_field(Field::Extra(3)));
    }
}
