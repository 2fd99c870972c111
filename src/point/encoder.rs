use crate::{
    Error, Field, Header, PointTable, Result, Summary, Transform, Vector,
    extra_dims::{self, ExtraDim, narrow},
    point::Format,
};
use byteorder::{LittleEndian, WriteBytesExt};
use log::warn;

/// Counts of points with suspicious return information.
///
/// The first point of each kind is logged, the rest are only counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReturnWarnings {
    /// Points whose return number is zero or larger than the format allows.
    pub invalid_return_number: u64,
    /// Points that claim to have zero returns.
    pub zero_number_of_returns: u64,
    /// Points with more returns than the format allows.
    pub too_many_returns: u64,
    /// Points that weren't written because their return number is too high.
    pub discarded: u64,
}

impl ReturnWarnings {
    /// Returns true if no warnings were raised.
    pub fn is_empty(&self) -> bool {
        *self == ReturnWarnings::default()
    }
}

/// Packs points from a table into fixed-width point records.
#[derive(Debug)]
pub struct PointEncoder {
    format: Format,
    point_len: usize,
    max_return_count: u8,
    transforms: Vector<Transform>,
    extra_dims: Vec<(Field, ExtraDim)>,
    discard_high_return_numbers: bool,
    warnings: ReturnWarnings,
}

impl PointEncoder {
    /// Creates an encoder for the header's point format and record length.
    ///
    /// Every extra dimension must already be resolved against the table.
    pub fn new(
        header: &Header,
        extra_dims: &[ExtraDim],
        discard_high_return_numbers: bool,
    ) -> Result<PointEncoder> {
        let extra_dims = extra_dims
            .iter()
            .map(|dim| {
                dim.field()
                    .map(|field| (field, dim.clone()))
                    .ok_or_else(|| Error::DimensionNotFound(dim.name().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let dims: Vec<ExtraDim> = extra_dims.iter().map(|(_, dim)| dim.clone()).collect();
        let len = usize::from(header.base_point_len()) + extra_dims::extra_len(&dims);
        if len != usize::from(header.point_len()) {
            return Err(Error::PointRecordLength {
                expected: header.point_len(),
                actual: len as u64,
            });
        }
        Ok(PointEncoder {
            format: header.point_format(),
            point_len: len,
            max_return_count: header.max_return_count(),
            transforms: *header.transforms(),
            extra_dims,
            discard_high_return_numbers,
            warnings: ReturnWarnings::default(),
        })
    }

    /// Replaces the transforms, e.g. after computing automatic offsets.
    pub fn set_transforms(&mut self, transforms: Vector<Transform>) {
        self.transforms = transforms;
    }

    /// The transforms used to quantize coordinates.
    pub fn transforms(&self) -> &Vector<Transform> {
        &self.transforms
    }

    /// The length of each encoded record.
    pub fn point_len(&self) -> usize {
        self.point_len
    }

    /// The warnings raised so far.
    pub fn warnings(&self) -> ReturnWarnings {
        self.warnings
    }

    /// Encodes up to `count` points starting at `start`, appending the records to `out`.
    ///
    /// Returns the index of the first point not yet looked at. Discarded points are consumed
    /// but produce no record, so `out` may hold fewer than `count` records.
    pub fn fill<T: PointTable + ?Sized>(
        &mut self,
        table: &T,
        start: usize,
        count: usize,
        out: &mut Vec<u8>,
        summary: &mut Summary,
    ) -> Result<usize> {
        let end = start.saturating_add(count).min(table.len());
        for index in start..end {
            let _ = self.encode(table, index, out, summary)?;
        }
        Ok(end)
    }

    /// Encodes one point, appending its record to `out` and adding it to the summary.
    ///
    /// Returns false if the point was discarded.
    pub fn encode<T: PointTable + ?Sized>(
        &mut self,
        table: &T,
        index: usize,
        out: &mut Vec<u8>,
        summary: &mut Summary,
    ) -> Result<bool> {
        let max = self.max_return_count;
        let return_number: u8 = field_or(table, Field::ReturnNumber, index, 1)?;
        if table.has_field(Field::ReturnNumber) && (return_number < 1 || return_number > max) {
            self.warnings.invalid_return_number += 1;
            if self.warnings.invalid_return_number == 1 {
                warn!("invalid return number {return_number} for {}", self.format);
            }
        }
        let mut number_of_returns: u8 = field_or(table, Field::NumberOfReturns, index, 1)?;
        if number_of_returns == 0 {
            self.warnings.zero_number_of_returns += 1;
            if self.warnings.zero_number_of_returns == 1 {
                warn!("point {index} has a number of returns of zero");
            }
        }
        if number_of_returns > max {
            if self.discard_high_return_numbers {
                if return_number > max {
                    self.warnings.discarded += 1;
                    return Ok(false);
                }
                number_of_returns = max;
            } else {
                self.warnings.too_many_returns += 1;
                if self.warnings.too_many_returns == 1 {
                    warn!(
                        "number of returns {number_of_returns} is larger than {max}, the maximum for {}",
                        self.format
                    );
                }
            }
        }

        let start = out.len();
        let x = value_or(table, Field::X, index, 0.);
        let y = value_or(table, Field::Y, index, 0.);
        let z = value_or(table, Field::Z, index, 0.);
        out.write_i32::<LittleEndian>(self.transforms.x.inverse(x)?)?;
        out.write_i32::<LittleEndian>(self.transforms.y.inverse(y)?)?;
        out.write_i32::<LittleEndian>(self.transforms.z.inverse(z)?)?;
        out.write_u16::<LittleEndian>(field_or(table, Field::Intensity, index, 0)?)?;

        let scan_direction: u8 = field_or(table, Field::ScanDirectionFlag, index, 0)?;
        let edge_of_flight_line: u8 = field_or(table, Field::EdgeOfFlightLine, index, 0)?;
        let flags = (return_number & 0b111)
            | (number_of_returns & 0b111) << 3
            | (scan_direction & 1) << 6
            | (edge_of_flight_line & 1) << 7;
        out.write_u8(flags)?;

        out.write_u8(field_or(table, Field::Classification, index, 0)?)?;
        out.write_i8(field_or(table, Field::ScanAngleRank, index, 0)?)?;
        out.write_u8(field_or(table, Field::UserData, index, 0)?)?;
        out.write_u16::<LittleEndian>(field_or(table, Field::PointSourceId, index, 0)?)?;
        if self.format.has_gps_time() {
            out.write_f64::<LittleEndian>(value_or(table, Field::GpsTime, index, 0.))?;
        }
        if self.format.has_color() {
            for field in [Field::Red, Field::Green, Field::Blue] {
                out.write_u16::<LittleEndian>(field_or(table, field, index, 0)?)?;
            }
        }
        for (field, dim) in &self.extra_dims {
            let value = value_or(table, *field, index, 0.);
            dim.data_type().write_value(&mut *out, dim.name(), value)?;
        }

        let written = out.len() - start;
        if written != self.point_len {
            out.truncate(start);
            return Err(Error::PointRecordLength {
                expected: self.point_len as u16,
                actual: written as u64,
            });
        }
        summary.add_point(x, y, z, return_number);
        Ok(true)
    }
}

fn value_or<T: PointTable + ?Sized>(table: &T, field: Field, index: usize, default: f64) -> f64 {
    if table.has_field(field) {
        table.value(field, index)
    } else {
        default
    }
}

fn field_or<T: PointTable + ?Sized, N: num_traits::NumCast>(
    table: &T,
    field: Field,
    index: usize,
    default: N,
) -> Result<N> {
    if table.has_field(field) {
        narrow(field.name().unwrap_or("extra"), table.value(field, index))
    } else {
        Ok(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PointBuffer, extra_dims::DataType};
    use byteorder::ReadBytesExt;
    use std::io::Cursor;

    fn header(format: u8, extra_len: usize) -> Header {
        let mut header = Header::default();
        header.set_point_format(format).unwrap();
        header
            .set_point_len(usize::from(header.base_point_len()) + extra_len)
            .unwrap();
        header
    }

    fn encode_one(encoder: &mut PointEncoder, buffer: &PointBuffer) -> (Vec<u8>, Summary) {
        let mut out = Vec::new();
        let mut summary = Summary::default();
        let _ = encoder
            .fill(buffer, 0, buffer.len(), &mut out, &mut summary)
            .unwrap();
        (out, summary)
    }

    #[test]
    fn quantizes_in_f64() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::X, 1.005), (Field::Y, 2.004), (Field::Z, 3.006)]);
        let mut encoder = PointEncoder::new(&header(3, 0), &[], false).unwrap();
        let (out, _) = encode_one(&mut encoder, &buffer);
        let mut cursor = Cursor::new(out);
        let x = cursor.read_i32::<LittleEndian>().unwrap();
        assert_eq!((1.005f64 / 0.01).round() as i32, x);
        assert_eq!(100, x);
        assert_eq!(200, cursor.read_i32::<LittleEndian>().unwrap());
        assert_eq!(301, cursor.read_i32::<LittleEndian>().unwrap());
    }

    #[test]
    fn exact_half_rounds_away_from_zero() {
        let mut h = header(0, 0);
        h.set_scale(0.25, 0.25, 0.25).unwrap();
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::X, 0.125), (Field::Y, -0.125), (Field::Z, 0.)]);
        let mut encoder = PointEncoder::new(&h, &[], false).unwrap();
        let (out, _) = encode_one(&mut encoder, &buffer);
        let mut cursor = Cursor::new(out);
        assert_eq!(1, cursor.read_i32::<LittleEndian>().unwrap());
        assert_eq!(-1, cursor.read_i32::<LittleEndian>().unwrap());
    }

    #[test]
    fn record_lengths() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::X, 1.), (Field::Red, 12.)]);
        for (format, len) in [(0, 20), (1, 28), (2, 26), (3, 34)] {
            let mut encoder = PointEncoder::new(&header(format, 0), &[], false).unwrap();
            let (out, _) = encode_one(&mut encoder, &buffer);
            assert_eq!(len, out.len());
        }
    }

    #[test]
    fn layout() {
        let mut buffer = PointBuffer::new();
        buffer.push([
            (Field::X, 0.01),
            (Field::Intensity, 513.),
            (Field::ReturnNumber, 2.),
            (Field::NumberOfReturns, 3.),
            (Field::ScanDirectionFlag, 1.),
            (Field::EdgeOfFlightLine, 1.),
            (Field::Classification, 2.),
            (Field::ScanAngleRank, -5.),
            (Field::UserData, 7.),
            (Field::PointSourceId, 258.),
            (Field::GpsTime, 42.5),
            (Field::Red, 1.),
            (Field::Green, 2.),
            (Field::Blue, 3.),
        ]);
        let mut encoder = PointEncoder::new(&header(3, 0), &[], false).unwrap();
        let (out, _) = encode_one(&mut encoder, &buffer);
        let mut cursor = Cursor::new(out);
        assert_eq!(1, cursor.read_i32::<LittleEndian>().unwrap());
        assert_eq!(0, cursor.read_i32::<LittleEndian>().unwrap());
        assert_eq!(0, cursor.read_i32::<LittleEndian>().unwrap());
        assert_eq!(513, cursor.read_u16::<LittleEndian>().unwrap());
        assert_eq!(0b1101_1010, cursor.read_u8().unwrap());
        assert_eq!(2, cursor.read_u8().unwrap());
        assert_eq!(-5, cursor.read_i8().unwrap());
        assert_eq!(7, cursor.read_u8().unwrap());
        assert_eq!(258, cursor.read_u16::<LittleEndian>().unwrap());
        assert_eq!(42.5, cursor.read_f64::<LittleEndian>().unwrap());
        assert_eq!(1, cursor.read_u16::<LittleEndian>().unwrap());
        assert_eq!(2, cursor.read_u16::<LittleEndian>().unwrap());
        assert_eq!(3, cursor.read_u16::<LittleEndian>().unwrap());
    }

    #[test]
    fn defaults_returns_to_one() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::X, 0.)]);
        let mut encoder = PointEncoder::new(&header(0, 0), &[], false).unwrap();
        let (out, summary) = encode_one(&mut encoder, &buffer);
        assert_eq!(0b0000_1001, out[14]);
        assert_eq!(1, summary.points_by_return()[0]);
        assert!(encoder.warnings().is_empty());
    }

    #[test]
    fn extra_dims() {
        let mut buffer = PointBuffer::new();
        let amplitude = buffer.add_field("Amplitude");
        buffer.push([(Field::X, 0.), (amplitude, 1000.)]);
        let mut dim = ExtraDim::new("Amplitude", DataType::Uint16);
        dim.resolve(&buffer).unwrap();
        let mut encoder = PointEncoder::new(&header(0, 2), &[dim], false).unwrap();
        let (out, _) = encode_one(&mut encoder, &buffer);
        assert_eq!(22, out.len());
        assert_eq!(1000u16.to_le_bytes(), out[20..22]);
    }

    #[test]
    fn unresolved_extra_dim() {
        let dim = ExtraDim::new("Amplitude", DataType::Uint16);
        assert!(PointEncoder::new(&header(0, 2), &[dim], false).is_err());
    }

    #[test]
    fn mismatched_point_len() {
        assert!(matches!(
            PointEncoder::new(&header(0, 4), &[], false),
            Err(Error::PointRecordLength { .. })
        ));
    }

    #[test]
    fn warnings() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::ReturnNumber, 0.), (Field::NumberOfReturns, 0.)]);
        buffer.push([(Field::ReturnNumber, 1.), (Field::NumberOfReturns, 7.)]);
        buffer.push([(Field::ReturnNumber, 6.), (Field::NumberOfReturns, 7.)]);
        let mut encoder = PointEncoder::new(&header(0, 0), &[], false).unwrap();
        let (out, summary) = encode_one(&mut encoder, &buffer);
        assert_eq!(60, out.len());
        assert_eq!(3, summary.count());
        let warnings = encoder.warnings();
        assert_eq!(2, warnings.invalid_return_number);
        assert_eq!(1, warnings.zero_number_of_returns);
        assert_eq!(2, warnings.too_many_returns);
        assert_eq!(0, warnings.discarded);
    }

    #[test]
    fn discard() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::ReturnNumber, 1.), (Field::NumberOfReturns, 7.)]);
        buffer.push([(Field::ReturnNumber, 6.), (Field::NumberOfReturns, 7.)]);
        let mut encoder = PointEncoder::new(&header(0, 0), &[], true).unwrap();
        let (out, summary) = encode_one(&mut encoder, &buffer);
        assert_eq!(20, out.len());
        assert_eq!(1, summary.count());
        // clamped to five returns
        assert_eq!(1 | 5 << 3, out[14]);
        assert_eq!(1, encoder.warnings().discarded);
        assert_eq!(0, encoder.warnings().too_many_returns);
    }

    #[test]
    fn out_of_range() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::Intensity, 70000.)]);
        let mut encoder = PointEncoder::new(&header(0, 0), &[], false).unwrap();
        let mut out = Vec::new();
        let mut summary = Summary::default();
        assert!(matches!(
            encoder.encode(&buffer, 0, &mut out, &mut summary),
            Err(Error::FieldOutOfRange { .. })
        ));
        assert_eq!(0, summary.count());
    }

    #[test]
    fn coordinate_overflow() {
        let mut buffer = PointBuffer::new();
        buffer.push([(Field::X, 1e12)]);
        let mut encoder = PointEncoder::new(&header(0, 0), &[], false).unwrap();
        let mut out = Vec::new();
        let mut summary = Summary::default();
        assert!(matches!(
            encoder.encode(&buffer, 0, &mut out, &mut summary),
            Err(Error::InverseTransform { .. })
        ));
    }

    #[test]
    fn fill_respects_count() {
        let mut buffer = PointBuffer::new();
        for i in 0..5 {
            buffer.push([(Field::X, f64::from(i))]);
        }
        let mut encoder = PointEncoder::new(&header(0, 0), &[], false).unwrap();
        let mut out = Vec::new();
        let mut summary = Summary::default();
        assert_eq!(2, encoder.fill(&buffer, 0, 2, &mut out, &mut summary).unwrap());
        assert_eq!(40, out.len());
        assert_eq!(5, encoder.fill(&buffer, 2, 10, &mut out, &mut summary).unwrap());
        assert_eq!(100, out.len());
    }
}
