//! The las public header block.
//!
//! A [Header] is filled from the writer options before any point is written, serialized once
//! as a placeholder, and serialized again over the top of the placeholder after the last point,
//! when the point count and bounds are known.

use crate::{
    Bounds, Error, Result, Summary, Transform, Vector, Version,
    feature::{Evlrs, FileSourceId, LargeFiles, Waveforms},
    point::Format,
    utils::las_string,
};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use uuid::Uuid;

const FILE_SIGNATURE: &[u8; 4] = b"LASF";

/// In-memory las header, serialized exactly as the version requires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
    version: Version,
    point_format: Format,
    is_compressed: bool,
    point_len: u16,
    point_count: u64,
    bounds: Option<Bounds>,
    points_by_return: [u64; 15],
    transforms: Vector<Transform>,
    vlr_count: u32,
    evlr_count: u32,
    vlr_offset: u16,
    point_offset: u32,
    evlr_offset: u64,
    creation_year: u16,
    creation_doy: u16,
    system_id: [u8; 32],
    software_id: [u8; 32],
    project_id: Uuid,
    global_encoding: u16,
    file_source_id: u16,
}

impl Header {
    /// Sets the scale of each axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Header;
    /// let mut header = Header::default();
    /// header.set_scale(0.001, 0.001, 0.01).unwrap();
    /// assert!(header.set_scale(0., 1., 1.).is_err());
    /// ```
    pub fn set_scale(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        let transforms = Vector {
            x: Transform::new(x, self.transforms.x.offset)?,
            y: Transform::new(y, self.transforms.y.offset)?,
            z: Transform::new(z, self.transforms.z.offset)?,
        };
        self.transforms = transforms;
        Ok(())
    }

    /// Sets the offset of each axis.
    pub fn set_offset(&mut self, x: f64, y: f64, z: f64) {
        self.transforms.x.offset = x;
        self.transforms.y.offset = y;
        self.transforms.z.offset = z;
    }

    /// Sets the point format, failing if the code has no defined layout.
    ///
    /// Formats that are defined but can't be written are accepted here; check
    /// [Header::point_format_supported].
    pub fn set_point_format(&mut self, n: u8) -> Result<()> {
        self.point_format = Format::new(n)?;
        Ok(())
    }

    /// Sets the point record length, base length plus extra bytes.
    pub fn set_point_len(&mut self, len: usize) -> Result<()> {
        self.point_len = u16::try_from(len).map_err(|_| Error::PointRecordTooLong(len))?;
        Ok(())
    }

    /// Sets the minor version, keeping the major version at 1.
    pub fn set_version_minor(&mut self, minor: u8) -> Result<()> {
        let version = Version::new(1, minor);
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion(version));
        }
        self.version = version;
        self.vlr_offset = version.header_size();
        Ok(())
    }

    /// Sets the year of file creation.
    pub fn set_creation_year(&mut self, year: u16) {
        self.creation_year = year;
    }

    /// Sets the day of year of file creation, January 1 being day 1.
    pub fn set_creation_doy(&mut self, doy: u16) {
        self.creation_doy = doy;
    }

    /// Sets the system identifier, truncated to 32 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Header;
    /// let mut header = Header::default();
    /// header.set_system_id(&"x".repeat(40));
    /// assert_eq!(32, header.system_id().len());
    /// ```
    pub fn set_system_id(&mut self, system_id: &str) {
        self.system_id = las_string(system_id);
    }

    /// Sets the generating software, truncated to 32 bytes.
    pub fn set_software_id(&mut self, software_id: &str) {
        self.software_id = las_string(software_id);
    }

    /// Sets the project id.
    pub fn set_project_id(&mut self, project_id: Uuid) {
        self.project_id = project_id;
    }

    /// Sets the global encoding bit field.
    pub fn set_global_encoding(&mut self, global_encoding: u16) {
        self.global_encoding = global_encoding;
    }

    /// Sets the file source id.
    pub fn set_file_source_id(&mut self, file_source_id: u16) {
        self.file_source_id = file_source_id;
    }

    /// Sets whether the point data are laszip compressed.
    pub fn set_compressed(&mut self, is_compressed: bool) {
        self.is_compressed = is_compressed;
    }

    /// Sets the number of variable length records.
    pub fn set_vlr_count(&mut self, count: usize) -> Result<()> {
        self.vlr_count = u32::try_from(count).map_err(|_| Error::OffsetTooLarge(count as u64))?;
        Ok(())
    }

    /// Sets the number of extended variable length records.
    pub fn set_evlr_count(&mut self, count: usize) -> Result<()> {
        self.evlr_count = u32::try_from(count).map_err(|_| Error::OffsetTooLarge(count as u64))?;
        Ok(())
    }

    /// Sets the offset to the first vlr, which is also the size of the header.
    pub fn set_vlr_offset(&mut self, offset: u64) -> Result<()> {
        self.vlr_offset = u16::try_from(offset).map_err(|_| Error::OffsetTooLarge(offset))?;
        Ok(())
    }

    /// Sets the offset to the first point record.
    pub fn set_point_offset(&mut self, offset: u64) -> Result<()> {
        self.point_offset = u32::try_from(offset).map_err(|_| Error::OffsetTooLarge(offset))?;
        Ok(())
    }

    /// Sets the offset to the first extended variable length record.
    pub fn set_evlr_offset(&mut self, offset: u64) {
        self.evlr_offset = offset;
    }

    /// Copies the bounds and per-return counts out of a summary.
    pub fn set_summary(&mut self, summary: &Summary) {
        self.bounds = summary.bounds();
        self.points_by_return = *summary.points_by_return();
    }

    /// Sets the number of points.
    pub fn set_point_count(&mut self, count: u64) {
        self.point_count = count;
    }

    /// Returns this header's version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the point format.
    pub fn point_format(&self) -> Format {
        self.point_format
    }

    /// Are the point data compressed?
    pub fn is_compressed(&self) -> bool {
        self.is_compressed
    }

    /// Returns the point record length.
    pub fn point_len(&self) -> u16 {
        self.point_len
    }

    /// Returns the length of a point record without any extra bytes.
    pub fn base_point_len(&self) -> u16 {
        self.point_format.base_len()
    }

    /// Returns the number of points.
    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    /// Returns the scale and offset of each axis.
    pub fn transforms(&self) -> &Vector<Transform> {
        &self.transforms
    }

    /// Returns the number of vlrs.
    pub fn vlr_count(&self) -> u32 {
        self.vlr_count
    }

    /// Returns the number of evlrs.
    pub fn evlr_count(&self) -> u32 {
        self.evlr_count
    }

    /// Returns the offset to the first point record.
    pub fn point_offset(&self) -> u32 {
        self.point_offset
    }

    /// Returns the system identifier field.
    pub fn system_id(&self) -> &[u8; 32] {
        &self.system_id
    }

    /// Returns the generating software field.
    pub fn software_id(&self) -> &[u8; 32] {
        &self.software_id
    }

    /// Does the point format carry color?
    pub fn has_color(&self) -> bool {
        self.point_format.has_color()
    }

    /// Does the point format carry gps time?
    pub fn has_time(&self) -> bool {
        self.point_format.has_gps_time()
    }

    /// The largest return number for the point format.
    pub fn max_return_count(&self) -> u8 {
        self.point_format.max_return_count()
    }

    /// Can points in this header's format be written?
    pub fn point_format_supported(&self) -> bool {
        self.point_format.is_supported()
    }

    /// Writes this header.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use las_writer::Header;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Header::default().write_to(&mut cursor).unwrap();
    /// assert_eq!(227, cursor.into_inner().len());
    /// ```
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        let (legacy_point_count, legacy_points_by_return) = self.legacy_counts()?;
        let (file_source_id, global_encoding) = if self.version.supports::<FileSourceId>() {
            (self.file_source_id, self.global_encoding)
        } else {
            (0, 0)
        };

        write.write_all(FILE_SIGNATURE)?;
        write.write_u16::<LittleEndian>(file_source_id)?;
        write.write_u16::<LittleEndian>(global_encoding)?;
        write.write_all(&self.project_id.to_bytes_le())?;
        write.write_u8(self.version.major)?;
        write.write_u8(self.version.minor)?;
        write.write_all(&self.system_id)?;
        write.write_all(&self.software_id)?;
        write.write_u16::<LittleEndian>(self.creation_doy)?;
        write.write_u16::<LittleEndian>(self.creation_year)?;
        write.write_u16::<LittleEndian>(self.vlr_offset)?;
        write.write_u32::<LittleEndian>(self.point_offset)?;
        write.write_u32::<LittleEndian>(self.vlr_count)?;
        write.write_u8(self.point_format.to_header_byte(self.is_compressed))?;
        write.write_u16::<LittleEndian>(self.point_len)?;
        write.write_u32::<LittleEndian>(legacy_point_count)?;
        for n in legacy_points_by_return {
            write.write_u32::<LittleEndian>(n)?;
        }
        write.write_f64::<LittleEndian>(self.transforms.x.scale)?;
        write.write_f64::<LittleEndian>(self.transforms.y.scale)?;
        write.write_f64::<LittleEndian>(self.transforms.z.scale)?;
        write.write_f64::<LittleEndian>(self.transforms.x.offset)?;
        write.write_f64::<LittleEndian>(self.transforms.y.offset)?;
        write.write_f64::<LittleEndian>(self.transforms.z.offset)?;
        let (min, max) = self
            .bounds
            .map(|bounds| (bounds.min(), bounds.max()))
            .unwrap_or_default();
        write.write_f64::<LittleEndian>(max.x)?;
        write.write_f64::<LittleEndian>(min.x)?;
        write.write_f64::<LittleEndian>(max.y)?;
        write.write_f64::<LittleEndian>(min.y)?;
        write.write_f64::<LittleEndian>(max.z)?;
        write.write_f64::<LittleEndian>(min.z)?;
        if self.version.supports::<Waveforms>() {
            write.write_u64::<LittleEndian>(0)?;
        }
        if self.version.supports::<Evlrs>() {
            write.write_u64::<LittleEndian>(self.evlr_offset)?;
            write.write_u32::<LittleEndian>(self.evlr_count)?;
        }
        if self.version.supports::<LargeFiles>() {
            write.write_u64::<LittleEndian>(self.point_count)?;
            for n in self.points_by_return {
                write.write_u64::<LittleEndian>(n)?;
            }
        }
        Ok(())
    }

    fn legacy_counts(&self) -> Result<(u32, [u32; 5])> {
        let mut points_by_return = [0; 5];
        let mut fits = u32::try_from(self.point_count).is_ok();
        for (legacy, &n) in points_by_return.iter_mut().zip(&self.points_by_return) {
            match u32::try_from(n) {
                Ok(n) => *legacy = n,
                Err(_) => fits = false,
            }
        }
        if self.version.supports::<LargeFiles>() {
            if fits && !self.point_format.is_extended() {
                Ok((self.point_count as u32, points_by_return))
            } else {
                Ok((0, [0; 5]))
            }
        } else if fits {
            Ok((self.point_count as u32, points_by_return))
        } else {
            Err(Error::TooManyPoints {
                version: self.version,
                count: self.point_count,
            })
        }
    }
}

impl Default for Header {
    fn default() -> Header {
        let version = Version::default();
        let point_format = Format::default();
        Header {
            version,
            point_format,
            is_compressed: false,
            point_len: point_format.base_len(),
            point_count: 0,
            bounds: None,
            points_by_return: [0; 15],
            transforms: Vector::splat(Transform::default()),
            vlr_count: 0,
            evlr_count: 0,
            vlr_offset: version.header_size(),
            point_offset: u32::from(version.header_size()),
            evlr_offset: 0,
            creation_year: 0,
            creation_doy: 0,
            system_id: las_string(""),
            software_id: las_string(""),
            project_id: Uuid::nil(),
            global_encoding: 0,
            file_source_id: 0,
        }
    }
}
