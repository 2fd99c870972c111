//! Write point tables as las or laz data.
//!
//! A [Writer] walks through a fixed sequence of states. Options are processed when it's
//! created, then a table is used to `prepare` (resolve extra dimensions) and get `ready`
//! (write the provisional header and vlrs). Points are streamed with `write`, which may be called
//! more than once, and `done` writes the evlrs and rewrites the header with the final counts:
//!
//! ```
//! use std::io::Cursor;
//! use las_writer::{Field, PointBuffer, Writer, WriterOptions};
//!
//! let mut buffer = PointBuffer::new();
//! buffer.push([(Field::X, 1.), (Field::Y, 2.), (Field::Z, 3.)]);
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
//! writer.prepare(&buffer).unwrap();
//! writer.ready(&buffer).unwrap();
//! writer.write(&buffer).unwrap();
//! writer.done().unwrap();
//! assert_eq!(1, writer.header().point_count());
//! ```
//!
//! Calling an operation out of order is an error:
//!
//! ```
//! use std::io::Cursor;
//! use las_writer::{PointBuffer, Writer, WriterOptions};
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
//! assert!(writer.write(&PointBuffer::new()).is_err());
//! ```

mod las;
#[cfg(feature = "laz")]
mod laz;

use crate::{
    Error, Field, Header, MetadataNode, Options, PointTable, Result, Summary, WriterOptions,
    extra_dims::{self, ExtraDim},
    feature::Evlrs,
    options::Offset,
    point::{PointEncoder, ReturnWarnings},
    srs::{EpsgGeoTiffEncoder, GeoTiffEncoder},
    vlr::{self, LAS_1_0_RESERVED, Vlr},
};
use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, warn};
use std::{
    fmt,
    fs::File,
    io::{BufWriter, Seek, SeekFrom, Write},
    path::Path,
};

/// The largest block of encoded points handed to the stream at once.
const BUFFER_SIZE: usize = 1 << 20;

/// Written after the vlrs of las 1.0 files.
const POINT_DATA_START_SIGNATURE: u16 = 0xCCDD;

trait PointSink<W: Write>: Send {
    fn write_points(&mut self, points: &[u8], point_len: usize) -> Result<()>;
    fn into_inner(self: Box<Self>) -> W;
    fn get_mut(&mut self) -> &mut W;
    fn done(&mut self) -> Result<()>;
}

/// Where a [Writer] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Created, options not yet processed.
    Constructed,
    /// Options have been checked.
    OptionsProcessed,
    /// Extra dimensions have been resolved against the table.
    Prepared,
    /// The provisional header and vlrs are on the stream.
    HeaderWritten,
    /// The provisional header and vlrs are on the stream and the compressor is open.
    Compressing,
    /// At least one table of points has been written.
    PointsWritten,
    /// The header has been rewritten, nothing more can be written.
    Finalized,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Constructed => "constructed",
            State::OptionsProcessed => "processing options",
            State::Prepared => "prepared",
            State::HeaderWritten => "header written",
            State::Compressing => "compressing",
            State::PointsWritten => "writing points",
            State::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// Writes las data.
///
/// Nothing is finalized on drop: call [Writer::done] (or [Writer::into_inner]) to rewrite the
/// header with the point count and bounds.
#[allow(missing_debug_implementations)]
pub struct Writer<W: 'static + Write + Seek + Send> {
    state: State,
    start: u64,
    options: WriterOptions,
    metadata: MetadataNode,
    geotiff: Option<Box<dyn GeoTiffEncoder>>,
    header: Header,
    extra_dims: Vec<ExtraDim>,
    evlrs: Vec<Vlr>,
    encoder: Option<PointEncoder>,
    auto_offsets_pending: bool,
    summary: Summary,
    buffer: Vec<u8>,
    sink: Option<Box<dyn PointSink<W>>>,
}

impl<W: 'static + Write + Seek + Send> Writer<W> {
    /// Creates a new writer at the stream's current position.
    ///
    /// Fails if compression is requested but this crate was built without the `laz` feature.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use las_writer::{Writer, WriterOptions};
    /// let writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
    /// ```
    pub fn new(mut write: W, options: WriterOptions) -> Result<Writer<W>> {
        let start = write.stream_position()?;
        let mut writer = Writer {
            state: State::Constructed,
            start,
            options,
            metadata: MetadataNode::default(),
            geotiff: Some(Box::new(EpsgGeoTiffEncoder)),
            header: Header::default(),
            extra_dims: Vec::new(),
            evlrs: Vec::new(),
            encoder: None,
            auto_offsets_pending: false,
            summary: Summary::default(),
            buffer: Vec::new(),
            sink: Some(Box::new(las::RawSink::new(write))),
        };
        writer.process_options()?;
        Ok(writer)
    }

    fn process_options(&mut self) -> Result<()> {
        self.check_state("process options", &[State::Constructed])?;
        if self.options.compression && !cfg!(feature = "laz") {
            return Err(Error::LaszipNotEnabled);
        }
        self.extra_dims = self.options.extra_dims.clone();
        self.state = State::OptionsProcessed;
        Ok(())
    }

    /// Sets the metadata used to resolve forwarded header values and vlrs.
    pub fn set_metadata(&mut self, metadata: MetadataNode) -> Result<()> {
        self.check_state(
            "set metadata",
            &[State::OptionsProcessed, State::Prepared],
        )?;
        self.metadata = metadata;
        Ok(())
    }

    /// Sets the encoder used to turn the spatial reference into GeoTIFF keys.
    ///
    /// With no encoder, no spatial reference records are written at all.
    pub fn set_geotiff_encoder(&mut self, geotiff: Option<Box<dyn GeoTiffEncoder>>) {
        self.geotiff = geotiff;
    }

    /// Resolves the extra dimensions against the table's fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use las_writer::{Options, PointBuffer, Writer, WriterOptions};
    ///
    /// let mut options = Options::new();
    /// options.add("extra_dims", "Amplitude=uint16");
    /// let options = WriterOptions::from_options(&options).unwrap();
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), options).unwrap();
    /// assert!(writer.prepare(&PointBuffer::new()).is_err());
    /// ```
    pub fn prepare<T: PointTable + ?Sized>(&mut self, table: &T) -> Result<()> {
        self.check_state("prepare", &[State::OptionsProcessed])?;
        for dim in &mut self.extra_dims {
            dim.resolve(table)?;
        }
        self.state = State::Prepared;
        Ok(())
    }

    /// Fills the header and writes it, with the vlrs, to the stream.
    pub fn ready<T: PointTable + ?Sized>(&mut self, table: &T) -> Result<()> {
        self.check_state("ready", &[State::Prepared])?;
        let srs = self
            .options
            .spatial_reference
            .clone()
            .filter(|srs| !srs.is_empty())
            .or_else(|| table.spatial_reference());
        let list = vlr::assemble(
            &self.metadata,
            &self.options.vlrs,
            srs.as_ref(),
            self.geotiff.as_deref(),
            &self.extra_dims,
        )?;
        self.fill_header()?;
        #[allow(unused_mut)]
        let (mut vlrs, evlrs) = list.into_parts();

        #[cfg(feature = "laz")]
        let laz_vlr = if self.options.compression {
            let extra_bytes = self.header.point_len() - self.header.base_point_len();
            let laz_vlr = crate::laz::laz_vlr(self.header.point_format(), extra_bytes)?;
            vlrs.push(crate::laz::to_vlr(&laz_vlr)?);
            Some(laz_vlr)
        } else {
            None
        };

        let version = self.header.version();
        let vlrs_len: usize = vlrs.iter().map(|vlr| vlr.len(false)).sum();
        let mut point_offset = usize::from(version.header_size()) + vlrs_len;
        if version.requires_point_data_start_signature() {
            point_offset += 2;
        }
        self.header
            .set_vlr_offset(u64::from(version.header_size()))?;
        self.header.set_vlr_count(vlrs.len())?;
        self.header.set_evlr_count(evlrs.len())?;
        self.header.set_point_offset(point_offset as u64)?;
        let reserved = if version.requires_point_data_start_signature() {
            LAS_1_0_RESERVED
        } else {
            0
        };

        let state = self.state;
        let write = self
            .sink
            .as_mut()
            .ok_or(Error::InvalidState {
                operation: "ready",
                state,
            })?
            .get_mut();
        self.header.write_to(&mut *write)?;
        for vlr in &vlrs {
            vlr.write_to(&mut *write, false, reserved)?;
        }
        if version.requires_point_data_start_signature() {
            write.write_u16::<LittleEndian>(POINT_DATA_START_SIGNATURE)?;
        }
        self.evlrs = evlrs;
        self.encoder = Some(PointEncoder::new(
            &self.header,
            &self.extra_dims,
            self.options.discard_high_return_numbers,
        )?);
        self.state = State::HeaderWritten;

        #[cfg(feature = "laz")]
        if let Some(laz_vlr) = laz_vlr {
            let raw = self.take_sink("ready")?;
            self.sink = Some(Box::new(laz::CompressedSink::new(raw.into_inner(), laz_vlr)?));
            self.state = State::Compressing;
        }
        debug!(
            "wrote {} header with {} vlrs, points start at byte {}",
            version,
            vlrs.len(),
            point_offset
        );
        Ok(())
    }

    fn fill_header(&mut self) -> Result<()> {
        let metadata = &self.metadata;
        let values = &self.options.header;
        let format = values.format.resolve("format", metadata)?;
        self.header.set_point_format(format)?;
        if !self.header.point_format_supported() {
            return Err(Error::UnsupportedPointFormat(format));
        }
        self.header.set_point_len(
            usize::from(self.header.base_point_len()) + extra_dims::extra_len(&self.extra_dims),
        )?;
        self.header
            .set_version_minor(values.minor_version.resolve("minor_version", metadata)?)?;
        self.header
            .set_creation_year(values.creation_year.resolve("creation_year", metadata)?);
        self.header
            .set_creation_doy(values.creation_doy.resolve("creation_doy", metadata)?);
        self.header
            .set_software_id(&values.software_id.resolve("software_id", metadata)?);
        self.header
            .set_system_id(&values.system_id.resolve("system_id", metadata)?);
        self.header
            .set_project_id(values.project_id.resolve("project_id", metadata)?);
        self.header
            .set_global_encoding(values.global_encoding.resolve("global_encoding", metadata)?);
        self.header
            .set_file_source_id(values.filesource_id.resolve("filesource_id", metadata)?);
        self.header.set_compressed(self.options.compression);

        let scale = self.options.scale;
        self.header.set_scale(scale.x, scale.y, scale.z)?;
        let offset = self.options.offset;
        let fixed = |offset: Offset| match offset {
            Offset::Value(value) => value,
            Offset::Auto => 0.,
        };
        self.header
            .set_offset(fixed(offset.x), fixed(offset.y), fixed(offset.z));
        self.auto_offsets_pending = [offset.x, offset.y, offset.z].contains(&Offset::Auto);
        Ok(())
    }

    /// Writes all points of a table.
    ///
    /// May be called more than once. Automatic offsets are computed from the first table that
    /// has points.
    pub fn write<T: PointTable + ?Sized>(&mut self, table: &T) -> Result<()> {
        self.check_state(
            "write",
            &[
                State::HeaderWritten,
                State::Compressing,
                State::PointsWritten,
            ],
        )?;
        if self.auto_offsets_pending && !table.is_empty() {
            self.compute_auto_offsets(table)?;
        }
        let state = self.state;
        let encoder = self.encoder.as_mut().ok_or(Error::InvalidState {
            operation: "write",
            state,
        })?;
        let sink = self.sink.as_mut().ok_or(Error::InvalidState {
            operation: "write",
            state,
        })?;
        let point_len = encoder.point_len();
        let count = (BUFFER_SIZE.min(point_len * table.len()) / point_len).max(1);
        let before = self.summary.count();
        let mut index = 0;
        while index < table.len() {
            self.buffer.clear();
            index = encoder.fill(table, index, count, &mut self.buffer, &mut self.summary)?;
            sink.write_points(&self.buffer, point_len)?;
        }
        debug!(
            "encoded {} of {} points",
            self.summary.count() - before,
            table.len()
        );
        self.state = State::PointsWritten;
        Ok(())
    }

    fn compute_auto_offsets<T: PointTable + ?Sized>(&mut self, table: &T) -> Result<()> {
        let mut transforms = *self.header.transforms();
        let offset = self.options.offset;
        for (offset, transform, field) in [
            (offset.x, &mut transforms.x, Field::X),
            (offset.y, &mut transforms.y, Field::Y),
            (offset.z, &mut transforms.z, Field::Z),
        ] {
            if offset == Offset::Auto && table.has_field(field) {
                transform.offset = (0..table.len())
                    .map(|index| table.value(field, index))
                    .fold(f64::INFINITY, f64::min);
            }
        }
        self.header
            .set_offset(transforms.x.offset, transforms.y.offset, transforms.z.offset);
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.set_transforms(transforms);
        }
        self.auto_offsets_pending = false;
        debug!(
            "automatic offsets: {}, {}, {}",
            transforms.x.offset, transforms.y.offset, transforms.z.offset
        );
        Ok(())
    }

    /// Closes the compressor, writes the evlrs, and rewrites the header.
    ///
    /// Leaves the stream positioned at the start of the point data.
    pub fn done(&mut self) -> Result<()> {
        self.check_state(
            "finish",
            &[
                State::HeaderWritten,
                State::Compressing,
                State::PointsWritten,
            ],
        )?;
        let start = self.start;
        let state = self.state;
        let sink = self.sink.as_mut().ok_or(Error::InvalidState {
            operation: "finish",
            state,
        })?;
        sink.done()?;
        debug!("Wrote {} points to the LAS file", self.summary.count());
        if let Some(encoder) = &self.encoder {
            log_warnings(encoder.warnings());
        }

        let write = sink.get_mut();
        if !self.evlrs.is_empty() {
            let version = self.header.version();
            if !version.supports::<Evlrs>() {
                warn!(
                    "{} does not support evlrs, writing {} after the points anyway",
                    version,
                    self.evlrs.len()
                );
            }
            let position = write.stream_position()?;
            self.header.set_evlr_offset(position - start);
            for evlr in &self.evlrs {
                evlr.write_to(&mut *write, true, 0)?;
            }
        }

        self.header.set_point_count(self.summary.count());
        self.header.set_summary(&self.summary);
        self.header.set_evlr_count(self.evlrs.len())?;

        let _ = write.seek(SeekFrom::Start(start))?;
        self.header.write_to(&mut *write)?;
        let _ = write.seek(SeekFrom::Start(
            start + u64::from(self.header.point_offset()),
        ))?;
        write.flush()?;
        self.state = State::Finalized;
        Ok(())
    }

    /// Runs a whole table through the writer: prepare, ready, write and done.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use las_writer::{Field, PointBuffer, Writer, WriterOptions};
    ///
    /// let mut buffer = PointBuffer::new();
    /// buffer.push([(Field::X, 1.), (Field::Y, 2.), (Field::Z, 3.)]);
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
    /// writer.write_table(&buffer).unwrap();
    /// let bytes = writer.into_inner().unwrap().into_inner();
    /// assert_eq!(227 + 34, bytes.len());
    /// ```
    pub fn write_table<T: PointTable + ?Sized>(&mut self, table: &T) -> Result<()> {
        self.prepare(table)?;
        self.ready(table)?;
        self.write(table)?;
        self.done()
    }

    /// Returns a reference to this writer's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the running summary of the points written so far.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Returns the return warnings raised so far.
    pub fn warnings(&self) -> ReturnWarnings {
        self.encoder
            .as_ref()
            .map(PointEncoder::warnings)
            .unwrap_or_default()
    }

    /// Returns this writer's state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Finishes writing if points were started and returns the inner `Write`, seeked to the
    /// beginning of the las data.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use las_writer::{Writer, WriterOptions};
    /// let writer = Writer::new(Cursor::new(Vec::new()), WriterOptions::default()).unwrap();
    /// let cursor = writer.into_inner().unwrap();
    /// assert!(cursor.into_inner().is_empty());
    /// ```
    pub fn into_inner(mut self) -> Result<W> {
        if matches!(
            self.state,
            State::HeaderWritten | State::Compressing | State::PointsWritten
        ) {
            self.done()?;
        }
        let mut inner = self.take_sink("take the stream")?.into_inner();
        let _ = inner.seek(SeekFrom::Start(self.start))?;
        Ok(inner)
    }

    fn check_state(&self, operation: &'static str, allowed: &[State]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    #[cfg_attr(not(feature = "laz"), allow(dead_code))]
    fn take_sink(&mut self, operation: &'static str) -> Result<Box<dyn PointSink<W>>> {
        let state = self.state;
        self.sink
            .take()
            .ok_or(Error::InvalidState { operation, state })
    }
}

impl Writer<BufWriter<File>> {
    /// Creates a new writer for a path.
    ///
    /// If the "laz" feature is enabled, a `.laz` extension turns on compression.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::{Writer, WriterOptions};
    /// let writer = Writer::from_path("/dev/null", WriterOptions::default()).unwrap();
    /// ```
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        mut options: WriterOptions,
    ) -> Result<Writer<BufWriter<File>>> {
        if cfg!(feature = "laz") {
            let is_laz = path
                .as_ref()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("laz"));
            options.compression |= is_laz;
        }
        File::create(path)
            .map_err(Error::from)
            .and_then(|file| Writer::new(BufWriter::new(file), options))
    }

    /// Creates a new writer from string options, writing to the `filename` option.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::{Options, Writer};
    /// let mut options = Options::new();
    /// assert!(Writer::from_options(&options).is_err());
    /// options.add("filename", "/dev/null");
    /// let writer = Writer::from_options(&options).unwrap();
    /// ```
    pub fn from_options(options: &Options) -> Result<Writer<BufWriter<File>>> {
        let options = WriterOptions::from_options(options)?;
        let path = options.filename.clone().ok_or_else(|| Error::InvalidOption {
            name: "filename".to_string(),
            value: String::new(),
        })?;
        Writer::from_path(path, options)
    }
}

fn log_warnings(warnings: ReturnWarnings) {
    if warnings.is_empty() {
        return;
    }
    warn!(
        "{} points with invalid return numbers, {} with zero returns, {} with too many returns, {} discarded",
        warnings.invalid_return_number,
        warnings.zero_number_of_returns,
        warnings.too_many_returns,
        warnings.discarded
    );
}
