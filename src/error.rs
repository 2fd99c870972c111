use crate::{Transform, Version, writer::State};
use thiserror::Error;

/// Crate-specific error enum.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An option value could not be parsed.
    #[error("invalid value for option '{name}': '{value}'")]
    InvalidOption {
        /// The option name.
        name: String,
        /// The value that was rejected.
        value: String,
    },

    /// A `vlr` option group is missing one of its required entries.
    #[error("vlr option '{name}' is missing '{entry}'")]
    IncompleteVlrOption {
        /// The name of the vlr option group.
        name: String,
        /// The missing entry, `record_id` or `user_id`.
        entry: &'static str,
    },

    /// An extra dimension specification could not be parsed.
    #[error("invalid extra dimension specification: '{0}'")]
    InvalidExtraDim(String),

    /// The data type of an extra dimension is not known.
    #[error("unknown extra dimension type '{data_type}' for dimension '{name}'")]
    UnknownExtraDimType {
        /// The dimension name.
        name: String,
        /// The unknown type name.
        data_type: String,
    },

    /// An extra dimension named in the options is absent from the point table.
    #[error("Dimension '{0}' specified in 'extra_dims' option not found.")]
    DimensionNotFound(String),

    /// The point format code has no defined field layout.
    #[error("invalid point format: {0}")]
    InvalidPointFormat(u8),

    /// The point format is defined, but this writer cannot produce it.
    #[error("Unsupported LAS output point format: {0}.")]
    UnsupportedPointFormat(u8),

    /// The las version is not one that this writer can produce.
    #[error("unsupported las version: {0}")]
    UnsupportedVersion(Version),

    /// A scale of zero (or a non-finite scale) can't be used to quantize coordinates.
    #[error("invalid scale: {0}")]
    InvalidScale(f64),

    /// The quantized coordinate doesn't fit into an i32.
    #[error("the transform {transform} cannot represent {value} as an i32")]
    InverseTransform {
        /// The value that could not be transformed.
        value: f64,
        /// The transform that was being applied.
        transform: Transform,
    },

    /// A field value doesn't fit the type of its slot in the point record.
    #[error("value {value} of field '{field}' is out of range for its point record type")]
    FieldOutOfRange {
        /// The field name.
        field: String,
        /// The value that didn't fit.
        value: f64,
    },

    /// Encoding a point produced a different number of bytes than the point record length.
    #[error("encoded point record has {actual} bytes, expected {expected}")]
    PointRecordLength {
        /// The expected point record length.
        expected: u16,
        /// The number of bytes actually written.
        actual: u64,
    },

    /// The point record length is too large for the header field.
    #[error("point record length of {0} bytes is too large")]
    PointRecordTooLong(usize),

    /// The number of points can't be stored in this version's header.
    #[error("{version} cannot store {count} points")]
    TooManyPoints {
        /// The las version.
        version: Version,
        /// The number of points.
        count: u64,
    },

    /// An offset into the file doesn't fit into its header field.
    #[error("offset {0} is too large for the header")]
    OffsetTooLarge(u64),

    /// The vlr data is too long to be written as a regular vlr.
    #[error("the vlr is too long: {0}")]
    VlrTooLong(usize),

    /// Compression was requested, but this crate was built without the `laz` feature.
    #[error("LASzip support is not enabled, can't write LAZ output")]
    LaszipNotEnabled,

    /// An operation was called in the wrong writer state.
    #[error("cannot {operation} while the writer is {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the writer was in.
        state: State,
    },

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// [base64::DecodeError]
    #[error("vlr data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The LASzip compressor failed.
    #[error("error {operation} LASzip compressor: {message}")]
    Compressor {
        /// What the writer was doing with the compressor, e.g. "opening".
        operation: &'static str,
        /// The compressor's error text.
        message: String,
    },
}
