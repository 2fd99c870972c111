//! Write [ASPRS LAS](https://www.asprs.org/committee-general/laser-las-file-format-exchange-activities.html)
//! point cloud data, optionally compressed with LASzip.
//!
//! # Writing
//!
//! Points come from anything that implements [PointTable]. [PointBuffer] is a simple in-memory
//! table:
//!
//! ```
//! use las_writer::{Field, PointBuffer};
//! let mut buffer = PointBuffer::new();
//! buffer.push([(Field::X, 1.), (Field::Y, 2.), (Field::Z, 3.), (Field::Intensity, 42.)]);
//! ```
//!
//! A [Writer] is configured with [WriterOptions], which can be built by hand or parsed from
//! string [Options]:
//!
//! ```
//! use std::io::Cursor;
//! use las_writer::{Field, Options, PointBuffer, Writer, WriterOptions};
//!
//! let mut options = Options::new();
//! options
//!     .add("format", 1)
//!     .add("minor_version", 4)
//!     .add("scale_x", 0.001)
//!     .add("offset_x", "auto");
//! let options = WriterOptions::from_options(&options).unwrap();
//!
//! let mut buffer = PointBuffer::new();
//! buffer.push([(Field::X, 1.), (Field::Y, 2.), (Field::Z, 3.)]);
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), options).unwrap();
//! writer.write_table(&buffer).unwrap();
//! let cursor = writer.into_inner().unwrap();
//! ```
//!
//! You can also write out to a path (automatically buffered with `BufWriter`):
//!
//! ```
//! use las_writer::{Writer, WriterOptions};
//! let writer = Writer::from_path("/dev/null", WriterOptions::default());
//! ```
//!
//! ## Compression
//!
//! If compiled with the `laz` feature, the point data can be compressed:
//!
//! ```
//! use std::io::Cursor;
//! use las_writer::{Writer, WriterOptions};
//!
//! let mut options = WriterOptions::default();
//! options.compression = true;
//! let result = Writer::new(Cursor::new(Vec::new()), options);
//! if cfg!(feature = "laz") {
//!     assert!(result.is_ok());
//! } else {
//!     assert!(result.is_err());
//! }
//! ```
//!
//! ## Prefer `BufWrite`
//!
//! Your performance will improve greatly if you use a `BufWrite` instead of just a `Write`.

#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

#[cfg(feature = "laz")]
pub mod laz;

pub mod extra_dims;
pub mod feature;
pub mod header;
pub mod metadata;
pub mod options;
pub mod point;
pub mod srs;
pub mod table;
pub mod vlr;
pub mod writer;

mod bounds;
mod error;
mod summary;
mod transform;
mod utils;
mod vector;
mod version;

pub use bounds::Bounds;
pub use error::Error;
pub use feature::Feature;
pub use header::Header;
pub use metadata::MetadataNode;
pub use options::{Options, WriterOptions};
pub use srs::SpatialReference;
pub use summary::Summary;
pub use table::{Field, PointBuffer, PointTable};
pub use transform::Transform;
pub use vector::Vector;
pub use version::Version;
pub use vlr::Vlr;
pub use writer::Writer;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
