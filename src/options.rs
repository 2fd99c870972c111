//! Writer configuration.
//!
//! Options arrive as strings, the way a pipeline definition spells them, and are parsed once
//! into [WriterOptions]:
//!
//! ```
//! use las_writer::{Options, WriterOptions};
//! let mut options = Options::new();
//! options.add("minor_version", "4").add("scale_x", "0.001").add("offset_x", "auto");
//! let options = WriterOptions::from_options(&options).unwrap();
//! assert_eq!(0.001, options.scale.x);
//! ```

use crate::{
    Error, MetadataNode, Result, SpatialReference, Transform, Vector, extra_dims::ExtraDim,
};
use chrono::{Datelike, Utc};
use std::{fmt::Display, path::PathBuf, str::FromStr};
use uuid::Uuid;

const FORWARD: &str = "FORWARD";

/// String options, in the order they were given.
#[derive(Clone, Debug, Default)]
pub struct Options {
    values: Vec<(String, String)>,
    vlrs: Vec<VlrOptionGroup>,
}

/// A `vlr` option with its nested entries.
#[derive(Clone, Debug, Default)]
pub struct VlrOptionGroup {
    /// The option name, which starts with `vlr`.
    pub name: String,
    /// Base64 payload, or `FORWARD`.
    pub value: String,
    /// Nested entries: `record_id`, `user_id` and optionally `description`.
    pub entries: Vec<(String, String)>,
}

impl Options {
    /// Creates an empty set of options.
    pub fn new() -> Options {
        Options::default()
    }

    /// Adds an option. A later value for the same name wins.
    pub fn add<N: Into<String>, V: Display>(&mut self, name: N, value: V) -> &mut Options {
        self.values.push((name.into(), value.to_string()));
        self
    }

    /// Adds a `vlr` option group.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Options;
    /// let mut options = Options::new();
    /// options.add_vlr("vlr", "aGVsbG8=", &[("record_id", "42"), ("user_id", "me")]);
    /// ```
    pub fn add_vlr<N: Into<String>, V: Into<String>>(
        &mut self,
        name: N,
        value: V,
        entries: &[(&str, &str)],
    ) -> &mut Options {
        self.vlrs.push(VlrOptionGroup {
            name: name.into(),
            value: value.into(),
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    /// Returns the value of an option.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
    {
        self.get(name)
            .map(|value| parse_value(name, value))
            .transpose()
    }

    fn parse_bool(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            None => Ok(false),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" | "" => Ok(false),
                _ => Err(invalid(name, value)),
            },
        }
    }
}

fn invalid(name: &str, value: &str) -> Error {
    Error::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid(name, value))
}

/// A header value that is either given or looked up in forwarded metadata.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue<T> {
    /// Use this value.
    Value(T),
    /// Use the metadata child with the header value's name, or the default if there isn't one.
    Forward(T),
}

impl<T: Clone + FromStr> HeaderValue<T> {
    /// Resolves this value against forwarded metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::{MetadataNode, options::HeaderValue};
    /// let metadata = MetadataNode::new("root", "").with_child(MetadataNode::new("format", "1"));
    /// assert_eq!(1, HeaderValue::Forward(3u8).resolve("format", &metadata).unwrap());
    /// assert_eq!(3, HeaderValue::Forward(3u8).resolve("minor_version", &metadata).unwrap());
    /// assert_eq!(0, HeaderValue::Value(0u8).resolve("format", &metadata).unwrap());
    /// ```
    pub fn resolve(&self, name: &str, metadata: &MetadataNode) -> Result<T> {
        match self {
            HeaderValue::Value(value) => Ok(value.clone()),
            HeaderValue::Forward(default) => match metadata.child(name) {
                Some(node) => parse_value(name, node.value()),
                None => Ok(default.clone()),
            },
        }
    }

    fn with_option(
        self,
        options: &Options,
        name: &str,
        forward_metadata: bool,
    ) -> Result<HeaderValue<T>> {
        let default = match self {
            HeaderValue::Value(value) | HeaderValue::Forward(value) => value,
        };
        match options.get(name) {
            Some(value) if value.trim().eq_ignore_ascii_case(FORWARD) => {
                Ok(HeaderValue::Forward(default))
            }
            Some(value) => parse_value(name, value).map(HeaderValue::Value),
            None if forward_metadata => Ok(HeaderValue::Forward(default)),
            None => Ok(HeaderValue::Value(default)),
        }
    }
}

/// Header values, each of which can be forwarded from metadata.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct HeaderOptions {
    pub format: HeaderValue<u8>,
    pub minor_version: HeaderValue<u8>,
    pub creation_year: HeaderValue<u16>,
    pub creation_doy: HeaderValue<u16>,
    pub software_id: HeaderValue<String>,
    pub system_id: HeaderValue<String>,
    pub project_id: HeaderValue<Uuid>,
    pub global_encoding: HeaderValue<u16>,
    pub filesource_id: HeaderValue<u16>,
}

/// The default software id.
pub fn default_software_id() -> String {
    format!("las-writer {}", env!("CARGO_PKG_VERSION"))
}

/// The default system id.
pub const DEFAULT_SYSTEM_ID: &str = "las-writer";

impl HeaderOptions {
    fn from_options(options: &Options, forward_metadata: bool) -> Result<HeaderOptions> {
        let defaults = HeaderOptions::default();
        Ok(HeaderOptions {
            format: defaults.format.with_option(options, "format", forward_metadata)?,
            minor_version: defaults
                .minor_version
                .with_option(options, "minor_version", forward_metadata)?,
            creation_year: defaults
                .creation_year
                .with_option(options, "creation_year", forward_metadata)?,
            creation_doy: defaults
                .creation_doy
                .with_option(options, "creation_doy", forward_metadata)?,
            software_id: defaults
                .software_id
                .with_option(options, "software_id", forward_metadata)?,
            system_id: defaults
                .system_id
                .with_option(options, "system_id", forward_metadata)?,
            project_id: defaults
                .project_id
                .with_option(options, "project_id", forward_metadata)?,
            global_encoding: defaults
                .global_encoding
                .with_option(options, "global_encoding", forward_metadata)?,
            filesource_id: defaults
                .filesource_id
                .with_option(options, "filesource_id", forward_metadata)?,
        })
    }
}

impl Default for HeaderOptions {
    fn default() -> HeaderOptions {
        let today = Utc::now().date_naive();
        HeaderOptions {
            format: HeaderValue::Value(3),
            minor_version: HeaderValue::Value(2),
            creation_year: HeaderValue::Value(u16::try_from(today.year()).unwrap_or_default()),
            creation_doy: HeaderValue::Value(today.ordinal() as u16),
            software_id: HeaderValue::Value(default_software_id()),
            system_id: HeaderValue::Value(DEFAULT_SYSTEM_ID.to_string()),
            project_id: HeaderValue::Value(Uuid::nil()),
            global_encoding: HeaderValue::Value(0),
            filesource_id: HeaderValue::Value(0),
        }
    }
}

/// An axis offset, fixed or computed from the first points written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Offset {
    /// A fixed offset.
    Value(f64),
    /// The minimum value of the axis over the first table written.
    Auto,
}

impl Default for Offset {
    fn default() -> Offset {
        Offset::Value(0.)
    }
}

/// A user-specified vlr.
#[derive(Clone, Debug, PartialEq)]
pub struct VlrOption {
    /// The base64 payload, or a value starting with `FORWARD`.
    pub value: String,
    /// The record id.
    pub record_id: u16,
    /// The user id.
    pub user_id: String,
    /// The description, empty if not given.
    pub description: String,
}

impl VlrOption {
    /// Does this vlr come from forwarded metadata?
    pub fn is_forward(&self) -> bool {
        self.value.starts_with(FORWARD)
    }

    fn from_group(group: &VlrOptionGroup) -> Result<VlrOption> {
        let entry = |key: &str| {
            group
                .entries
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let record_id = entry("record_id").ok_or_else(|| Error::IncompleteVlrOption {
            name: group.name.clone(),
            entry: "record_id",
        })?;
        let user_id = entry("user_id").ok_or_else(|| Error::IncompleteVlrOption {
            name: group.name.clone(),
            entry: "user_id",
        })?;
        Ok(VlrOption {
            value: group.value.clone(),
            record_id: parse_value("record_id", record_id)?,
            user_id: user_id.to_string(),
            description: entry("description").unwrap_or_default().to_string(),
        })
    }
}

/// Typed writer configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct WriterOptions {
    /// Output path, used by [crate::Writer::from_options].
    pub filename: Option<PathBuf>,
    /// Compress the point data with laszip.
    pub compression: bool,
    /// Drop points whose return number is larger than the format allows.
    pub discard_high_return_numbers: bool,
    /// Treat header values that aren't given as `FORWARD`.
    pub forward_metadata: bool,
    /// Extra dimensions, in point record order.
    pub extra_dims: Vec<ExtraDim>,
    /// Spatial reference, overriding the table's.
    pub spatial_reference: Option<SpatialReference>,
    /// Header values.
    pub header: HeaderOptions,
    /// Scale of each axis.
    pub scale: Vector<f64>,
    /// Offset of each axis.
    pub offset: Vector<Offset>,
    /// User vlrs, in option order.
    pub vlrs: Vec<VlrOption>,
}

impl WriterOptions {
    /// Parses string options.
    pub fn from_options(options: &Options) -> Result<WriterOptions> {
        if let Some(major) = options.parse::<u8>("major_version")? {
            if major != 1 {
                return Err(invalid("major_version", &major.to_string()));
            }
        }
        let forward_metadata = options.parse_bool("forward_metadata")?;
        let extra_dims = match options.get("extra_dims") {
            Some(value) => ExtraDim::parse_list(value)?,
            None => Vec::new(),
        };
        let scale = Vector {
            x: scale(options, "scale_x")?,
            y: scale(options, "scale_y")?,
            z: scale(options, "scale_z")?,
        };
        let offset = Vector {
            x: offset(options, "offset_x")?,
            y: offset(options, "offset_y")?,
            z: offset(options, "offset_z")?,
        };
        let vlrs = options
            .vlrs
            .iter()
            .filter(|group| group.name.to_ascii_lowercase().starts_with("vlr"))
            .map(VlrOption::from_group)
            .collect::<Result<Vec<_>>>()?;
        Ok(WriterOptions {
            filename: options.get("filename").map(PathBuf::from),
            compression: options.parse_bool("compression")?,
            discard_high_return_numbers: options.parse_bool("discard_high_return_numbers")?,
            forward_metadata,
            extra_dims,
            spatial_reference: options.get("a_srs").map(SpatialReference::new),
            header: HeaderOptions::from_options(options, forward_metadata)?,
            scale,
            offset,
            vlrs,
        })
    }
}

impl Default for WriterOptions {
    fn default() -> WriterOptions {
        WriterOptions {
            filename: None,
            compression: false,
            discard_high_return_numbers: false,
            forward_metadata: false,
            extra_dims: Vec::new(),
            spatial_reference: None,
            header: HeaderOptions::default(),
            scale: Vector::splat(Transform::default().scale),
            offset: Vector::default(),
            vlrs: Vec::new(),
        }
    }
}

fn scale(options: &Options, name: &str) -> Result<f64> {
    let scale = options
        .parse::<f64>(name)?
        .unwrap_or(Transform::default().scale);
    let _ = Transform::new(scale, 0.)?;
    Ok(scale)
}

fn offset(options: &Options, name: &str) -> Result<Offset> {
    match options.get(name) {
        Some(value) if value.trim().eq_ignore_ascii_case("auto") => Ok(Offset::Auto),
        Some(value) => parse_value(name, value).map(Offset::Value),
        None => Ok(Offset::default()),
    }
}
