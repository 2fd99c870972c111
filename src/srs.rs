//! Spatial references and their GeoTIFF key encoding.
//!
//! The writer stores a spatial reference twice: as GeoTIFF keys, for readers that predate WKT
//! in las, and as WKT. Producing GeoTIFF keys is the job of a [GeoTiffEncoder], which is handed
//! to the writer. [EpsgGeoTiffEncoder] covers the common case of a WKT that ends in an EPSG
//! authority.

use byteorder::{LittleEndian, WriteBytesExt};

const EPSG_RANGE: std::ops::RangeInclusive<u16> = 1024..=(i16::MAX as u16);

const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const VERTICAL_CS_TYPE_GEO_KEY: u16 = 4096;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// A spatial reference, as well known text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpatialReference {
    wkt: String,
}

impl SpatialReference {
    /// Creates a spatial reference from well known text.
    pub fn new<S: Into<String>>(wkt: S) -> SpatialReference {
        SpatialReference { wkt: wkt.into() }
    }

    /// Returns the well known text.
    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    /// Returns true if there's no well known text.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::SpatialReference;
    /// assert!(SpatialReference::new("  ").is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.wkt.trim().is_empty()
    }

    /// Returns the horizontal and optional vertical EPSG codes at the end of the WKT's
    /// sections, if there are any.
    ///
    /// This looks at digits at the tail of each section, it is not a WKT parser.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::SpatialReference;
    /// let srs = SpatialReference::new(r#"PROJCS["NAD83 / UTM zone 10N",AUTHORITY["EPSG","26910"]]"#);
    /// assert_eq!(Some((26910, None)), srs.epsg_codes());
    /// ```
    pub fn epsg_codes(&self) -> Option<(u16, Option<u16>)> {
        let wkt = self.wkt.trim();
        let pieces = ["VERTCRS", "VERTICALCRS", "VERT_CS"]
            .iter()
            .find_map(|keyword| wkt.split_once(keyword))
            .map(|(horizontal, vertical)| (horizontal, Some(vertical)))
            .unwrap_or((wkt, None));
        let horizontal = trailing_code(pieces.0)?;
        Some((horizontal, pieces.1.and_then(trailing_code)))
    }

    fn is_projected(&self) -> bool {
        ["PROJCS", "PROJCRS", "PROJECTEDCRS"]
            .iter()
            .any(|keyword| self.wkt.contains(keyword))
    }
}

fn trailing_code(s: &str) -> Option<u16> {
    // codes are four or five digits a couple of bytes from the end
    let tail = &s.as_bytes()[s.len().saturating_sub(10)..];
    let end = tail.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = tail[..end]
        .iter()
        .rposition(|byte| !byte.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let digits = &tail[start..end];
    if digits.len() > 5 {
        return None;
    }
    let code = digits
        .iter()
        .fold(0u32, |code, byte| code * 10 + u32::from(byte - b'0'));
    u16::try_from(code).ok().filter(|code| EPSG_RANGE.contains(code))
}

/// The three GeoTIFF tags a spatial reference is stored in.
///
/// An empty tag is not written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoTiffKeys {
    /// GeoKeyDirectoryTag, as little endian u16s.
    pub directory: Vec<u8>,
    /// GeoDoubleParamsTag, as little endian f64s.
    pub doubles: Vec<u8>,
    /// GeoAsciiParamsTag.
    pub ascii: Vec<u8>,
}

/// Converts a spatial reference into GeoTIFF keys.
pub trait GeoTiffEncoder: Send {
    /// Encodes the spatial reference, returning empty keys if it can't be expressed.
    fn encode(&self, srs: &SpatialReference) -> GeoTiffKeys;
}

/// Encodes spatial references that carry EPSG codes as a minimal GeoTIFF key directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct EpsgGeoTiffEncoder;

impl GeoTiffEncoder for EpsgGeoTiffEncoder {
    fn encode(&self, srs: &SpatialReference) -> GeoTiffKeys {
        let Some((horizontal, vertical)) = srs.epsg_codes() else {
            return GeoTiffKeys::default();
        };
        let mut keys = if srs.is_projected() {
            vec![
                (GT_MODEL_TYPE_GEO_KEY, MODEL_TYPE_PROJECTED),
                (GT_RASTER_TYPE_GEO_KEY, RASTER_PIXEL_IS_AREA),
                (PROJECTED_CS_TYPE_GEO_KEY, horizontal),
            ]
        } else {
            vec![
                (GT_MODEL_TYPE_GEO_KEY, MODEL_TYPE_GEOGRAPHIC),
                (GT_RASTER_TYPE_GEO_KEY, RASTER_PIXEL_IS_AREA),
                (GEOGRAPHIC_TYPE_GEO_KEY, horizontal),
            ]
        };
        if let Some(vertical) = vertical {
            keys.push((VERTICAL_CS_TYPE_GEO_KEY, vertical));
        }
        GeoTiffKeys {
            directory: key_directory(&keys),
            doubles: Vec::new(),
            ascii: Vec::new(),
        }
    }
}

fn key_directory(keys: &[(u16, u16)]) -> Vec<u8> {
    let mut directory = Vec::with_capacity(8 * (keys.len() + 1));
    // version, revision, minor revision, number of keys
    let header = [1, 1, 0, keys.len() as u16];
    for word in header {
        let _ = directory.write_u16::<LittleEndian>(word);
    }
    for &(id, value) in keys {
        // values are stored inline: no tag location, count of one
        for word in [id, 0, 1, value] {
            let _ = directory.write_u16::<LittleEndian>(word);
        }
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ReadBytesExt;
    use std::io::Cursor;

    const UTM: &str = r#"PROJCS["NAD83 / UTM zone 10N",GEOGCS["NAD83",AUTHORITY["EPSG","4269"]],AUTHORITY["EPSG","26910"]]"#;

    fn words(bytes: &[u8]) -> Vec<u16> {
        let mut cursor = Cursor::new(bytes);
        (0..bytes.len() / 2)
            .map(|_| cursor.read_u16::<LittleEndian>().unwrap())
            .collect()
    }

    #[test]
    fn projected() {
        let keys = EpsgGeoTiffEncoder.encode(&SpatialReference::new(UTM));
        assert_eq!(
            vec![1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 26910],
            words(&keys.directory)
        );
        assert!(keys.doubles.is_empty());
        assert!(keys.ascii.is_empty());
    }

    #[test]
    fn geographic() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984"],AUTHORITY["EPSG","4326"]]"#;
        let keys = EpsgGeoTiffEncoder.encode(&SpatialReference::new(wkt));
        assert_eq!(&[2048, 0, 1, 4326], &words(&keys.directory)[12..16]);
    }

    #[test]
    fn compound() {
        let wkt = format!(r#"COMPD_CS["x",{UTM},VERT_CS["NAVD88",AUTHORITY["EPSG","5703"]]]"#);
        let srs = SpatialReference::new(wkt);
        assert_eq!(Some((26910, Some(5703))), srs.epsg_codes());
        let keys = EpsgGeoTiffEncoder.encode(&srs);
        assert_eq!(4, words(&keys.directory)[3]);
    }

    #[test]
    fn long_digit_tail() {
        let srs = SpatialReference::new("LOCAL_CS[\"site grid\",1234567890");
        assert_eq!(None, srs.epsg_codes());
        assert_eq!(GeoTiffKeys::default(), EpsgGeoTiffEncoder.encode(&srs));
        let srs = SpatialReference::new("999999999999999999999");
        assert_eq!(None, srs.epsg_codes());
    }

    #[test]
    fn no_code() {
        let srs = SpatialReference::new("LOCAL_CS[\"arbitrary\"]");
        assert_eq!(None, srs.epsg_codes());
        assert_eq!(GeoTiffKeys::default(), EpsgGeoTiffEncoder.encode(&srs));
    }
}
