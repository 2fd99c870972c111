//! Variable length records.
//!
//! These store data that isn't part of the standard header, such as spatial reference
//! information, extra bytes descriptions, and the laszip item configuration. Records whose
//! payload doesn't fit in a u16 length are written as extended variable length records after
//! the point data.

mod assemble;

pub use assemble::assemble;

use crate::{Error, Result, utils::las_string};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// The size of a vlr header.
pub const HEADER_SIZE: usize = 54;

/// The size of an evlr header.
pub const EXTENDED_HEADER_SIZE: usize = 60;

/// The largest payload a regular vlr can carry.
pub const MAX_DATA_LEN: usize = u16::MAX as usize;

/// User id for spatial reference records.
pub const TRANSFORM_USER_ID: &str = "LASF_Projection";
/// User id for the liblas copy of the WKT.
pub const LIBLAS_USER_ID: &str = "liblas";
/// User id for records defined by the las specification.
pub const SPEC_USER_ID: &str = "LASF_Spec";

/// GeoKeyDirectoryTag record id.
pub const GEOTIFF_DIRECTORY_RECORD_ID: u16 = 34735;
/// GeoDoubleParamsTag record id.
pub const GEOTIFF_DOUBLES_RECORD_ID: u16 = 34736;
/// GeoAsciiParamsTag record id.
pub const GEOTIFF_ASCII_RECORD_ID: u16 = 34737;
/// OGC WKT record id.
pub const WKT_RECORD_ID: u16 = 2112;
/// Extra bytes record id.
pub const EXTRA_BYTES_RECORD_ID: u16 = 4;

/// Reserved value for vlrs in las 1.0.
pub const LAS_1_0_RESERVED: u16 = 0xAABB;

/// A variable length record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vlr {
    /// The user that created this record, e.g. "LASF_Projection".
    pub user_id: String,
    /// This value specifies the type of record, and depends on the user id.
    pub record_id: u16,
    /// Textual description of these data.
    pub description: String,
    /// The data themselves.
    pub data: Vec<u8>,
}

impl Vlr {
    /// Creates a new vlr, taking ownership of the payload.
    pub fn new<U: Into<String>, D: Into<String>>(
        user_id: U,
        record_id: u16,
        description: D,
        data: Vec<u8>,
    ) -> Vlr {
        Vlr {
            user_id: user_id.into(),
            record_id,
            description: description.into(),
            data,
        }
    }

    /// Returns true if this payload is too large for a regular vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Vlr;
    /// assert!(!Vlr::new("me", 1, "", vec![0; u16::MAX as usize]).is_extended());
    /// assert!(Vlr::new("me", 1, "", vec![0; u16::MAX as usize + 1]).is_extended());
    /// ```
    pub fn is_extended(&self) -> bool {
        self.data.len() > MAX_DATA_LEN
    }

    /// Returns the total length of this record as written, header and data.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Vlr;
    /// let vlr = Vlr::new("me", 1, "", vec![0; 10]);
    /// assert_eq!(64, vlr.len(false));
    /// assert_eq!(70, vlr.len(true));
    /// ```
    pub fn len(&self, extended: bool) -> usize {
        let header_size = if extended {
            EXTENDED_HEADER_SIZE
        } else {
            HEADER_SIZE
        };
        header_size + self.data.len()
    }

    /// Writes this record.
    ///
    /// `reserved` goes into the first two bytes, which las 1.0 sets to 0xAABB.
    pub fn write_to<W: Write>(&self, mut write: W, extended: bool, reserved: u16) -> Result<()> {
        write.write_u16::<LittleEndian>(reserved)?;
        write.write_all(&las_string::<16>(&self.user_id))?;
        write.write_u16::<LittleEndian>(self.record_id)?;
        if extended {
            write.write_u64::<LittleEndian>(self.data.len() as u64)?;
        } else {
            let len = u16::try_from(self.data.len())
                .map_err(|_| Error::VlrTooLong(self.data.len()))?;
            write.write_u16::<LittleEndian>(len)?;
        }
        write.write_all(&las_string::<32>(&self.description))?;
        write.write_all(&self.data)?;
        Ok(())
    }
}

/// The records of a file, split into those written after the header and those written after
/// the points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VlrList {
    vlrs: Vec<Vlr>,
    evlrs: Vec<Vlr>,
}

impl VlrList {
    /// Adds a record to the vlrs, or to the evlrs if its payload is too large.
    pub fn push(&mut self, vlr: Vlr) {
        if vlr.is_extended() {
            self.evlrs.push(vlr);
        } else {
            self.vlrs.push(vlr);
        }
    }

    /// Records written between the header and the points.
    pub fn vlrs(&self) -> &[Vlr] {
        &self.vlrs
    }

    /// Records written after the points.
    pub fn evlrs(&self) -> &[Vlr] {
        &self.evlrs
    }

    /// Splits this list into its vlrs and evlrs.
    pub fn into_parts(self) -> (Vec<Vlr>, Vec<Vlr>) {
        (self.vlrs, self.evlrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_vlr() {
        let vlr = Vlr::new("me", 42, "desc", vec![1, 2, 3]);
        let mut bytes = Vec::new();
        vlr.write_to(&mut bytes, false, 0).unwrap();
        assert_eq!(57, bytes.len());
        assert_eq!([0, 0], bytes[0..2]);
        assert_eq!(b"me\0", &bytes[2..5]);
        assert_eq!([42, 0], bytes[18..20]);
        assert_eq!([3, 0], bytes[20..22]);
        assert_eq!(b"desc", &bytes[22..26]);
        assert_eq!([1, 2, 3], bytes[54..57]);
    }

    #[test]
    fn write_evlr() {
        let vlr = Vlr::new("me", 42, "desc", vec![1, 2, 3]);
        let mut bytes = Vec::new();
        vlr.write_to(&mut bytes, true, 0).unwrap();
        assert_eq!(63, bytes.len());
        assert_eq!([3, 0, 0, 0, 0, 0, 0, 0], bytes[20..28]);
        assert_eq!([1, 2, 3], bytes[60..63]);
    }

    #[test]
    fn las_1_0_reserved() {
        let mut bytes = Vec::new();
        Vlr::default()
            .write_to(&mut bytes, false, LAS_1_0_RESERVED)
            .unwrap();
        assert_eq!([0xBB, 0xAA], bytes[0..2]);
    }

    #[test]
    fn too_long_vlr_data() {
        let vlr = Vlr::new("me", 1, "", vec![0; MAX_DATA_LEN + 1]);
        assert!(vlr.write_to(Vec::new(), false, 0).is_err());
    }

    #[test]
    fn list_splits_on_size() {
        let mut list = VlrList::default();
        list.push(Vlr::new("a", 1, "", vec![0; MAX_DATA_LEN]));
        list.push(Vlr::new("b", 1, "", vec![0; MAX_DATA_LEN + 1]));
        assert_eq!(1, list.vlrs().len());
        assert_eq!("a", list.vlrs()[0].user_id);
        assert_eq!(1, list.evlrs().len());
        assert_eq!("b", list.evlrs()[0].user_id);
        assert_eq!(HEADER_SIZE + MAX_DATA_LEN, list.vlrs()[0].len(false));
        let (vlrs, evlrs) = list.into_parts();
        assert_eq!(1, vlrs.len());
        assert_eq!(1, evlrs.len());
    }
}
