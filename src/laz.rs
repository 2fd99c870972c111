//! Utility functions for writing laszip compressed data.

use crate::{Error, Result, Vlr, point::Format};
use ::laz::{LazItemRecordBuilder, LazItemType, LazVlr};
use std::io::Cursor;

/// Returns true if this [Vlr] is the laszip Vlr.
///
/// # Examples
///
/// ```
/// use las_writer::{Vlr, laz};
///
/// let mut vlr = Vlr::default();
/// assert!(!laz::is_laszip_vlr(&vlr));
/// vlr.user_id = "laszip encoded".to_string();
/// vlr.record_id = 22204;
/// assert!(laz::is_laszip_vlr(&vlr));
/// ```
pub fn is_laszip_vlr(vlr: &Vlr) -> bool {
    vlr.user_id == LazVlr::USER_ID && vlr.record_id == LazVlr::RECORD_ID
}

/// Describes the compressed items of a point format with `extra_bytes` trailing bytes.
///
/// Only the legacy formats (0 through 5) can be described.
pub fn laz_vlr(format: Format, extra_bytes: u16) -> Result<LazVlr> {
    if format.is_extended() {
        return Err(Error::UnsupportedPointFormat(format.to_u8()));
    }
    let mut laz_items = LazItemRecordBuilder::new();
    let _ = laz_items.add_item(LazItemType::Point10);
    if format.has_gps_time() {
        let _ = laz_items.add_item(LazItemType::GpsTime);
    }
    if format.has_color() {
        let _ = laz_items.add_item(LazItemType::RGB12);
    }
    if extra_bytes > 0 {
        let _ = laz_items.add_item(LazItemType::Byte(extra_bytes));
    }
    Ok(LazVlr::from_laz_items(laz_items.build()))
}

/// Wraps a [LazVlr] into a regular [Vlr].
pub fn to_vlr(laz_vlr: &LazVlr) -> Result<Vlr> {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    laz_vlr.write_to(&mut cursor)?;
    Ok(Vlr::new(
        LazVlr::USER_ID,
        LazVlr::RECORD_ID,
        LazVlr::DESCRIPTION,
        cursor.into_inner(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items() {
        let vlr = laz_vlr(Format::new(3).unwrap(), 2).unwrap();
        assert_eq!(4, vlr.items().len());
        let vlr = laz_vlr(Format::new(0).unwrap(), 0).unwrap();
        assert_eq!(1, vlr.items().len());
    }

    #[test]
    fn extended() {
        assert!(laz_vlr(Format::new(6).unwrap(), 0).is_err());
    }

    #[test]
    fn wrapped() {
        let laz_vlr = laz_vlr(Format::new(1).unwrap(), 0).unwrap();
        let vlr = to_vlr(&laz_vlr).unwrap();
        assert!(is_laszip_vlr(&vlr));
        let read = LazVlr::from_buffer(&vlr.data).unwrap();
        assert_eq!(laz_vlr.items_size(), read.items_size());
        assert_eq!(28, read.items_size());
    }
}
