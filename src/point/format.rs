use crate::{Error, Result};
use std::fmt;

const IS_COMPRESSED_MASK: u8 = 0x80;

/// Point data record format.
///
/// Las defines formats zero through ten. Each format is a base record with an optional gps time
/// and optional color, and this writer can produce formats zero through three.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Format(u8);

impl Format {
    /// Creates a new point format, failing if the code has no defined record layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::point::Format;
    /// assert!(Format::new(3).is_ok());
    /// assert!(Format::new(11).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Format> {
        if n <= 10 {
            Ok(Format(n))
        } else {
            Err(Error::InvalidPointFormat(n))
        }
    }

    /// Returns this format's code.
    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Returns the code as written in the header, with the high bit set if compressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::point::Format;
    /// let format = Format::new(3).unwrap();
    /// assert_eq!(3, format.to_header_byte(false));
    /// assert_eq!(131, format.to_header_byte(true));
    /// ```
    pub fn to_header_byte(self, is_compressed: bool) -> u8 {
        if is_compressed {
            self.0 | IS_COMPRESSED_MASK
        } else {
            self.0
        }
    }

    /// Does this point format have a gps_time field?
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::point::Format;
    /// assert!(!Format::new(0).unwrap().has_gps_time());
    /// assert!(Format::new(1).unwrap().has_gps_time());
    /// ```
    pub fn has_gps_time(&self) -> bool {
        !matches!(self.0, 0 | 2)
    }

    /// Does this point format have color fields?
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::point::Format;
    /// assert!(!Format::new(1).unwrap().has_color());
    /// assert!(Format::new(2).unwrap().has_color());
    /// ```
    pub fn has_color(&self) -> bool {
        matches!(self.0, 2 | 3 | 5 | 7 | 8 | 10)
    }

    /// Is this one of the extended (las 1.4) formats?
    pub fn is_extended(&self) -> bool {
        self.0 >= 6
    }

    /// Returns true if this writer can encode points in this format.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::point::Format;
    /// assert!(Format::new(0).unwrap().is_supported());
    /// assert!(!Format::new(6).unwrap().is_supported());
    /// ```
    pub fn is_supported(&self) -> bool {
        self.0 <= 3
    }

    /// The largest return number this format can hold.
    pub fn max_return_count(&self) -> u8 {
        if self.is_extended() { 15 } else { 5 }
    }

    /// The length of a point in this format, without any extra bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::point::Format;
    /// assert_eq!(20, Format::new(0).unwrap().base_len());
    /// assert_eq!(34, Format::new(3).unwrap().base_len());
    /// assert_eq!(57, Format::new(4).unwrap().base_len());
    /// ```
    pub fn base_len(&self) -> u16 {
        match self.0 {
            0 => 20,
            1 => 28,
            2 => 26,
            3 => 34,
            4 => 57,
            5 => 63,
            6 => 30,
            7 => 36,
            8 => 38,
            9 => 59,
            _ => 67,
        }
    }
}

impl Default for Format {
    fn default() -> Format {
        Format(3)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point format {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(n: u8) -> Format {
        Format::new(n).unwrap()
    }

    #[test]
    fn has_gps_time() {
        assert!(!format(0).has_gps_time());
        assert!(format(1).has_gps_time());
        assert!(!format(2).has_gps_time());
        assert!(format(3).has_gps_time());
        assert!(format(6).has_gps_time());
    }

    #[test]
    fn has_color() {
        assert!(!format(0).has_color());
        assert!(!format(1).has_color());
        assert!(format(2).has_color());
        assert!(format(3).has_color());
        assert!(!format(4).has_color());
        assert!(format(10).has_color());
    }

    #[test]
    fn is_supported() {
        for n in 0..=3 {
            assert!(format(n).is_supported());
        }
        for n in 4..=10 {
            assert!(!format(n).is_supported());
        }
    }

    #[test]
    fn base_len() {
        assert_eq!(20, format(0).base_len());
        assert_eq!(28, format(1).base_len());
        assert_eq!(26, format(2).base_len());
        assert_eq!(34, format(3).base_len());
        assert_eq!(57, format(4).base_len());
        assert_eq!(63, format(5).base_len());
        assert_eq!(30, format(6).base_len());
        assert_eq!(36, format(7).base_len());
        assert_eq!(38, format(8).base_len());
        assert_eq!(59, format(9).base_len());
        assert_eq!(67, format(10).base_len());
    }

    #[test]
    fn max_return_count() {
        assert_eq!(5, format(3).max_return_count());
        assert_eq!(15, format(6).max_return_count());
    }
}
