use crate::feature::Feature;
use std::fmt;

/// LAS version.
///
/// Versions 1.0 through 1.4 can be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// The major version.
    ///
    /// For now, always 1.
    pub major: u8,
    /// The minor version.
    pub minor: u8,
}

impl Version {
    /// Creates a new version.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Version;
    /// let version = Version::new(1, 2);
    /// ```
    pub fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Returns true if this version can be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Version;
    /// assert!(Version::new(1, 4).is_supported());
    /// assert!(!Version::new(1, 5).is_supported());
    /// assert!(!Version::new(2, 0).is_supported());
    /// ```
    pub fn is_supported(&self) -> bool {
        self.major == 1 && self.minor <= 4
    }

    /// Returns the size of the public header block for this version.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Version;
    /// assert_eq!(227, Version::new(1, 2).header_size());
    /// assert_eq!(235, Version::new(1, 3).header_size());
    /// assert_eq!(375, Version::new(1, 4).header_size());
    /// ```
    pub fn header_size(&self) -> u16 {
        if self.minor >= 4 {
            375
        } else if self.minor == 3 {
            235
        } else {
            227
        }
    }

    /// Does this version support the feature?
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::{Version, feature::Evlrs};
    /// assert!(!Version::new(1, 2).supports::<Evlrs>());
    /// assert!(Version::new(1, 4).supports::<Evlrs>());
    /// ```
    pub fn supports<F: Feature>(&self) -> bool {
        F::is_supported_by(*self)
    }

    /// Las 1.0 puts a two-byte signature between the vlrs and the points.
    pub fn requires_point_data_start_signature(&self) -> bool {
        *self == Version::new(1, 0)
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::new(1, 2)
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "las {}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Evlrs, FileSourceId, LargeFiles, Waveforms};

    #[test]
    fn features() {
        assert!(!Version::new(1, 0).supports::<FileSourceId>());
        assert!(Version::new(1, 1).supports::<FileSourceId>());
        assert!(!Version::new(1, 2).supports::<Waveforms>());
        assert!(Version::new(1, 3).supports::<Waveforms>());
        assert!(!Version::new(1, 3).supports::<LargeFiles>());
        assert!(Version::new(1, 4).supports::<LargeFiles>());
        assert!(Version::new(1, 4).supports::<Evlrs>());
    }

    #[test]
    fn ordering() {
        assert!(Version::new(1, 2) < Version::new(1, 4));
        assert_eq!(Version::new(1, 2), Version::default());
    }

    #[test]
    fn start_signature() {
        assert!(Version::new(1, 0).requires_point_data_start_signature());
        assert!(!Version::new(1, 1).requires_point_data_start_signature());
    }
}
