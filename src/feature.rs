//! Programmatically determine whether a las version supports a feature.
//!
//! Features are structures that implement the [Feature] trait, and are usually queried through
//! [Version::supports]:
//!
//! ```
//! use las_writer::feature::Waveforms;
//! use las_writer::Version;
//!
//! assert!(!Version::new(1, 2).supports::<Waveforms>());
//! assert!(Version::new(1, 4).supports::<Waveforms>());
//! ```

use crate::Version;

const MAJOR: u8 = 1;

/// A trait implemented by each feature.
pub trait Feature {
    /// Is this feature supported by this version?
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::feature::{Evlrs, Feature};
    /// use las_writer::Version;
    /// assert!(!Evlrs::is_supported_by(Version::new(1, 3)));
    /// assert!(Evlrs::is_supported_by(Version::new(1, 4)));
    /// ```
    fn is_supported_by(version: Version) -> bool;

    /// Returns the name of this feature.
    fn name() -> &'static str;
}

macro_rules! features {
    (   $(
            $(#[$meta:meta])*
            $name:ident ($($versions:expr),+);
        )+
    ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug)]
            pub struct $name {}

            impl Feature for $name {
                fn is_supported_by(version: Version) -> bool {
                    [$($versions),+]
                        .into_iter()
                        .map(|minor| Version::new(MAJOR, minor))
                        .any(|v| version == v)
                }

                fn name() -> &'static str {
                    stringify!($name)
                }
            }
        )+
    }
}

features! {
    /// Does the header carry a file source id, or is that slot reserved?
    FileSourceId(1, 2, 3, 4);
    /// Does the header have a start of waveform data field?
    Waveforms(3, 4);
    /// Does the header carry 64-bit point counts?
    LargeFiles(4);
    /// Can extended variable length records be referenced from the header?
    Evlrs(4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!("Evlrs", Evlrs::name());
        assert_eq!("LargeFiles", LargeFiles::name());
    }
}
