use crate::{Error, Result};
use std::fmt;

/// A scale and an offset that transforms xyz coordinates.
///
/// Las files store coordinates as `i32`s: `value = record * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,
    /// The offset.
    pub offset: f64,
}

impl Transform {
    /// Creates a new transform, checking that the scale can be used to quantize values.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Transform;
    /// assert!(Transform::new(0.01, 0.).is_ok());
    /// assert!(Transform::new(0., 0.).is_err());
    /// ```
    pub fn new(scale: f64, offset: f64) -> Result<Transform> {
        let transform = Transform { scale, offset };
        transform.validate()?;
        Ok(transform)
    }

    /// Returns an error if this transform's scale is zero or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.scale == 0. || !self.scale.is_finite() {
            Err(Error::InvalidScale(self.scale))
        } else {
            Ok(())
        }
    }

    /// Applies this transform to an i32, returning a float.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1));
    /// ```
    pub fn direct(&self, n: i32) -> f64 {
        self.scale * f64::from(n) + self.offset
    }

    /// Applies the inverse transform, rounding half away from zero.
    ///
    /// Returns an error if the resultant value can't be represented as an i32.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1, transform.inverse(2.9).unwrap());
    /// assert_eq!(2, transform.inverse(4.).unwrap());
    /// assert_eq!(-2, transform.inverse(-2.).unwrap());
    /// ```
    pub fn inverse(&self, n: f64) -> Result<i32> {
        let n = ((n - self.offset) / self.scale).round();
        if n.is_nan() || n > f64::from(i32::MAX) || n < f64::from(i32::MIN) {
            Err(Error::InverseTransform {
                value: n,
                transform: *self,
            })
        } else {
            Ok(n as i32)
        }
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: 0.01,
            offset: 0.,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{} * x + {}`", self.scale, self.offset)
    }
}
