use crate::Vector;

/// Minimum and maximum bounds in three dimensions.
///
/// A `Bounds` is never inverted: on every axis, `min <= max`. Growing keeps that true, and
/// clipping two boxes that don't overlap produces no bounds at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    min: Vector<f64>,
    max: Vector<f64>,
}

impl Bounds {
    /// Creates bounds from two corners, ordering each axis so that min <= max.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::{Bounds, Vector};
    /// let bounds = Bounds::new(Vector::from((10., 0., 0.)), Vector::from((0., 10., 10.)));
    /// assert_eq!(0., bounds.min().x);
    /// assert_eq!(10., bounds.max().x);
    /// ```
    pub fn new(a: Vector<f64>, b: Vector<f64>) -> Bounds {
        Bounds {
            min: Vector {
                x: a.x.min(b.x),
                y: a.y.min(b.y),
                z: a.z.min(b.z),
            },
            max: Vector {
                x: a.x.max(b.x),
                y: a.y.max(b.y),
                z: a.z.max(b.z),
            },
        }
    }

    /// Creates zero-volume bounds around a single point.
    pub fn from_point(x: f64, y: f64, z: f64) -> Bounds {
        let point = Vector { x, y, z };
        Bounds {
            min: point,
            max: point,
        }
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vector<f64> {
        self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vector<f64> {
        self.max
    }

    /// Grows the bounds to encompass this point in xyz space.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Bounds;
    /// let mut bounds = Bounds::from_point(1., 2., 3.);
    /// bounds.grow_point(0., 5., 3.);
    /// assert_eq!(0., bounds.min().x);
    /// assert_eq!(5., bounds.max().y);
    /// ```
    pub fn grow_point(&mut self, x: f64, y: f64, z: f64) {
        if x < self.min.x {
            self.min.x = x;
        }
        if y < self.min.y {
            self.min.y = y;
        }
        if z < self.min.z {
            self.min.z = z;
        }
        if x > self.max.x {
            self.max.x = x;
        }
        if y > self.max.y {
            self.max.y = y;
        }
        if z > self.max.z {
            self.max.z = z;
        }
    }

    /// Grows the bounds to encompass other bounds.
    pub fn grow(&mut self, other: &Bounds) {
        self.grow_point(other.min.x, other.min.y, other.min.z);
        self.grow_point(other.max.x, other.max.y, other.max.z);
    }

    /// Returns the intersection of these bounds with other bounds.
    ///
    /// Returns `None` if the two boxes don't overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::{Bounds, Vector};
    /// let a = Bounds::new(Vector::splat(0.), Vector::splat(10.));
    /// let b = Bounds::new(Vector::splat(20.), Vector::splat(30.));
    /// assert!(a.clip(&b).is_none());
    /// ```
    pub fn clip(&self, other: &Bounds) -> Option<Bounds> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Bounds {
            min: Vector {
                x: self.min.x.max(other.min.x),
                y: self.min.y.max(other.min.y),
                z: self.min.z.max(other.min.z),
            },
            max: Vector {
                x: self.max.x.min(other.max.x),
                y: self.max.y.min(other.max.y),
                z: self.max.z.min(other.max.z),
            },
        })
    }

    /// Returns true if the two boxes share at least one point.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// Returns true if the other box lies entirely inside this one.
    pub fn contains(&self, other: &Bounds) -> bool {
        self.min.x <= other.min.x
            && other.max.x <= self.max.x
            && self.min.y <= other.min.y
            && other.max.y <= self.max.y
            && self.min.z <= other.min.z
            && other.max.z <= self.max.z
    }
}
