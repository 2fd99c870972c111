/// A value for each of the three spatial axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector<T> {
    /// X
    pub x: T,
    /// Y
    pub y: T,
    /// Z
    pub z: T,
}

impl<T: Copy> Vector<T> {
    /// Creates a vector with the same value on every axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Vector;
    /// let vector = Vector::splat(0.01);
    /// assert_eq!(0.01, vector.z);
    /// ```
    pub fn splat(value: T) -> Vector<T> {
        Vector {
            x: value,
            y: value,
            z: value,
        }
    }

    /// Applies a function to each axis, producing a new vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Vector;
    /// let vector = Vector::from((1, 2, 3)).map(|n| n * 2);
    /// assert_eq!(Vector::from((2, 4, 6)), vector);
    /// ```
    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Vector<U> {
        Vector {
            x: f(self.x),
            y: f(self.y),
            z: f(self.z),
        }
    }
}

impl<T> From<(T, T, T)> for Vector<T> {
    fn from((x, y, z): (T, T, T)) -> Vector<T> {
        Vector { x, y, z }
    }
}
