use crate::Bounds;

/// Running totals over the points that have been written.
///
/// Updated once per accepted point and read once, when the header is rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    bounds: Option<Bounds>,
    count: u64,
    points_by_return: [u64; 15],
}

impl Summary {
    /// Adds one point to the summary.
    ///
    /// Return numbers outside of 1 through 15 are counted but not binned.
    ///
    /// # Examples
    ///
    /// ```
    /// use las_writer::Summary;
    /// let mut summary = Summary::default();
    /// summary.add_point(1., 2., 3., 1);
    /// summary.add_point(4., 5., 6., 2);
    /// assert_eq!(2, summary.count());
    /// assert_eq!(4., summary.bounds().unwrap().max().x);
    /// ```
    pub fn add_point(&mut self, x: f64, y: f64, z: f64, return_number: u8) {
        match &mut self.bounds {
            Some(bounds) => bounds.grow_point(x, y, z),
            None => self.bounds = Some(Bounds::from_point(x, y, z)),
        }
        self.count += 1;
        if (1..=15).contains(&return_number) {
            self.points_by_return[usize::from(return_number) - 1] += 1;
        }
    }

    /// The bounds of every point added, or `None` if there are no points.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// The number of points added.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The number of points per return number, starting with the first return.
    pub fn points_by_return(&self) -> &[u64; 15] {
        &self.points_by_return
    }
}
