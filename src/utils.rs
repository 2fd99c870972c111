//! Fixed-width string fields.

/// Copies a string into a nul-filled fixed-width las field.
///
/// Las strings are ASCII and nul filled. Strings longer than the field are truncated.
pub(crate) trait FromLasStr {
    fn from_las_str(&mut self, s: &str);
}

impl FromLasStr for [u8] {
    fn from_las_str(&mut self, s: &str) {
        self.fill(0);
        let bytes = s.as_bytes();
        let n = bytes.len().min(self.len());
        self[..n].copy_from_slice(&bytes[..n]);
    }
}

/// Returns a fixed-width las field holding `s`.
pub(crate) fn las_string<const N: usize>(s: &str) -> [u8; N] {
    let mut field = [0; N];
    field.from_las_str(s);
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_nul() {
        let field: [u8; 8] = las_string("LiDAR");
        assert_eq!(b"LiDAR\0\0\0", &field);
    }

    #[test]
    fn truncates() {
        let field: [u8; 4] = las_string("LiDAR");
        assert_eq!(b"LiDA", &field);
    }

    #[test]
    fn refill_clears_old_bytes() {
        let mut field = [b'x'; 6];
        field.from_las_str("ab");
        assert_eq!(b"ab\0\0\0\0", &field);
    }
}
