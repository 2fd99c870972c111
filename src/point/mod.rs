//! Point formats and point record encoding.

mod encoder;
mod format;

pub use encoder::{PointEncoder, ReturnWarnings};
pub use format::Format;
