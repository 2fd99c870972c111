use super::PointSink;
use crate::Result;
use std::io::{Seek, Write};

/// Writes point records straight to the stream.
pub(crate) struct RawSink<W: Write + Seek> {
    write: W,
}

impl<W: Write + Seek> RawSink<W> {
    pub(crate) fn new(write: W) -> RawSink<W> {
        RawSink { write }
    }
}

impl<W: Write + Seek + Send> PointSink<W> for RawSink<W> {
    fn write_points(&mut self, points: &[u8], _point_len: usize) -> Result<()> {
        self.write.write_all(points)?;
        Ok(())
    }

    fn into_inner(self: Box<Self>) -> W {
        self.write
    }

    fn get_mut(&mut self) -> &mut W {
        &mut self.write
    }

    fn done(&mut self) -> Result<()> {
        Ok(())
    }
}
