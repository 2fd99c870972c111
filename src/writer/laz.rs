use super::PointSink;
use crate::{Error, Result};
use ::laz::{LasZipCompressor, LazVlr};
use std::{
    fmt::Display,
    io::{Seek, Write},
};

/// Hands point records to a laszip compressor.
pub(crate) struct CompressedSink<W: Write + Seek + Send + 'static> {
    compressor: LasZipCompressor<'static, W>,
}

impl<W: Write + Seek + Send + 'static> CompressedSink<W> {
    /// Opens the compressor at the stream's current position.
    ///
    /// The chunk table offset is reserved right away, so a file without points is still valid.
    pub(crate) fn new(write: W, vlr: LazVlr) -> Result<CompressedSink<W>> {
        let mut compressor =
            LasZipCompressor::new(write, vlr).map_err(|err| compressor_error("opening", err))?;
        compressor
            .reserve_offset_to_chunk_table()
            .map_err(|err| compressor_error("opening", err))?;
        Ok(CompressedSink { compressor })
    }
}

impl<W: Write + Seek + Send + 'static> PointSink<W> for CompressedSink<W> {
    fn write_points(&mut self, points: &[u8], point_len: usize) -> Result<()> {
        for point in points.chunks_exact(point_len) {
            self.compressor
                .compress_one(point)
                .map_err(|err| compressor_error("writing point to", err))?;
        }
        Ok(())
    }

    fn into_inner(self: Box<Self>) -> W {
        self.compressor.into_inner()
    }

    fn get_mut(&mut self) -> &mut W {
        self.compressor.get_mut()
    }

    fn done(&mut self) -> Result<()> {
        self.compressor
            .done()
            .map_err(|err| compressor_error("closing", err))
    }
}

fn compressor_error<E: Display>(operation: &'static str, err: E) -> Error {
    Error::Compressor {
        operation,
        message: err.to_string(),
    }
}
