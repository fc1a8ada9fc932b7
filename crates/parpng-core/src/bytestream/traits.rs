/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::bytestream::ByteIoError;

/// The writer trait implemented for the parpng encoders
///
/// Anything that implements this trait can be used as a sink
/// for writing encoded images.
///
/// Writes are strictly sequential, the encoder never seeks back.
pub trait ByteSink {
    /// Write some bytes into the sink returning number of bytes written or
    /// an error if something bad happened
    ///
    /// An implementation is free to write less bytes than are in buf,
    /// returning `Ok(0)` for a non-empty buffer signals that the sink
    /// cannot accept more data
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError>;

    /// Write all bytes to the sink or return an error if something occurred
    ///
    /// The default implementation loops on [`write_bytes`](Self::write_bytes)
    /// and errors out with [`ByteIoError::ZeroWrite`] if the sink stops
    /// making progress
    fn write_all_bytes(&mut self, mut buf: &[u8]) -> Result<(), ByteIoError> {
        while !buf.is_empty() {
            let written = self.write_bytes(buf)?;
            if written == 0 {
                return Err(ByteIoError::ZeroWrite);
            }
            buf = &buf[written.min(buf.len())..];
        }
        Ok(())
    }

    /// Ensure bytes are written to the sink.
    fn flush_bytes(&mut self) -> Result<(), ByteIoError>;

    /// A hint to tell the implementation how big of a size we expect the image to be
    ///
    /// This is just a hint, akin to calling `Vec::reserve` and should be treated as such.
    fn reserve_capacity(&mut self, _size: usize) -> Result<(), ByteIoError> {
        Ok(())
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        (**self).write_bytes(buf)
    }

    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        (**self).write_all_bytes(buf)
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        (**self).flush_bytes()
    }

    fn reserve_capacity(&mut self, size: usize) -> Result<(), ByteIoError> {
        (**self).reserve_capacity(size)
    }
}

impl ByteSink for &mut Vec<u8> {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.extend_from_slice(buf);
        Ok(())
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        Ok(())
    }

    fn reserve_capacity(&mut self, size: usize) -> Result<(), ByteIoError> {
        self.reserve(size);
        Ok(())
    }
}

impl ByteSink for &mut [u8] {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        let amt = core::cmp::min(buf.len(), self.len());
        let (a, b) = core::mem::take(self).split_at_mut(amt);
        a.copy_from_slice(&buf[..amt]);
        *self = b;
        Ok(amt)
    }

    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        if buf.len() > self.len() {
            return Err(ByteIoError::NotEnoughBuffer(self.len(), buf.len()));
        }
        let (a, b) = core::mem::take(self).split_at_mut(buf.len());
        a.copy_from_slice(buf);
        *self = b;

        Ok(())
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        Ok(())
    }
}
