/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Write;

use crate::bytestream::{ByteIoError, ByteSink};

/// Adapter turning any [`Write`] implementation into a [`ByteSink`]
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use parpng_core::bytestream::{ByteSink, WriteSink};
///
/// let mut sink = WriteSink::new(Cursor::new(Vec::new()));
/// sink.write_all_bytes(b"PNG").unwrap();
/// assert_eq!(sink.into_inner().into_inner(), b"PNG");
/// ```
pub struct WriteSink<W: Write> {
    inner: W
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> WriteSink<W> {
        WriteSink { inner }
    }

    /// Destroy this sink returning the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> ByteSink for WriteSink<W> {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        self.inner.write(buf).map_err(ByteIoError::StdIoError)
    }

    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.inner.write_all(buf).map_err(|err| {
            if err.kind() == std::io::ErrorKind::WriteZero {
                ByteIoError::ZeroWrite
            } else {
                ByteIoError::StdIoError(err)
            }
        })
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        self.inner.flush().map_err(ByteIoError::StdIoError)
    }
}
