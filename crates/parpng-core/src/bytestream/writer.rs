/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::mem::size_of;

use crate::bytestream::{ByteIoError, ByteSink};

/// Encapsulates a byte sink with support for endian aware writes
/// and a count of the bytes that made it into the sink
pub struct SinkWriter<T: ByteSink> {
    inner:         T,
    bytes_written: usize
}

impl<T: ByteSink> SinkWriter<T> {
    /// Create a new writer for the sink
    pub fn new(sink: T) -> SinkWriter<T> {
        SinkWriter {
            inner:         sink,
            bytes_written: 0
        }
    }

    /// Write all bytes of `buf` into the sink
    ///
    /// # Example
    /// ```
    /// use parpng_core::bytestream::SinkWriter;
    /// let mut out = vec![];
    /// let mut writer = SinkWriter::new(&mut out);
    /// writer.write_all(b"IHDR").unwrap();
    /// assert_eq!(writer.bytes_written(), 4);
    /// ```
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.inner.write_all_bytes(buf)?;
        self.bytes_written += buf.len();
        Ok(())
    }

    pub fn write_u8_err(&mut self, byte: u8) -> Result<(), ByteIoError> {
        self.write_all(&[byte])
    }

    /// Return the number of bytes the writer has pushed into the sink
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> Result<(), ByteIoError> {
        self.inner.flush_bytes()
    }

    /// Forward a size hint to the underlying sink
    pub fn reserve(&mut self, size: usize) -> Result<(), ByteIoError> {
        self.inner.reserve_capacity(size)
    }

    /// Destroy this writer returning the sink
    pub fn consume(self) -> T {
        self.inner
    }
}

macro_rules! write_single_type {
    ($name_be:tt,$name_le:tt,$int_type:tt) => {
        impl<T: ByteSink> SinkWriter<T> {
            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying sink cannot support a ",stringify!($int_type)," write.")]
            #[inline]
            pub fn $name_be(&mut self, byte: $int_type) -> Result<(), ByteIoError> {
                const SIZE: usize = size_of::<$int_type>();
                let bytes: [u8; SIZE] = byte.to_be_bytes();
                self.write_all(&bytes)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying sink cannot support a ",stringify!($int_type)," write.")]
            #[inline]
            pub fn $name_le(&mut self, byte: $int_type) -> Result<(), ByteIoError> {
                const SIZE: usize = size_of::<$int_type>();
                let bytes: [u8; SIZE] = byte.to_le_bytes();
                self.write_all(&bytes)
            }
        }
    };
}

write_single_type!(write_u64_be_err, write_u64_le_err, u64);
write_single_type!(write_u32_be_err, write_u32_le_err, u32);
write_single_type!(write_u16_be_err, write_u16_le_err, u16);
