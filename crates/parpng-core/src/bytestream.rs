/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Byte sinks for encoders
//!
//! The encoder never writes to a `std::io::Write` directly, instead
//! it goes through [`ByteSink`] which is implemented for in memory
//! buffers and for any writer wrapped in [`WriteSink`].
//!
//! [`SinkWriter`] sits on top of a sink and adds endian aware
//! writes plus a running count of bytes written.
use core::fmt::{Debug, Display, Formatter};

pub use crate::bytestream::std_writer::WriteSink;
pub use crate::bytestream::traits::ByteSink;
pub use crate::bytestream::writer::SinkWriter;

mod std_writer;
mod traits;
mod writer;

/// Errors raised by a [`ByteSink`]
pub enum ByteIoError {
    /// The underlying writer failed
    StdIoError(std::io::Error),
    /// A fixed size buffer ran out of space
    ///
    /// Contains (space left, bytes requested)
    NotEnoughBuffer(usize, usize),
    /// The sink refused to take any bytes
    ZeroWrite,
    Generic(&'static str)
}

impl Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteIoError::StdIoError(err) => {
                writeln!(f, "Underlying I/O error {}", err)
            }
            ByteIoError::NotEnoughBuffer(left, requested) => {
                writeln!(
                    f,
                    "Not enough buffer to write {requested} bytes, buffer has {left} bytes left"
                )
            }
            ByteIoError::ZeroWrite => {
                writeln!(f, "Sink accepted zero bytes")
            }
            ByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

impl Display for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ByteIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ByteIoError::StdIoError(err) => Some(err),
            _ => None
        }
    }
}

impl From<std::io::Error> for ByteIoError {
    fn from(value: std::io::Error) -> Self {
        ByteIoError::StdIoError(value)
    }
}

impl From<&'static str> for ByteIoError {
    fn from(value: &'static str) -> Self {
        ByteIoError::Generic(value)
    }
}
