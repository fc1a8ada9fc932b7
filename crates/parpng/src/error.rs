/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use parpng_core::bytestream::ByteIoError;

/// Errors that can occur while encoding a png
///
/// Validation errors (`InvalidLayout`, `InvalidConfig` and `InvalidChunk`)
/// are always reported before a single byte reaches the sink.
pub enum PngEncodeErrors {
    /// The image description does not match the pixel buffer
    InvalidLayout(String),
    /// The encoder options are inconsistent
    InvalidConfig(&'static str),
    /// An ancillary chunk or text entry cannot be written
    InvalidChunk(String),
    /// The sink stopped accepting bytes
    EncodeIoError(ByteIoError),
    /// The sink returned an error
    SinkWriteError(ByteIoError),
    /// A worker thread panicked
    ///
    /// Contains the index of the band the worker was processing
    InternalWorkerFailure(usize)
}

impl Debug for PngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidLayout(reason) => writeln!(f, "Invalid image layout: {reason}"),
            Self::InvalidConfig(reason) => writeln!(f, "Invalid encoder configuration: {reason}"),
            Self::InvalidChunk(reason) => writeln!(f, "Invalid chunk: {reason}"),
            Self::EncodeIoError(err) => {
                writeln!(f, "Sink did not accept the encoded bytes: {err:?}")
            }
            Self::SinkWriteError(err) => writeln!(f, "Writing to the sink failed: {err:?}"),
            Self::InternalWorkerFailure(band) => {
                writeln!(f, "Worker panicked while processing band {band}")
            }
        }
    }
}

impl Display for PngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PngEncodeErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EncodeIoError(err) | Self::SinkWriteError(err) => Some(err),
            _ => None
        }
    }
}

impl From<ByteIoError> for PngEncodeErrors {
    fn from(value: ByteIoError) -> Self {
        match value {
            ByteIoError::ZeroWrite | ByteIoError::NotEnoughBuffer(..) => Self::EncodeIoError(value),
            _ => Self::SinkWriteError(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use parpng_core::bytestream::ByteIoError;

    use super::PngEncodeErrors;

    #[test]
    fn sink_errors_are_classified() {
        let err = PngEncodeErrors::from(ByteIoError::ZeroWrite);
        assert!(matches!(err, PngEncodeErrors::EncodeIoError(_)));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = PngEncodeErrors::from(ByteIoError::from(io));
        assert!(matches!(err, PngEncodeErrors::SinkWriteError(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
