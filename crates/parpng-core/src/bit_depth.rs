/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image bit depth information

/// The image bit depth.
///
/// PNG supports lower depths for grayscale and palette images
/// but the encoder only deals with byte aligned samples, so only
/// eight and sixteen bit samples are representable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum BitDepth {
    /// Eight bit depth.
    ///
    /// Each sample occupies one byte
    #[default]
    Eight,
    /// Sixteen bit depth
    ///
    /// Each sample occupies two bytes, stored in big endian
    /// order inside the pixel buffer handed to the encoder.
    Sixteen
}

impl BitDepth {
    /// Create a bit depth from the number of bits per sample
    ///
    /// Returns `None` for anything other than 8 or 16
    ///
    /// # Example
    /// ```
    /// use parpng_core::bit_depth::BitDepth;
    /// assert_eq!(BitDepth::from_bits(16), Some(BitDepth::Sixteen));
    /// assert_eq!(BitDepth::from_bits(4), None);
    /// ```
    pub const fn from_bits(bits: u8) -> Option<BitDepth> {
        match bits {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            _ => None
        }
    }

    /// Size of a single sample in bytes
    pub const fn size_of(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2
        }
    }

    /// Number of bits in a single sample, as written in the IHDR chunk
    pub const fn bit_size(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16
        }
    }

    /// Get the max value supported by the bit depth
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Eight => (1 << 8) - 1,
            Self::Sixteen => u16::MAX
        }
    }
}
