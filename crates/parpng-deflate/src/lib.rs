/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A deflate compressor built for parallel encoders
//!
//! Besides producing ordinary raw deflate and zlib streams, the encoder
//! can produce *segments*: independently compressed pieces of a larger
//! stream. A segment starts with an empty dictionary and, unless it is
//! the last one, ends with a sync marker (an empty stored block) so it
//! finishes on a byte boundary without setting `BFINAL`.
//!
//! Concatenating segments in order therefore yields a single valid deflate
//! stream, which lets callers compress pieces of their input on separate
//! threads. The zlib trailer of such a stream is obtained by combining the
//! per-segment Adler-32 values with [`adler32_combine`].
//!
//! # Example
//! ```
//! use parpng_deflate::{DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy};
//!
//! let data = vec![7_u8; 1000];
//! let options = DeflateEncodingOptions::default()
//!     .set_level(6)
//!     .set_strategy(DeflateEncodingStrategy::Rle);
//!
//! let zlib = DeflateEncoder::new_with_options(&data, options).encode_zlib();
//! assert!(zlib.len() < data.len());
//! ```
pub use crate::encoder::{DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy};
#[cfg(feature = "zlib")]
pub use crate::utils::calc_adler_hash;
pub use crate::utils::adler32_combine;

mod bitstream;
mod constants;
mod encoder;
mod huffman;
mod matcher;
mod utils;
