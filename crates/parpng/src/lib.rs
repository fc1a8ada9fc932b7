/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A multi-threaded png encoder
//!
//! The image is cut into bands of rows. Bands are filtered and compressed
//! on a pool of worker threads, each band into its own deflate segment with
//! a fresh dictionary, and the segments are joined in order into a single
//! zlib stream. Band boundaries depend only on the image and the options,
//! so the output is the same byte for byte whatever the number of threads.
//!
//! # Features
//! - 8 and 16 bit images with one to four channels
//! - Adaptive per row filtering or a fixed filter
//! - zlib style compression strategies and levels
//! - gAMA, eXIf, iTXt and custom ancillary chunks
//!
//! # Usage
//!
//! ```
//! use parpng::{encode_to_vec, ImageDescriptor};
//! use parpng_core::options::{CompressionLevel, EncoderOptions, Strategy};
//!
//! let (width, height) = (64, 32);
//! let pixels: Vec<u8> = (0..width * height * 4).map(|x| (x % 251) as u8).collect();
//!
//! let options = EncoderOptions::default()
//!     .set_compression_level(CompressionLevel::High)
//!     .set_strategy(Strategy::Filtered)
//!     .set_num_threads(4);
//!
//! let png = encode_to_vec(&pixels, ImageDescriptor::new(width, height, 8, 4), options).unwrap();
//! assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
//! ```
//!
//! # 16 bit images
//!
//! Png stores samples in big endian. [`encode_png`] expects the buffer to
//! already be in that order, [`encode_u16_png`] takes native `u16` samples
//! and does the conversion.
pub use parpng_core;

pub use crate::assembler::ChunkRecord;
pub use crate::encoder::{encode_png, encode_to_vec, encode_u16_png, EncodeState, PngEncoder};
pub use crate::error::PngEncodeErrors;
pub use crate::pool::WorkerPool;
pub use crate::raster::{ImageDescriptor, RasterView};

mod assembler;
mod band;
mod compress;
mod constants;
mod crc;
mod encoder;
mod error;
pub mod filters;
mod headers;
mod pool;
mod raster;
