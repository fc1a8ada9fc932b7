/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the parpng crates
//!
//! This crate provides the small set of primitives the encoder
//! and the compressor agree on
//!
//! It currently contains
//!
//! - A byte sink trait and an endian aware writer on top of it
//! - Colorspace and bit depth information for images
//! - Encoder options, including compression level, strategy and filter choices
//!
//! # Features
//!  - `serde`: Enables serializing of the option enums present in the crate
//!
pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod options;
mod serde;
