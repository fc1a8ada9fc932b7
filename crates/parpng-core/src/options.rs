/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoder options
//!
//! This module exposes the options struct consumed by the png encoder
//! together with the enums describing compression effort, compressor
//! strategy and row filter selection.
pub use encoder::{
    CompressionLevel, EncoderOptions, FilterMode, FilterType, Strategy, DEFAULT_CHUNK_SIZE,
    MIN_CHUNK_SIZE
};

mod encoder;
