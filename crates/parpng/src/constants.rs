/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// The eight byte signature every png starts with
pub const PNG_SIGNATURE: u64 = u64::from_be_bytes([137, 80, 78, 71, 13, 10, 26, 10]);

/// Largest payload placed in a single IDAT chunk
pub const MAX_IDAT_LEN: usize = 1 << 20;

/// Largest width or height a png may declare
pub const MAX_DIMENSION: u32 = (1 << 31) - 1;

/// Longest keyword allowed in text chunks
pub const MAX_KEYWORD_LEN: usize = 79;
