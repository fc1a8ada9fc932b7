/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Splitting an image into row bands and filtering them
//!
//! Band boundaries only depend on the image geometry and the options,
//! never on how many threads run, which keeps the output identical
//! for any pool size.

use log::trace;
use parpng_core::options::EncoderOptions;

use crate::filters::FilterSelector;
use crate::raster::RasterView;

/// A run of consecutive rows compressed as one deflate segment
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Band {
    pub index:     usize,
    pub start_row: usize,
    pub row_count: usize,
    /// Filtered rows, each prefixed with its filter type byte
    pub filtered:  Vec<u8>
}

/// Number of rows per band for an image with rows of `row_bytes` bytes
///
/// A band holds as many filtered rows as fit in the chunk size, at
/// least one, unless a fixed row count was requested.
pub fn rows_per_band(row_bytes: usize, options: &EncoderOptions) -> usize {
    match options.band_rows() {
        Some(rows) => rows.max(1),
        None => (options.chunk_size() / (row_bytes + 1)).max(1)
    }
}

/// Split `height` rows into bands, filtered data is left empty
pub fn partition(height: usize, row_bytes: usize, options: &EncoderOptions) -> Vec<Band> {
    let rows = rows_per_band(row_bytes, options);

    let bands: Vec<Band> = (0..height)
        .step_by(rows)
        .enumerate()
        .map(|(index, start_row)| Band {
            index,
            start_row,
            row_count: rows.min(height - start_row),
            filtered: Vec::new()
        })
        .collect();

    trace!(
        "Split {height} rows into {} bands of up to {rows} rows",
        bands.len()
    );
    bands
}

impl Band {
    /// Filter every row of this band
    ///
    /// The row above the band is read from the raster so the result does
    /// not depend on any other band being processed first.
    pub fn filter(&mut self, raster: &RasterView, selector: &mut FilterSelector) {
        let row_bytes = raster.row_bytes();
        let zero_row = vec![0; row_bytes];

        self.filtered.clear();
        self.filtered.reserve_exact(self.row_count * (row_bytes + 1));

        let mut previous: &[u8] = if self.start_row == 0 {
            &zero_row
        } else {
            raster.pixels(self.start_row - 1)
        };

        for y in self.start_row..self.start_row + self.row_count {
            let current = raster.pixels(y);

            selector
                .filter(current, previous)
                .write_into(&mut self.filtered);

            previous = current;
        }
    }
}
