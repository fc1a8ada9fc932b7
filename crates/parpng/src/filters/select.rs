/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per row filter selection

use parpng_core::options::{FilterMode, FilterType, Strategy};

use crate::filters::{filter_scanline, FilteredRow};

/// Sum of the filtered bytes read as signed values
///
/// The usual minimum sum of absolute differences heuristic, small
/// signed values compress well.
#[inline]
pub fn filter_cost(filtered: &[u8]) -> u64 {
    filtered
        .iter()
        .map(|&b| u64::from((b as i8).unsigned_abs()))
        .sum()
}

/// Chooses and applies filters row by row
///
/// Holds one scratch row per filter so trying all five filters does
/// not allocate. Each worker owns its own selector.
pub struct FilterSelector {
    mode:    FilterMode,
    bpp:     usize,
    scratch: [Vec<u8>; 5]
}

impl FilterSelector {
    pub fn new(strategy: Strategy, mode: FilterMode, bpp: usize, row_bytes: usize) -> FilterSelector {
        // rows the compressor will not match across are left alone
        let mode = match mode {
            FilterMode::Adaptive if strategy.skips_filtering() => {
                FilterMode::Fixed(FilterType::None)
            }
            mode => mode
        };
        FilterSelector {
            mode,
            bpp,
            scratch: core::array::from_fn(|_| vec![0; row_bytes])
        }
    }

    /// Filter `current` given the raw row above it
    ///
    /// `previous` is all zeroes for the first row of the image. In adaptive
    /// mode the filter with the lowest [`filter_cost`] wins, ties go
    /// to the filter listed first in [`FilterType::ALL`].
    pub fn filter<'s>(&'s mut self, current: &[u8], previous: &[u8]) -> FilteredRow<'s> {
        let filter = match self.mode {
            FilterMode::Fixed(filter) => {
                let out = &mut self.scratch[usize::from(filter.to_int())];
                filter_scanline(current, previous, out, filter, self.bpp);
                filter
            }
            FilterMode::Adaptive => {
                let mut best = FilterType::None;
                let mut best_cost = u64::MAX;

                for filter in FilterType::ALL {
                    let out = &mut self.scratch[usize::from(filter.to_int())];
                    filter_scanline(current, previous, out, filter, self.bpp);

                    let cost = filter_cost(out);
                    if cost < best_cost {
                        best = filter;
                        best_cost = cost;
                    }
                }
                best
            }
        };
        FilteredRow {
            filter,
            payload: &self.scratch[usize::from(filter.to_int())]
        }
    }
}

#[cfg(test)]
mod tests {
    use parpng_core::options::{FilterMode, FilterType, Strategy};

    use super::{filter_cost, FilterSelector};
    use crate::filters::filter_row;

    #[test]
    fn cost_reads_bytes_as_signed() {
        assert_eq!(filter_cost(&[0, 1, 255, 128, 127]), 1 + 1 + 128 + 127);
    }

    #[test]
    fn huffman_and_rle_skip_filtering() {
        for strategy in [Strategy::Huffman, Strategy::Rle] {
            let mut selector = FilterSelector::new(strategy, FilterMode::Adaptive, 1, 4);
            // Up would give all zeroes here
            let row = selector.filter(&[5, 6, 7, 8], &[5, 6, 7, 8]);
            assert_eq!(row.filter, FilterType::None);
            assert_eq!(row.payload, &[5, 6, 7, 8]);
        }
    }

    #[test]
    fn fixed_filter_always_used() {
        let mut selector =
            FilterSelector::new(Strategy::Huffman, FilterMode::Fixed(FilterType::Up), 1, 3);
        let row = selector.filter(&[3, 3, 3], &[1, 2, 3]);

        assert_eq!(row.filter, FilterType::Up);
        assert_eq!(row.payload, &[2, 1, 0]);
    }

    #[test]
    fn ties_prefer_lower_filter() {
        // a zero row costs nothing under every filter
        let mut selector = FilterSelector::new(Strategy::Default, FilterMode::Adaptive, 3, 6);
        assert_eq!(selector.filter(&[0; 6], &[0; 6]).filter, FilterType::None);

        // identical rows: Up and Paeth both give zeroes, Up comes first
        let row = [10, 20, 30, 40, 50, 60];
        assert_eq!(selector.filter(&row, &row).filter, FilterType::Up);
    }

    #[test]
    fn adaptive_picks_minimum_cost() {
        let previous: Vec<u8> = (0..64_u32).map(|x| (x * 13 % 256) as u8).collect();
        let current: Vec<u8> = (0..64_u32).map(|x| (x * 4 + 9) as u8).collect();

        let mut selector = FilterSelector::new(Strategy::Filtered, FilterMode::Adaptive, 4, 64);
        let chosen = selector.filter(&current, &previous);

        let costs: Vec<u64> = FilterType::ALL
            .iter()
            .map(|&f| filter_cost(&filter_row(&current, &previous, f, 4)))
            .collect();
        let min = *costs.iter().min().unwrap();

        assert_eq!(filter_cost(chosen.payload), min);
        assert_eq!(costs[usize::from(chosen.filter.to_int())], min);
    }
}
