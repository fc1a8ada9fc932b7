/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Png scanline filters
//!
//! Every filter predicts a byte from its neighbours `bpp` bytes to
//! the left (`a`), directly above (`b`) and above left (`c`), and stores
//! the difference. Bytes left of the row start and the row above the
//! first row read as zero.
pub use parpng_core::options::FilterType;

pub use crate::filters::select::{filter_cost, FilterSelector};

pub mod select;

/// A filtered scanline
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FilteredRow<'a> {
    /// Filter used, written as the prefix byte of the row
    pub filter:  FilterType,
    /// Filtered bytes, as long as the raw row
    pub payload: &'a [u8]
}

impl FilteredRow<'_> {
    /// Append the prefix byte and the payload to `out`
    pub fn write_into(&self, out: &mut Vec<u8>) {
        out.push(self.filter.to_int());
        out.extend_from_slice(self.payload);
    }
}

/// Filter `current` into `out` with `filter`
///
/// `previous` must be as long as `current`, pass a zeroed row for
/// the first row of an image. `out` receives exactly `current.len()`
/// bytes, the filter type prefix is not written.
pub fn filter_scanline(
    current: &[u8], previous: &[u8], out: &mut [u8], filter: FilterType, bpp: usize
) {
    debug_assert_eq!(current.len(), previous.len());
    debug_assert_eq!(current.len(), out.len());

    let lead = bpp.min(current.len());

    match filter {
        FilterType::None => out.copy_from_slice(current),
        FilterType::Sub => {
            out[..lead].copy_from_slice(&current[..lead]);

            for ((o, &x), &a) in out[lead..]
                .iter_mut()
                .zip(&current[lead..])
                .zip(current)
            {
                *o = x.wrapping_sub(a);
            }
        }
        FilterType::Up => {
            for ((o, &x), &b) in out.iter_mut().zip(current).zip(previous) {
                *o = x.wrapping_sub(b);
            }
        }
        FilterType::Average => {
            for i in 0..lead {
                out[i] = current[i].wrapping_sub(previous[i] >> 1);
            }
            for (((o, &x), &a), &b) in out[lead..]
                .iter_mut()
                .zip(&current[lead..])
                .zip(current)
                .zip(&previous[lead..])
            {
                // needs nine bits of precision
                let avg = ((u16::from(a) + u16::from(b)) >> 1) as u8;
                *o = x.wrapping_sub(avg);
            }
        }
        FilterType::Paeth => {
            // with a and c zero the predictor is always b
            for i in 0..lead {
                out[i] = current[i].wrapping_sub(previous[i]);
            }
            for ((((o, &x), &a), &b), &c) in out[lead..]
                .iter_mut()
                .zip(&current[lead..])
                .zip(current)
                .zip(&previous[lead..])
                .zip(previous)
            {
                *o = x.wrapping_sub(paeth(a, b, c));
            }
        }
    }
}

/// Filter a single row into a fresh buffer
pub fn filter_row(current: &[u8], previous: &[u8], filter: FilterType, bpp: usize) -> Vec<u8> {
    let mut out = vec![0; current.len()];
    filter_scanline(current, previous, &mut out, filter, bpp);
    out
}

#[inline(always)]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let a = i16::from(a);
    let b = i16::from(b);
    let c = i16::from(c);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        return a as u8;
    }
    if pb <= pc {
        return b as u8;
    }
    c as u8
}

#[cfg(test)]
mod tests {
    use super::{filter_row, paeth, FilterType};

    /// Undo a filter, straight from the png reconstruction rules
    fn unfilter(filtered: &[u8], previous: &[u8], filter: FilterType, bpp: usize) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::with_capacity(filtered.len());

        for (i, &x) in filtered.iter().enumerate() {
            let a = if i >= bpp { out[i - bpp] } else { 0 };
            let b = previous[i];
            let c = if i >= bpp { previous[i - bpp] } else { 0 };

            let pred = match filter {
                FilterType::None => 0,
                FilterType::Sub => a,
                FilterType::Up => b,
                FilterType::Average => ((u16::from(a) + u16::from(b)) / 2) as u8,
                FilterType::Paeth => paeth(a, b, c)
            };
            out.push(x.wrapping_add(pred));
        }
        out
    }

    #[test]
    fn filters_are_reversible() {
        let previous: Vec<u8> = (0..48_u32).map(|x| (x * 37 % 256) as u8).collect();
        let current: Vec<u8> = (0..48_u32).map(|x| (x * 91 % 253) as u8).collect();

        for bpp in [1, 2, 3, 4, 6, 8] {
            for filter in FilterType::ALL {
                let filtered = filter_row(&current, &previous, filter, bpp);
                let restored = unfilter(&filtered, &previous, filter, bpp);

                assert_eq!(restored, current, "{filter:?} bpp {bpp}");
            }
        }
    }

    #[test]
    fn sub_of_constant_row() {
        let current = [9, 8, 7, 9, 8, 7, 9, 8, 7];
        let filtered = filter_row(&current, &[0; 9], FilterType::Sub, 3);

        assert_eq!(filtered, [9, 8, 7, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn rows_shorter_than_a_pixel() {
        // a single pixel row, everything is in the leading part
        let filtered = filter_row(&[200, 100], &[10, 20], FilterType::Paeth, 2);
        assert_eq!(filtered, [190, 80]);

        let filtered = filter_row(&[200, 100], &[10, 20], FilterType::Average, 2);
        assert_eq!(filtered, [195, 90]);
    }

    #[test]
    fn paeth_tie_order() {
        // p = a + b - c, ties prefer a then b
        assert_eq!(paeth(10, 10, 10), 10);
        assert_eq!(paeth(1, 5, 3), 3);
        assert_eq!(paeth(5, 1, 0), 5);
        assert_eq!(paeth(0, 7, 0), 7);
    }
}
