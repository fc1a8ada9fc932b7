/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Read only access to caller owned pixels

use parpng_core::bit_depth::BitDepth;
use parpng_core::colorspace::ColorSpace;

use crate::constants::MAX_DIMENSION;
use crate::error::PngEncodeErrors;

/// Geometry and sample layout of an image to encode
///
/// Rows are `row_stride` bytes apart in the pixel buffer, only the first
/// `width * channels * bit_depth / 8` bytes of each row are encoded.
/// 16 bit samples are expected in big endian order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageDescriptor {
    width:      u32,
    height:     u32,
    bit_depth:  u8,
    channels:   u8,
    row_stride: usize
}

impl ImageDescriptor {
    /// Describe a tightly packed image
    ///
    /// # Example
    /// ```
    /// use parpng::ImageDescriptor;
    ///
    /// let desc = ImageDescriptor::new(10, 4, 16, 3);
    /// assert_eq!(desc.row_stride(), 60);
    /// ```
    pub fn new(width: u32, height: u32, bit_depth: u8, channels: u8) -> ImageDescriptor {
        let row_stride = (width as usize)
            .saturating_mul(usize::from(channels))
            .saturating_mul(usize::from(bit_depth / 8));

        ImageDescriptor {
            width,
            height,
            bit_depth,
            channels,
            row_stride
        }
    }

    /// Set the distance in bytes between the starts of two rows
    pub fn set_row_stride(mut self, row_stride: usize) -> ImageDescriptor {
        self.row_stride = row_stride;
        self
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub const fn channels(&self) -> u8 {
        self.channels
    }

    pub const fn row_stride(&self) -> usize {
        self.row_stride
    }
}

/// A validated view over the pixel buffer
///
/// Creating the view checks every layout constraint, after that
/// rows can be handed out to any number of threads.
#[derive(Copy, Clone)]
pub struct RasterView<'a> {
    data:       &'a [u8],
    width:      usize,
    height:     usize,
    depth:      BitDepth,
    colorspace: ColorSpace,
    row_bytes:  usize,
    row_stride: usize
}

impl<'a> RasterView<'a> {
    /// Wrap `data` checking it matches `desc`
    ///
    /// # Errors
    /// [`PngEncodeErrors::InvalidLayout`] if the dimensions, depth or
    /// channel count are unsupported, the stride is shorter than a row,
    /// or the buffer does not hold `height * row_stride` bytes
    pub fn new(data: &'a [u8], desc: &ImageDescriptor) -> Result<RasterView<'a>, PngEncodeErrors> {
        let layout_err = |reason: String| Err(PngEncodeErrors::InvalidLayout(reason));

        if desc.width == 0 || desc.height == 0 {
            return layout_err(format!(
                "Zero sized image, width {} height {}",
                desc.width, desc.height
            ));
        }
        if desc.width > MAX_DIMENSION || desc.height > MAX_DIMENSION {
            return layout_err(format!(
                "Dimensions {}x{} exceed the png limit of {MAX_DIMENSION}",
                desc.width, desc.height
            ));
        }
        let Some(depth) = BitDepth::from_bits(desc.bit_depth) else {
            return layout_err(format!(
                "Unsupported bit depth {}, expected 8 or 16",
                desc.bit_depth
            ));
        };
        let Some(colorspace) = ColorSpace::from_num_components(desc.channels) else {
            return layout_err(format!(
                "Unsupported channel count {}, expected 1 to 4",
                desc.channels
            ));
        };
        let width = desc.width as usize;
        let height = desc.height as usize;

        let Some(row_bytes) = width
            .checked_mul(colorspace.num_components())
            .and_then(|x| x.checked_mul(depth.size_of()))
        else {
            return layout_err("Row size overflows".to_string());
        };

        if desc.row_stride < row_bytes {
            return layout_err(format!(
                "Row stride {} is smaller than a row of {row_bytes} bytes",
                desc.row_stride
            ));
        }
        let Some(expected) = desc.row_stride.checked_mul(height) else {
            return layout_err("Image size overflows".to_string());
        };
        if data.len() < expected {
            return layout_err(format!(
                "Buffer holds {} bytes, expected at least {expected}",
                data.len()
            ));
        }

        Ok(RasterView {
            data,
            width,
            height,
            depth,
            colorspace,
            row_bytes,
            row_stride: desc.row_stride
        })
    }

    /// The full `row_stride` bytes of row `i`, padding included
    ///
    /// # Panics
    /// If `i >= height`
    #[inline]
    pub fn row(&self, i: usize) -> &'a [u8] {
        assert!(i < self.height, "row {i} out of bounds");
        let start = i * self.row_stride;
        &self.data[start..start + self.row_stride]
    }

    /// The encoded bytes of row `i`, padding excluded
    #[inline]
    pub fn pixels(&self, i: usize) -> &'a [u8] {
        &self.row(i)[..self.row_bytes]
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn depth(&self) -> BitDepth {
        self.depth
    }

    pub const fn colorspace(&self) -> ColorSpace {
        self.colorspace
    }

    /// Bytes per complete pixel, the stride of the filter predictors
    pub const fn bpp(&self) -> usize {
        self.colorspace.num_components() * self.depth.size_of()
    }

    /// Bytes of pixel data in a row
    pub const fn row_bytes(&self) -> usize {
        self.row_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageDescriptor, RasterView};
    use crate::error::PngEncodeErrors;

    #[test]
    fn strided_rows() {
        let data: Vec<u8> = (0..24).collect();
        let desc = ImageDescriptor::new(2, 3, 8, 3).set_row_stride(8);
        let view = RasterView::new(&data, &desc).unwrap();

        assert_eq!(view.bpp(), 3);
        assert_eq!(view.row(1), &data[8..16]);
        assert_eq!(view.pixels(2), &[16, 17, 18, 19, 20, 21]);
    }

    #[test]
    fn rejects_bad_layouts() {
        let data = vec![0_u8; 64];
        let bad = [
            ImageDescriptor::new(4, 4, 8, 1).set_row_stride(3),
            ImageDescriptor::new(0, 4, 8, 1),
            ImageDescriptor::new(4, 4, 4, 1),
            ImageDescriptor::new(4, 4, 8, 5),
            ImageDescriptor::new(4, 4, 16, 4),
            ImageDescriptor::new(u32::MAX, 1, 8, 1)
        ];
        for desc in bad {
            assert!(
                matches!(
                    RasterView::new(&data, &desc),
                    Err(PngEncodeErrors::InvalidLayout(_))
                ),
                "{desc:?}"
            );
        }
    }

    #[test]
    fn last_row_may_not_be_short() {
        // height * row_stride bytes are required even though the
        // padding of the last row is never read
        let desc = ImageDescriptor::new(3, 2, 8, 1).set_row_stride(4);
        assert!(RasterView::new(&[0; 7], &desc).is_err());
        assert!(RasterView::new(&[0; 8], &desc).is_ok());
    }
}
