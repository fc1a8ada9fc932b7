/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image colorspace information

/// Colorspaces a png encoder can write without conversion
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColorSpace {
    /// Grayscale colorspace
    Luma,
    /// Grayscale with alpha colorspace
    LumaA,
    /// Red, Green , Blue
    RGB,
    /// Red, Green, Blue, Alpha
    RGBA
}

impl ColorSpace {
    /// Number of color channels present for a certain colorspace
    ///
    /// E.g. RGB returns 3 since it contains R,G and B colors to make up a pixel
    pub const fn num_components(&self) -> usize {
        match self {
            Self::Luma => 1,
            Self::LumaA => 2,
            Self::RGB => 3,
            Self::RGBA => 4
        }
    }

    /// Map a channel count to the colorspace a png stores it as
    ///
    /// # Example
    /// ```
    /// use parpng_core::colorspace::ColorSpace;
    /// assert_eq!(ColorSpace::from_num_components(2), Some(ColorSpace::LumaA));
    /// assert_eq!(ColorSpace::from_num_components(5), None);
    /// ```
    pub const fn from_num_components(components: u8) -> Option<ColorSpace> {
        match components {
            1 => Some(Self::Luma),
            2 => Some(Self::LumaA),
            3 => Some(Self::RGB),
            4 => Some(Self::RGBA),
            _ => None
        }
    }
}
