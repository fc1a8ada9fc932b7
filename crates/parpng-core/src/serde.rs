/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![cfg(feature = "serde")]

use serde::ser::*;

use crate::bit_depth::BitDepth;
use crate::colorspace::ColorSpace;
use crate::options::{CompressionLevel, FilterMode, FilterType, Strategy};

macro_rules! serialize_by_name {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer
                {
                    // serialization is simply the debug value
                    serializer.collect_str(&format_args!("{:?}", self))
                }
            }
        )*
    };
}

serialize_by_name!(
    ColorSpace,
    BitDepth,
    CompressionLevel,
    Strategy,
    FilterType,
    FilterMode
);
