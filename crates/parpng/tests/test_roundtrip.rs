/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encode images with every setting and decode them with the png crate

use nanorand::Rng;
use parpng::{encode_to_vec, encode_u16_png, ImageDescriptor};
use parpng_core::options::{CompressionLevel, EncoderOptions, FilterMode, FilterType, Strategy};

const LEVELS: [CompressionLevel; 4] = [
    CompressionLevel::Fast,
    CompressionLevel::Default,
    CompressionLevel::High,
    CompressionLevel::Max
];

const STRATEGIES: [Strategy; 6] = [
    Strategy::Adaptive,
    Strategy::Default,
    Strategy::Filtered,
    Strategy::Huffman,
    Strategy::Rle,
    Strategy::Fixed
];

fn decode_ref(data: &[u8]) -> (png::OutputInfo, Vec<u8>) {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::IDENTITY);

    let mut reader = decoder.read_info().unwrap();

    // Allocate the output buffer.
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());

    (info, buf)
}

/// Smooth gradients with some noise, compresses but not trivially
fn synthetic_image(width: usize, height: usize, bytes_per_pixel: usize, seed: u64) -> Vec<u8> {
    let mut rng = nanorand::WyRand::new_seed(seed);
    let mut data = vec![0_u8; width * height * bytes_per_pixel];

    for (i, px) in data.iter_mut().enumerate() {
        let x = (i / bytes_per_pixel) % width;
        let y = i / (bytes_per_pixel * width);
        let noise: u8 = rng.generate_range(0..4);
        *px = ((x * 3 + y * 2 + (i % bytes_per_pixel) * 40) as u8).wrapping_add(noise);
    }
    data
}

#[test]
fn every_level_and_strategy() {
    let (width, height) = (67, 45);
    let pixels = synthetic_image(width, height, 3, 1);
    let desc = ImageDescriptor::new(width as u32, height as u32, 8, 3);

    for level in LEVELS {
        for strategy in STRATEGIES {
            let options = EncoderOptions::new(level, strategy).set_num_threads(2);
            let png = encode_to_vec(&pixels, desc, options).unwrap();

            let (info, decoded) = decode_ref(&png);
            assert_eq!(info.color_type, png::ColorType::Rgb);
            assert_eq!(decoded, pixels, "{level:?} {strategy:?}");
        }
    }
}

#[test]
fn every_channel_count_and_depth() {
    let color_types = [
        png::ColorType::Grayscale,
        png::ColorType::GrayscaleAlpha,
        png::ColorType::Rgb,
        png::ColorType::Rgba
    ];

    for channels in 1..=4_u8 {
        for depth in [8_u8, 16] {
            let (width, height) = (31, 23);
            let bpp = usize::from(channels) * usize::from(depth / 8);
            let pixels = synthetic_image(width, height, bpp, u64::from(channels));
            let desc = ImageDescriptor::new(width as u32, height as u32, depth, channels);

            for strategy in [Strategy::Adaptive, Strategy::Rle] {
                let options = EncoderOptions::default().set_strategy(strategy);
                let png = encode_to_vec(&pixels, desc, options).unwrap();

                let (info, decoded) = decode_ref(&png);
                assert_eq!(info.color_type, color_types[usize::from(channels) - 1]);
                assert_eq!(info.bit_depth as u8, depth);
                assert_eq!(decoded, pixels, "{channels} channels, {depth} bits");
            }
        }
    }
}

#[test]
fn every_fixed_filter() {
    let (width, height) = (40, 40);
    let pixels = synthetic_image(width, height, 4, 9);
    let desc = ImageDescriptor::new(width as u32, height as u32, 8, 4);

    for filter in FilterType::ALL {
        let options = EncoderOptions::default().set_filter(FilterMode::Fixed(filter));
        let png = encode_to_vec(&pixels, desc, options).unwrap();

        assert_eq!(decode_ref(&png).1, pixels, "{filter:?}");
    }
}

#[test]
fn single_pixel() {
    for channels in 1..=4 {
        let pixels = vec![0xA5_u8; usize::from(channels)];
        let png = encode_to_vec(
            &pixels,
            ImageDescriptor::new(1, 1, 8, channels),
            EncoderOptions::default()
        )
        .unwrap();

        assert_eq!(decode_ref(&png).1, pixels);
    }
}

#[test]
fn image_smaller_than_one_band() {
    let (width, height) = (10, 3);
    let pixels = synthetic_image(width, height, 1, 3);
    let options = EncoderOptions::default().set_band_rows(Some(1000));
    let png = encode_to_vec(&pixels, ImageDescriptor::new(10, 3, 8, 1), options).unwrap();

    assert_eq!(decode_ref(&png).1, pixels);
}

#[test]
fn strided_sixteen_bit_with_odd_padding() {
    let (width, height) = (13_usize, 9_usize);
    let row_bytes = width * 3 * 2;
    let stride = row_bytes + 5;

    let packed = synthetic_image(width, height, 6, 21);
    let mut strided = vec![0xEE_u8; stride * height];

    for (src, dst) in packed.chunks_exact(row_bytes).zip(strided.chunks_exact_mut(stride)) {
        dst[..row_bytes].copy_from_slice(src);
    }
    let desc = ImageDescriptor::new(13, 9, 16, 3).set_row_stride(stride);

    for threads in [1, 3] {
        let options = EncoderOptions::default()
            .set_num_threads(threads)
            .set_band_rows(Some(2));
        let png = encode_to_vec(&strided, desc, options).unwrap();

        assert_eq!(decode_ref(&png).1, packed);
    }
}

#[test]
fn native_u16_samples() {
    let (width, height) = (20, 12);
    let samples: Vec<u16> = (0..width * height * 2)
        .map(|x| (x * 977 % 65536) as u16)
        .collect();
    let desc = ImageDescriptor::new(width as u32, height as u32, 16, 2);

    let mut png = Vec::new();
    encode_u16_png(&samples, desc, EncoderOptions::default(), &mut png).unwrap();

    let expected: Vec<u8> = samples.iter().flat_map(|x| x.to_be_bytes()).collect();
    assert_eq!(decode_ref(&png).1, expected);
}

#[test]
fn noisy_image_many_bands() {
    let (width, height) = (300, 200);
    let mut rng = nanorand::WyRand::new_seed(77);
    let mut pixels = vec![0_u8; width * height * 3];
    rng.fill(&mut pixels);

    let options = EncoderOptions::default()
        .set_chunk_size(32 * 1024)
        .set_num_threads(4);
    let png = encode_to_vec(&pixels, ImageDescriptor::new(300, 200, 8, 3), options).unwrap();

    assert_eq!(decode_ref(&png).1, pixels);
}
