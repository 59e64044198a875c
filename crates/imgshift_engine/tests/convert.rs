use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use imgshift_core::{FailureKind, TargetFormat};
use imgshift_engine::{ConvertError, Converter, ImageCrateConverter};

fn sample_png() -> Vec<u8> {
    let image = RgbaImage::from_fn(8, 6, |x, y| {
        Rgba([(x * 30) as u8, (y * 40) as u8, 128, if x % 2 == 0 { 255 } else { 90 }])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn expected_format(format: TargetFormat) -> ImageFormat {
    match format {
        TargetFormat::Jpg => ImageFormat::Jpeg,
        TargetFormat::Png => ImageFormat::Png,
        TargetFormat::Webp => ImageFormat::WebP,
        TargetFormat::Gif => ImageFormat::Gif,
    }
}

#[test]
fn converts_png_into_every_target_format() {
    let input = sample_png();
    for format in TargetFormat::ALL {
        let output = ImageCrateConverter
            .convert(&input, format)
            .unwrap_or_else(|err| panic!("{format} conversion failed: {err}"));

        assert_eq!(image::guess_format(&output).unwrap(), expected_format(format));
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }
}

#[test]
fn same_format_reencodes() {
    let input = sample_png();
    let output = ImageCrateConverter.convert(&input, TargetFormat::Png).unwrap();
    assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Png);
}

#[test]
fn corrupt_input_is_a_decode_fault() {
    let err = ImageCrateConverter
        .convert(b"definitely not an image", TargetFormat::Png)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Decode(_)));
    assert_eq!(err.into_failure().kind, FailureKind::Decode);
}

#[test]
fn truncated_png_is_a_decode_fault() {
    let input = sample_png();
    let err = ImageCrateConverter
        .convert(&input[..input.len() / 2], TargetFormat::Jpg)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Decode(_)));
}
