use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_empty_and_garbage() {
    assert!(decode_image(&[]).is_err());
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn unpremultiply_restores_opaque_and_clear_pixels() {
    let mut px = vec![10, 20, 30, 255, 0, 0, 0, 0, 64, 0, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..8], &[10, 20, 30, 255, 0, 0, 0, 0]);
    assert_eq!(px[11], 128);
    assert!((px[8] as i32 - 127).abs() <= 1);
}

#[test]
fn normalize_rel_path_cleans_and_rejects() {
    assert_eq!(normalize_rel_path("./tiles\\a.png").unwrap(), "tiles/a.png");
    assert_eq!(normalize_rel_path("a//b/./c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}
