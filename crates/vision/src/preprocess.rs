use common::{Result, VisionError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use std::path::Path;

/// Square side length the extractor was validated against.
pub const INPUT_SIZE: u32 = 224;
/// Shortest side after the initial resize, before center-crop.
pub const RESIZE_SIZE: u32 = 256;

/// Per-channel normalization constants matching the extractor's training
/// regime (ImageNet statistics, RGB order).
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode an image file. Fails with [`VisionError::Decode`] naming the file
/// if it is not a readable image.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| VisionError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Convert a decoded image to a normalized NCHW tensor of shape
/// `[1, 3, 224, 224]`: resize shortest side to 256, center-crop 224x224,
/// scale to `[0, 1]`, then normalize channel-wise with [`MEAN`]/[`STD`].
pub fn image_to_tensor(img: &DynamicImage) -> Array4<f32> {
    let (w, h) = img.dimensions();

    // Resize so the shortest side becomes RESIZE_SIZE, preserving aspect.
    let (new_w, new_h) = if w <= h {
        let scaled = (h as f32 * RESIZE_SIZE as f32 / w as f32).round() as u32;
        (RESIZE_SIZE, scaled.max(RESIZE_SIZE))
    } else {
        let scaled = (w as f32 * RESIZE_SIZE as f32 / h as f32).round() as u32;
        (scaled.max(RESIZE_SIZE), RESIZE_SIZE)
    };
    let resized = img.resize_exact(new_w, new_h, FilterType::Triangle);

    let x = (new_w - INPUT_SIZE) / 2;
    let y = (new_h - INPUT_SIZE) / 2;
    let cropped = resized.crop_imm(x, y, INPUT_SIZE, INPUT_SIZE).to_rgb8();

    let side = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (px, py, pixel) in cropped.enumerate_pixels() {
        for c in 0..3 {
            let value = pixel[c] as f32 / 255.0;
            tensor[[0, c, py as usize, px as usize]] = (value - MEAN[c]) / STD[c];
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Write;

    #[test]
    fn tensor_has_fixed_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([10, 20, 30])));
        let tensor = image_to_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn uniform_image_normalizes_per_channel() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 400, Rgb([128, 128, 128])));
        let tensor = image_to_tensor(&img);

        for c in 0..3 {
            let expected = (128.0 / 255.0 - MEAN[c]) / STD[c];
            let got = tensor[[0, c, 100, 100]];
            assert!(
                (got - expected).abs() < 1e-4,
                "channel {c}: got {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn small_image_is_upscaled_before_crop() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 40, Rgb([0, 0, 0])));
        let tensor = image_to_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn non_image_file_fails_with_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.jpg");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"plain text, not jpeg bytes").unwrap();

        let err = load_image(&path).unwrap_err();
        match err {
            common::VisionError::Decode { path: p, .. } => {
                assert!(p.ends_with("not_an_image.jpg"))
            }
            other => panic!("expected Decode error, got {other:?}"),
        }
    }
}
