// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for YOLO inference.
//!
//! Images are letterboxed into the model input: scaled to fit while keeping
//! their aspect ratio, centered, and padded with gray. The result is an NCHW
//! `f32` tensor normalized to [0, 1] plus the transform needed to map boxes
//! back onto the original image.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

/// Letterbox padding value (gray) on the 0-255 scale.
pub const LETTERBOX_VALUE: u8 = 114;

/// Normalized letterbox padding value.
const LETTERBOX_NORM: f32 = LETTERBOX_VALUE as f32 / 255.0;

/// Reciprocal of 255 for normalization.
const INV_255: f32 = 1.0 / 255.0;

/// Result of preprocessing an image, containing the tensor and transform info.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Preprocessed image tensor in NCHW format, normalized to [0, 1].
    pub tensor: Array4<f32>,
    /// Original image dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Scale factors applied (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
    /// Padding applied (`pad_top`, `pad_left`).
    pub padding: (f32, f32),
}

impl PreprocessResult {
    /// Inference tensor shape (height, width).
    #[must_use]
    pub fn inference_shape(&self) -> (u32, u32) {
        let shape = self.tensor.shape();
        (shape[2] as u32, shape[3] as u32)
    }
}

/// Letterbox geometry for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scaled image width.
    pub new_width: u32,
    /// Scaled image height.
    pub new_height: u32,
    /// Left padding in pixels.
    pub pad_left: u32,
    /// Top padding in pixels.
    pub pad_top: u32,
    /// Scale factors (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
}

impl Letterbox {
    /// Compute the letterbox for an image of `orig_width` x `orig_height`
    /// placed into `target_size` (height, width).
    #[must_use]
    pub fn new(orig_width: u32, orig_height: u32, target_size: (usize, usize)) -> Self {
        let (target_h, target_w) = (target_size.0 as f32, target_size.1 as f32);
        let (orig_h, orig_w) = (orig_height.max(1) as f32, orig_width.max(1) as f32);

        let ratio = (target_h / orig_h).min(target_w / orig_w);

        let new_width = ((orig_w * ratio).round() as u32).clamp(1, target_size.1 as u32);
        let new_height = ((orig_h * ratio).round() as u32).clamp(1, target_size.0 as u32);

        let pad_left = (target_size.1 as u32 - new_width) / 2;
        let pad_top = (target_size.0 as u32 - new_height) / 2;

        Self {
            new_width,
            new_height,
            pad_left,
            pad_top,
            scale: (new_height as f32 / orig_h, new_width as f32 / orig_w),
        }
    }
}

/// Preprocess an image for YOLO inference.
///
/// # Arguments
///
/// * `image` - Input image.
/// * `target_size` - Model input size as (height, width).
#[must_use]
pub fn preprocess_image(image: &DynamicImage, target_size: (usize, usize)) -> PreprocessResult {
    let (orig_width, orig_height) = image.dimensions();
    let letterbox = Letterbox::new(orig_width, orig_height, target_size);

    let rgb = image.to_rgb8();
    let resized = if (letterbox.new_width, letterbox.new_height) == (orig_width, orig_height) {
        rgb
    } else {
        imageops::resize(&rgb, letterbox.new_width, letterbox.new_height, FilterType::Triangle)
    };

    let (dst_h, dst_w) = target_size;
    let mut tensor = Array4::from_elem((1, 3, dst_h, dst_w), LETTERBOX_NORM);

    let (top, left) = (letterbox.pad_top as usize, letterbox.pad_left as usize);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (row, col) = (top + y as usize, left + x as usize);
        for (c, &value) in pixel.0.iter().enumerate() {
            tensor[[0, c, row, col]] = f32::from(value) * INV_255;
        }
    }

    PreprocessResult {
        tensor,
        orig_shape: (orig_height, orig_width),
        scale: letterbox.scale,
        padding: (letterbox.pad_top as f32, letterbox.pad_left as f32),
    }
}

/// Scale xyxy coordinates from model input space back to original image space.
#[must_use]
pub fn scale_coords(coords: &[f32; 4], scale: (f32, f32), padding: (f32, f32)) -> [f32; 4] {
    let (scale_y, scale_x) = scale;
    let (pad_top, pad_left) = padding;

    [
        (coords[0] - pad_left) / scale_x,
        (coords[1] - pad_top) / scale_y,
        (coords[2] - pad_left) / scale_x,
        (coords[3] - pad_top) / scale_y,
    ]
}

/// Clip xyxy coordinates to an image of `shape` (height, width).
#[must_use]
pub const fn clip_coords(coords: &[f32; 4], shape: (u32, u32)) -> [f32; 4] {
    let (h, w) = (shape.0 as f32, shape.1 as f32);
    [
        coords[0].clamp(0.0, w),
        coords[1].clamp(0.0, h),
        coords[2].clamp(0.0, w),
        coords[3].clamp(0.0, h),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_letterbox_square() {
        let lb = Letterbox::new(640, 640, (640, 640));
        assert_eq!((lb.new_width, lb.new_height), (640, 640));
        assert_eq!((lb.pad_left, lb.pad_top), (0, 0));
    }

    #[test]
    fn test_letterbox_wide() {
        let lb = Letterbox::new(1280, 720, (640, 640));
        assert_eq!((lb.new_width, lb.new_height), (640, 360));
        assert_eq!((lb.pad_left, lb.pad_top), (0, 140));
        assert!((lb.scale.0 - 0.5).abs() < 1e-6);
        assert!((lb.scale.1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_letterbox_extreme_aspect() {
        let lb = Letterbox::new(10_000, 1, (640, 640));
        assert_eq!(lb.new_width, 640);
        assert_eq!(lb.new_height, 1);
    }

    #[test]
    fn test_preprocess_pads_and_normalizes() {
        let img = RgbImage::from_pixel(4, 2, Rgb([255, 0, 51]));
        let result = preprocess_image(&DynamicImage::ImageRgb8(img), (8, 8));

        assert_eq!(result.tensor.shape(), &[1, 3, 8, 8]);
        assert_eq!(result.orig_shape, (2, 4));
        assert_eq!(result.inference_shape(), (8, 8));
        assert_eq!(result.padding, (2.0, 0.0));

        // Padding rows keep the letterbox gray
        assert!((result.tensor[[0, 0, 0, 0]] - LETTERBOX_NORM).abs() < 1e-6);
        // Image rows hold the normalized pixel
        assert!((result.tensor[[0, 0, 4, 3]] - 1.0).abs() < 1e-6);
        assert!(result.tensor[[0, 1, 4, 3]].abs() < 1e-6);
        assert!((result.tensor[[0, 2, 4, 3]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_scale_coords() {
        let scaled = scale_coords(&[100.0, 100.0, 200.0, 200.0], (0.5, 0.5), (10.0, 20.0));
        assert!((scaled[0] - 160.0).abs() < 1e-4);
        assert!((scaled[1] - 180.0).abs() < 1e-4);
        assert!((scaled[2] - 360.0).abs() < 1e-4);
        assert!((scaled[3] - 380.0).abs() < 1e-4);
    }

    #[test]
    fn test_clip_coords() {
        let clipped = clip_coords(&[-10.0, -20.0, 700.0, 500.0], (480, 640));
        assert_eq!(clipped, [0.0, 0.0, 640.0, 480.0]);
    }
}
