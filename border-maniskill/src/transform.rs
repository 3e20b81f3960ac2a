//! Image preprocessing applied when an example is accessed.
use anyhow::{anyhow, Result};
use border_core::BorderError;
use image::{
    imageops::{crop_imm, resize, FilterType::Triangle},
    RgbImage,
};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Converts a channel-first image of an example.
pub trait ImageTransform {
    /// Returns the transformed image.
    fn apply(&self, image: &Array3<f32>) -> Result<Array3<f32>>;
}

/// Per-channel normalization, `(x - mean) / std`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Normalize {
    /// Mean of each channel.
    pub mean: [f32; 3],

    /// Standard deviation of each channel.
    pub std: [f32; 3],
}

impl Normalize {
    /// Statistics of ImageNet.
    pub fn imagenet() -> Self {
        Self {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

/// Optional steps of [`ToTensor`]. All of them are disabled by default.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct ToTensorConfig {
    /// Resizes the shorter edge to this length, keeping the aspect ratio.
    pub resize: Option<u32>,

    /// Crops a square of this size at the center.
    pub center_crop: Option<u32>,

    /// Normalizes each channel after scaling into `[0, 1]`.
    pub normalize: Option<Normalize>,
}

impl ToTensorConfig {
    /// Sets the length of the shorter edge after resizing.
    pub fn resize(mut self, v: Option<u32>) -> Self {
        self.resize = v;
        self
    }

    /// Sets the size of the center crop.
    pub fn center_crop(mut self, v: Option<u32>) -> Self {
        self.center_crop = v;
        self
    }

    /// Sets the per-channel normalization.
    pub fn normalize(mut self, v: Option<Normalize>) -> Self {
        self.normalize = v;
        self
    }
}

/// Converts a channel-first array of pixel values into a channel-first array
/// scaled into `[0, 1]`.
///
/// The array is first converted into an 8-bit RGB image, casting each value to
/// `u8`, and then back into `f32` divided by 255. With the default
/// configuration no other step is applied.
#[derive(Debug, Clone, Default)]
pub struct ToTensor {
    config: ToTensorConfig,
}

impl ToTensor {
    /// Creates the transform with optional steps.
    pub fn new(config: ToTensorConfig) -> Self {
        Self { config }
    }

    fn to_rgb_image(image: &Array3<f32>) -> Result<RgbImage> {
        let (c, h, w) = image.dim();
        if c != 3 {
            return Err(BorderError::ShapeMismatch {
                field: "image".to_string(),
                expected: "3 channels".to_string(),
                actual: format!("{} channels", c),
            }
            .into());
        }

        // HWC order
        let raw = image
            .view()
            .permuted_axes([1, 2, 0])
            .iter()
            .map(|&v| v as u8)
            .collect::<Vec<_>>();
        RgbImage::from_raw(w as u32, h as u32, raw)
            .ok_or_else(|| anyhow!("Failed to create an image of size {}x{}", w, h))
    }

    fn resize_shorter_edge(img: RgbImage, size: u32) -> RgbImage {
        let (w, h) = img.dimensions();
        let (w_, h_) = if w <= h {
            (size, (size as u64 * h as u64 / w as u64) as u32)
        } else {
            ((size as u64 * w as u64 / h as u64) as u32, size)
        };
        resize(&img, w_, h_, Triangle)
    }

    fn center_crop(img: RgbImage, size: u32) -> Result<RgbImage> {
        let (w, h) = img.dimensions();
        if size > w || size > h {
            return Err(BorderError::InvalidConfig(format!(
                "center crop {} is larger than the image {}x{}",
                size, w, h
            ))
            .into());
        }
        let (x, y) = ((w - size) / 2, (h - size) / 2);
        Ok(crop_imm(&img, x, y, size, size).to_image())
    }

    fn to_array(img: &RgbImage) -> Array3<f32> {
        let (w, h) = img.dimensions();
        Array3::from_shape_fn((3, h as usize, w as usize), |(c, y, x)| {
            img.get_pixel(x as u32, y as u32).0[c] as f32 / 255.0
        })
    }
}

impl ImageTransform for ToTensor {
    fn apply(&self, image: &Array3<f32>) -> Result<Array3<f32>> {
        let mut img = Self::to_rgb_image(image)?;

        if let Some(size) = self.config.resize {
            img = Self::resize_shorter_edge(img, size);
        }
        if let Some(size) = self.config.center_crop {
            img = Self::center_crop(img, size)?;
        }

        let mut arr = Self::to_array(&img);

        if let Some(n) = &self.config.normalize {
            for (c, mut channel) in arr.outer_iter_mut().enumerate() {
                let (mean, std) = (n.mean[c], n.std[c]);
                channel.mapv_inplace(|v| (v - mean) / std);
            }
        }

        Ok(arr)
    }
}
