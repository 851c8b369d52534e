use image::{imageops::FilterType, DynamicImage, GrayImage, Luma, RgbaImage};
use imageproc::distance_transform::Norm;
use crate::{
    error::{Result, TraceError},
    traits::BackgroundMatte,
    types::{BinaryMask, Dimensions},
};

/// Output of background matting.
#[derive(Debug, Clone)]
pub struct Matte {
    /// Source colours, normalized to RGBA, with alpha zeroed on background
    pub image: RgbaImage,
    /// Dilated white-background mask (255 = background)
    pub background: GrayImage,
}

impl Matte {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::pixels(self.width(), self.height())
    }

    /// The alpha channel after matting.
    pub fn alpha(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([self.image.get_pixel(x, y)[3]])
        })
    }

    /// Resample to `dimensions` (bilinear for colour, nearest for the mask).
    pub fn resized(&self, dimensions: Dimensions) -> Matte {
        if dimensions.width == self.width() && dimensions.height == self.height() {
            return self.clone();
        }
        Matte {
            image: image::imageops::resize(
                &self.image,
                dimensions.width,
                dimensions.height,
                FilterType::Triangle,
            ),
            background: image::imageops::resize(
                &self.background,
                dimensions.width,
                dimensions.height,
                FilterType::Nearest,
            ),
        }
    }

    /// Classify pixels: foreground iff the mean of R, G, B is below
    /// `dark_threshold` and the pixel is not fully transparent.
    pub fn foreground_mask(&self, dark_threshold: u8) -> BinaryMask {
        let cutoff = dark_threshold as u16 * 3;
        BinaryMask::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, a] = self.image.get_pixel(x, y).0;
            a > 0 && (r as u16 + g as u16 + b as u16) < cutoff
        })
    }
}

/// Makes near-white pixels, and their immediate neighbours, transparent.
#[derive(Debug, Clone)]
pub struct WhiteBackgroundMatte {
    pub white_threshold: u8,
}

impl Default for WhiteBackgroundMatte {
    fn default() -> Self {
        Self { white_threshold: 245 }
    }
}

impl WhiteBackgroundMatte {
    fn white_mask(&self, image: &RgbaImage) -> GrayImage {
        let t = self.white_threshold;
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            if r >= t && g >= t && b >= t {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }
}

impl BackgroundMatte for WhiteBackgroundMatte {
    fn matte(&self, image: &DynamicImage) -> Result<Matte> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TraceError::InvalidDimension {
                width: image.width(),
                height: image.height(),
            });
        }

        // Grayscale and RGB sources come out fully opaque.
        let mut rgba = image.to_rgba8();

        // One 3x3 dilation also catches the anti-aliased fringe next to white.
        let background = imageproc::morphology::dilate(&self.white_mask(&rgba), Norm::LInf, 1);

        for (x, y, pixel) in rgba.enumerate_pixels_mut() {
            if background.get_pixel(x, y)[0] > 0 {
                pixel[3] = 0;
            }
        }

        Ok(Matte { image: rgba, background })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgb, RgbImage, Rgba};

    /// White canvas with a black square at `[from, to)` on both axes.
    fn square_on_white(size: u32, from: u32, to: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (from..to).contains(&x) && (from..to).contains(&y) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn white_image_has_no_foreground() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([255, 255, 255])));
        let matte = WhiteBackgroundMatte::default().matte(&image).unwrap();
        assert!(matte.alpha().pixels().all(|p| p[0] == 0));
        assert!(matte.foreground_mask(128).is_empty());
    }

    #[test]
    fn dilation_strips_one_pixel_fringe() {
        let image = DynamicImage::ImageRgb8(square_on_white(30, 10, 20));
        let matte = WhiteBackgroundMatte::default().matte(&image).unwrap();
        let mask = matte.foreground_mask(128);

        // 10x10 square loses its outer ring to the dilated white mask
        assert_eq!(mask.foreground_count(), 64);
        assert!(!mask.get(10, 10));
        assert!(mask.get(11, 11));
        assert!(mask.get(18, 18));
        assert!(!mask.get(19, 18));
    }

    #[test]
    fn colour_channels_are_untouched() {
        let image = DynamicImage::ImageRgb8(square_on_white(8, 2, 6));
        let matte = WhiteBackgroundMatte::default().matte(&image).unwrap();
        assert_eq!(matte.image.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(matte.image.get_pixel(2, 2).0, [0, 0, 0, 0]);
        assert_eq!(matte.image.get_pixel(3, 3).0, [0, 0, 0, 255]);
    }

    #[test]
    fn grayscale_is_treated_as_opaque() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(6, 4, Luma([10])));
        let matte = WhiteBackgroundMatte::default().matte(&image).unwrap();
        assert!(matte.alpha().pixels().all(|p| p[0] == 255));
        assert_eq!(matte.foreground_mask(128).foreground_count(), 24);
    }

    #[test]
    fn transparent_dark_pixels_stay_background() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 0])));
        let matte = WhiteBackgroundMatte::default().matte(&image).unwrap();
        assert!(matte.foreground_mask(128).is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([245, 245, 245])));
        let matte = WhiteBackgroundMatte { white_threshold: 245 }.matte(&image).unwrap();
        assert!(matte.background.pixels().all(|p| p[0] == 255));

        let matte = WhiteBackgroundMatte { white_threshold: 246 }.matte(&image).unwrap();
        assert!(matte.background.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn empty_image_is_invalid() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 4));
        assert!(matches!(
            WhiteBackgroundMatte::default().matte(&image),
            Err(TraceError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn resize_keeps_classification() {
        let image = DynamicImage::ImageRgb8(square_on_white(40, 8, 32));
        let matte = WhiteBackgroundMatte::default().matte(&image).unwrap();
        let small = matte.resized(Dimensions::pixels(20, 20));
        assert_eq!(small.dimensions(), Dimensions::pixels(20, 20));
        let mask = small.foreground_mask(128);
        assert!(mask.get(10, 10));
        assert!(!mask.get(1, 1));
    }
}
