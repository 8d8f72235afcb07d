//! Image transform engine
//!
//! Pure CPU work on decoded images: complete the target box from the size
//! profile, apply the resize mode, encode in the output format named by the
//! source extension. The service wraps these calls in a blocking task so
//! runtime worker threads are never pinned by pixel work.

use std::io::Cursor;

use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageOutputFormat, Rgba, RgbaImage};

use crate::config::{ResizeMode, SizeProfile};
use crate::error::{Result, ThumbCacheError};

/// An encoded thumbnail ready for publication
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Complete a profile's target box against the source dimensions
///
/// A missing side is derived from the source aspect ratio; a profile with
/// neither side keeps the source dimensions. Results are clamped to at
/// least 1x1.
fn target_box(
    src_width: u32,
    src_height: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    match (width, height) {
        (Some(w), Some(h)) => (w.max(1), h.max(1)),
        (Some(w), None) => {
            let ratio = w as f32 / src_width as f32;
            let h = (src_height as f32 * ratio) as u32;
            (w.max(1), h.max(1))
        }
        (None, Some(h)) => {
            let ratio = h as f32 / src_height as f32;
            let w = (src_width as f32 * ratio) as u32;
            (w.max(1), h.max(1))
        }
        (None, None) => (src_width, src_height),
    }
}

/// Apply a size profile to a decoded image
pub fn render(img: &DynamicImage, profile: &SizeProfile) -> DynamicImage {
    let (box_width, box_height) = target_box(img.width(), img.height(), profile.width, profile.height);

    match profile.mode {
        ResizeMode::Fit => img.resize(box_width, box_height, FilterType::Triangle),
        ResizeMode::Exact | ResizeMode::Stretch => {
            img.resize_exact(box_width, box_height, FilterType::Triangle)
        }
        ResizeMode::ShrinkOnly => shrink_to_box(img, box_width, box_height),
        ResizeMode::Fill => img.resize_to_fill(box_width, box_height, FilterType::Triangle),
        ResizeMode::Centered => {
            let inner = shrink_to_box(img, box_width, box_height);
            center_on_canvas(&inner, box_width, box_height)
        }
    }
}

fn shrink_to_box(img: &DynamicImage, box_width: u32, box_height: u32) -> DynamicImage {
    if img.width() <= box_width && img.height() <= box_height {
        img.clone()
    } else {
        img.resize(box_width, box_height, FilterType::Triangle)
    }
}

fn center_on_canvas(inner: &DynamicImage, box_width: u32, box_height: u32) -> DynamicImage {
    let mut canvas = RgbaImage::from_pixel(box_width, box_height, Rgba([255, 255, 255, 255]));
    let x = box_width.saturating_sub(inner.width()) / 2;
    let y = box_height.saturating_sub(inner.height()) / 2;
    imageops::overlay(&mut canvas, &inner.to_rgba8(), x as i64, y as i64);
    DynamicImage::ImageRgba8(canvas)
}

/// Encode a rendered image in the format named by the source extension
pub fn encode(img: &DynamicImage, extension: &str, jpeg_quality: u8) -> Result<RenderedThumbnail> {
    let format = ImageFormat::from_extension(extension)
        .filter(|f| f.can_write())
        .ok_or_else(|| ThumbCacheError::UnsupportedFormat(extension.to_string()))?;

    let mut cursor = Cursor::new(Vec::new());
    match format {
        // The JPEG encoder rejects alpha channels.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut cursor, ImageOutputFormat::Jpeg(jpeg_quality)),
        other => img.write_to(&mut cursor, ImageOutputFormat::from(other)),
    }
    .map_err(ThumbCacheError::Encode)?;

    Ok(RenderedThumbnail {
        data: Bytes::from(cursor.into_inner()),
        width: img.width(),
        height: img.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn red_source(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([200u8, 30, 30])))
    }

    fn profile(width: Option<u32>, height: Option<u32>, mode: ResizeMode) -> SizeProfile {
        SizeProfile::new(width, height, mode)
    }

    #[test]
    fn test_target_box() {
        assert_eq!(target_box(200, 100, Some(100), Some(100)), (100, 100));
        assert_eq!(target_box(200, 100, Some(100), None), (100, 50));
        assert_eq!(target_box(200, 100, None, Some(50)), (100, 50));
        assert_eq!(target_box(200, 100, None, None), (200, 100));
    }

    #[test]
    fn test_target_box_clamps_to_one() {
        assert_eq!(target_box(1000, 10, Some(1), None), (1, 1));
        assert_eq!(target_box(10, 1000, None, Some(1)), (1, 1));
    }

    #[test]
    fn test_render_modes_on_landscape_source() {
        let img = red_source(200, 100);
        let box_100 = |mode| profile(Some(100), Some(100), mode);

        let fit = render(&img, &box_100(ResizeMode::Fit));
        assert_eq!((fit.width(), fit.height()), (100, 50));

        let exact = render(&img, &box_100(ResizeMode::Exact));
        assert_eq!((exact.width(), exact.height()), (100, 100));

        let stretch = render(&img, &box_100(ResizeMode::Stretch));
        assert_eq!((stretch.width(), stretch.height()), (100, 100));

        let shrink = render(&img, &box_100(ResizeMode::ShrinkOnly));
        assert_eq!((shrink.width(), shrink.height()), (100, 50));

        let fill = render(&img, &box_100(ResizeMode::Fill));
        assert_eq!((fill.width(), fill.height()), (100, 100));

        let centered = render(&img, &box_100(ResizeMode::Centered));
        assert_eq!((centered.width(), centered.height()), (100, 100));
    }

    #[test]
    fn test_fit_scales_up_but_shrink_only_does_not() {
        let img = red_source(200, 100);

        let fit = render(&img, &profile(Some(400), Some(400), ResizeMode::Fit));
        assert_eq!((fit.width(), fit.height()), (400, 200));

        let shrink = render(&img, &profile(Some(400), Some(400), ResizeMode::ShrinkOnly));
        assert_eq!((shrink.width(), shrink.height()), (200, 100));
    }

    #[test]
    fn test_centered_pads_with_white() {
        use image::GenericImageView;

        let img = red_source(200, 100);
        let centered = render(&img, &profile(Some(100), Some(100), ResizeMode::Centered));

        // Inner image lands at rows 25..75; the top edge stays canvas white.
        assert_eq!(centered.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(centered.get_pixel(99, 0), Rgba([255, 255, 255, 255]));
        let middle = centered.get_pixel(50, 50);
        assert!(middle[0] > 150 && middle[2] < 100, "middle pixel {:?}", middle);
    }

    #[test]
    fn test_encode_jpeg_flattens_alpha() {
        let img = red_source(200, 100);
        let centered = render(&img, &profile(Some(100), Some(100), ResizeMode::Centered));

        let rendered = encode(&centered, "jpg", 85).unwrap();
        assert_eq!((rendered.width, rendered.height), (100, 100));

        let reloaded = image::load_from_memory(&rendered.data).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (100, 100));
    }

    #[test]
    fn test_encode_png() {
        let img = red_source(8, 8);
        let rendered = encode(&img, "png", 85).unwrap();
        assert!(!rendered.data.is_empty());
        assert_eq!(image::guess_format(&rendered.data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_encode_rejects_unknown_extension() {
        let img = red_source(8, 8);
        let err = encode(&img, "zzz", 85).unwrap_err();
        assert!(matches!(err, ThumbCacheError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_encode_rejects_decode_only_format() {
        let img = red_source(8, 8);
        let err = encode(&img, "dds", 85).unwrap_err();
        assert!(matches!(err, ThumbCacheError::UnsupportedFormat(_)));
    }
}
