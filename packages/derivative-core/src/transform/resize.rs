use crate::constants::MAX_PIXELS;
use crate::errors::TransformError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeOptions, Resizer};
use image::DynamicImage;

/// 画像を指定寸法ちょうどにリサイズする
///
/// アスペクト比は維持しない。要求キーに含まれる寸法がそのまま出力寸法になる。
/// fast_image_resize の Lanczos3 フィルタを使用。
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    // 出力ピクセル数チェック
    let total_pixels = target_w as u64 * target_h as u64;
    if total_pixels > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge {
            width: target_w,
            height: target_h,
        });
    }

    if img.width() == target_w && img.height() == target_h {
        return Ok(img.clone());
    }

    let rgb_img = img.to_rgb8();
    let (src_w, src_h) = (rgb_img.width(), rgb_img.height());

    let src_image = Image::from_vec_u8(src_w, src_h, rgb_img.into_raw(), PixelType::U8x3)
        .map_err(|e| {
            TransformError::ProcessingFailed(format!("failed to create source image: {e}"))
        })?;

    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x3);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
                FilterType::Lanczos3,
            )),
        )
        .map_err(|e| TransformError::ProcessingFailed(format!("resize failed: {e}")))?;

    let resized_rgb = image::RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| {
            TransformError::ProcessingFailed("failed to convert resized image".to_string())
        })?;

    Ok(DynamicImage::ImageRgb8(resized_rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_to_exact_dimensions() {
        let img = DynamicImage::new_rgb8(1000, 1000);
        let resized = resize_image(&img, 50, 60).unwrap();

        assert_eq!(resized.width(), 50);
        assert_eq!(resized.height(), 60);
    }

    #[test]
    fn test_resize_noop_when_same_size() {
        let img = DynamicImage::new_rgb8(40, 30);
        let resized = resize_image(&img, 40, 30).unwrap();

        assert_eq!(resized.width(), 40);
        assert_eq!(resized.height(), 30);
    }

    #[test]
    fn test_resize_exceeds_max_pixels() {
        let img = DynamicImage::new_rgb8(100, 100);
        let result = resize_image(&img, 100_000, 100_000);

        match result.unwrap_err() {
            TransformError::ResolutionTooLarge { width, height } => {
                assert_eq!(width, 100_000);
                assert_eq!(height, 100_000);
            }
            _ => panic!("expected ResolutionTooLarge error"),
        }
    }
}
