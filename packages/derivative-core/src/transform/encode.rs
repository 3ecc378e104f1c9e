use crate::errors::TransformError;
use crate::transform::params::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use std::io::Cursor;

/// 画像をエンコードする
///
/// quality は損失圧縮（JPEG）にのみ適用される。
pub fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        ImageFormat::Png => {
            img.write_to(&mut buf, image::ImageFormat::Png)
                .map_err(|e| TransformError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
        }
        ImageFormat::WebP => {
            // image クレートの WebP エンコーダはロスレスのみ対応（quality は無視）
            let encoder = WebPEncoder::new_lossless(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("WebP encode failed: {e}")))?;
        }
        ImageFormat::Tiff => {
            img.write_to(&mut buf, image::ImageFormat::Tiff)
                .map_err(|e| TransformError::ProcessingFailed(format!("TIFF encode failed: {e}")))?;
        }
    }

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg() {
        let img = DynamicImage::new_rgb8(10, 10);
        let data = encode_image(&img, ImageFormat::Jpeg, 80).unwrap();

        assert!(!data.is_empty());
        // JPEG マジックナンバー確認
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png() {
        let img = DynamicImage::new_rgb8(10, 10);
        let data = encode_image(&img, ImageFormat::Png, 80).unwrap();

        assert!(!data.is_empty());
        // PNG マジックナンバー確認
        assert_eq!(&data[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_webp() {
        let img = DynamicImage::new_rgb8(10, 10);
        let data = encode_image(&img, ImageFormat::WebP, 80).unwrap();

        assert!(!data.is_empty());
        // WebP は RIFF コンテナ
        assert_eq!(&data[0..4], b"RIFF");
    }

    #[test]
    fn test_encode_tiff() {
        let img = DynamicImage::new_rgb8(10, 10);
        let data = encode_image(&img, ImageFormat::Tiff, 80).unwrap();

        assert!(!data.is_empty());
        // TIFF リトルエンディアンヘッダ
        assert_eq!(&data[0..2], b"II");
    }

    #[test]
    fn test_encode_deterministic() {
        // 同一入力から常に同一バイト列が得られること（冪等な派生生成の前提）
        let img = DynamicImage::new_rgb8(16, 16);
        let first = encode_image(&img, ImageFormat::Jpeg, 80).unwrap();
        let second = encode_image(&img, ImageFormat::Jpeg, 80).unwrap();
        assert_eq!(first, second);
    }
}
