use crate::errors::TransformError;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// 画像バイト列をデコードする
///
/// フォーマットはバイト列の先頭から推測する。宣言された Content-Type とは
/// 独立に動作するため、誤った Content-Type でも実体が画像ならデコードできる。
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, TransformError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to guess format: {e}")))?;

    reader
        .decode()
        .map_err(|e| TransformError::ProcessingFailed(format!("decode failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::encode::encode_image;
    use crate::transform::params::ImageFormat;

    #[test]
    fn test_decode_png_roundtrip() {
        let img = DynamicImage::new_rgb8(12, 8);
        let data = encode_image(&img, ImageFormat::Png, 80).unwrap();

        let decoded = decode_image(&data).unwrap();
        assert_eq!(decoded.width(), 12);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_image(b"not an image at all");
        assert!(matches!(result, Err(TransformError::ProcessingFailed(_))));
    }
}
