use bytes::Bytes;

use derivative_core::{decode_image, encode_image, resize_image, ImageFormat, TransformError};

/// 画像バイト列を指定寸法・指定フォーマットの派生画像に変換する
///
/// デコード → リサイズ → エンコードの同期処理。呼び出し側がブロッキング
/// タスクに載せる。同一入力に対して常に同一バイト列を返す。
pub fn make_derivative(
    input: &Bytes,
    width: u32,
    height: u32,
    format: ImageFormat,
    quality: u8,
) -> Result<Bytes, TransformError> {
    let img = decode_image(input)?;
    let resized = resize_image(&img, width, height)?;
    let encoded = encode_image(&resized, format, quality)?;

    Ok(Bytes::from(encoded))
}
