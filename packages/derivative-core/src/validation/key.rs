use crate::constants::{ASSET_PREFIX, RESIZE_TAG};
use crate::errors::KeyError;

/// キー文法のモード（デプロイメントごとに固定）
///
/// 二つのモードは排他的。アセット名にドットを含むキーに対して両方を同時に
/// 適用すると解釈が曖昧になるため、設定で片方のみを選択する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarMode {
    /// 拡張子なし。出力フォーマットは元画像の Content-Type から決定する。
    ContentType,
    /// 末尾セグメントが `.<拡張子>` で終わる。出力フォーマットは拡張子の
    /// 固定対応表から決定する。
    Extension,
}

/// 要求キーの解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// 先頭タグと末尾セグメントを除いた中間パス（空の場合あり）
    pub middle_path: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub asset_id: String,
    /// Extension モードでのみ Some
    pub extension: Option<String>,
}

impl ParsedKey {
    /// 元画像の格納キーを導出する
    ///
    /// 寸法には依存しない。寸法違いの要求キーは同一の元画像キーに解決される。
    pub fn original_asset_key(&self) -> String {
        let mut key = format!("{}/{}/{}", ASSET_PREFIX, self.middle_path.join("/"), self.asset_id);
        if let Some(ext) = &self.extension {
            key.push('.');
            key.push_str(ext);
        }
        key
    }
}

/// 要求キーを解析する
///
/// 文法: `resize/<segment>/.../<W>x<H>-<assetId>[.<ext>]`
/// 幅・高さが 0 の場合も文法違反として扱う。値域の制限はここでは行わない
/// （許可リスト照合は寸法ポリシーの責務）。
pub fn parse_key(key: &str, mode: GrammarMode) -> Result<ParsedKey, KeyError> {
    let segments: Vec<&str> = key.split('/').collect();

    if segments.len() < 2 {
        return Err(KeyError("fewer than two segments".to_string()));
    }
    if segments[0] != RESIZE_TAG {
        return Err(KeyError(format!(
            "first segment {:?} is not {:?}",
            segments[0], RESIZE_TAG
        )));
    }

    let middle_path: Vec<String> = segments[1..segments.len() - 1]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let last = segments[segments.len() - 1];

    let (dims, rest) = last
        .split_once('-')
        .ok_or_else(|| KeyError(format!("last segment {last:?} has no dimensions prefix")))?;

    let (width_str, height_str) = dims
        .split_once('x')
        .ok_or_else(|| KeyError(format!("dimensions {dims:?} are not in WxH form")))?;

    let width = parse_dimension(width_str)?;
    let height = parse_dimension(height_str)?;

    if rest.is_empty() {
        return Err(KeyError("asset id is empty".to_string()));
    }

    let (asset_id, extension) = match mode {
        GrammarMode::ContentType => (rest.to_string(), None),
        GrammarMode::Extension => {
            // 最後のドットで分割する。アセット名自体にドットを含んでもよい。
            let (name, ext) = rest
                .rsplit_once('.')
                .ok_or_else(|| KeyError(format!("asset name {rest:?} has no extension")))?;
            if name.is_empty() || ext.is_empty() {
                return Err(KeyError(format!("asset name {rest:?} has no extension")));
            }
            (name.to_string(), Some(ext.to_string()))
        }
    };

    Ok(ParsedKey {
        middle_path,
        width,
        height,
        asset_id,
        extension,
    })
}

fn parse_dimension(s: &str) -> Result<u32, KeyError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KeyError(format!("dimension {s:?} is not a decimal number")));
    }
    let value: u32 = s
        .parse()
        .map_err(|_| KeyError(format!("dimension {s:?} is out of range")))?;
    if value == 0 {
        return Err(KeyError("dimension is zero".to_string()));
    }
    Ok(value)
}
