use crate::errors::DimensionsError;

/// 要求寸法を許可リストと照合する
///
/// 許可リストが空の場合はすべての寸法を受け付ける（ポリシーはオプトイン）。
/// 照合は `WxH` 文字列の完全一致のみで、近似や許容幅はない。
pub fn check_dimensions(
    width: u32,
    height: u32,
    allow_list: &[String],
) -> Result<(), DimensionsError> {
    if allow_list.is_empty() {
        return Ok(());
    }

    let requested = format!("{width}x{height}");
    if allow_list.iter().any(|d| d == &requested) {
        Ok(())
    } else {
        Err(DimensionsError { requested })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> Vec<String> {
        ["30x40", "50x60", "20x30"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_empty_allow_list_accepts_everything() {
        assert!(check_dimensions(1, 1, &[]).is_ok());
        assert!(check_dimensions(9999, 9999, &[]).is_ok());
    }

    #[test]
    fn test_member_dimensions_accepted() {
        assert!(check_dimensions(50, 60, &allow_list()).is_ok());
        assert!(check_dimensions(20, 30, &allow_list()).is_ok());
    }

    #[test]
    fn test_non_member_dimensions_rejected() {
        let err = check_dimensions(1000, 2000, &allow_list()).unwrap_err();
        assert_eq!(err.requested, "1000x2000");
    }

    #[test]
    fn test_no_nearest_fit() {
        // 完全一致のみ。転置した寸法も不一致。
        assert!(check_dimensions(60, 50, &allow_list()).is_err());
    }
}
