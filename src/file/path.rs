//! パス処理ユーティリティ
//!
//! ドキュメントのパス解決（展開・正規化・絶対化）と表示名の決定

use crate::error::{Result, TextdeskError};
use std::env;
use std::path::{Component, Path, PathBuf};

/// 未保存バッファの表示名
pub const UNTITLED_NAME: &str = "Untitled";

/// 保存ダイアログで提案する既定のファイル名
pub const DEFAULT_SAVE_NAME: &str = "untitled.txt";

/// ホームディレクトリを展開（~ → /home/user）
pub fn expand_home<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home_dir = dirs::home_dir()
        .ok_or_else(|| TextdeskError::Path("ホームディレクトリが取得できません".to_string()))?;

    if path_str == "~" {
        Ok(home_dir)
    } else if let Some(rest) = path_str.strip_prefix("~/") {
        Ok(home_dir.join(rest))
    } else {
        // ~user形式は未サポート
        Err(TextdeskError::Path(
            "~user形式のパス展開は未サポートです".to_string(),
        ))
    }
}

/// 環境変数を展開（$VAR → 値）
pub fn expand_env<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path_str = path.as_ref().to_string_lossy().to_string();

    shellexpand::env(&path_str)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| TextdeskError::Path(format!("環境変数展開エラー: {}", e)))
}

/// パスを正規化（. や .. を字句的に解決）
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {
                    return Err(TextdeskError::Path(
                        "パスが不正です: ルートを超えた親ディレクトリ参照".to_string(),
                    ));
                }
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    Ok(components.iter().collect())
}

/// 相対パスを絶対パスに変換
pub fn to_absolute<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let current_dir = env::current_dir()
        .map_err(|e| TextdeskError::Path(format!("現在のディレクトリが取得できません: {}", e)))?;
    Ok(current_dir.join(path))
}

/// レジストリのキーとなる解決済み絶対パスを求める
///
/// 展開 → 絶対化 → 正規化の順で処理し、実在するファイルはシンボリックリンクも解決する
pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(TextdeskError::Path("空のパスは指定できません".to_string()));
    }

    let expanded = expand_env(expand_home(path)?)?;
    let absolute = normalize_path(to_absolute(expanded)?)?;

    Ok(absolute.canonicalize().unwrap_or(absolute))
}

/// 一時ファイル由来の未保存名（`Untitled-xyz.txt`）かどうか
pub fn is_untitled_name(base: &str) -> bool {
    let lower = base.to_lowercase();
    lower.starts_with("untitled-") && lower.ends_with(".txt")
}

/// パスから表示名を決定
pub fn display_name(path: Option<&Path>) -> String {
    let base = path
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if base.is_empty() || is_untitled_name(&base) {
        UNTITLED_NAME.to_string()
    } else {
        base
    }
}

/// 保存先を尋ねる際の提案（ディレクトリとファイル名）
pub fn save_suggestion(path: Option<&Path>) -> (Option<PathBuf>, String) {
    match path {
        Some(path) => (
            path.parent().map(Path::to_path_buf),
            path.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| DEFAULT_SAVE_NAME.to_string()),
        ),
        None => (None, DEFAULT_SAVE_NAME.to_string()),
    }
}
