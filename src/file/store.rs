//! テキストストア
//!
//! ファイル内容の読み込みと保存を行う I/O 境界。状態は持たない

use crate::error::{FileError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// テキスト読み書きのトレイト
pub trait TextStore {
    /// テキストを読み込む。`None` の場合は空文字列
    fn load(&self, path: Option<&Path>) -> Result<String>;

    /// UTF-8 として厳密に読み込む。不正なバイト列は読み込みエラー
    ///
    /// 内容をそのまま書き戻す用途向け
    fn load_strict(&self, path: &Path) -> Result<String> {
        self.load(Some(path))
    }

    /// テキストを書き込む（作成または上書き）
    fn save(&self, path: &Path, text: &str) -> Result<()>;

    /// 通常ファイルが存在するか
    fn exists(&self, path: &Path) -> bool;
}

/// ファイルシステム上のテキストストア
///
/// 保存は対象ファイルへ直接書き込む。一時ファイル経由のリネームは行わないため、
/// 書き込み途中でクラッシュした場合の整合性は保証しない
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTextStore;

impl FsTextStore {
    pub fn new() -> Self {
        Self
    }
}

impl TextStore for FsTextStore {
    fn load(&self, path: Option<&Path>) -> Result<String> {
        let Some(path) = path else {
            return Ok(String::new());
        };

        if path.is_dir() {
            return Err(FileError::InvalidPath {
                path: path.display().to_string(),
            }
            .into());
        }

        let bytes = std::fs::read(path).map_err(|e| FileError::read(path, &e))?;

        // 不正なバイト列は置換文字に変換して読み込みを継続
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                log::warn!(
                    "{} is not valid UTF-8; undecodable bytes were replaced",
                    path.display()
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        log::debug!("loaded {} ({} bytes)", path.display(), text.len());
        Ok(text)
    }

    fn load_strict(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| FileError::read(path, &e))?;
        String::from_utf8(bytes).map_err(|err| {
            FileError::Read {
                path: path.display().to_string(),
                message: format!("invalid UTF-8: {}", err.utf8_error()),
            }
            .into()
        })
    }

    fn save(&self, path: &Path, text: &str) -> Result<()> {
        std::fs::write(path, text.as_bytes()).map_err(|e| FileError::write(path, &e))?;
        log::debug!("saved {} ({} bytes)", path.display(), text.len());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// メモリ上のテキストストア（テストやホスト側のシミュレーション向け）
#[derive(Debug, Default)]
pub struct MemoryTextStore {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: Mutex<bool>,
    writes: Mutex<usize>,
}

impl MemoryTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期ファイルを登録
    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), text.into());
        }
    }

    /// 書き込みを失敗させるかどうかを切り替える
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    /// 保存済み内容を取得
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().ok()?.get(path).cloned()
    }

    /// 成功した書き込み回数
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or(0)
    }
}

impl TextStore for MemoryTextStore {
    fn load(&self, path: Option<&Path>) -> Result<String> {
        let Some(path) = path else {
            return Ok(String::new());
        };

        self.contents(path).ok_or_else(|| {
            FileError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        })
    }

    fn save(&self, path: &Path, text: &str) -> Result<()> {
        if self.fail_writes.lock().map(|flag| *flag).unwrap_or(false) {
            return Err(FileError::Write {
                path: path.display().to_string(),
                message: "write rejected".to_string(),
            }
            .into());
        }

        self.insert(path, text);
        if let Ok(mut count) = self.writes.lock() {
            *count += 1;
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.contents(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TextdeskError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        let content = "Hello, World!\nこんにちは！";

        let store = FsTextStore::new();
        store.save(&file_path, content).unwrap();

        assert_eq!(store.load(Some(&file_path)).unwrap(), content);
    }

    #[test]
    fn test_load_without_path_is_empty() {
        assert_eq!(FsTextStore::new().load(None).unwrap(), "");
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.txt");

        match FsTextStore::new().load(Some(&missing)) {
            Err(TextdeskError::File(err)) => assert!(err.is_read_error()),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_replaces_invalid_utf8() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("binary.txt");
        fs::write(&file_path, [b'a', 0xff, b'b']).unwrap();

        let text = FsTextStore::new().load(Some(&file_path)).unwrap();
        assert_eq!(text, "a\u{FFFD}b");
    }

    #[test]
    fn test_strict_load_rejects_invalid_utf8() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("binary.txt");
        fs::write(&file_path, [b'a', 0xff, b'b']).unwrap();

        match FsTextStore::new().load_strict(&file_path) {
            Err(TextdeskError::File(FileError::Read { message, .. })) => {
                assert!(message.contains("invalid UTF-8"))
            }
            other => panic!("expected read error, got {:?}", other),
        }

        fs::write(&file_path, "日本語").unwrap();
        assert_eq!(FsTextStore::new().load_strict(&file_path).unwrap(), "日本語");
    }

    #[test]
    fn test_load_directory_is_invalid_path() {
        let temp_dir = tempdir().unwrap();
        let result = FsTextStore::new().load(Some(temp_dir.path()));

        assert!(matches!(
            result,
            Err(TextdeskError::File(FileError::InvalidPath { .. }))
        ));
    }

    #[test]
    fn test_save_overwrites_without_backup() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "old content that is longer").unwrap();

        FsTextStore::new().save(&file_path, "new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_into_missing_directory_is_write_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("no-such-dir").join("file.txt");

        match FsTextStore::new().save(&file_path, "x") {
            Err(TextdeskError::File(err)) => assert!(err.is_write_error()),
            other => panic!("expected write error, got {:?}", other),
        }
        assert!(!file_path.exists());
    }

    #[test]
    fn test_memory_store_tracks_writes() {
        let store = MemoryTextStore::new().with_file("/doc.txt", "abc");
        assert!(store.exists(Path::new("/doc.txt")));
        assert_eq!(store.load(Some(Path::new("/doc.txt"))).unwrap(), "abc");

        store.save(Path::new("/doc.txt"), "xyz").unwrap();
        assert_eq!(store.write_count(), 1);

        store.set_fail_writes(true);
        assert!(store.save(Path::new("/doc.txt"), "lost").is_err());
        assert_eq!(store.contents(Path::new("/doc.txt")).unwrap(), "xyz");
        assert_eq!(store.write_count(), 1);
    }
}
