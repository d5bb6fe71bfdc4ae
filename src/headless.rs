//! ヘッドレス実行
//!
//! UI もセッションも使わずに、ファイル 1 つへ正規表現置換を一度だけ適用する

use crate::error::{FileError, Result};
use crate::file::{FsTextStore, TextStore};
use crate::transform::pattern;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// ヘッドレス実行の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub path: PathBuf,
    pub changed: bool,
    pub match_count: usize,
}

impl Report {
    /// 標準出力向けの要約
    pub fn summary(&self) -> String {
        if self.changed {
            format!(
                "Successfully made {} replacement(s) in {}",
                self.match_count,
                self.path.display()
            )
        } else if self.match_count > 0 {
            format!(
                "{} match(es) found but the replacement produced identical text. File was not changed.",
                self.match_count
            )
        } else {
            "No matches found. File was not changed.".to_string()
        }
    }
}

/// ヘッドレス置換の実行器
#[derive(Debug, Default)]
pub struct HeadlessRunner<S: TextStore = FsTextStore> {
    store: S,
}

impl HeadlessRunner<FsTextStore> {
    pub fn new() -> Self {
        Self {
            store: FsTextStore::new(),
        }
    }
}

impl<S: TextStore> HeadlessRunner<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// ファイルを読み込み、置換し、内容が変わった場合のみ書き戻す
    ///
    /// ファイルが存在しない場合は「マッチなし」とは区別してエラーにする。
    /// UTF-8 として不正なファイルは書き換えずに読み込みエラーとする
    pub fn run(&self, file_path: &Path, pattern: &str, replacement: &str) -> Result<Report> {
        if !self.store.exists(file_path) {
            return Err(FileError::NotFound {
                path: file_path.display().to_string(),
            }
            .into());
        }

        let original = self.store.load_strict(file_path)?;
        let outcome = pattern::apply(&original, pattern, replacement)?;
        let changed = outcome.changed_from(&original);

        if changed {
            self.store.save(file_path, &outcome.text)?;
            log::info!(
                "rewrote {} ({} replacement(s))",
                file_path.display(),
                outcome.match_count
            );
        } else {
            log::info!("{} left untouched", file_path.display());
        }

        Ok(Report {
            path: file_path.to_path_buf(),
            changed,
            match_count: outcome.match_count,
        })
    }
}
