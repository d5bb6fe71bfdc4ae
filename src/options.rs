//! 起動オプション
//!
//! コマンドラインから組み立てた設定と、編集ウィジェットへ渡す起動データ

use crate::transform::TextRange;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// エディタのテーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum Theme {
    #[serde(rename = "vs")]
    #[value(name = "vs")]
    Light,
    #[default]
    #[serde(rename = "vs-dark")]
    #[value(name = "vs-dark")]
    Dark,
}

/// 起動時に選択・置換する範囲（列は省略可能）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRequest {
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
    pub start_col: Option<usize>,
    pub end_col: Option<usize>,
}

impl SelectionRequest {
    /// 行指定があれば範囲に変換する。終了行の省略時は開始行と同じ行を使う
    pub fn to_range(&self) -> Option<TextRange> {
        let start_line = self.start_line.or(self.end_line)?;
        Some(TextRange {
            start_line,
            start_col: self.start_col,
            end_line: self.end_line.unwrap_or(start_line),
            end_col: self.end_col,
        })
    }
}

/// 対話モードの起動設定
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaunchOptions {
    /// 起動時に開くファイル
    pub file: Option<PathBuf>,
    /// `file` を無視して未保存バッファで開始する
    pub untitled: bool,
    pub selection: SelectionRequest,
    /// 選択範囲へ挿入するテキスト
    pub replace_text: Option<String>,
    /// 置換後に自動保存する
    pub autosave: bool,
    pub theme: Theme,
    /// シンタックスハイライト言語（未指定時は拡張子から推定）
    pub language: Option<String>,
    pub read_only: bool,
    /// デバッグログ出力先
    pub debug_log_path: Option<PathBuf>,
}

impl LaunchOptions {
    /// 実際に開くファイル
    pub fn boot_file(&self) -> Option<&Path> {
        if self.untitled {
            None
        } else {
            self.file.as_deref()
        }
    }

    /// 言語を決定する
    pub fn resolve_language(&self) -> String {
        match (&self.language, self.boot_file()) {
            (Some(language), _) => language.clone(),
            (None, Some(path)) => infer_language(path).to_string(),
            (None, None) => DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// デバッグログの出力先（明示指定がなければホーム配下の既定値）
    pub fn resolve_log_path(&self) -> Option<PathBuf> {
        match &self.debug_log_path {
            Some(path) => Some(path.clone()),
            None => default_log_path(),
        }
    }
}

pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// 拡張子から言語を推定
pub fn infer_language(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "json" => "json",
        "md" => "markdown",
        "html" => "html",
        "css" => "css",
        "txt" => "plaintext",
        "c" | "h" => "c",
        "cpp" | "hpp" => "cpp",
        "sh" => "shell",
        "ini" => "ini",
        _ => DEFAULT_LANGUAGE,
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".textdesk-log").join("debug.log"))
}

/// 編集ウィジェットへ渡す起動データ
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootData {
    pub document_id: u64,
    pub text: String,
    pub path: Option<PathBuf>,
    /// 起動時に表示・選択する範囲
    pub range: Option<TextRange>,
    pub theme: Theme,
    pub lang: String,
    pub read_only: bool,
    pub display_name: String,
    pub is_untitled: bool,
    pub is_dirty: bool,
    pub title: String,
}

impl BootData {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
