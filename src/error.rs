//! エラーハンドリングシステム
//!
//! textdesk 全体で使用される統一されたエラー型とユーティリティを定義
//! 対話モードではアラート境界へ、ヘッドレスモードでは標準エラー出力へ報告する

use std::path::Path;
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextdeskError {
    /// ファイル操作エラー
    #[error(transparent)]
    File(#[from] FileError),

    /// テキスト変換エラー
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// ドキュメントセッションエラー
    #[error(transparent)]
    Session(#[from] SessionError),

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// パスエラー
    #[error("Path error: {0}")]
    Path(String),
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

impl FileError {
    pub fn read(path: &Path, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound {
                path: path.display().to_string(),
            },
            _ => FileError::Read {
                path: path.display().to_string(),
                message: error.to_string(),
            },
        }
    }

    pub fn write(path: &Path, error: &std::io::Error) -> Self {
        FileError::Write {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    /// 読み込み系エラー（ReadError）かどうか
    pub fn is_read_error(&self) -> bool {
        matches!(self, FileError::NotFound { .. } | FileError::Read { .. })
    }

    /// 書き込み系エラー（WriteError）かどうか
    pub fn is_write_error(&self) -> bool {
        matches!(self, FileError::Write { .. })
    }
}

/// テキスト変換固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Invalid pattern: {message}")]
    Pattern { message: String },

    #[error("Line {line} is out of range (document has {line_count} lines)")]
    Range { line: usize, line_count: usize },

    #[error("Range start {start_line}:{start_col} is after end {end_line}:{end_col}")]
    InvertedRange {
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    },
}

/// ドキュメントセッション固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("A file path is required to save this document")]
    PathRequired,

    #[error("Autosave requires the document to be bound to a file path")]
    AutosaveRequiresPath,

    #[error("Unknown document: {id}")]
    UnknownDocument { id: u64 },

    #[error("{path} is already open in another document")]
    PathInUse { path: String },

    #[error("Document {id} is closed")]
    Closed { id: u64 },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{message}")]
    Usage { message: String },
}

impl From<regex::Error> for TransformError {
    fn from(error: regex::Error) -> Self {
        TransformError::Pattern {
            message: error.to_string(),
        }
    }
}

impl From<regex::Error> for TextdeskError {
    fn from(error: regex::Error) -> Self {
        TextdeskError::Transform(error.into())
    }
}

/// アラートの重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

/// ホスト側のアラート表示へ渡す情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub level: AlertLevel,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>, level: AlertLevel) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level,
        }
    }

    /// エラーからアラートを生成
    pub fn from_error(error: &TextdeskError) -> Self {
        let title = match error {
            TextdeskError::File(err) if err.is_read_error() => "File Open Error",
            TextdeskError::File(_) => "Save Error",
            TextdeskError::Session(SessionError::PathRequired) => "Save Error",
            TextdeskError::Session(SessionError::AutosaveRequiresPath) => "Autosave Error",
            TextdeskError::Session(_) => "Document Error",
            TextdeskError::Transform(TransformError::Pattern { .. }) => "Pattern Error",
            TextdeskError::Transform(_) => "Replace Error",
            TextdeskError::Config(_) => "Configuration Error",
            TextdeskError::Path(_) => "Path Error",
        };
        let level = match error {
            TextdeskError::Session(SessionError::PathRequired) => AlertLevel::Warning,
            _ => AlertLevel::Error,
        };
        Self::new(title, error.to_string(), level)
    }
}

/// パニックハンドラの設定
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .unwrap_or_else(|| std::panic::Location::caller());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("PANIC at {}:{}: {}", location.file(), location.line(), message);
        eprintln!("PANIC at {}:{}: {}", location.file(), location.line(), message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());

        std::process::exit(1);
    }));
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, TextdeskError>;
