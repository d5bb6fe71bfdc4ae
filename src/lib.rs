//! textdesk - Document session and headless transformation engine
//!
//! 編集ウィジェットを載せるデスクトップシェルの中核部分。
//! ドキュメントのパス束縛・変更状態・保存と、範囲／正規表現によるテキスト変換を扱う

// コアモジュール
pub mod error;
pub mod logging;
pub mod options;

// データ層
pub mod file;

// 変換層
pub mod transform;

// セッション層
pub mod session;

// 実行モード
pub mod controller;
pub mod headless;

// コマンドライン
pub mod cli;

// 公開API
pub use controller::{DocumentView, HostBridge, InteractiveController, SavePrompt};
pub use error::{Alert, AlertLevel, Result, TextdeskError};
pub use file::{FsTextStore, MemoryTextStore, TextStore};
pub use headless::{HeadlessRunner, Report};
pub use options::{BootData, LaunchOptions, Theme};
pub use session::{Document, DocumentId, DocumentState, SessionRegistry};
pub use transform::{PatternOutcome, TextRange};
