//! ファイル操作モジュール
//!
//! - 読み込みは UTF-8、不正なバイト列は置換して継続
//! - 保存は直接上書き（バックアップなし、アトミック保証なし）
//! - パスは展開・正規化した絶対パスでドキュメントを識別

pub mod path;
pub mod store;

pub use path::{display_name, is_untitled_name, resolve_path, UNTITLED_NAME};
pub use store::{FsTextStore, MemoryTextStore, TextStore};
