//! ドキュメントセッション管理
//!
//! すべての変更は単一の制御スレッドから行う前提で、内部ロックは持たない

pub mod document;
pub mod registry;

pub use document::{Document, DocumentId, DocumentState};
pub use registry::SessionRegistry;
