//! テキスト変換モジュール
//!
//! いずれも入力テキストを変更しない純粋関数として実装する

pub mod pattern;
pub mod range;

pub use pattern::PatternOutcome;
pub use range::TextRange;
