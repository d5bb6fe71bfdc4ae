//! 行・列指定による範囲置換
//!
//! 行番号・列番号はいずれも 1 始まり。終了列は置換される最後の文字を指し、
//! バイト位置としては `[開始, 終了列 + 1)` の半開区間になる

use crate::error::TransformError;
use serde::{Deserialize, Serialize};

/// 行・列で指定するテキスト範囲
///
/// 列を省略した場合は行全体（開始列は行頭、終了列は行末 + 1）を選択する。
/// 終了列を開始列の直前（開始列 - 1）にすると開始位置への挿入になる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_line: usize,
    pub start_col: Option<usize>,
    pub end_line: usize,
    pub end_col: Option<usize>,
}

impl TextRange {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col: Some(start_col),
            end_line,
            end_col: Some(end_col),
        }
    }

    /// 行単位の範囲（列省略）
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            start_col: None,
            end_line,
            end_col: None,
        }
    }

    /// テキスト全体を覆う範囲
    pub fn full(text: &str) -> Self {
        let lines = LineTable::new(text);
        let last = lines.count();
        Self::new(1, 1, last, lines.char_len(last))
    }
}

/// 各行の開始バイト位置と内容長
struct LineTable<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineTable<'a> {
    fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { text, starts }
    }

    fn count(&self) -> usize {
        self.starts.len()
    }

    /// 改行（CRLF の CR を含む）を除いた行内容
    fn content(&self, line: usize) -> &'a str {
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    fn char_len(&self, line: usize) -> usize {
        self.content(line).chars().count()
    }

    /// 列（1 始まり）をバイト位置へ変換。行長を超える列は行末へ丸める
    fn offset(&self, line: usize, col: usize) -> usize {
        let content = self.content(line);
        let index = col.saturating_sub(1);
        let within = content
            .char_indices()
            .nth(index)
            .map(|(byte, _)| byte)
            .unwrap_or(content.len());
        self.starts[line - 1] + within
    }

    fn check_line(&self, line: usize) -> Result<(), TransformError> {
        if line == 0 || line > self.count() {
            return Err(TransformError::Range {
                line,
                line_count: self.count(),
            });
        }
        Ok(())
    }
}

/// 範囲置換を適用する
///
/// 範囲外のテキストはバイト単位でそのまま保持される
pub fn apply(text: &str, range: &TextRange, replacement: &str) -> Result<String, TransformError> {
    let (start, end) = byte_span(text, range)?;

    let mut output = String::with_capacity(text.len() - (end - start) + replacement.len());
    output.push_str(&text[..start]);
    output.push_str(replacement);
    output.push_str(&text[end..]);
    Ok(output)
}

/// 範囲をバイト位置の組 `[start, end)` に解決する
pub fn byte_span(text: &str, range: &TextRange) -> Result<(usize, usize), TransformError> {
    let lines = LineTable::new(text);
    lines.check_line(range.start_line)?;
    lines.check_line(range.end_line)?;

    let start_col = range.start_col.unwrap_or(1);
    let end_col = range
        .end_col
        .unwrap_or_else(|| lines.char_len(range.end_line) + 1);

    let start = lines.offset(range.start_line, start_col);
    let end = lines.offset(range.end_line, end_col.saturating_add(1));

    if start > end {
        return Err(TransformError::InvertedRange {
            start_line: range.start_line,
            start_col,
            end_line: range.end_line,
            end_col,
        });
    }

    Ok((start, end))
}
