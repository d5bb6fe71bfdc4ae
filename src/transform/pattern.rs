//! 正規表現による一括置換
//!
//! テキスト全体に対して重ならない全マッチを置換する純粋関数

use crate::error::TransformError;
use regex::{Captures, Regex};

/// 置換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternOutcome {
    pub text: String,
    pub match_count: usize,
}

impl PatternOutcome {
    /// 置換によって内容が変わったか
    pub fn changed_from(&self, original: &str) -> bool {
        self.match_count > 0 && self.text != original
    }
}

#[derive(Debug, Clone, PartialEq)]
enum GroupRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
enum TemplatePart {
    Literal(String),
    Group(GroupRef),
}

/// 置換テンプレート
///
/// `$1` `${1}` `${name}` `\1` `\g<name>` でキャプチャを参照、`$$` はドル記号、
/// `\n` `\t` `\r` `\\` はエスケープとして扱う
#[derive(Debug, Clone)]
struct ReplacementTemplate {
    parts: Vec<TemplatePart>,
}

impl ReplacementTemplate {
    fn parse(template: &str) -> Result<Self, TransformError> {
        let mut chars = template.chars().peekable();
        let mut parts = Vec::new();
        let mut literal = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '$' => match chars.peek().copied() {
                    Some('$') => {
                        chars.next();
                        literal.push('$');
                    }
                    Some('{') => {
                        chars.next();
                        let name = Self::take_delimited(&mut chars, '}')?;
                        Self::push_group(&mut parts, &mut literal, Self::group_ref(&name)?);
                    }
                    Some(next) if next.is_ascii_digit() => {
                        let digits = Self::take_while(&mut chars, |c| c.is_ascii_digit());
                        Self::push_group(&mut parts, &mut literal, Self::group_ref(&digits)?);
                    }
                    _ => literal.push('$'),
                },
                '\\' => match chars.next() {
                    Some(digit) if digit.is_ascii_digit() => {
                        let mut digits = digit.to_string();
                        digits.push_str(&Self::take_while(&mut chars, |c| c.is_ascii_digit()));
                        Self::push_group(&mut parts, &mut literal, Self::group_ref(&digits)?);
                    }
                    Some('g') if chars.peek() == Some(&'<') => {
                        chars.next();
                        let name = Self::take_delimited(&mut chars, '>')?;
                        Self::push_group(&mut parts, &mut literal, Self::group_ref(&name)?);
                    }
                    Some('n') => literal.push('\n'),
                    Some('t') => literal.push('\t'),
                    Some('r') => literal.push('\r'),
                    Some(other) => literal.push(other),
                    None => literal.push('\\'),
                },
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(Self { parts })
    }

    fn push_group(parts: &mut Vec<TemplatePart>, literal: &mut String, group: GroupRef) {
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(std::mem::take(literal)));
        }
        parts.push(TemplatePart::Group(group));
    }

    fn take_delimited(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        close: char,
    ) -> Result<String, TransformError> {
        let mut name = String::new();
        for next in chars.by_ref() {
            if next == close {
                if name.is_empty() {
                    break;
                }
                return Ok(name);
            }
            name.push(next);
        }
        Err(TransformError::Pattern {
            message: format!("unterminated group reference: {}", name),
        })
    }

    fn take_while(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        accept: impl Fn(char) -> bool,
    ) -> String {
        let mut taken = String::new();
        while let Some(&c) = chars.peek() {
            if !accept(c) {
                break;
            }
            taken.push(c);
            chars.next();
        }
        taken
    }

    fn group_ref(token: &str) -> Result<GroupRef, TransformError> {
        if token.chars().all(|c| c.is_ascii_digit()) {
            token
                .parse::<usize>()
                .map(GroupRef::Index)
                .map_err(|_| TransformError::Pattern {
                    message: format!("invalid group reference: {}", token),
                })
        } else {
            Ok(GroupRef::Name(token.to_string()))
        }
    }

    /// 存在しないグループへの参照を検出
    fn validate(&self, regex: &Regex) -> Result<(), TransformError> {
        for part in &self.parts {
            let TemplatePart::Group(group) = part else {
                continue;
            };
            let known = match group {
                GroupRef::Index(index) => *index < regex.captures_len(),
                GroupRef::Name(name) => regex.capture_names().flatten().any(|n| n == name),
            };
            if !known {
                let shown = match group {
                    GroupRef::Index(index) => index.to_string(),
                    GroupRef::Name(name) => name.clone(),
                };
                return Err(TransformError::Pattern {
                    message: format!("invalid group reference: {}", shown),
                });
            }
        }
        Ok(())
    }

    fn render(&self, captures: &Captures<'_>, output: &mut String) {
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => output.push_str(text),
                TemplatePart::Group(GroupRef::Index(index)) => {
                    if let Some(mat) = captures.get(*index) {
                        output.push_str(mat.as_str());
                    }
                }
                TemplatePart::Group(GroupRef::Name(name)) => {
                    if let Some(mat) = captures.name(name) {
                        output.push_str(mat.as_str());
                    }
                }
            }
        }
    }
}

/// 正規表現置換を適用する
///
/// マッチが 0 件の場合は入力をそのまま返す（エラーではない）
pub fn apply(text: &str, pattern: &str, replacement: &str) -> Result<PatternOutcome, TransformError> {
    let regex = Regex::new(pattern)?;
    let template = ReplacementTemplate::parse(replacement)?;
    template.validate(&regex)?;

    let mut output = String::with_capacity(text.len());
    let mut last_end = 0;
    let mut match_count = 0;

    for captures in regex.captures_iter(text) {
        let Some(mat) = captures.get(0) else {
            continue;
        };
        output.push_str(&text[last_end..mat.start()]);
        template.render(&captures, &mut output);
        last_end = mat.end();
        match_count += 1;
    }

    if match_count == 0 {
        return Ok(PatternOutcome {
            text: text.to_string(),
            match_count,
        });
    }

    output.push_str(&text[last_end..]);
    Ok(PatternOutcome {
        text: output,
        match_count,
    })
}
