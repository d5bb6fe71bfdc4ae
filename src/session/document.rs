//! ドキュメントセッション
//!
//! 開いている 1 バッファ分のモデル。パスの束縛・変更状態・保存の遷移を管理する
//!
//! 状態遷移:
//! `Unbound` →(save)→ `BoundClean` ⇄(mutate / save)⇄ `BoundDirty`、いずれからも close で `Closed`

use crate::error::{Result, SessionError};
use crate::file::{display_name, resolve_path, TextStore};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// ウィンドウタイトルの接尾辞
pub const APP_TITLE: &str = "Textdesk";

/// 未保存変更の表示記号
pub const DIRTY_MARKER: char = '●';

/// ドキュメントの識別子。レジストリ内で一意かつ再利用されない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// ドキュメントの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentState {
    /// パス未設定（一度も保存されていない）
    Unbound,
    /// パス設定済み、内容はディスクと一致
    BoundClean,
    /// パス設定済み、未保存の変更あり
    BoundDirty,
    /// 閉じられた（終端状態）
    Closed,
}

/// 編集可能なバッファ 1 つ分
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    path: Option<PathBuf>,
    content: String,
    dirty: bool,
    closed: bool,
}

impl Document {
    /// 未保存の新規ドキュメント
    pub fn untitled(id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            id,
            path: None,
            content: text.into(),
            dirty: false,
            closed: false,
        }
    }

    /// 読み込み済みの内容でパスに束縛されたドキュメントを作成
    pub(crate) fn bound(id: DocumentId, path: PathBuf, text: String) -> Self {
        Self {
            id,
            path: Some(path),
            content: text,
            dirty: false,
            closed: false,
        }
    }

    /// 初期テキストと初期パスからドキュメントを作成
    ///
    /// パスがあればストアから読み込み、成功した場合のみ `BoundClean` で返す
    pub fn create<S: TextStore + ?Sized>(
        id: DocumentId,
        store: &S,
        initial_text: impl Into<String>,
        initial_path: Option<&Path>,
    ) -> Result<Self> {
        match initial_path {
            None => Ok(Self::untitled(id, initial_text)),
            Some(path) => {
                let resolved = resolve_path(path)?;
                let text = store.load(Some(&resolved))?;
                Ok(Self::bound(id, resolved, text))
            }
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 未保存ドキュメントは常に保存が必要とみなす
    pub fn needs_save(&self) -> bool {
        self.dirty || self.path.is_none()
    }

    pub fn state(&self) -> DocumentState {
        match (self.closed, &self.path, self.dirty) {
            (true, _, _) => DocumentState::Closed,
            (false, None, _) => DocumentState::Unbound,
            (false, Some(_), false) => DocumentState::BoundClean,
            (false, Some(_), true) => DocumentState::BoundDirty,
        }
    }

    /// タブ・タイトルに表示する名前
    pub fn display_name(&self) -> String {
        display_name(self.path())
    }

    /// ウィンドウタイトル（例: `main.rs● - Textdesk`）
    pub fn title(&self) -> String {
        let marker = if self.dirty {
            DIRTY_MARKER.to_string()
        } else {
            String::new()
        };
        format!("{}{} - {}", self.display_name(), marker, APP_TITLE)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(SessionError::Closed { id: self.id.value() }.into());
        }
        Ok(())
    }

    /// 内容を置き換えて変更状態にする
    pub fn mutate(&mut self, new_content: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.content = new_content.into();
        self.dirty = true;
        Ok(())
    }

    /// 保存先を決定する（明示指定 → 束縛済みパス）
    pub fn save_target(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match (explicit, &self.path) {
            (Some(path), _) => resolve_path(path),
            (None, Some(bound)) => Ok(bound.clone()),
            (None, None) => Err(SessionError::PathRequired.into()),
        }
    }

    /// 保存する
    ///
    /// 成功時のみ `BoundClean` へ遷移し、失敗時は状態を変更しない
    pub fn save<S: TextStore + ?Sized>(
        &mut self,
        store: &S,
        explicit: Option<&Path>,
    ) -> Result<PathBuf> {
        self.ensure_open()?;
        let target = self.save_target(explicit)?;

        store.save(&target, &self.content)?;

        // 新規作成したファイルは保存後に初めて正規化できる
        let target = resolve_path(&target).unwrap_or(target);
        log::info!("{} saved to {}", self.id, target.display());
        self.path = Some(target.clone());
        self.dirty = false;
        Ok(target)
    }

    /// 閉じる（終端状態）
    pub fn close(&mut self) {
        self.closed = true;
    }
}
