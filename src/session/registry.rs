//! セッションレジストリ
//!
//! 同時に開いているドキュメント（タブ）の集合とアクティブなドキュメントを管理する
//!
//! - 解決済みパス 1 つにつき最大 1 ドキュメント
//! - 表示順は追加順。ID は閉じても再利用しない
//! - 最後のドキュメントを閉じると新しい未保存ドキュメントを補充する

use super::document::{Document, DocumentId};
use crate::error::{Result, SessionError};
use crate::file::{resolve_path, TextStore};
use std::path::{Path, PathBuf};

/// ドキュメントの集合
#[derive(Debug, Default)]
pub struct SessionRegistry {
    documents: Vec<Document>,
    active_id: Option<DocumentId>,
    next_id: u64,
}

impl SessionRegistry {
    /// 空のレジストリ
    pub fn new() -> Self {
        Self::default()
    }

    /// 未保存ドキュメント 1 つで開始するレジストリ
    pub fn with_untitled() -> Self {
        let mut registry = Self::new();
        registry.open_untitled("");
        registry
    }

    fn allocate_id(&mut self) -> DocumentId {
        self.next_id = self.next_id.saturating_add(1);
        DocumentId::new(self.next_id)
    }

    fn find_index(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id() == id)
    }

    fn find_index_by_resolved(&self, resolved: &Path) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.path().map_or(false, |p| p == resolved))
    }

    fn document_mut(&mut self, id: DocumentId) -> Result<&mut Document> {
        self.documents
            .iter_mut()
            .find(|doc| doc.id() == id)
            .ok_or_else(|| SessionError::UnknownDocument { id: id.value() }.into())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// 表示順のドキュメント一覧
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.find_index(id).map(|index| &self.documents[index])
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Document> {
        self.active_id.and_then(|id| self.get(id))
    }

    /// パスに対応する開いているドキュメントを探す
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        let resolved = resolve_path(path).ok()?;
        self.find_index_by_resolved(&resolved)
            .map(|index| self.documents[index].id())
    }

    /// 未保存ドキュメントを追加してアクティブにする
    pub fn open_untitled(&mut self, text: impl Into<String>) -> DocumentId {
        let id = self.allocate_id();
        self.documents.push(Document::untitled(id, text));
        self.active_id = Some(id);
        log::debug!("opened untitled document {}", id);
        id
    }

    /// パスのドキュメントを開く、または既存のものをアクティブにする
    ///
    /// 既に開いている場合は内容・変更状態をディスクから再読み込みしない
    pub fn open_or_activate(&mut self, path: &Path, text: String) -> Result<&Document> {
        let resolved = resolve_path(path)?;

        let index = match self.find_index_by_resolved(&resolved) {
            Some(index) => {
                log::debug!("{} is already open; activating", resolved.display());
                index
            }
            None => {
                let id = self.allocate_id();
                log::debug!("opened {} as {}", resolved.display(), id);
                self.documents.push(Document::bound(id, resolved, text));
                self.documents.len() - 1
            }
        };

        self.active_id = Some(self.documents[index].id());
        Ok(&self.documents[index])
    }

    /// アクティブなドキュメントを切り替える。未知の ID は無視する
    pub fn activate(&mut self, id: DocumentId) -> bool {
        if self.find_index(id).is_none() {
            return false;
        }
        self.active_id = Some(id);
        true
    }

    /// ドキュメントの内容を置き換える
    pub fn mutate(&mut self, id: DocumentId, content: impl Into<String>) -> Result<&Document> {
        let doc = self.document_mut(id)?;
        doc.mutate(content)?;
        Ok(&*doc)
    }

    /// ドキュメントを保存する
    ///
    /// 別のドキュメントが既に使っているパスへの保存は拒否する
    pub fn save<S: TextStore + ?Sized>(
        &mut self,
        id: DocumentId,
        store: &S,
        explicit: Option<&Path>,
    ) -> Result<&Document> {
        let index = self
            .find_index(id)
            .ok_or(SessionError::UnknownDocument { id: id.value() })?;
        let target = self.documents[index].save_target(explicit)?;

        if let Some(other) = self.find_index_by_resolved(&target) {
            if other != index {
                return Err(SessionError::PathInUse {
                    path: target.display().to_string(),
                }
                .into());
            }
        }

        let doc = &mut self.documents[index];
        doc.save(store, Some(&target))?;
        Ok(&*doc)
    }

    /// ドキュメントを閉じて取り除く
    ///
    /// アクティブなものを閉じた場合は直前のドキュメント（なければ先頭）へ移る。
    /// 空になった場合は未保存ドキュメントを補充する
    pub fn close(&mut self, id: DocumentId) -> Option<Document> {
        let index = self.find_index(id)?;
        let mut removed = self.documents.remove(index);
        removed.close();

        if self.active_id == Some(id) {
            self.active_id = index
                .checked_sub(1)
                .and_then(|prev| self.documents.get(prev))
                .or_else(|| self.documents.first())
                .map(Document::id);
        }

        if self.documents.is_empty() {
            self.open_untitled("");
        }

        log::debug!("closed document {}", id);
        Some(removed)
    }

    /// 開いているパスの一覧（表示順）
    pub fn open_paths(&self) -> Vec<PathBuf> {
        self.documents
            .iter()
            .filter_map(|doc| doc.path().map(Path::to_path_buf))
            .collect()
    }
}
