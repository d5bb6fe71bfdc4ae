//! 対話モードのコントローラー
//!
//! ウィンドウ側（編集ウィジェット・ネイティブダイアログ）からの要求を受けて、
//! レジストリ・テキストストア・範囲置換を組み合わせる。
//! 呼び出しはすべて単一の制御スレッドで直列に処理される

use crate::error::{Alert, Result, SessionError, TextdeskError};
use crate::file::{path::save_suggestion, resolve_path, FsTextStore, TextStore};
use crate::options::{BootData, LaunchOptions};
use crate::session::{Document, DocumentId, DocumentState, SessionRegistry};
use crate::transform::{range, TextRange};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 保存先を尋ねる際の提案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePrompt {
    pub directory: Option<PathBuf>,
    pub file_name: String,
}

/// ウィンドウ側の境界
///
/// ダイアログの表示方法には依存せず、選ばれたパスと通知だけをやり取りする
pub trait HostBridge {
    /// 保存先パスを選ばせる。キャンセル時は `None`
    fn choose_save_path(&mut self, prompt: &SavePrompt) -> Option<PathBuf>;

    /// タイトル・変更状態・内容の更新を通知する
    fn document_changed(&mut self, view: &DocumentView);

    /// エラーなどをアラートとして表示する
    fn alert(&mut self, alert: &Alert);
}

/// ウィンドウ側へ返すドキュメントの状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: DocumentId,
    pub path: Option<PathBuf>,
    pub text: String,
    pub dirty: bool,
    pub state: DocumentState,
    pub display_name: String,
    pub title: String,
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id(),
            path: doc.path().map(Path::to_path_buf),
            text: doc.content().to_string(),
            dirty: doc.is_dirty(),
            state: doc.state(),
            display_name: doc.display_name(),
            title: doc.title(),
        }
    }
}

/// 対話モードのコントローラー
pub struct InteractiveController<H: HostBridge, S: TextStore = FsTextStore> {
    registry: SessionRegistry,
    store: S,
    host: H,
}

impl<H: HostBridge, S: TextStore> InteractiveController<H, S> {
    /// 未保存ドキュメント 1 つで開始する
    pub fn new(host: H, store: S) -> Self {
        Self {
            registry: SessionRegistry::with_untitled(),
            store,
            host,
        }
    }

    /// 起動オプションに従ってセッションを開始し、ウィジェット向けの起動データを返す
    ///
    /// 起動ファイルが読めない場合はアラートを出して未保存ドキュメントで開始する
    pub fn launch(host: H, store: S, options: &LaunchOptions) -> (Self, BootData) {
        let mut controller = Self {
            registry: SessionRegistry::new(),
            store,
            host,
        };

        let id = match options.boot_file() {
            Some(path) => match controller.open_file(path) {
                Ok(view) => view.id,
                Err(_) => controller.registry.open_untitled(""),
            },
            None => controller.registry.open_untitled(""),
        };

        let range = options.selection.to_range();
        if let (Some(range), Some(text)) = (range, options.replace_text.as_deref()) {
            // 失敗はアラート済み。セッションは継続する
            let _ = controller.replace_range(id, range, text, options.autosave);
        }

        let boot = controller.boot_data(id, range, options);
        (controller, boot)
    }

    fn boot_data(
        &self,
        id: DocumentId,
        range: Option<TextRange>,
        options: &LaunchOptions,
    ) -> BootData {
        let view = self
            .registry
            .get(id)
            .or_else(|| self.registry.active())
            .map(DocumentView::from);

        let (text, path, display_name, dirty, title, document_id) = match view {
            Some(view) => (
                view.text,
                view.path,
                view.display_name,
                view.dirty,
                view.title,
                view.id.value(),
            ),
            None => Default::default(),
        };

        BootData {
            document_id,
            is_untitled: path.is_none(),
            text,
            path,
            range,
            theme: options.theme,
            lang: options.resolve_language(),
            read_only: options.read_only,
            display_name,
            is_dirty: dirty,
            title,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// アクティブなドキュメント
    pub fn active_view(&self) -> Option<DocumentView> {
        self.registry.active().map(DocumentView::from)
    }

    fn view(&self, id: DocumentId) -> Result<DocumentView> {
        self.registry
            .get(id)
            .map(DocumentView::from)
            .ok_or_else(|| SessionError::UnknownDocument { id: id.value() }.into())
    }

    fn notify(&mut self, view: &DocumentView) {
        log::debug!("title: {}", view.title);
        self.host.document_changed(view);
    }

    /// 失敗をアラート境界へ報告してから呼び出し元へ返す
    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            log::error!("{}", err);
            // 保存先選択のキャンセルは利用者自身の操作なのでアラートは出さない
            if !matches!(err, TextdeskError::Session(SessionError::PathRequired)) {
                self.host.alert(&Alert::from_error(err));
            }
        }
        result
    }

    /// ファイルを開く（既に開いていればそのドキュメントをアクティブにする）
    pub fn open_file(&mut self, path: &Path) -> Result<DocumentView> {
        let result = self.open_file_inner(path);
        self.report(result)
    }

    fn open_file_inner(&mut self, path: &Path) -> Result<DocumentView> {
        let resolved = resolve_path(path)?;
        if let Some(id) = self.registry.find_by_path(&resolved) {
            self.registry.activate(id);
            let view = self.view(id)?;
            self.notify(&view);
            return Ok(view);
        }

        let text = self.store.load(Some(&resolved))?;
        let view = DocumentView::from(self.registry.open_or_activate(&resolved, text)?);
        self.notify(&view);
        Ok(view)
    }

    /// 新しい未保存ドキュメントを開く
    pub fn new_untitled(&mut self) -> DocumentId {
        let id = self.registry.open_untitled("");
        if let Ok(view) = self.view(id) {
            self.notify(&view);
        }
        id
    }

    /// ウィジェットで編集された内容を反映する
    pub fn update_content(
        &mut self,
        id: DocumentId,
        text: impl Into<String>,
    ) -> Result<DocumentView> {
        let result = self.registry.mutate(id, text).map(DocumentView::from);
        let view = self.report(result)?;
        self.notify(&view);
        Ok(view)
    }

    /// 保存する
    ///
    /// パス未設定で明示パスもない場合はウィンドウ側に保存先を尋ねる
    pub fn save(&mut self, id: DocumentId, explicit: Option<&Path>) -> Result<DocumentView> {
        let result = self.save_inner(id, explicit, false);
        self.report(result)
    }

    /// 別名で保存する（常に保存先を尋ねる）
    pub fn save_as(&mut self, id: DocumentId) -> Result<DocumentView> {
        let result = self.save_inner(id, None, true);
        self.report(result)
    }

    fn save_inner(
        &mut self,
        id: DocumentId,
        explicit: Option<&Path>,
        force_prompt: bool,
    ) -> Result<DocumentView> {
        let current = self
            .registry
            .get(id)
            .ok_or(SessionError::UnknownDocument { id: id.value() })?
            .path()
            .map(Path::to_path_buf);

        let target = match (explicit, &current) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(_)) if !force_prompt => None,
            (None, _) => {
                let (directory, file_name) = save_suggestion(current.as_deref());
                let prompt = SavePrompt {
                    directory,
                    file_name,
                };
                match self.host.choose_save_path(&prompt) {
                    Some(chosen) => Some(chosen),
                    None => return Err(SessionError::PathRequired.into()),
                }
            }
        };

        let view = DocumentView::from(self.registry.save(id, &self.store, target.as_deref())?);
        self.notify(&view);
        Ok(view)
    }

    /// 範囲置換を適用する。`autosave` なら束縛済みパスへ直ちに保存する
    pub fn replace_range(
        &mut self,
        id: DocumentId,
        range: TextRange,
        text: &str,
        autosave: bool,
    ) -> Result<DocumentView> {
        let result = self.replace_range_inner(id, range, text, autosave);
        self.report(result)
    }

    fn replace_range_inner(
        &mut self,
        id: DocumentId,
        range: TextRange,
        text: &str,
        autosave: bool,
    ) -> Result<DocumentView> {
        let doc = self
            .registry
            .get(id)
            .ok_or(SessionError::UnknownDocument { id: id.value() })?;

        if autosave && doc.path().is_none() {
            return Err(SessionError::AutosaveRequiresPath.into());
        }

        let replaced = range::apply(doc.content(), &range, text)?;
        self.registry.mutate(id, replaced)?;
        log::info!("replaced range {:?} in {}", range, id);

        if autosave {
            return self.save_inner(id, None, false);
        }

        let view = self.view(id)?;
        self.notify(&view);
        Ok(view)
    }

    /// アクティブなドキュメントを切り替える。未知の ID は無視する
    pub fn activate(&mut self, id: DocumentId) -> Option<DocumentView> {
        if !self.registry.activate(id) {
            return None;
        }
        let view = self.view(id).ok()?;
        self.notify(&view);
        Some(view)
    }

    /// ドキュメントを閉じ、新たにアクティブになったドキュメントを返す
    ///
    /// 未保存変更の確認はウィンドウ側の責務
    pub fn close(&mut self, id: DocumentId) -> Option<DocumentView> {
        self.registry.close(id)?;
        let view = self.active_view()?;
        self.notify(&view);
        Some(view)
    }
}
