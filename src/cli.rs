//! コマンドラインインターフェース
//!
//! フラグの組み合わせでヘッドレスモードか対話モードかを選ぶ。
//! ヘッドレスモードの終了コード: 0 成功（マッチなしを含む）、1 実行時エラー、2 引数の組み合わせ不正

use crate::controller::{DocumentView, HostBridge, InteractiveController, SavePrompt};
use crate::error::{Alert, ConfigError};
use crate::file::FsTextStore;
use crate::headless::HeadlessRunner;
use crate::logging::{Logger, DEBUG_ENV_VAR};
use crate::options::{LaunchOptions, SelectionRequest, Theme};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// 引数の組み合わせ不正時の終了コード
pub const EXIT_USAGE: u8 = 2;
/// 実行時エラーの終了コード
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "textdesk")]
#[command(version, about = "Text editor host with a headless regex replacement mode", long_about = None)]
pub struct Cli {
    /// File to open (or to rewrite in headless mode)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Start with an untitled buffer, ignoring --file
    #[arg(long)]
    pub untitled: bool,

    /// Start line of the initial selection (1-based)
    #[arg(long, value_name = "LINE")]
    pub sline: Option<usize>,

    /// End line of the initial selection (1-based)
    #[arg(long, value_name = "LINE")]
    pub eline: Option<usize>,

    /// Start column of the initial selection (1-based)
    #[arg(long, value_name = "COL")]
    pub scol: Option<usize>,

    /// End column of the initial selection (1-based, inclusive)
    #[arg(long, value_name = "COL")]
    pub ecol: Option<usize>,

    /// Text that replaces the initial selection
    #[arg(long, value_name = "TEXT")]
    pub replace_text: Option<String>,

    /// Save right after the initial replacement
    #[arg(long)]
    pub autosave: bool,

    /// Editor theme
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    pub theme: Theme,

    /// Syntax highlighting language (inferred from the extension when omitted)
    #[arg(long, visible_alias = "language", value_name = "LANG")]
    pub lang: Option<String>,

    /// Open the editor read-only
    #[arg(long)]
    pub read_only: bool,

    /// Regex to search for (headless mode)
    #[arg(long, visible_alias = "pattern", value_name = "REGEX")]
    pub regex_find: Option<String>,

    /// Replacement template (headless mode)
    #[arg(long, visible_alias = "replacement", value_name = "TEMPLATE")]
    pub regex_replace: Option<String>,

    /// Mirror log lines into a file (default ~/.textdesk-log/debug.log)
    #[arg(long, value_name = "PATH")]
    pub debug_log: Option<Option<PathBuf>>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// 実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Headless {
        file: PathBuf,
        pattern: String,
        replacement: String,
    },
    Interactive(LaunchOptions),
}

impl Cli {
    /// フラグの組み合わせから実行モードを決める
    pub fn mode(&self) -> Result<Mode, ConfigError> {
        match (&self.regex_find, &self.regex_replace) {
            (None, None) => Ok(Mode::Interactive(self.launch_options())),
            (Some(pattern), Some(replacement)) => {
                let file = self.file.clone().ok_or_else(|| ConfigError::Usage {
                    message: "--file is required with --regex-find and --regex-replace".to_string(),
                })?;
                Ok(Mode::Headless {
                    file,
                    pattern: pattern.clone(),
                    replacement: replacement.clone(),
                })
            }
            _ => Err(ConfigError::Usage {
                message: "--regex-find and --regex-replace must be given together".to_string(),
            }),
        }
    }

    /// 対話モードの起動設定
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            file: self.file.clone(),
            untitled: self.untitled,
            selection: SelectionRequest {
                start_line: self.sline,
                end_line: self.eline,
                start_col: self.scol,
                end_col: self.ecol,
            },
            replace_text: self.replace_text.clone(),
            autosave: self.autosave,
            theme: self.theme,
            language: self.lang.clone(),
            read_only: self.read_only,
            debug_log_path: self.debug_log.clone().flatten(),
        }
    }

    /// フラグと環境変数からロガーを組み立てる
    pub fn logger(&self) -> Logger {
        let logger = Logger::from_env(self.verbose);
        let wants_file =
            self.debug_log.is_some() || std::env::var_os(DEBUG_ENV_VAR).is_some();
        if !wants_file {
            return logger;
        }

        let Some(path) = self.launch_options().resolve_log_path() else {
            return logger;
        };

        // ロガー登録前なので標準エラー出力へ直接知らせ、ファイル出力なしで続行する
        if let Some(parent) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                eprintln!(
                    "[warning] debug log disabled: cannot create {}: {}",
                    parent.display(),
                    err
                );
                return logger;
            }
        }
        logger.with_file_output(path)
    }
}

/// 端末用のホスト。保存先ダイアログは持たない
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl HostBridge for ConsoleHost {
    fn choose_save_path(&mut self, prompt: &SavePrompt) -> Option<PathBuf> {
        log::debug!("no save dialog available (suggested {})", prompt.file_name);
        None
    }

    fn document_changed(&mut self, view: &DocumentView) {
        log::info!("{}", view.title);
    }

    fn alert(&mut self, alert: &Alert) {
        eprintln!("[{}] {}", alert.title, alert.message);
    }
}

/// コマンドを実行して終了コードを返す
pub fn run(cli: Cli) -> ExitCode {
    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("[error] {}", err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let result = match mode {
        Mode::Headless {
            file,
            pattern,
            replacement,
        } => run_headless(&file, &pattern, &replacement),
        Mode::Interactive(options) => run_interactive(&options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("[error] {:#}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run_headless(file: &Path, pattern: &str, replacement: &str) -> anyhow::Result<()> {
    let report = HeadlessRunner::new()
        .run(file, pattern, replacement)
        .with_context(|| format!("headless replacement in {} failed", file.display()))?;
    println!("{}", report.summary());
    Ok(())
}

fn run_interactive(options: &LaunchOptions) -> anyhow::Result<()> {
    let (_controller, boot) =
        InteractiveController::launch(ConsoleHost, FsTextStore::new(), options);
    let json = boot.to_json().context("failed to serialize boot data")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("textdesk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_headless_mode_requires_all_three() {
        let cli = parse(&["--file", "a.txt", "--regex-find", "a", "--regex-replace", "b"]);
        assert_eq!(
            cli.mode().unwrap(),
            Mode::Headless {
                file: PathBuf::from("a.txt"),
                pattern: "a".to_string(),
                replacement: "b".to_string(),
            }
        );

        let cli = parse(&["--regex-find", "a", "--regex-replace", "b"]);
        assert!(matches!(cli.mode(), Err(ConfigError::Usage { .. })));

        let cli = parse(&["--file", "a.txt", "--pattern", "a"]);
        assert!(matches!(cli.mode(), Err(ConfigError::Usage { .. })));
    }

    #[test]
    fn test_interactive_flags_become_launch_options() {
        let cli = parse(&[
            "--file", "x.md", "--sline", "2", "--scol", "3", "--replace-text", "hi", "--autosave",
            "--theme", "vs", "--read-only",
        ]);

        let Mode::Interactive(options) = cli.mode().unwrap() else {
            panic!("expected interactive mode");
        };
        assert_eq!(options.theme, Theme::Light);
        assert!(options.read_only);
        assert!(options.autosave);
        assert_eq!(options.replace_text.as_deref(), Some("hi"));
        assert_eq!(options.selection.start_line, Some(2));
        assert_eq!(options.resolve_language(), "markdown");
    }

    #[test]
    fn test_unwritable_debug_log_directory_disables_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let target = blocker.join("logs").join("debug.log");

        let cli = parse(&["--debug-log", target.to_str().unwrap()]);
        assert!(cli.logger().file_output().is_none());

        let target = dir.path().join("logs").join("debug.log");
        let cli = parse(&["--debug-log", target.to_str().unwrap()]);
        assert_eq!(cli.logger().file_output(), Some(target.as_path()));
    }

    #[test]
    fn test_debug_log_accepts_optional_path() {
        let cli = parse(&["--debug-log"]);
        assert_eq!(cli.debug_log, Some(None));
        assert!(cli.launch_options().debug_log_path.is_none());

        let cli = parse(&["--debug-log", "/tmp/t.log"]);
        assert_eq!(
            cli.launch_options().debug_log_path,
            Some(PathBuf::from("/tmp/t.log"))
        );
    }
}
