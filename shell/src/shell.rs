//! Shell state and the interactive loop

use std::sync::Arc;
use std::time::Duration;

use lfsh_config::ShellConfig;
use lfsh_sdk::{CharStream, FileStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::editor::{LineEditor, LineEvent};
use crate::error::ShellResult;
use crate::history::History;
use crate::session::{Session, DEFAULT_MAX_PATH_LENGTH};
use crate::stream::MemoryStream;
use crate::terminal::Terminal;
use crate::tokenizer::tokenize;

const DEFAULT_LOAD_IDLE_TIMEOUT: Duration = Duration::from_millis(500);

/// One terminal session driving one file store.
pub struct Shell {
    pub(crate) store: Arc<dyn FileStore>,
    pub(crate) terminal: Terminal,
    pub(crate) session: Session,
    pub(crate) editor: LineEditor,
    pub(crate) load_idle_timeout: Duration,
    banner: Option<String>,
}

impl Shell {
    pub fn builder(store: Arc<dyn FileStore>) -> ShellBuilder {
        ShellBuilder::new(store)
    }

    /// Execute one command line without going through the line editor
    pub async fn execute(&mut self, line: &str) -> ShellResult<()> {
        let args = tokenize(line);
        let result = self.dispatch(&args).await;
        self.session.clear_pattern();
        result
    }

    /// Reads and executes one line. Returns `false` when the session is over:
    /// after `exit`, Ctrl-D, end of input or cancellation.
    pub async fn run_once(&mut self) -> ShellResult<bool> {
        if self.session.take_exit() {
            return Ok(false);
        }

        self.terminal.newline().await?;
        let prompt = self.session.prompt();
        let line = match self.editor.read_line(&mut self.terminal, &prompt).await? {
            LineEvent::Line(line) => line,
            LineEvent::EndOfTransmission => return Ok(false),
        };

        match self.execute(&line).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) if e.already_reported() => debug!(error = %e, "batch finished with failures"),
            Err(e) => {
                if let Some(source) = e.store_error() {
                    warn!(line = %line, error = %source, "store operation failed");
                }
                self.terminal.write_line(&e.to_string()).await?;
            }
        }
        Ok(true)
    }

    /// Runs until `exit`, Ctrl-D, end of input or cancellation.
    pub async fn run(&mut self) -> ShellResult<()> {
        if let Some(banner) = self.banner.clone() {
            self.terminal.write_line(&banner).await?;
        }
        info!(work_dir = %self.session.work_dir(), "shell started");

        while self.run_once().await? {}

        self.terminal.flush().await?;
        info!("shell finished");
        Ok(())
    }

    pub fn work_dir(&self) -> &str {
        self.session.work_dir()
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn history(&self) -> &History {
        self.editor.history()
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.terminal.cancellation_token()
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("session", &self.session)
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

pub struct ShellBuilder {
    store: Arc<dyn FileStore>,
    stream: Option<Box<dyn CharStream>>,
    cancel: CancellationToken,
    max_path_length: usize,
    load_idle_timeout: Duration,
    banner: Option<String>,
}

impl ShellBuilder {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self {
            store,
            stream: None,
            cancel: CancellationToken::new(),
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            load_idle_timeout: DEFAULT_LOAD_IDLE_TIMEOUT,
            banner: None,
        }
    }

    /// Terminal transport; a closed, empty [`MemoryStream`] when unset.
    #[must_use]
    pub fn stream(mut self, stream: impl CharStream + 'static) -> Self {
        self.stream = Some(Box::new(stream));
        self
    }

    #[must_use]
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub const fn max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = max;
        self
    }

    #[must_use]
    pub const fn load_idle_timeout(mut self, timeout: Duration) -> Self {
        self.load_idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Applies the `shell` section of the configuration file.
    #[must_use]
    pub fn config(mut self, config: &ShellConfig) -> Self {
        self.max_path_length = config.max_path_length;
        self.load_idle_timeout = Duration::from_millis(config.load_idle_timeout_ms);
        self.banner.clone_from(&config.banner);
        self
    }

    pub fn build(self) -> Shell {
        let stream: Box<dyn CharStream> = match self.stream {
            Some(stream) => stream,
            None => Box::new(MemoryStream::scripted(b"")),
        };
        let terminal = Terminal::from_boxed(stream, self.cancel);
        Shell {
            store: self.store,
            terminal,
            session: Session::new().with_max_path_length(self.max_path_length),
            editor: LineEditor::new(),
            load_idle_timeout: self.load_idle_timeout,
            banner: self.banner,
        }
    }
}
