/// Longest absolute path accepted by default, in characters.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 32;

/// Per-terminal shell state: the working directory, the pattern extracted by
/// the most recent path resolution, and the exit request.
#[derive(Debug, Clone)]
pub struct Session {
    work_dir: String,
    pattern: Option<String>,
    exit_requested: bool,
    max_path_length: usize,
}

impl Session {
    pub fn new() -> Self {
        Self {
            work_dir: "/".to_string(),
            pattern: None,
            exit_requested: false,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
        }
    }

    #[must_use]
    pub const fn with_max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = max;
        self
    }

    pub fn work_dir(&self) -> &str {
        &self.work_dir
    }

    pub fn set_work_dir(&mut self, path: impl Into<String>) {
        self.work_dir = path.into();
    }

    /// Prompt text for the current working directory.
    pub fn prompt(&self) -> String {
        format!("{} >", self.work_dir)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn set_pattern(&mut self, pattern: Option<String>) {
        self.pattern = pattern;
    }

    pub fn clear_pattern(&mut self) {
        self.pattern = None;
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub const fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Returns the exit request and clears it.
    pub fn take_exit(&mut self) -> bool {
        std::mem::take(&mut self.exit_requested)
    }

    pub const fn max_path_length(&self) -> usize {
        self.max_path_length
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
