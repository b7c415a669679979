//! System prompt templates read from the prompts directory.

use std::{fmt, fs, io, path::PathBuf};

use tracing::{error, instrument};

use crate::base::config::Config;

/// File extension of prompt templates.
pub const PROMPT_EXTENSION: &str = "prompt";

/// The logical prompts the assistant knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Classification prompt used for every query.
    Default,
    /// Prompt that constrains the answer to fetched tracker data.
    Detail,
}

impl PromptKind {
    pub fn name(&self) -> &'static str {
        match self {
            PromptKind::Default => "default",
            PromptKind::Detail => "detail",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolves prompt templates from a directory.
#[derive(Debug, Clone)]
pub struct Prompts {
    dir: PathBuf,
}

impl Prompts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.prompts_dir.clone())
    }

    /// Path of the template for `kind`.
    pub fn path(&self, kind: PromptKind) -> PathBuf {
        self.dir.join(format!("{}.{PROMPT_EXTENSION}", kind.name()))
    }

    /// Read the template for `kind` as a single-line string.
    ///
    /// A missing file is logged and resolves to an empty prompt.
    #[instrument(name = "Prompts::get_system_prompt", skip(self))]
    pub fn get_system_prompt(&self, kind: PromptKind) -> String {
        match self.read(kind) {
            Ok(prompt) => prompt,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                error!("Prompt file not found: {kind}");
                String::new()
            }
            Err(err) => {
                error!("Unable to read prompt `{kind}`: {err}");
                String::new()
            }
        }
    }

    fn read(&self, kind: PromptKind) -> io::Result<String> {
        fs::read_to_string(self.path(kind)).map(|raw| collapse_newlines(&raw))
    }
}

/// Replace every line break with the two-character sequence `\n`.
pub fn collapse_newlines(text: &str) -> String {
    text.replace('\n', "\\n")
}
