//! Engine configuration.
//!
//! The corpus directory and store path are required; missing values are
//! configuration errors, fatal at startup. Everything else falls back to
//! the shared defaults.

use std::env;
use std::path::PathBuf;

use swingby_core::defaults;
use swingby_core::{Error, Result};

/// Environment variable naming the knowledge store file.
pub const STORE_VAR: &str = "SWINGBY_STORE";

/// Environment variable naming the note corpus directory.
pub const CORPUS_VAR: &str = "SWINGBY_CORPUS";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory of Markdown notes.
    pub corpus_dir: PathBuf,
    /// Knowledge store file.
    pub store_path: PathBuf,
    /// Unattended mode: ambiguous matches auto-reject instead of
    /// prompting.
    pub script_mode: bool,
    /// Keywords requested per document.
    pub keyword_count: usize,
    /// General/specific keyword split.
    pub keyword_ratio: f32,
    /// Vector results per embedding field at query time.
    pub vector_fanout: usize,
    /// Keyword-overlap results at query time.
    pub keyword_fanout: usize,
    /// Estimated token budget for assembled context.
    pub context_budget: usize,
}

impl EngineConfig {
    pub fn new(corpus_dir: impl Into<PathBuf>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            store_path: store_path.into(),
            script_mode: true,
            keyword_count: defaults::KEYWORD_COUNT,
            keyword_ratio: defaults::KEYWORD_RATIO,
            vector_fanout: defaults::VECTOR_FANOUT,
            keyword_fanout: defaults::KEYWORD_FANOUT,
            context_budget: defaults::CONTEXT_TOKEN_BUDGET,
        }
    }

    /// Build from the environment (a `.env` file is honored).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let corpus_dir =
            env::var(CORPUS_VAR).map_err(|_| Error::Config(format!("{CORPUS_VAR} is not set")))?;
        let store_path =
            env::var(STORE_VAR).map_err(|_| Error::Config(format!("{STORE_VAR} is not set")))?;

        let mut config = Self::new(corpus_dir, store_path);
        if let Ok(value) = env::var("SWINGBY_SCRIPT_MODE") {
            config.script_mode = value == "1" || value.eq_ignore_ascii_case("true");
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.corpus_dir.as_os_str().is_empty() {
            return Err(Error::Config("Corpus directory cannot be empty".to_string()));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(Error::Config("Store path cannot be empty".to_string()));
        }
        if self.keyword_count == 0 {
            return Err(Error::Config("Keyword count must be positive".to_string()));
        }
        Ok(())
    }
}
