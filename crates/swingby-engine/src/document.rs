//! Corpus documents: Markdown with YAML front matter.
//!
//! Only the parsed metadata map and the body text are consumed here;
//! section formatting and front-matter serialization back to disk belong
//! to the note-editing tooling, not this engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use sha2::{Digest, Sha256};

use swingby_core::models::DocumentKind;
use swingby_core::{Error, Result};

/// Parsed YAML front matter.
///
/// Providers of notes are as inconsistent as providers of bibliographic
/// data: `author` may be a scalar or a list, `year` a number or a string.
/// Both are normalized on the way in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontMatter {
    pub key: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub author: Vec<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    pub doi: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub created: Option<String>,
}

impl FrontMatter {
    /// Document kind: the explicit `type` field wins, a `Paper` tag
    /// implies an article, anything else is a plain note.
    pub fn document_kind(&self) -> DocumentKind {
        match self.kind.as_deref() {
            Some("article") | Some("paper") => DocumentKind::Article,
            Some("debug") | Some("debug_log") => DocumentKind::DebugLog,
            Some(_) => DocumentKind::Note,
            None => {
                if self.tags.iter().any(|t| t == "Paper") {
                    DocumentKind::Article
                } else {
                    DocumentKind::Note
                }
            }
        }
    }

    pub fn first_author(&self) -> Option<&str> {
        self.author.first().map(String::as_str)
    }
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::One(s)) => vec![s],
        Some(Value::Many(v)) => v,
        None => Vec::new(),
    })
}

fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Number(i32),
        Text(String),
    }
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(y)) => Some(y),
        Some(Value::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// One corpus file, parsed.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub file_name: String,
    /// File stem; the key for non-article notes.
    pub stem: String,
    pub front_matter: FrontMatter,
    pub body: String,
    /// SHA-256 of the raw file content, the reindex guard.
    pub content_hash: String,
    pub kind: DocumentKind,
}

impl Document {
    /// Parse raw file content.
    pub fn parse(path: impl Into<PathBuf>, raw: &str) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;
        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());

        let (front_matter, body) = split_front_matter(raw)?;
        let content_hash = content_hash(raw);
        let kind = front_matter.document_kind();

        Ok(Self {
            path,
            file_name,
            stem,
            front_matter,
            body,
            content_hash,
            kind,
        })
    }

    /// Read and parse a corpus file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::parse(path, &raw)
    }

    /// Best available title: front matter, else the file stem.
    pub fn title(&self) -> &str {
        self.front_matter.title.as_deref().unwrap_or(&self.stem)
    }
}

/// Split YAML front matter from the body.
///
/// Leading blank lines are tolerated; a document without a front-matter
/// fence is all body.
pub fn split_front_matter(raw: &str) -> Result<(FrontMatter, String)> {
    let lines: Vec<&str> = raw.lines().collect();
    let first_content = lines.iter().position(|l| !l.trim().is_empty());
    let Some(first_content) = first_content else {
        return Ok((FrontMatter::default(), String::new()));
    };
    if !lines[first_content].trim().contains("---") {
        return Ok((FrontMatter::default(), lines[first_content..].join("\n")));
    }

    let yaml_start = first_content + 1;
    let Some(yaml_end) = lines[yaml_start..]
        .iter()
        .position(|l| l.trim().contains("---"))
        .map(|i| i + yaml_start)
    else {
        // Unterminated fence: treat everything as body.
        return Ok((FrontMatter::default(), lines[first_content..].join("\n")));
    };

    let yaml_text = lines[yaml_start..yaml_end].join("\n");
    let front_matter: FrontMatter = serde_yaml::from_str(&yaml_text)?;
    Ok((front_matter, lines[yaml_end + 1..].join("\n")))
}

/// Text of the named section: from the heading containing `# name` (any
/// level, case-insensitive) up to the next heading of the same level.
pub fn extract_section(body: &str, section_name: &str) -> Option<String> {
    let lines: Vec<&str> = body.lines().collect();
    let needle = format!("# {}", section_name).to_lowercase();

    let mut level = 0;
    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match start {
            None => {
                if trimmed.to_lowercase().contains(&needle) {
                    level = heading_level(trimmed);
                    start = Some(i);
                }
            }
            Some(s) => {
                if heading_level(trimmed) == level && trimmed.starts_with('#') {
                    return Some(lines[s + 1..i].join("\n"));
                }
            }
        }
    }
    start.map(|s| lines[s + 1..].join("\n"))
}

fn heading_level(line: &str) -> usize {
    line.split_whitespace()
        .next()
        .map(|token| token.chars().take_while(|c| *c == '#').count())
        .unwrap_or(0)
}

/// SHA-256 of the raw content, hex-encoded.
pub fn content_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
