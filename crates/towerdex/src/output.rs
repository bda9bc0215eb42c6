//! Output mode control.
//!
//! [`OutputMode`] is the user-facing `--output` flag: a plain text table or
//! one of the structured formats. [`OutputDestination`] is where the
//! rendered result goes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How command output is rendered.
///
/// - `Text` - aligned columns for reading in a terminal
/// - `Json`, `Yaml`, `Csv` - serialize the records directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Text,
    Json,
    Yaml,
    Csv,
}

impl OutputMode {
    pub fn is_structured(&self) -> bool {
        !matches!(self, OutputMode::Text)
    }
}

/// Where a command's rendered output goes: stdout or `--out-file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(OutputDestination::Stdout, OutputDestination::File)
    }

    /// Stdout gets exactly one trailing newline. Files get the content as is.
    pub fn write_text(&self, content: &str) -> io::Result<()> {
        match self {
            OutputDestination::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", content.trim_end_matches('\n'))
            }
            OutputDestination::File(path) => {
                ensure_parent_exists(path)?;
                fs::write(path, content)
            }
        }
    }
}

impl OutputDestination {
    /// A writer for output produced in several pieces. A file is created,
    /// or truncated if it exists.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        match self {
            OutputDestination::Stdout => Ok(Box::new(io::stdout())),
            OutputDestination::File(path) => {
                ensure_parent_exists(path)?;
                Ok(Box::new(io::BufWriter::new(fs::File::create(path)?)))
            }
        }
    }
}

fn ensure_parent_exists(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such directory: {}", dir.display()),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_the_only_unstructured_mode() {
        assert_eq!(OutputMode::default(), OutputMode::Text);
        let structured: Vec<_> = OutputMode::value_variants()
            .iter()
            .filter(|m| m.is_structured())
            .collect();
        assert_eq!(structured, [&OutputMode::Json, &OutputMode::Yaml, &OutputMode::Csv]);
    }

    #[test]
    fn flag_and_config_spellings_agree() {
        assert_eq!(OutputMode::from_str("yaml", true), Ok(OutputMode::Yaml));
        let mode: OutputMode = serde_yaml::from_str("json").unwrap();
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn out_file_receives_content_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.csv");
        let dest = OutputDestination::from_option(Some(path.clone()));

        dest.write_text("name\nFire Rain\n").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "name\nFire Rain\n");
    }

    #[test]
    fn streamed_output_replaces_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("browse.txt");
        fs::write(&path, "old session\n").unwrap();
        let dest = OutputDestination::File(path.clone());

        {
            let mut out = dest.writer().unwrap();
            writeln!(out, "first").unwrap();
            writeln!(out, "second").unwrap();
            out.flush().unwrap();
        }

        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
        let missing = OutputDestination::File(dir.path().join("nope").join("x.txt"));
        assert!(missing.writer().is_err());
    }

    #[test]
    fn out_file_in_a_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = OutputDestination::File(dir.path().join("exports").join("chips.csv"));

        let err = dest.write_text("name\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("exports"));
    }
}
