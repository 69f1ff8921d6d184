use anyhow::{Context, Result, bail};
use log::debug;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Something that can hand lyrics to a human and return the edited text.
pub trait LyricsEditor {
    fn edit(&self, text: &str) -> Result<String>;
}

/// A text editor run as a child process on a temporary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalEditor {
    /// First configured command among the flag, the settings file, `$VISUAL`
    /// and `$EDITOR`. Yields nothing when that program cannot be found.
    pub fn detect(flag: Option<&str>, configured: Option<&str>) -> Option<Self> {
        let from_env = |name: &str| env::var(name).ok();
        let command = [
            flag.map(str::to_string),
            configured.map(str::to_string),
            from_env("VISUAL"),
            from_env("EDITOR"),
        ]
        .into_iter()
        .flatten()
        .find(|command| !command.trim().is_empty())?;

        let editor = Self::from_command(&command);
        if editor.is_none() {
            debug!("editor {command:?} not found, editing disabled");
        }
        editor
    }

    pub fn from_command(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = find_program(parts.next()?)?;
        Some(Self {
            program,
            args: parts.map(str::to_string).collect(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl LyricsEditor for ExternalEditor {
    fn edit(&self, text: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("lyricpick-")
            .suffix(".txt")
            .tempfile()
            .context("failed to create temporary lyrics file")?;
        file.write_all(text.as_bytes())
            .context("failed to write temporary lyrics file")?;
        file.flush()?;

        debug!("editing lyrics with {}", self.program.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .status()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        if !status.success() {
            bail!("{} exited with {status}", self.program.display());
        }

        let edited = fs::read_to_string(file.path())
            .with_context(|| format!("failed to read {}", file.path().display()))?;
        Ok(trim_final_newline(edited))
    }
}

fn trim_final_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

fn find_program(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let search = env::var_os("PATH")?;
    env::split_paths(&search).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
