use crate::aggregator;
use crate::audio::AudioEngine;
use crate::editor::LyricsEditor;
use crate::error::LyricsError;
use crate::genre::GenreLookup;
use crate::library::{self, InputEntry, TrackStore};
use crate::model::{AudioTrack, BatchReport};
use crate::picker::{self, Interrupted, PickOutcome, Picker, PickerSurface};
use crate::sources::LyricsSource;
use crate::ui::title_case;
use anyhow::Result;
use crossterm::style::{Color, Stylize};
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

const ARROW: &str = " ⟶   ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub play: bool,
    pub skip_existing: bool,
    pub genre: bool,
    pub parallel: bool,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Unsupported,
    Broken,
    AutomaticallySkipped,
    NotFound,
    SaveError,
    PickerError,
    Interrupted,
    Skipped,
    Original,
    Adopted(String),
    Genre(Option<String>),
}

impl FileOutcome {
    pub fn label(&self) -> String {
        match self {
            Self::Unsupported => title_case("unsupported_file"),
            Self::Broken => title_case("broken_file"),
            Self::AutomaticallySkipped => title_case("automatically_skipped"),
            Self::NotFound => title_case("lyrics_not_found"),
            Self::SaveError => title_case("save_error"),
            Self::PickerError => title_case("picker_error"),
            Self::Interrupted => title_case("interrupted"),
            Self::Skipped => title_case("skipped"),
            Self::Original => title_case("original"),
            Self::Adopted(source_id) => title_case(source_id),
            Self::Genre(Some(genre)) => title_case(genre),
            Self::Genre(None) => title_case("unknown_genre"),
        }
    }

    fn color(&self) -> Color {
        match self {
            Self::Unsupported
            | Self::Broken
            | Self::NotFound
            | Self::SaveError
            | Self::PickerError
            | Self::Interrupted => Color::Red,
            Self::AutomaticallySkipped | Self::Skipped => Color::Yellow,
            Self::Adopted(_) => Color::Green,
            Self::Genre(_) => Color::Magenta,
            Self::Original => Color::White,
        }
    }
}

/// Walks the inputs and runs every file through tag reading, lookup,
/// picking and write-back. Per-file failures only ever produce a label.
pub struct BatchProcessor {
    options: BatchOptions,
    store: Box<dyn TrackStore>,
    sources: Vec<Box<dyn LyricsSource>>,
    surface: Box<dyn PickerSurface>,
    audio: Box<dyn AudioEngine>,
    editor: Option<Box<dyn LyricsEditor>>,
    genre: Option<Box<dyn GenreLookup>>,
    report: BatchReport,
}

impl BatchProcessor {
    pub fn new(
        options: BatchOptions,
        store: Box<dyn TrackStore>,
        sources: Vec<Box<dyn LyricsSource>>,
        surface: Box<dyn PickerSurface>,
        audio: Box<dyn AudioEngine>,
    ) -> Self {
        Self {
            options,
            store,
            sources,
            surface,
            audio,
            editor: None,
            genre: None,
            report: BatchReport::default(),
        }
    }

    pub fn with_editor(mut self, editor: Option<Box<dyn LyricsEditor>>) -> Self {
        self.editor = editor;
        self
    }

    pub fn with_genre(mut self, genre: Box<dyn GenreLookup>) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn report(&self) -> &BatchReport {
        &self.report
    }

    /// Processes every input in order. Only a failing `out` or an operator
    /// interrupt ends the run early.
    pub fn process(&mut self, inputs: &[PathBuf], out: &mut dyn Write) -> Result<()> {
        debug!("start processing {inputs:?}");
        'inputs: for input in inputs {
            for entry in library::walk_input(input) {
                let indent = "  ".repeat(entry.depth());
                let shown = shown_path(&entry);
                match &entry {
                    InputEntry::Directory { .. } => {
                        writeln!(out, "{indent}{}", shown.blue())?;
                    }
                    InputEntry::File { path, .. } => {
                        let (track, outcome) = self.process_file(path);
                        let display = track.map_or(shown, |track| track.to_string());
                        writeln!(
                            out,
                            "{indent}{display}{}{}",
                            ARROW.blue(),
                            outcome.label().with(outcome.color()).bold()
                        )?;
                        if outcome == FileOutcome::Interrupted {
                            warn!("run interrupted at {}", path.display());
                            break 'inputs;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn print_reports(&self, out: &mut dyn Write) -> Result<()> {
        if !self.report.skipped.is_empty() {
            writeln!(out, "\n{}", "Skipped files:".yellow().reverse())?;
            for path in &self.report.skipped {
                writeln!(out, "  {}", shell_quote(path))?;
            }
        }
        if !self.report.broken.is_empty() {
            writeln!(out, "\n{}", "Broken files:".red().reverse())?;
            for path in &self.report.broken {
                writeln!(out, "  {}", shell_quote(path))?;
            }
        }
        Ok(())
    }

    fn process_file(&mut self, path: &Path) -> (Option<AudioTrack>, FileOutcome) {
        info!("processing {}", path.display());
        let track = match self.store.read_track(path) {
            Ok(track) => track,
            Err(LyricsError::UnsupportedMediaType(_)) => return (None, FileOutcome::Unsupported),
            Err(err) => {
                warn!("{err}");
                self.report.add_broken(path);
                return (None, FileOutcome::Broken);
            }
        };

        let outcome = self.handle_track(&track);
        self.audio.stop();
        (Some(track), outcome)
    }

    fn handle_track(&mut self, track: &AudioTrack) -> FileOutcome {
        if self.options.genre {
            let genre = self
                .genre
                .as_ref()
                .and_then(|lookup| lookup.lookup(&track.song()));
            return FileOutcome::Genre(genre);
        }

        if self.options.skip_existing && track.has_lyrics() {
            return FileOutcome::AutomaticallySkipped;
        }

        if self.options.play
            && let Err(err) = self.audio.play(&track.path)
        {
            warn!("playback error: {err:#}");
        }

        let song = track.song();
        let resolved = if self.options.parallel {
            aggregator::resolve_concurrently(&song, &self.sources)
        } else {
            aggregator::resolve(&song, &self.sources)
        };
        let Some(mut picker) = resolved
            .ok()
            .and_then(|variants| Picker::new(variants, track.lyrics.clone()))
        else {
            self.report.add_broken(&track.path);
            return FileOutcome::NotFound;
        };

        let chosen = match picker::run(
            &mut picker,
            track,
            self.surface.as_mut(),
            self.audio.as_mut(),
            self.editor.as_deref(),
        ) {
            Ok(chosen) => chosen,
            Err(err) if err.is::<Interrupted>() => return FileOutcome::Interrupted,
            Err(err) => {
                warn!("picker failed for {}: {err:#}", track.path.display());
                self.report.add_broken(&track.path);
                return FileOutcome::PickerError;
            }
        };

        match chosen {
            PickOutcome::Adopt(variant) => match self.store.save_lyrics(track, &variant.lyrics) {
                Ok(()) => FileOutcome::Adopted(variant.source_id),
                Err(err) => {
                    warn!("{err}");
                    self.report.add_broken(&track.path);
                    FileOutcome::SaveError
                }
            },
            PickOutcome::KeepOriginal => FileOutcome::Original,
            PickOutcome::Skip => {
                self.report.add_skipped(&track.path);
                FileOutcome::Skipped
            }
        }
    }
}

/// Inputs are shown as given; anything found below them by its own name.
fn shown_path(entry: &InputEntry) -> String {
    let path = entry.path();
    if entry.depth() == 0 {
        return path.display().to_string();
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn shell_quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let safe = !raw.is_empty()
        && raw
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "_-./,:@+=%".contains(ch));
    if safe {
        raw.into_owned()
    } else {
        format!("'{}'", raw.replace('\'', r"'\''"))
    }
}
