use crate::audio::AudioEngine;
use crate::editor::LyricsEditor;
use crate::model::{AudioTrack, Variant, VariantSet};
use anyhow::Result;
use crossterm::event::KeyCode;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    Accept,
    KeepOriginal,
    Skip,
    Advance,
    Edit,
    Play,
    Stop,
}

/// How a picking session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Adopt(Variant),
    KeepOriginal,
    Skip,
}

pub fn action_for_key(code: KeyCode) -> Option<PickerAction> {
    match code {
        KeyCode::Left => Some(PickerAction::Accept),
        KeyCode::Right => Some(PickerAction::KeepOriginal),
        KeyCode::Up => Some(PickerAction::Skip),
        KeyCode::Down => Some(PickerAction::Advance),
        KeyCode::Char('e') => Some(PickerAction::Edit),
        KeyCode::Char('p') => Some(PickerAction::Play),
        KeyCode::Char('s') => Some(PickerAction::Stop),
        _ => None,
    }
}

/// Cyclic cursor over the variants found for one track, next to the lyrics
/// the track already carries.
#[derive(Debug, Clone)]
pub struct Picker {
    variants: Vec<Variant>,
    cursor: usize,
    original: String,
}

impl Picker {
    /// `None` when there is nothing to pick from.
    pub fn new(variants: VariantSet, original: impl Into<String>) -> Option<Self> {
        if variants.is_empty() {
            return None;
        }
        Some(Self {
            variants: variants.into_iter().collect(),
            cursor: 0,
            original: original.into(),
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn current(&self) -> &Variant {
        &self.variants[self.cursor]
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.variants.len();
    }

    /// Exact comparison with the original lyrics; no normalization at all.
    pub fn is_identical(&self) -> bool {
        self.current().lyrics == self.original
    }

    /// Replaces the current variant's text unless the edit came back empty.
    pub fn replace_current_lyrics(&mut self, edited: String) -> bool {
        if edited.is_empty() {
            return false;
        }
        self.variants[self.cursor].lyrics = edited;
        true
    }

    /// Applies the state part of an action. Terminal actions yield the
    /// outcome; everything else leaves the session running.
    pub fn apply(&mut self, action: PickerAction) -> Option<PickOutcome> {
        match action {
            PickerAction::Accept => Some(PickOutcome::Adopt(self.current().clone())),
            PickerAction::KeepOriginal => Some(PickOutcome::KeepOriginal),
            PickerAction::Skip => Some(PickOutcome::Skip),
            PickerAction::Advance => {
                self.advance();
                None
            }
            PickerAction::Edit | PickerAction::Play | PickerAction::Stop => None,
        }
    }

    pub fn view<'a>(&'a self, track: &'a AudioTrack, can_edit: bool) -> PickerView<'a> {
        PickerView {
            variant: self.current(),
            slot: self.cursor,
            track,
            identical: self.is_identical(),
            can_edit,
        }
    }
}

/// Everything one frame of the picker shows.
#[derive(Debug, Clone, Copy)]
pub struct PickerView<'a> {
    pub variant: &'a Variant,
    pub slot: usize,
    pub track: &'a AudioTrack,
    pub identical: bool,
    pub can_edit: bool,
}

/// Returned by a surface when the operator aborts the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Where the picker is shown and where operator actions come from.
pub trait PickerSurface {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn draw(&mut self, view: &PickerView<'_>) -> Result<()>;
    /// Blocks for the next input event. `None` asks for a redraw without
    /// any state change (resizes, unmapped keys).
    fn next_action(&mut self) -> Result<Option<PickerAction>>;
}

/// Runs one picking session until a terminal action. The surface is left
/// again on every exit path.
pub fn run(
    picker: &mut Picker,
    track: &AudioTrack,
    surface: &mut dyn PickerSurface,
    audio: &mut dyn AudioEngine,
    editor: Option<&dyn LyricsEditor>,
) -> Result<PickOutcome> {
    surface.enter()?;
    let outcome = session(picker, track, surface, audio, editor);
    let left = surface.leave();
    let outcome = outcome?;
    left?;
    Ok(outcome)
}

fn session(
    picker: &mut Picker,
    track: &AudioTrack,
    surface: &mut dyn PickerSurface,
    audio: &mut dyn AudioEngine,
    editor: Option<&dyn LyricsEditor>,
) -> Result<PickOutcome> {
    loop {
        surface.draw(&picker.view(track, editor.is_some()))?;
        let Some(action) = surface.next_action()? else {
            continue;
        };
        debug!("picker action {action:?} at {}", picker.current().source_id);

        match action {
            PickerAction::Edit => {
                let Some(editor) = editor else {
                    continue;
                };
                surface.leave()?;
                let edited = editor.edit(&picker.current().lyrics);
                surface.enter()?;
                match edited {
                    Ok(text) => {
                        picker.replace_current_lyrics(text);
                    }
                    Err(err) => warn!("editing failed: {err:#}"),
                }
            }
            PickerAction::Play => {
                if let Err(err) = audio.play(&track.path) {
                    warn!("playback error: {err:#}");
                }
            }
            PickerAction::Stop => audio.stop(),
            other => {
                if let Some(outcome) = picker.apply(other) {
                    return Ok(outcome);
                }
            }
        }
    }
}
