use crate::picker::{self, Interrupted, PickerAction, PickerSurface, PickerView};
use crate::ui::{self, Palette};
use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{Stdout, stdout};

/// Full-screen crossterm picker. The alternate screen is only held while a
/// session runs so batch output stays in the normal scrollback.
pub struct TerminalSurface {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    palette: Palette,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            terminal: None,
            palette: Palette::shuffled(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.terminal.is_some()
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PickerSurface for TerminalSurface {
    fn enter(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            return Ok(());
        }

        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(out);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        self.terminal = Some(terminal);
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn draw(&mut self, view: &PickerView<'_>) -> Result<()> {
        let palette = &self.palette;
        let Some(terminal) = self.terminal.as_mut() else {
            bail!("terminal surface is not active");
        };
        terminal.draw(|frame| ui::draw(frame, view, palette))?;
        Ok(())
    }

    fn next_action(&mut self) -> Result<Option<PickerAction>> {
        loop {
            match event::read()? {
                Event::Resize(_, _) => return Ok(None),
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Err(Interrupted.into());
                    }
                    return Ok(picker::action_for_key(key.code));
                }
                _ => {}
            }
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
