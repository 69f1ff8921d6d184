use crate::picker::PickerView;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const IDENTICAL_BANNER: &str = "LYRICS ARE THE SAME";
const SIDE_MARGIN: u16 = 3;
const HEADER_HEIGHT: u16 = 6;
const ORIGINAL_COLOR: Color = Color::White;
const LYRIC_COLORS: [Color; 6] = [
    Color::Blue,
    Color::Green,
    Color::Cyan,
    Color::Red,
    Color::Magenta,
    Color::Yellow,
];

/// Colors handed out to sources in the order their variants appear.
#[derive(Debug, Clone)]
pub struct Palette {
    lyrics: [Color; 6],
}

impl Palette {
    pub fn shuffled() -> Self {
        let mut lyrics = LYRIC_COLORS;
        lyrics.shuffle(&mut SmallRng::from_os_rng());
        Self { lyrics }
    }

    pub fn for_slot(&self, slot: usize) -> Color {
        self.lyrics[slot % self.lyrics.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            lyrics: LYRIC_COLORS,
        }
    }
}

pub fn draw(frame: &mut Frame, view: &PickerView<'_>, palette: &Palette) {
    let area = frame.area();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[1].union(vertical[2]).inner(Margin {
            vertical: 0,
            horizontal: SIDE_MARGIN,
        }));

    let variant_color = palette.for_slot(view.slot);
    let variant = view.variant;
    draw_column(
        frame,
        columns[0],
        Column {
            heading: &variant.source_id,
            title: &variant.title,
            artist: &variant.artist,
            lyrics: &variant.lyrics,
            color: variant_color,
        },
    );

    let track = view.track;
    let file_name = track.file_name();
    draw_column(
        frame,
        columns[1],
        Column {
            heading: &file_name,
            title: &track.title,
            artist: &track.artist,
            lyrics: &track.lyrics,
            color: ORIGINAL_COLOR,
        },
    );

    if view.identical {
        draw_identical_banner(frame, area, columns[1].x);
    }

    let legend = control_legend(&variant.source_id, view.can_edit, vertical[3].width);
    frame.render_widget(
        Paragraph::new(legend).style(Style::default().fg(Color::Black).bg(Color::White)),
        vertical[3],
    );
}

struct Column<'a> {
    heading: &'a str,
    title: &'a str,
    artist: &'a str,
    lyrics: &'a str,
    color: Color,
}

fn draw_column(frame: &mut Frame, area: Rect, column: Column<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(2)])
        .split(area);

    let header = Block::default()
        .borders(Borders::ALL)
        .title(
            Line::from(Span::styled(
                format!(" {} ", column.heading),
                Style::default().add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ))
            .centered(),
        )
        .style(Style::default().fg(Color::Black).bg(column.color));
    let header_text = vec![
        Line::default(),
        Line::styled(
            column.title.to_uppercase(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(column.artist),
    ];
    frame.render_widget(
        Paragraph::new(header_text)
            .alignment(Alignment::Center)
            .block(header),
        rows[0],
    );

    let lyrics_block = panel_block(column.color);
    let visible = usize::from(rows[1].height.saturating_sub(2));
    let lines: Vec<Line> = column.lyrics.lines().take(visible).map(Line::raw).collect();
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().fg(column.color))
            .block(lyrics_block),
        rows[1],
    );
}

fn panel_block(color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().fg(color).bg(Color::Black))
}

fn draw_identical_banner(frame: &mut Frame, area: Rect, boundary_x: u16) {
    let text_width = u16::try_from(IDENTICAL_BANNER.len()).unwrap_or(u16::MAX);
    let width = text_width
        .saturating_add(4)
        .max(area.width / 4)
        .min(area.width);
    let height = 3.min(area.height);
    let x = boundary_x
        .saturating_sub(width / 2)
        .min(area.right().saturating_sub(width));
    let y = (area.height / 2).saturating_sub(2);
    let banner = Rect {
        x,
        y,
        width,
        height,
    };

    frame.render_widget(Clear, banner);
    frame.render_widget(
        Paragraph::new(IDENTICAL_BANNER)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        banner,
    );
}

/// The most descriptive key legend that fits in `width` columns.
pub fn control_legend(source_id: &str, can_edit: bool, width: u16) -> String {
    let source = title_case(source_id);
    let edit = |entry: String| if can_edit { entry } else { String::new() };

    let compact = format!("| ◀ | ▶ | ▲ | ▼ |{} P | S |", edit(String::from(" E |")));
    let short = format!(
        "| ◀ {source} | ▶ Original | ▲ Skip | ▼ Switch |{} P | S |",
        edit(String::from(" E |"))
    );
    let medium = format!(
        "| ◀ {source} | ▶ Original | ▲ Skip | ▼ Switch |{} P lay | S top |",
        edit(String::from(" E dit |"))
    );
    let full = format!(
        "| ◀ Choose {source} | ▶ Keep Original | ▲ Skip | ▼ Change lyrics source |{} P Play audio | S Stop playing audio |",
        edit(format!(" E Edit {source} lyrics |"))
    );

    let width = usize::from(width);
    [full, medium, short]
        .into_iter()
        .find(|legend| legend.chars().count() <= width)
        .unwrap_or(compact)
}

/// `"lyrics_not_found"` or `"LYRICS NOT FOUND"` become `"Lyrics Not Found"`.
pub fn title_case(text: &str) -> String {
    text.split(|ch: char| ch == '_' || ch.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AudioTrack, MediaFormat, Variant};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn render(view: &PickerView<'_>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal
            .draw(|frame| draw(frame, view, &Palette::default()))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn fixtures(lyrics: &str) -> (Variant, AudioTrack) {
        let variant = Variant {
            source_id: String::from("GENIUS"),
            title: String::from("Hey Jude"),
            artist: String::from("The Beatles"),
            lyrics: lyrics.to_string(),
        };
        let track = AudioTrack {
            path: PathBuf::from("/music/hey_jude.mp3"),
            format: MediaFormat::Mp3,
            title: String::from("Hey Jude"),
            artist: String::from("The Beatles"),
            lyrics: String::from("Hey Jude, don't make it bad"),
        };
        (variant, track)
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("lyrics_not_found"), "Lyrics Not Found");
        assert_eq!(title_case("GENIUS"), "Genius");
        assert_eq!(title_case("  hip  hop "), "Hip Hop");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn legend_shrinks_with_width() {
        let full = control_legend("GENIUS", true, 500);
        assert!(full.contains("Choose Genius"));
        assert!(full.contains("Edit Genius lyrics"));

        let medium_width = u16::try_from(
            control_legend("GENIUS", true, 500).chars().count() - 1,
        )
        .expect("fits");
        let medium = control_legend("GENIUS", true, medium_width);
        assert!(medium.contains("P lay"));

        let compact = control_legend("GENIUS", true, 10);
        assert_eq!(compact, "| ◀ | ▶ | ▲ | ▼ | E | P | S |");
    }

    #[test]
    fn legend_hides_edit_when_unavailable() {
        for width in [10, 60, 80, 500] {
            let legend = control_legend("TEKSTOWO", false, width);
            assert!(!legend.contains(" E "), "edit shown at width {width}: {legend}");
        }
    }

    #[test]
    fn renders_both_columns_and_banner_when_identical() {
        let (variant, track) = fixtures("Hey Jude, don't make it bad");
        let view = PickerView {
            variant: &variant,
            slot: 0,
            track: &track,
            identical: true,
            can_edit: false,
        };

        let screen = render(&view, 120, 30);
        assert!(screen.contains("GENIUS"));
        assert!(screen.contains("hey_jude.mp3"));
        assert!(screen.contains("HEY JUDE"));
        assert!(screen.contains(IDENTICAL_BANNER));
    }

    #[test]
    fn banner_absent_when_lyrics_differ() {
        let (variant, track) = fixtures("Na na na");
        let view = PickerView {
            variant: &variant,
            slot: 1,
            track: &track,
            identical: false,
            can_edit: true,
        };

        let screen = render(&view, 120, 30);
        assert!(screen.contains("Na na na"));
        assert!(!screen.contains(IDENTICAL_BANNER));
    }

    #[test]
    fn shuffled_palette_is_a_permutation() {
        let palette = Palette::shuffled();
        let mut seen: Vec<Color> = (0..6).map(|slot| palette.for_slot(slot)).collect();
        seen.sort_by_key(|color| format!("{color:?}"));
        let mut expected = LYRIC_COLORS.to_vec();
        expected.sort_by_key(|color| format!("{color:?}"));
        assert_eq!(seen, expected);
        assert_eq!(palette.for_slot(6), palette.for_slot(0));
    }
}
