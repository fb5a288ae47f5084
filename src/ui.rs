//! UI rendering for the terminal user interface.
//!
//! Everything is drawn from `App` state on every frame; nothing here mutates
//! the model.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, LineGauge, List, ListItem, Padding, Paragraph, Widget, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{
    App, EMPTY_PLAYLIST, Focus, NO_TRACKS_FOUND, Phase, PlaylistView, playlist_view, stats,
};
use crate::audio::MediaOutput;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::format_clock;
use crate::metadata::{CoverArt, Rgb};
use crate::visualizer::{bar_layout, gradient_color};

const MUTED: Color = Color::Rgb(0x8a, 0x8f, 0x98);
const TYPING_HINT: &str = "[enter] confirm | [esc] cancel | [backspace] delete";

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space".to_string(), "play/pause".to_string());
    map.insert("←/→".to_string(), "prev/next".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "seek".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("o".to_string(), "open".to_string());
    map.insert("c".to_string(), "clear".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "space", "←/→", "j/k", "enter", "H/L", "0-9", "+/-", "gg/G", "/", "s", "r", "o", "c",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Shorten `s` to `max` chars, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Cover thumbnail drawn with upper-half blocks, two pixels per cell.
fn cover_lines(cover: &CoverArt, area: Rect) -> Vec<Line<'static>> {
    let side = u32::from(area.width).min(u32::from(area.height) * 2);
    if side == 0 {
        return Vec::new();
    }
    let (tw, th) = cover.thumbnail.dimensions();
    let sample = |x: u32, y: u32| {
        let px = cover.thumbnail.get_pixel(x * tw / side, y * th / side);
        Color::Rgb(px[0], px[1], px[2])
    };

    (0..side)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span> = (0..side)
                .map(|x| {
                    let top = sample(x, y);
                    let bottom = if y + 1 < side { sample(x, y + 1) } else { top };
                    Span::styled("▀", Style::default().fg(top).bg(bottom))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn cover_placeholder(accent: Color, area: Rect) -> Vec<Line<'static>> {
    let pad = area.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..pad).map(|_| Line::default()).collect();
    lines.push(Line::from(Span::styled("♪", Style::default().fg(accent).bold())));
    lines
}

/// Spectrum bars for one frame, one value per frequency bin.
struct Spectrum<'a> {
    values: &'a [u8],
}

impl Widget for Spectrum<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        const EIGHTHS: [&str; 8] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇"];
        if area.is_empty() {
            return;
        }
        let bars = bar_layout(self.values, f32::from(area.width), f32::from(area.height));
        let bottom = area.bottom() - 1;

        for bar in bars {
            let left = bar.x.round() as u16;
            let right = ((bar.x + bar.width).round() as u16)
                .max(left + 1)
                .min(area.width);
            let full = bar.height.floor() as u16;
            let partial = ((bar.height - bar.height.floor()) * 8.0).round() as usize;

            for col in left..right {
                let x = area.x + col;
                for row in 0..full.min(area.height) {
                    let fg = color(gradient_color((f32::from(row) + 0.5) / bar.height));
                    if let Some(cell) = buf.cell_mut((x, bottom - row)) {
                        cell.set_symbol("█").set_fg(fg);
                    }
                }
                if full < area.height && (1..8).contains(&partial) {
                    let fg = color(gradient_color(1.0));
                    if let Some(cell) = buf.cell_mut((x, bottom - full)) {
                        cell.set_symbol(EIGHTHS[partial]).set_fg(fg);
                    }
                }
            }
        }
    }
}

fn draw_player<M: MediaOutput>(frame: &mut Frame, app: &App<M>, ui: &UiSettings, area: Rect) {
    let np = &app.now_playing;
    let accent = color(np.accent);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(" now playing ")
        .padding(left_pad());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cover_height = if ui.show_cover {
        inner.height.saturating_sub(6).min(inner.width / 2).max(1)
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(cover_height),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    if ui.show_cover {
        let lines = match &np.cover {
            Some(cover) => cover_lines(cover, chunks[0]),
            None => cover_placeholder(accent, chunks[0]),
        };
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[0]);
    }

    let info = vec![
        Line::from(Span::styled(np.title.clone(), Style::default().bold())),
        Line::from(Span::styled(np.artist.clone(), Style::default().fg(accent))),
        Line::from(Span::styled(np.album.clone(), Style::default().fg(MUTED))),
    ];
    frame.render_widget(
        Paragraph::new(info)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    let (position, duration) = if app.transport.current().is_some() {
        let duration = app.media.duration().or_else(|| {
            app.transport
                .current()
                .and_then(|i| app.store.get(i))
                .and_then(|t| t.duration)
        });
        (app.media.position(), duration)
    } else {
        (Duration::ZERO, None)
    };
    let ratio = match duration {
        Some(d) if !d.is_zero() => (position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    };
    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(accent))
        .unfilled_style(Style::default().fg(MUTED))
        .line_set(symbols::line::THICK)
        .label(format!(
            "{} / {}",
            format_clock(Some(position)),
            format_clock(duration)
        ))
        .ratio(ratio);
    frame.render_widget(gauge, chunks[2]);

    let state = match app.transport.phase() {
        Phase::Playing => "▶ playing",
        Phase::Paused => "⏸ paused",
        Phase::Empty => "■ idle",
    };
    let toggle = |on: bool, name: &'static str| {
        let style = if on {
            Style::default().fg(accent).bold()
        } else {
            Style::default().fg(MUTED)
        };
        Span::styled(name, style)
    };
    let volume = app.transport.volume();
    let controls = Line::from(vec![
        Span::raw(state),
        Span::raw("  "),
        toggle(app.transport.shuffle(), "shuffle"),
        Span::raw("  "),
        toggle(app.transport.repeat(), "repeat"),
        Span::raw("  "),
        Span::raw(format!(
            "vol {} {:>3}%",
            app.transport.volume_level().label(),
            (volume * 100.0).round() as u32
        )),
    ]);
    frame.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_playlist<M: MediaOutput>(frame: &mut Frame, app: &App<M>, area: Rect) {
    let accent = color(app.now_playing.accent);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    // Search box
    let searching = app.focus == Focus::Search;
    let search_line = if searching {
        Line::from(vec![
            Span::raw(app.search.clone()),
            Span::styled("▏", Style::default().fg(accent)),
        ])
    } else if app.search.is_empty() {
        Line::from(Span::styled("press / to search", Style::default().fg(MUTED)))
    } else {
        Line::from(Span::raw(app.search.clone()))
    };
    let search_border = if searching {
        Style::default().fg(accent)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(search_line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(search_border)
                .title(" search ")
                .padding(left_pad()),
        ),
        chunks[0],
    );

    // Track list
    let list_block = Block::default().borders(Borders::ALL).title(" playlist ");
    let playing = app.transport.phase() == Phase::Playing;
    match playlist_view(&app.store, &app.search, app.transport.current()) {
        PlaylistView::Empty => {
            frame.render_widget(
                Paragraph::new(EMPTY_PLAYLIST)
                    .alignment(Alignment::Center)
                    .fg(MUTED)
                    .wrap(Wrap { trim: true })
                    .block(list_block),
                chunks[1],
            );
        }
        PlaylistView::NoMatches => {
            frame.render_widget(
                Paragraph::new(NO_TRACKS_FOUND)
                    .alignment(Alignment::Center)
                    .fg(MUTED)
                    .block(list_block),
                chunks[1],
            );
        }
        PlaylistView::Rows(rows) => {
            // Center the selected item when possible by creating a visible window.
            let total = rows.len();
            let list_height = chunks[1].height.saturating_sub(2) as usize;
            let sel_pos = rows
                .iter()
                .position(|r| r.index == app.selected)
                .unwrap_or(0);
            let (start, end, selected_pos_in_visible) =
                if total <= list_height || list_height == 0 {
                    (0, total, sel_pos)
                } else {
                    let half = list_height / 2;
                    let mut start = sel_pos.saturating_sub(half);
                    if start + list_height > total {
                        start = total - list_height;
                    }
                    (start, start + list_height, sel_pos - start)
                };

            // borders + highlight symbol + number + icon + duration
            let name_width = (chunks[1].width as usize).saturating_sub(2 + 2 + 4 + 2 + 7);
            let items: Vec<ListItem> = rows[start..end]
                .iter()
                .map(|row| {
                    let icon = if row.is_current && playing { "▶" } else { "♪" };
                    let text = format!(
                        "{:>3} {} {:<width$} {:>6}",
                        row.index + 1,
                        icon,
                        truncate(&row.track.name, name_width),
                        row.duration_label(),
                        width = name_width
                    );
                    let style = if row.is_current {
                        Style::default().fg(accent).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(text).style(style)
                })
                .collect();

            let list = List::new(items)
                .block(list_block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ratatui::widgets::ListState::default();
            if total > 0 {
                state.select(Some(selected_pos_in_visible));
            }
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }
    }

    // Stats line
    let s = stats(&app.store);
    let mut parts = vec![s.count, s.total];
    if app.ingesting > 0 {
        parts.push("reading files…".to_string());
    } else if let Some(status) = &app.status {
        parts.push(status.clone());
    }
    frame.render_widget(
        Paragraph::new(format!(" {}", parts.join(" • "))).fg(MUTED),
        chunks[2],
    );
}

fn draw_popup(frame: &mut Frame, area: Rect, title: &str, body: Vec<Line>, border: Color) {
    let height = body.len() as u16 + 2;
    let popup = centered_rect_sized(64, height, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title.to_string())
                .padding(left_pad()),
        ),
        popup,
    );
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw<M: MediaOutput>(
    frame: &mut Frame,
    app: &App<M>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let visualizer_height = if ui_settings.show_visualizer { 8 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(visualizer_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" vinyl ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    draw_player(frame, app, ui_settings, main[0]);
    draw_playlist(frame, app, main[1]);

    if ui_settings.show_visualizer {
        let block = Block::default().borders(Borders::ALL).title(" spectrum ");
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);
        frame.render_widget(
            Spectrum {
                values: &app.spectrum,
            },
            inner,
        );
    }

    let footer_text = if app.focus.is_text_input() {
        TYPING_HINT.to_string()
    } else {
        controls_text(controls_settings.scrub_seconds)
    };
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);

    let accent = color(app.now_playing.accent);
    match app.focus {
        Focus::OpenPrompt => draw_popup(
            frame,
            chunks[1],
            " open file or folder ",
            vec![
                Line::from(vec![
                    Span::raw(app.prompt.clone()),
                    Span::styled("▏", Style::default().fg(accent)),
                ]),
                Line::default(),
                Line::from(Span::styled(
                    "enter adds • esc cancels",
                    Style::default().fg(MUTED),
                )),
            ],
            accent,
        ),
        Focus::ConfirmClear => draw_popup(
            frame,
            chunks[1],
            " clear ",
            vec![
                Line::from("Clear all tracks from playlist?"),
                Line::default(),
                Line::from(Span::styled("y / n", Style::default().fg(MUTED))),
            ],
            accent,
        ),
        Focus::Playlist | Focus::Search => {}
    }

    if let Some(alert) = &app.alert {
        draw_popup(
            frame,
            chunks[1],
            " alert ",
            vec![
                Line::from(alert.clone()),
                Line::default(),
                Line::from(Span::styled("press any key", Style::default().fg(MUTED))),
            ],
            Color::Red,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::FakeMedia;
    use crate::config::Settings;
    use crate::library::{IngestReport, ResolvedFile};
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;

    fn screen(app: &App<FakeMedia>, settings: &Settings) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|f| draw(f, app, &settings.ui, &settings.controls))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.contains("[space] play/pause"));
        assert!(text.ends_with("[q] quit"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn idle_screen_shows_placeholders() {
        let settings = Settings::default();
        let app = App::new(FakeMedia::default(), &settings);
        let out = screen(&app, &settings);
        assert!(out.contains("No track selected"));
        assert!(out.contains("0 tracks"));
        assert!(out.contains("Drop audio files here"));
    }

    #[test]
    fn unmatched_search_renders_message() {
        let settings = Settings::default();
        let mut app = App::new(FakeMedia::default(), &settings);
        app.on_ingested(IngestReport {
            files: vec![ResolvedFile {
                path: PathBuf::from("/m/Song.mp3"),
                duration: None,
            }],
            ..IngestReport::default()
        });
        app.search = "nomatch".into();
        let out = screen(&app, &settings);
        assert!(out.contains(NO_TRACKS_FOUND));
        assert!(out.contains("1 track"));
    }

    #[test]
    fn spectrum_fills_from_the_bottom() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        Spectrum {
            values: &[255, 0, 0, 0],
        }
        .render(area, &mut buf);
        // First bar: width 10/4*2.5 = 6.25 cells, height 255/255*5*0.8 = 4 rows.
        assert_eq!(buf[(0, 4)].symbol(), "█");
        assert_eq!(buf[(0, 1)].symbol(), "█");
        assert_eq!(buf[(0, 0)].symbol(), " ");
        assert_eq!(buf[(5, 4)].symbol(), "█");
        assert_eq!(buf[(9, 4)].symbol(), " ");
    }
}
