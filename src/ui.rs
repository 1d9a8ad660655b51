use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{app::App, catalog::Label, verdict::Verdict};

pub mod screen;

use screen::Screen;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const SIDE_HINT_WIDTH: u16 = 14;
const LOW_TIME_SECS: u32 = 10;

const TITLE: &str = "Bot or Not!";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(self.session.phase()).render(self, area, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn label_text(label: Label) -> &'static str {
    match label {
        Label::Real => "real",
        Label::Deepfake => "a deepfake",
    }
}

/// Overlay text and color for the last answer
pub fn feedback_line(verdict: &Verdict) -> (String, Color) {
    if verdict.is_correct() {
        (
            format!("Correct! It was {}", label_text(verdict.truth)),
            Color::Green,
        )
    } else {
        (
            format!("Wrong, it was {}", label_text(verdict.truth)),
            Color::Red,
        )
    }
}

/// Shorten `text` to at most `max` columns, keeping the tail (file names
/// live at the end of locators).
pub fn fit_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut kept = Vec::new();
    let mut used = 1; // leading ellipsis
    for c in text.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        kept.push(c);
    }

    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

pub(crate) fn render_start(app: &App, area: Rect, buf: &mut Buffer) {
    let (real, deepfake) = app.catalog().label_counts();
    let limit = app.settings().session.queue_limit.min(app.catalog().len());
    let secs = app.settings().session.total_secs;

    let lines = vec![
        Line::from(Span::styled(
            TITLE,
            bold().fg(Color::Magenta).add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
        Line::from("Is it a real photo or a deepfake?"),
        Line::from(Span::styled(
            format!("{limit} images, {secs} seconds"),
            dim(),
        )),
        Line::from(Span::styled(
            format!("catalog: {real} real / {deepfake} deepfake"),
            dim(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("← deepfake", bold().fg(Color::Red)),
            Span::raw("     "),
            Span::styled("real →", bold().fg(Color::Green)),
        ]),
        Line::from(Span::styled(
            "arrow keys, h / l, or drag the card with the mouse",
            dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "(enter) start / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

pub(crate) fn render_quiz(app: &App, area: Rect, buf: &mut Buffer) {
    let snap = app.session.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // score and timer
            Constraint::Length(1), // countdown gauge
            Constraint::Min(3),    // card row
            Constraint::Length(1), // feedback
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(TITLE, bold().fg(Color::Magenta)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let timer_style = if snap.remaining_secs <= LOW_TIME_SECS {
        bold().fg(Color::Red)
    } else {
        bold()
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("Score: {} / {}", snap.score, snap.total), bold()),
        Span::raw("   "),
        Span::styled(format!("Time: {}s", snap.remaining_secs), timer_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let total_secs = app.session.config().total_secs.max(1);
    let ratio = (snap.remaining_secs as f64 / total_secs as f64).clamp(0.0, 1.0);
    Gauge::default()
        .gauge_style(Style::default().fg(if snap.remaining_secs <= LOW_TIME_SECS {
            Color::Red
        } else {
            Color::Cyan
        }))
        .ratio(ratio)
        .label("")
        .render(chunks[2], buf);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDE_HINT_WIDTH),
            Constraint::Min(10),
            Constraint::Length(SIDE_HINT_WIDTH),
        ])
        .split(chunks[3]);

    let hint_row = |r: Rect| {
        let pad = r.height.saturating_sub(1) / 2;
        Rect::new(r.x, r.y + pad, r.width, r.height.min(1))
    };
    Paragraph::new(Span::styled("← Deepfake", dim()))
        .alignment(Alignment::Right)
        .render(hint_row(row[0]), buf);
    Paragraph::new(Span::styled("Real →", dim()))
        .alignment(Alignment::Left)
        .render(hint_row(row[2]), buf);

    if let Some(item) = &snap.current {
        let inner_width = row[1].width.saturating_sub(4) as usize;
        let card = Block::default()
            .borders(Borders::ALL)
            .title(format!(" #{} of {} ", snap.cursor + 1, snap.total))
            .title_alignment(Alignment::Center);

        let pad = row[1].height.saturating_sub(4) / 2;
        let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
        lines.push(Line::from(Span::styled(
            fit_to_width(item.file_name(), inner_width),
            bold(),
        )));
        lines.push(Line::from(Span::styled(
            fit_to_width(&item.url, inner_width),
            dim(),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(card)
            .render(row[1], buf);
    }

    if let Some(verdict) = &snap.feedback {
        let (text, color) = feedback_line(verdict);
        Paragraph::new(Span::styled(text, bold().fg(color)))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(←/h) deepfake / (→/l) real / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);
}

pub(crate) fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(outcome) = app.session.outcome() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // heading
            Constraint::Length(1), // padding
            Constraint::Length(1), // score
            Constraint::Length(1), // details
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("Game over", bold().fg(Color::Magenta)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("Your score: {} / {}", outcome.score, outcome.total),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    let ending = if outcome.timed_out {
        "time's up"
    } else {
        "all images judged"
    };
    Paragraph::new(Span::styled(
        format!(
            "{} answered   {}% acc   {}",
            outcome.answered, outcome.accuracy, ending
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        "(n)ew / (r)etry / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppSettings;
    use crate::catalog::Catalog;
    use crate::session::SessionConfig;
    use crate::verdict::{judge, Direction as Swipe};
    use std::sync::Arc;
    use std::time::Instant;

    fn create_test_app(total_secs: u32) -> App {
        let catalog = Catalog::new([
            ("/photos/0_alpha.jpg", Label::Real),
            ("/photos/1_beta.jpg", Label::Deepfake),
        ]);
        App::new(
            Arc::new(catalog),
            AppSettings {
                session: SessionConfig {
                    total_secs,
                    ..SessionConfig::default()
                },
                in_order: true,
                ..AppSettings::default()
            },
        )
    }

    fn render_to_string(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_start_screen() {
        let app = create_test_app(60);
        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains(TITLE));
        assert!(rendered.contains("2 images, 60 seconds"));
        assert!(rendered.contains("(enter) start"));
    }

    #[test]
    fn test_quiz_screen_shows_item_and_header() {
        let mut app = create_test_app(45);
        app.start(Instant::now());
        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("Score: 0 / 2"));
        assert!(rendered.contains("Time: 45s"));
        assert!(rendered.contains("0_alpha.jpg"));
        assert!(rendered.contains("#1 of 2"));
    }

    #[test]
    fn test_quiz_screen_shows_feedback() {
        let mut app = create_test_app(60);
        let now = Instant::now();
        app.start(now);
        app.session.answer_at(Swipe::Left, now);
        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("Wrong, it was real"));
        assert!(rendered.contains("1_beta.jpg"));
    }

    #[test]
    fn test_results_screen() {
        let mut app = create_test_app(60);
        let now = Instant::now();
        app.start(now);
        app.session.answer_at(Swipe::Right, now);
        app.session.answer_at(Swipe::Right, now);
        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("Game over"));
        assert!(rendered.contains("Your score: 1 / 2"));
        assert!(rendered.contains("50% acc"));
        assert!(rendered.contains("(n)ew"));
    }

    #[test]
    fn test_extreme_sizes_do_not_panic() {
        let mut app = create_test_app(60);
        for area in [
            Rect::new(0, 0, 10, 5),
            Rect::new(0, 0, 1, 1),
            Rect::new(0, 0, 300, 120),
        ] {
            render_to_string(&app, area);
        }

        app.start(Instant::now());
        for area in [Rect::new(0, 0, 10, 5), Rect::new(0, 0, 300, 120)] {
            let mut buffer = Buffer::empty(area);
            (&app).render(area, &mut buffer);
            assert_eq!(*buffer.area(), area);
        }
    }

    #[test]
    fn test_feedback_line() {
        let (text, color) = feedback_line(&judge(Swipe::Left, Label::Deepfake));
        assert_eq!(text, "Correct! It was a deepfake");
        assert_eq!(color, Color::Green);

        let (text, color) = feedback_line(&judge(Swipe::Left, Label::Real));
        assert_eq!(text, "Wrong, it was real");
        assert_eq!(color, Color::Red);
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width("short.jpg", 20), "short.jpg");
        assert_eq!(fit_to_width("/very/long/path/1_x.jpg", 8), "…1_x.jpg");
        assert_eq!(fit_to_width("abc", 0), "");
        assert!(fit_to_width("/a/b/c/d/e/f/g.png", 6).width() <= 6);
    }
}
