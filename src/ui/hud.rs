use ratatui::prelude::*;
use ratatui::widgets::*;

use rustcade_cabinet::cabinet::Phase;

use crate::app::App;

pub fn render_hud(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let (badge, badge_color) = match state.phase {
        Phase::Idle => ("MENU", Color::Rgb(120, 120, 140)),
        Phase::Instructions => ("READY", Color::Rgb(80, 200, 255)),
        Phase::Running => ("PLAYING", Color::Rgb(80, 220, 80)),
        Phase::GameOver => ("GAME OVER", Color::Rgb(255, 80, 80)),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.controller.services().hud_text()),
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))),
        Span::styled(badge, Style::default().fg(badge_color).add_modifier(Modifier::BOLD)),
    ];
    if app.controller.services().audio().is_muted() {
        spans.push(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));
        spans.push(Span::styled("muted", Style::default().fg(Color::Rgb(120, 120, 140))));
    }

    let hud = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .border_type(BorderType::Rounded)
            .title(" 🕹 RustCade ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(200, 120, 255))
                    .add_modifier(Modifier::BOLD),
            ),
    );
    frame.render_widget(hud, area);
}

pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = app.controller.services().notice() {
        let line = Line::from(vec![
            Span::styled(" ⚠ ", Style::default().fg(Color::Red)),
            Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let keys: &[(&str, &str)] = match app.controller.state().phase {
        Phase::Idle => &[
            ("←→", "Select"),
            ("Enter", "Play"),
            ("1-9", "Quick launch"),
            ("Q", "Quit"),
        ],
        Phase::Instructions => &[("Space", "Start now"), ("Esc", "Menu")],
        Phase::Running => &[("Esc", "Menu"), ("F2", "Diagnostics")],
        Phase::GameOver => &[("R", "Play again"), ("Enter/Esc", "Menu")],
    };
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, what)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))));
        }
        spans.push(Span::styled(
            format!("{} ", key),
            Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!("{} ", what), Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
