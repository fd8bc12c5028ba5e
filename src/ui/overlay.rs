use std::time::Duration;

use ratatui::prelude::*;
use ratatui::widgets::*;

use rustcade_cabinet::cabinet::Diagnostics;
use rustcade_cabinet::games::GameModule;

use super::centered;

const PANEL_BG: Color = Color::Rgb(15, 15, 25);

fn panel(
    frame: &mut Frame,
    area: Rect,
    width: u16,
    height: u16,
    title: &str,
    color: Color,
) -> Rect {
    let overlay_area = centered(area, width, height);
    frame.render_widget(Clear, overlay_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(PANEL_BG));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    inner
}

pub fn render_instructions(
    frame: &mut Frame,
    area: Rect,
    module: &GameModule,
    remaining: Duration,
) {
    let height = module.controls.len() as u16 + 9;
    let inner = panel(
        frame,
        area,
        area.width.saturating_sub(4).min(54),
        height,
        &format!(" {} ", module.title),
        Color::Rgb(80, 200, 255),
    );

    let mut lines = vec![
        Line::from(Span::styled(
            module.instructions,
            Style::default().fg(Color::Rgb(180, 180, 200)),
        )),
        Line::from(""),
    ];
    for (keys, meaning) in module.controls {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", keys), Style::default().fg(Color::Rgb(80, 200, 255))),
            Span::styled(*meaning, Style::default().fg(Color::Rgb(140, 140, 140))),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("  Starting in {:.1}s", remaining.as_secs_f32()),
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (Space to start now)", Style::default().fg(Color::Rgb(100, 100, 130))),
    ]));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(PANEL_BG));
    frame.render_widget(p, inner);
}

pub fn render_game_over(frame: &mut Frame, area: Rect, score: u32) {
    let inner = panel(frame, area, 34, 8, " GAME OVER ", Color::Rgb(255, 80, 80));
    let key = Style::default()
        .fg(Color::Rgb(80, 200, 255))
        .add_modifier(Modifier::BOLD);
    let hint = Style::default().fg(Color::Rgb(100, 100, 130));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Final score: {}", score),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  R", key),
            Span::styled(" play again  ", hint),
            Span::styled("Enter", key),
            Span::styled(" menu", hint),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(PANEL_BG)), inner);
}

pub fn render_diagnostics(frame: &mut Frame, area: Rect, diagnostics: &Diagnostics) {
    let inner = panel(frame, area, 44, 12, " Diagnostics ", Color::Rgb(200, 120, 255));
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("  {:<16}", label),
                Style::default().fg(Color::Rgb(140, 140, 140)),
            ),
            Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ])
    };
    let lines = vec![
        row("phase", diagnostics.phase.to_string()),
        row(
            "active game",
            diagnostics.active_game.clone().unwrap_or_else(|| "-".into()),
        ),
        row("frame loop", yes_no(diagnostics.loop_active)),
        row("input bound", yes_no(diagnostics.input_bound)),
        row("cleanup queued", diagnostics.cleanup_pending.to_string()),
        row("timers live", diagnostics.timers_pending.to_string()),
        row("surface blank", yes_no(diagnostics.surface_blank)),
        row("inputs dropped", diagnostics.dropped_inputs.to_string()),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(PANEL_BG)), inner);
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
