use ratatui::prelude::*;
use ratatui::widgets::*;

use rustcade_cabinet::games::GameModule;

const BANNER: &str = r#"
 ╔═════════════════════════════════════════════════════════════════════════════╗
 ║  ██████╗ ██╗   ██╗███████╗████████╗         ██████╗ █████╗ ██████╗ ███████╗ ║
 ║  ██╔══██╗██║   ██║██╔════╝╚══██╔══╝         ██╔════╝██╔══██╗██╔══██╗██╔════╝ ║
 ║  ██████╔╝██║   ██║███████╗   ██║   ███████╗ ██║     ███████║██║  ██║█████╗   ║
 ║  ██╔══██╗██║   ██║╚════██║   ██║   ╚══════╝ ██║     ██╔══██║██║  ██║██╔══╝   ║
 ║  ██║  ██║╚██████╔╝███████║   ██║            ╚██████╗██║  ██║██████╔╝███████╗ ║
 ║  ╚═╝  ╚═╝ ╚═════╝ ╚══════╝   ╚═╝             ╚═════╝╚═╝  ╚═╝╚═════╝ ╚══════╝ ║
 ╚═════════════════════════════════════════════════════════════════════════════╝"#;

const TILE_COLORS: [Color; 4] = [
    Color::Rgb(220, 80, 80),
    Color::Rgb(100, 180, 255),
    Color::Rgb(80, 220, 80),
    Color::Rgb(255, 160, 60),
];

pub fn render_home(frame: &mut Frame, area: Rect, games: &[GameModule], selected: usize) {
    let banner_height = BANNER.lines().count() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Length(7),
            Constraint::Min(0),
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(200, 120, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    if games.is_empty() {
        let empty = Paragraph::new("No games registered.")
            .style(Style::default().fg(Color::Rgb(120, 120, 140)))
            .alignment(Alignment::Center);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, games.len() as u32); games.len()])
        .split(chunks[1]);
    for (idx, (module, tile_area)) in games.iter().zip(tiles.iter()).enumerate() {
        render_game_tile(frame, *tile_area, idx, module, idx == selected);
    }

    if let Some(module) = games.get(selected) {
        render_controls(frame, chunks[2], module);
    }
}

fn render_game_tile(
    frame: &mut Frame,
    area: Rect,
    idx: usize,
    module: &GameModule,
    selected: bool,
) {
    let color = TILE_COLORS[idx % TILE_COLORS.len()];
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { color };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let name_color = if selected { Color::Rgb(255, 255, 255) } else { color };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("[{}] ", idx + 1),
                Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                module.title,
                Style::default().fg(name_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("{}x{}", module.resolution.width, module.resolution.height),
            Style::default().fg(Color::Rgb(120, 120, 140)),
        )),
    ];
    if selected {
        lines.push(Line::from(Span::styled(
            "▶ Enter to play",
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        )));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_controls(frame: &mut Frame, area: Rect, module: &GameModule) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", module.title),
            Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {}", module.instructions),
            Style::default().fg(Color::Rgb(100, 100, 120)),
        )),
        Line::from(""),
    ];
    for (keys, meaning) in module.controls {
        lines.push(Line::from(vec![
            Span::styled(
                format!("    {:<18}", keys),
                Style::default().fg(Color::Rgb(80, 200, 255)),
            ),
            Span::styled(*meaning, Style::default().fg(Color::Rgb(140, 140, 140))),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 60, 80)))
        .title(" Controls ");
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
