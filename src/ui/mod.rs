pub mod home;
pub mod hud;
pub mod overlay;

use ratatui::prelude::*;
use ratatui::widgets::*;

use rustcade_cabinet::cabinet::Phase;

use crate::app::App;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // HUD
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help / notice
        ])
        .split(frame.area());

    hud::render_hud(frame, app, chunks[0]);

    let phase = app.controller.state().phase;
    if phase == Phase::Idle {
        let games = app.games();
        home::render_home(frame, chunks[1], &games, app.selected_game);
    } else {
        render_game(frame, app, chunks[1]);
    }

    hud::render_footer(frame, app, chunks[2]);

    if app.show_diagnostics {
        overlay::render_diagnostics(frame, frame.area(), &app.controller.diagnostics());
    }
}

fn render_game(frame: &mut Frame, app: &mut App, area: Rect) {
    let surface = app.controller.surface();
    let resolution = surface.resolution();
    let outer = centered(area, resolution.width + 2, resolution.height + 2);

    let title = format!(" {} ", app.controller.state().title);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(outer);
    frame.render_widget(block, outer);
    frame.render_widget(surface, inner);
    app.surface_area = inner;

    match app.controller.state().phase {
        Phase::Instructions => {
            if let Some(module) = app.controller.active_module() {
                let remaining = app.controller.instructions_remaining().unwrap_or_default();
                overlay::render_instructions(frame, inner, module, remaining);
            }
        }
        Phase::GameOver => {
            overlay::render_game_over(frame, inner, app.controller.state().score);
        }
        _ => {}
    }
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}
