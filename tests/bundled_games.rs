use std::time::Duration;

use crossterm::event::KeyCode;
use rustcade_cabinet::cabinet::{AudioService, CabinetState, Controller, InputEvent, Phase};
use rustcade_cabinet::games::GameRegistry;

const FRAME: Duration = Duration::from_millis(16);

fn controller() -> Controller {
    Controller::new(GameRegistry::bundled(), AudioService::silent())
        .with_instructions_duration(Duration::from_millis(500))
}

#[test]
fn registry_ships_three_games() {
    let registry = GameRegistry::bundled();
    let ids: Vec<_> = registry.modules().map(|m| m.id).collect();
    assert_eq!(ids, ["breakout", "pong", "snake"]);
}

#[test]
fn every_bundled_game_runs_and_tears_down() {
    let mut controller = controller();
    let ids: Vec<&'static str> = controller.registry().modules().map(|m| m.id).collect();
    for id in ids {
        controller.launch(id).unwrap();
        controller.dismiss_instructions().unwrap();
        assert_eq!(controller.state().phase, Phase::Running, "{id}");
        assert!(controller.is_loop_active(), "{id} started no frame loop");
        assert!(controller.is_input_bound(), "{id} bound no input");

        let mut now = controller.now();
        for frame in 0..120 {
            now += FRAME;
            if frame % 10 == 0 {
                controller.handle_input(InputEvent::key_down(KeyCode::Left));
            }
            controller.tick(now);
        }
        assert_eq!(controller.services().notice(), None, "{id} failed");
        assert!(!controller.surface().is_blank(), "{id} drew nothing");
        assert_ne!(controller.state().phase, Phase::Idle);

        controller.exit_to_menu();
        let diagnostics = controller.diagnostics();
        assert_eq!(controller.state(), &CabinetState::default());
        assert!(!diagnostics.loop_active);
        assert!(!diagnostics.input_bound);
        assert_eq!(diagnostics.timers_pending, 0);
        assert_eq!(diagnostics.cleanup_pending, 0);
        assert!(diagnostics.surface_blank);
    }
}

#[test]
fn replaying_starts_from_a_clean_score() {
    let mut controller = controller();
    controller.launch("snake").unwrap();
    controller.dismiss_instructions().unwrap();
    controller.services_mut().add_score(40);
    controller.exit_to_menu();

    controller.launch("snake").unwrap();
    assert_eq!(controller.state().score, 0);
    assert_eq!(controller.state().title, "Snake");
}
