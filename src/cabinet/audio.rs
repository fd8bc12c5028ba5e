use std::collections::BTreeMap;
use std::io::{self, Write};

use log::{debug, warn};

/// Reserved effect id for the end-of-game jingle.
pub const GAME_OVER_JINGLE: &str = "game-over";

/// A resolved sound effect handed to the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cue {
    pub effect: String,
    pub rings: u8,
}

/// Host audio primitive.
pub trait AudioSink {
    fn play(&mut self, cue: &Cue) -> io::Result<()>;
}

/// Rings the terminal bell once per `rings`.
pub struct TerminalBell;

impl AudioSink for TerminalBell {
    fn play(&mut self, cue: &Cue) -> io::Result<()> {
        let mut out = io::stdout();
        for _ in 0..cue.rings {
            out.write_all(b"\x07")?;
        }
        out.flush()
    }
}

/// Swallows every cue.
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: &Cue) -> io::Result<()> {
        Ok(())
    }
}

/// The effect catalog every bundled game relies on.
pub fn default_effects() -> BTreeMap<String, u8> {
    [
        ("eat", 1),
        ("bounce", 1),
        ("brick", 1),
        ("point", 1),
        ("miss", 2),
        ("crash", 2),
        ("cleared", 2),
        (GAME_OVER_JINGLE, 3),
    ]
    .into_iter()
    .map(|(id, rings)| (id.to_string(), rings))
    .collect()
}

/// Fire-and-forget sound effects.
///
/// Nothing here ever returns an error to a game: unknown effects and sink
/// failures are logged and dropped.
pub struct AudioService {
    sink: Box<dyn AudioSink>,
    effects: BTreeMap<String, u8>,
    muted: bool,
}

impl AudioService {
    pub fn new(sink: Box<dyn AudioSink>, effects: BTreeMap<String, u8>) -> Self {
        Self {
            sink,
            effects,
            muted: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(Silent), default_effects())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn play(&mut self, effect_id: &str) {
        if effect_id == GAME_OVER_JINGLE {
            warn!("games may not play the game-over jingle directly");
            return;
        }
        self.emit(effect_id);
    }

    pub(crate) fn play_game_over_jingle(&mut self) {
        self.emit(GAME_OVER_JINGLE);
    }

    fn emit(&mut self, effect_id: &str) {
        let Some(&rings) = self.effects.get(effect_id) else {
            warn!("unknown sound effect: {}", effect_id);
            return;
        };
        if self.muted {
            debug!("muted: {}", effect_id);
            return;
        }
        let cue = Cue {
            effect: effect_id.to_string(),
            rings,
        };
        if let Err(err) = self.sink.play(&cue) {
            warn!("sound effect {} failed: {}", effect_id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: &Cue) -> io::Result<()> {
            self.0.borrow_mut().push(cue.effect.clone());
            Ok(())
        }
    }

    struct Broken;

    impl AudioSink for Broken {
        fn play(&mut self, _cue: &Cue) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "no speaker"))
        }
    }

    fn recorded() -> (AudioService, Rc<RefCell<Vec<String>>>) {
        let played = Rc::new(RefCell::new(Vec::new()));
        let audio = AudioService::new(Box::new(Recorder(Rc::clone(&played))), default_effects());
        (audio, played)
    }

    #[test]
    fn unknown_effect_is_a_no_op() {
        let (mut audio, played) = recorded();
        audio.play("kazoo");
        audio.play("eat");
        assert_eq!(*played.borrow(), vec!["eat".to_string()]);
    }

    #[test]
    fn jingle_is_reserved_for_the_controller() {
        let (mut audio, played) = recorded();
        audio.play(GAME_OVER_JINGLE);
        assert!(played.borrow().is_empty());
        audio.play_game_over_jingle();
        assert_eq!(*played.borrow(), vec![GAME_OVER_JINGLE.to_string()]);
    }

    #[test]
    fn muted_service_stays_quiet() {
        let (mut audio, played) = recorded();
        audio.set_muted(true);
        audio.play("bounce");
        audio.play_game_over_jingle();
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let mut audio = AudioService::new(Box::new(Broken), default_effects());
        audio.play("crash");
        audio.play_game_over_jingle();
    }
}
