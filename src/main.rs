//! Clockwise - native entry point
//!
//! Runs the simulation headless: loads settings and the four quadrant maps,
//! then steps the fixed-timestep loop and logs every emitted event. Rendering
//! and audio hosts drive the same `tick` with real input.

use std::path::{Path, PathBuf};

use clockwise::Settings;
use clockwise::consts::*;
use clockwise::sim::{GameEvent, GameState, MapError, QuadrantId, TickInput, TileMap, tick};

/// Errors that stop the headless run
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("Could not read input script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host frame time used when no window drives the loop
const HEADLESS_FRAME_DT: f32 = 1.0 / 30.0;

/// Fixed-step driver around a game state
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
    debug_keys: bool,
}

impl Game {
    fn new(state: GameState, debug_keys: bool) -> Self {
        Self {
            state,
            accumulator: 0.0,
            input: TickInput::default(),
            debug_keys,
        }
    }

    /// Advance by one host frame; returns the number of ticks run
    fn update(&mut self, dt: f32) -> u32 {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut input = self.input.clone();
            input.grant_key &= self.debug_keys;
            let events = tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs
            self.input.restart = false;
            self.input.grant_key = false;

            for event in &events {
                log_event(self.state.time_ticks, event);
            }
        }
        substeps
    }
}

fn log_event(ticks: u64, event: &GameEvent) {
    match serde_json::to_string(event) {
        Ok(json) => log::info!("[{ticks}] {json}"),
        Err(_) => log::info!("[{ticks}] {event:?}"),
    }
    if let Some(sound) = event.sound() {
        log::debug!("[{ticks}] play sound '{}'", sound.key());
    }
}

/// Parse one line of a scripted input file: `u d l r c` for held keys,
/// `R` for restart and `k` for the debug key
fn parse_input_line(line: &str) -> TickInput {
    let mut input = TickInput::default();
    for c in line.chars() {
        match c {
            'u' => input.up = true,
            'd' => input.down = true,
            'l' => input.left = true,
            'r' => input.right = true,
            'c' => input.charge = true,
            'R' => input.restart = true,
            'k' => input.grant_key = true,
            _ => {}
        }
    }
    input
}

/// Load the four quadrant maps from `<dir>/<quadrant>.json`
fn load_world(dir: &Path) -> Result<[TileMap; 4], MapError> {
    let [a, b, c, d] = QuadrantId::ALL;
    let load = |id: QuadrantId| {
        let path = dir.join(format!("{}.json", id.name()));
        log::info!("Loading {}", path.display());
        TileMap::load(id.name(), &path)
    };
    Ok([load(a)?, load(b)?, load(c)?, load(d)?])
}

/// Read a scripted input file, one line per host frame
fn load_script(path: &Path) -> Result<Vec<TickInput>, RunError> {
    let text = std::fs::read_to_string(path).map_err(|source| RunError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(parse_input_line).collect())
}

fn run() -> Result<(), RunError> {
    let settings = Settings::load();
    let maps = load_world(&settings.maps_dir)?;
    let mut state = GameState::new(maps, &settings.topology)?;
    state.screen_shake = settings.effective_screen_shake();

    let script = match std::env::args().nth(1) {
        Some(path) => load_script(Path::new(&path))?,
        None => Vec::new(),
    };

    let mut game = Game::new(state, settings.debug_keys);
    let mut frame = 0usize;
    while game.state.time_ticks < settings.headless_ticks && !game.state.won {
        game.input = script.get(frame).cloned().unwrap_or_default();
        game.update(HEADLESS_FRAME_DT);
        frame += 1;
    }

    let state = &game.state;
    log::info!(
        "Stopped after {} ticks in {} layer {} (title '{}', won: {})",
        state.time_ticks,
        state.current_quadrant().name(),
        state.ring.current().current_layer_index(),
        state.title,
        state.won
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Clockwise (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
