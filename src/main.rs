//! Block Ninja entry point
//!
//! The browser build is mounted from JS through `BlockNinja` in the library.
//! Natively this runs a headless autopilot game and reports the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use block_ninja::consts::REFERENCE_FRAME_MS;
    use block_ninja::persistence::MemoryStore;
    use block_ninja::sim::Autopilot;
    use block_ninja::{Game, OfflineHost, Settings};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let max_frames: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600);

    log::info!("Block Ninja (native) starting headless run, seed {seed}");
    let mut game = Game::new(seed, OfflineHost, Box::new(MemoryStore::new()), Settings::default());
    game.add_pointer_source(Box::new(Autopilot::new()));

    let mut frames = 0;
    while frames < max_frames && !game.state.game_over {
        game.frame(frames as f64 * REFERENCE_FRAME_MS as f64);
        game.take_events();
        frames += 1;
    }

    let hud = game.hud();
    println!(
        "seed {seed}: {frames} frames, score {}, cubes smashed {}{}",
        hud.score,
        hud.cube_count,
        if game.state.game_over { " (game over)" } else { "" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `BlockNinja`, this is just to satisfy the compiler
}
