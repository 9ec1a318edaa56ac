//! Billiard Table demo entry point
//!
//! Plays a few seeded shots on an in-memory 320x240 display, logging what
//! happens. Optionally writes the final frame as a PPM image.
//!
//! Usage: `billiard-table [shots] [seed] [tuning.json|-] [frame.ppm]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs::File;
    use std::io::BufWriter;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use billiard_table::consts::*;
    use billiard_table::renderer::FrameBuffer;
    use billiard_table::{BilliardGame, Tuning};

    /// Give up on a shot that has not settled after this many frames
    const MAX_SHOT_FRAMES: u32 = 60 * 120;

    /// Command line options, all positional and optional
    struct Options {
        shots: u32,
        seed: u64,
        tuning: Option<String>,
        ppm: Option<String>,
    }

    impl Options {
        fn from_args() -> Self {
            let args: Vec<String> = std::env::args().skip(1).collect();
            Self {
                shots: args.first().and_then(|s| s.parse().ok()).unwrap_or(5),
                seed: args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42),
                tuning: args.get(2).filter(|s| s.as_str() != "-").cloned(),
                ppm: args.get(3).cloned(),
            }
        }
    }

    pub fn run() {
        let options = Options::from_args();
        let tuning = match &options.tuning {
            Some(path) => Tuning::load(path),
            None => Tuning::default(),
        };
        log::info!(
            "Billiard table demo: {} shots, seed {}",
            options.shots,
            options.seed
        );

        let mut rng = Pcg32::seed_from_u64(options.seed);
        let mut game = BilliardGame::new(FrameBuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT), tuning);
        game.init();
        let setup = game.display_mut().take_stats();
        log::info!("Initial draw: {} pixels", setup.pixel_writes);

        for shot in 1..=options.shots {
            if game.count_active_balls() <= 1 {
                log::info!("Table cleared");
                break;
            }

            if !game.aim_at_nearest_ball() {
                game.aim_at_nearest_pocket();
            }
            game.aim_rotate_by(rng.random_range(-0.15..0.15));

            game.charge_start();
            let charge_frames: u32 = rng.random_range(10..50);
            for _ in 0..charge_frames {
                game.frame(SIM_DT);
            }
            let Some(velocity) = game.charge_release() else {
                log::warn!("Shot {} could not be taken", shot);
                continue;
            };

            let mut frames = 0;
            while !game.is_aiming() && frames < MAX_SHOT_FRAMES {
                game.frame(SIM_DT);
                frames += 1;
            }
            if !game.is_aiming() {
                log::warn!("Shot {} still rolling after {} frames", shot, frames);
            }

            let stats = game.display_mut().take_stats();
            log::info!(
                "Shot {}: speed {:.1}, {} frames, {} balls left, {} pixels drawn ({} full fills)",
                shot,
                velocity.length(),
                frames,
                game.count_active_balls(),
                stats.pixel_writes,
                stats.screen_fills
            );
        }

        println!(
            "{} shots taken, {} balls left on the table",
            game.shots_taken(),
            game.count_active_balls()
        );
        match serde_json::to_string_pretty(&game.state().balls) {
            Ok(json) => println!("{}", json),
            Err(e) => log::warn!("Could not serialize table: {}", e),
        }

        if let Some(path) = &options.ppm {
            let written = File::create(path)
                .and_then(|file| game.display().write_ppm(BufWriter::new(file)));
            match written {
                Ok(()) => log::info!("Wrote final frame to {}", path),
                Err(e) => log::error!("Could not write {}: {}", path, e),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No display driver on this target yet; the library is the product
}
