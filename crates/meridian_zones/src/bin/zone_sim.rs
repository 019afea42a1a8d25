//! # Zone Simulation
//!
//! Headless driver: a grid of checked zones, a crowd of players on seeded
//! random walks, one membership sweep per player per tick. Prints event
//! totals and sweep timings.
//!
//! Usage: `zone_sim [config.toml]`

use std::process::ExitCode;
use std::rc::Rc;
use std::time::Instant;

use meridian_zones::{
    PlayerSnapshot, Vec2, Vec3, ZoneBounds, ZoneEvent, ZoneEventChannel, ZonesComponent,
    ZonesConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ARENA_SIZE: f32 = 200.0;
const GRID: u32 = 4;
const PLAYER_COUNT: u32 = 64;
const DURATION_SECS: u32 = 30;
const STEP: f32 = 1.5;
const SEED: u64 = 0x5EED_2017;

fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(path) => match ZonesConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("zone_sim: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ZonesConfig::default(),
    };

    let mut zones = match ZonesComponent::new(config.clone()) {
        Ok(zones) => zones,
        Err(e) => {
            eprintln!("zone_sim: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    let title = format!("MERIDIAN ZONES - {} v{}", ZonesComponent::NAME, ZonesComponent::version());
    println!("{}", title_row(&title));
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    // Zone grid, every cell checked and shown to everybody.
    let cell = ARENA_SIZE / GRID as f32;
    let players = PLAYER_COUNT.min(config.max_players);
    for row in 0..GRID {
        for col in 0..GRID {
            let min = Vec2::new(col as f32 * cell, row as f32 * cell);
            let bounds = ZoneBounds::from_corners(min, min + Vec2::new(cell - 1.0, cell - 1.0));
            let id = match zones.try_create(bounds) {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("zone_sim: {e}");
                    return ExitCode::FAILURE;
                }
            };
            zones.use_zone_check(id, true);
            for player in 0..players {
                zones.show_for_player(id, player);
            }
        }
    }

    let (channel, receiver) = ZoneEventChannel::bounded(players as usize * zones.len() * 2);
    zones.add_event_handler(Rc::new(channel));

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut crowd: Vec<PlayerSnapshot> = (0..players)
        .map(|id| {
            zones.on_player_connect(id);
            let x = rng.gen_range(0.0..ARENA_SIZE);
            let y = rng.gen_range(0.0..ARENA_SIZE);
            PlayerSnapshot::new(id, Vec3::new(x, y, 0.0))
        })
        .collect();

    println!("┌─ CONFIGURATION ──────────────────────────────────────────────────┐");
    println!("{}", row(&format!("Zones:              {}", zones.len())));
    println!("{}", row(&format!("Players:            {players}")));
    println!("{}", row(&format!("Tick Rate:          {} Hz", config.tick_rate)));
    println!("{}", row(&format!("Duration:           {DURATION_SECS} seconds")));
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let total_ticks = u64::from(DURATION_SECS) * u64::from(config.tick_rate);
    let mut entered = 0u64;
    let mut left = 0u64;
    let mut max_tick_us = 0u128;
    let start = Instant::now();

    for tick in 0..total_ticks {
        let tick_start = Instant::now();

        for player in &mut crowd {
            let step = Vec3::new(rng.gen_range(-STEP..=STEP), rng.gen_range(-STEP..=STEP), 0.0);
            let moved = player.position + step;
            player.position = Vec3::new(
                moved.x.clamp(0.0, ARENA_SIZE),
                moved.y.clamp(0.0, ARENA_SIZE),
                moved.z,
            );
            zones.on_player_update(&*player);
        }

        for event in receiver.try_iter() {
            match event {
                ZoneEvent::Entered { .. } => entered += 1,
                ZoneEvent::Left { .. } => left += 1,
            }
        }

        max_tick_us = max_tick_us.max(tick_start.elapsed().as_micros());

        // Halfway through, a player drops out.
        if tick == total_ticks / 2 {
            if let Some(gone) = crowd.pop() {
                zones.on_player_disconnect(gone.id);
            }
        }
    }

    let elapsed = start.elapsed();
    let inside: usize = zones
        .entries()
        .map(|(_, zone)| zone.players_inside().len())
        .sum();

    println!("┌─ RESULTS ────────────────────────────────────────────────────────┐");
    println!("{}", row(&format!("Real Time:          {:.3} seconds", elapsed.as_secs_f64())));
    println!("{}", row(&format!("Total Ticks:        {total_ticks}")));
    println!("{}", row(&format!("Max Tick Time:      {max_tick_us} μs")));
    println!("{}", row(&format!("Budget per Tick:    {} μs", 1_000_000 / u64::from(config.tick_rate))));
    println!("{}", row(&format!("Enter Events:       {entered}")));
    println!("{}", row(&format!("Leave Events:       {left}")));
    println!("{}", row(&format!("Inside at End:      {inside}")));
    println!("└──────────────────────────────────────────────────────────────────┘");

    ExitCode::SUCCESS
}

/// One line of a box, padded to the box width.
fn row(text: &str) -> String {
    format!("│ {text:<65}│")
}

/// Centered title line of the banner.
fn title_row(text: &str) -> String {
    format!("║{text:^66}║")
}
