//! Ring Tunnel headless driver
//!
//! Flies a traveler down the tube at constant speed for a fixed number of
//! frames and prints a JSON summary of what the generator produced.
//!
//! Usage:
//!   ring-tunnel --seed 42 --frames 3600
//!   RUST_LOG=debug ring-tunnel --settings tunnel.json --rebuild-at 600 --side-count 8

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use ring_tunnel::Settings;
use ring_tunnel::consts::{FRAME_DT, TUBE_RADIUS};
use ring_tunnel::sim::{DebugSnapshot, PickupKind, Traveler, TunnelEvent, TunnelGenerator};

#[derive(Parser)]
#[command(name = "ring-tunnel")]
#[command(about = "Run the ring tunnel generator headless and summarize the result")]
struct Args {
    /// Seed for the generator RNG
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of fixed-step frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// Traveler speed in units per second
    #[arg(long, default_value_t = 30.0)]
    speed: f32,

    /// Tube radius for the traveler
    #[arg(long, default_value_t = TUBE_RADIUS)]
    tube_radius: f32,

    /// Settings JSON file (defaults are used when omitted)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to this path and continue
    #[arg(long)]
    write_settings: Option<PathBuf>,

    /// Frame at which to rebuild the tunnel
    #[arg(long)]
    rebuild_at: Option<u32>,

    /// Side count used for the rebuild
    #[arg(long, default_value_t = 8)]
    side_count: u32,

    /// Scale applied to all pickup spawn chances
    #[arg(long, default_value_t = 1.0)]
    pickup_chance: f32,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: u64,
    frames: u32,
    distance: f32,
    rings_passed: u32,
    runs_started: u32,
    coins: u32,
    powerups: u32,
    rebuilds: u32,
    /// Run counts per archetype name
    archetypes: BTreeMap<String, u32>,
    final_state: Option<DebugSnapshot>,
}

impl Summary {
    fn record(&mut self, event: &TunnelEvent) {
        match event {
            TunnelEvent::RingPassed { .. } => self.rings_passed += 1,
            TunnelEvent::RunStarted { archetype, .. } => {
                self.runs_started += 1;
                *self.archetypes.entry(archetype.clone()).or_default() += 1;
            }
            TunnelEvent::PickupSpawned { kind, .. } => match kind {
                PickupKind::Coin => self.coins += 1,
                PickupKind::Powerup(_) => self.powerups += 1,
            },
            TunnelEvent::Rebuilt { .. } => self.rebuilds += 1,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.frames == 0 {
        bail!("--frames must be > 0");
    }

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(path) = &args.write_settings {
        settings
            .save(path)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
    }

    let mut generator = TunnelGenerator::with_defaults(settings);
    generator.attach_traveler(Traveler::new(0.0, args.tube_radius));
    generator.set_pickup_chance_multiplier(args.pickup_chance);
    generator
        .start(args.seed)
        .context("generator failed to start")?;

    let mut summary = Summary {
        seed: args.seed,
        frames: args.frames,
        ..Default::default()
    };

    for frame in 0..args.frames {
        if args.rebuild_at == Some(frame) {
            generator
                .rebuild(args.side_count)
                .with_context(|| format!("rebuild failed at frame {frame}"))?;
        }
        if let Some(traveler) = generator.traveler_mut() {
            traveler.advance(args.speed * FRAME_DT);
        }
        generator.update(FRAME_DT);
        for event in generator.drain_events() {
            summary.record(&event);
        }
    }

    if let Some(reason) = generator.disabled_reason() {
        bail!("generator disabled: {reason}");
    }

    summary.distance = generator.traveler().map(|t| t.z).unwrap_or(0.0);
    summary.final_state = Some(generator.debug_snapshot());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
