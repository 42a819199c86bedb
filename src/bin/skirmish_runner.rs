//! Headless Skirmish Runner
//!
//! Pits enemy squads against a scripted player and prints a JSON summary of
//! how the director and difficulty dial responded.

use clap::Parser;
use combat_ai_core::ai::{load_personality, DirectorVerdict, FormationShape, PersonalityProfile};
use combat_ai_core::core::{CoreConfig, Vec3};
use combat_ai_core::simulation::SimulationContext;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;

/// Headless Skirmish Runner - squads vs scripted player
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run a headless skirmish and output a JSON summary")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 3000)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Agents per spawned squad
    #[arg(long, default_value_t = 6)]
    squad_size: usize,

    /// Formation shape: line, column or circle
    #[arg(long, default_value = "line")]
    shape: FormationShape,

    /// Base personality preset (loaded from data/personalities/)
    #[arg(long)]
    personality: Option<String>,

    /// Path to a TOML config (defaults are used if omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player damage per shot against enemies
    #[arg(long, default_value_t = 35.0)]
    player_damage: f32,

    /// Log director decisions
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishResult {
    ticks: u64,
    seconds: f32,
    kills: u32,
    player_deaths: u32,
    squads_spawned: u32,
    enemies_remaining: usize,
    strikes_taken: u32,
    abilities_used: u32,
    final_difficulty: f32,
    final_tension: f32,
    escalations: u32,
    eases: u32,
    seed: u64,
}

/// Seconds between squad spawns at multiplier 1.0
const BASE_SPAWN_INTERVAL: f32 = 8.0;
/// Seconds between player shots
const PLAYER_FIRE_INTERVAL: f32 = 0.4;
/// Player weapon reach
const PLAYER_RANGE: f32 = 25.0;
/// Distance from the player at which squads appear
const SPAWN_DISTANCE: f32 = 60.0;

fn main() {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter("combat_ai_core=debug")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut config = match &args.config {
        Some(path) => CoreConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config '{}': {}", path.display(), e);
            eprintln!("Using default config");
            CoreConfig::default()
        }),
        None => CoreConfig::default(),
    };

    let base_personality = args.personality.as_deref().map(|name| {
        load_personality(name).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load personality '{}': {}", name, e);
            eprintln!("Using default personality");
            PersonalityProfile::default()
        })
    });

    config.formation.shape = args.shape;
    let mut sim = match SimulationContext::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            std::process::exit(1);
        }
    };

    let mut result = SkirmishResult {
        ticks: args.ticks,
        seconds: 0.0,
        kills: 0,
        player_deaths: 0,
        squads_spawned: 0,
        enemies_remaining: 0,
        strikes_taken: 0,
        abilities_used: 0,
        final_difficulty: 0.0,
        final_tension: 0.0,
        escalations: 0,
        eases: 0,
        seed,
    };

    let mut spawn_timer = 0.0;
    let mut fire_timer = 0.0;
    let ability_ids: Vec<String> = sim.abilities().abilities().iter().map(|a| a.id.clone()).collect();

    for _ in 0..args.ticks {
        // Spawn a squad when the timer runs out and the director wants more
        spawn_timer -= args.dt;
        if spawn_timer <= 0.0 && sim.enemy_count() < sim.director().desired_enemy_count() as usize {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let anchor = sim.player.position
                + Vec3::new(angle.cos(), 0.0, angle.sin()) * SPAWN_DISTANCE;
            let allies = args.squad_size.saturating_sub(1) as u32;
            let personalities: Vec<PersonalityProfile> = (0..args.squad_size)
                .map(|_| {
                    let base = base_personality.unwrap_or_else(|| sim.situational_personality(allies));
                    jitter(base, &mut rng)
                })
                .collect();
            sim.spawn_squad(anchor, personalities);
            result.squads_spawned += 1;
            spawn_timer = sim.spawn_interval(BASE_SPAWN_INTERVAL);
        }

        // Scripted player: shoot the nearest enemy in range
        fire_timer -= args.dt;
        if fire_timer <= 0.0 {
            let player = sim.player.position;
            let nearest = sim
                .squads()
                .iter()
                .filter_map(|s| s.nearest_to(player).map(|a| (s.id(), a.id, a.position().distance(player))))
                .min_by(|a, b| a.2.total_cmp(&b.2));
            if let Some((squad, agent, distance)) = nearest {
                if distance <= PLAYER_RANGE {
                    sim.damage_agent(squad, &agent, args.player_damage);
                    fire_timer = PLAYER_FIRE_INTERVAL;
                }
            }
        }

        // Occasionally try a random ability
        if rng.gen_bool(0.02) {
            let id = &ability_ids[rng.gen_range(0..ability_ids.len())];
            match sim.use_ability(id) {
                Ok(_) => result.abilities_used += 1,
                Err(e) if args.verbose => eprintln!("  ability {}: {}", id, e),
                Err(_) => {}
            }
        }

        let report = sim.tick(args.dt);
        result.strikes_taken += report.strikes;
        match report.verdict {
            Some(DirectorVerdict::Escalate) => result.escalations += 1,
            Some(DirectorVerdict::Ease) => result.eases += 1,
            _ => {}
        }
        if args.verbose && report.verdict.is_some() {
            eprintln!(
                "[{}] verdict={:?} tension={:.2} difficulty={:.2} enemies={}",
                report.tick,
                report.verdict,
                sim.director().tension(),
                sim.difficulty().level(),
                sim.enemy_count()
            );
        }
    }

    result.seconds = sim.clock();
    result.kills = sim.kills();
    result.player_deaths = sim.player_deaths();
    result.enemies_remaining = sim.enemy_count();
    result.final_difficulty = sim.difficulty().level();
    result.final_tension = sim.director().tension();

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize result: {}", e);
            std::process::exit(1);
        }
    }
}

/// Perturb each trait by up to ±0.1 so squads aren't identical
fn jitter(base: PersonalityProfile, rng: &mut ChaCha8Rng) -> PersonalityProfile {
    let mut nudge = |v: f32| v + rng.gen_range(-0.1..=0.1);
    PersonalityProfile::normalized(
        nudge(base.aggression),
        nudge(base.caution),
        nudge(base.teamwork),
        nudge(base.range),
    )
}
