//! Scrollkit headless demo.
//!
//! Builds a small side-scrolling level with no window or audio device and
//! drives it the way a game loop would: one real frame at a time, fixed steps
//! inside, visual animators once per frame.
//!
//! # Level
//!
//! - a floor and a wall, both [`Solid`]
//! - a hero with physics, health, invincibility and an animation router
//! - a handful of crates dropped at seeded random positions
//! - a pit with a [`DeathZone`]
//! - a scripted arrow that flies into the wall and sticks there
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --config config.ini --seconds 3
//! ```

use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glam::DVec2;
use log::{info, warn};

use scrollkit::components::animation::{AnimationController, AnimationResource, CmpOp, Condition};
use scrollkit::components::entity::{Entity, EntityId};
use scrollkit::resources::audio::AudioBridge;
use scrollkit::resources::commands::WorldCommand;
use scrollkit::resources::gameconfig::GameConfig;
use scrollkit::traits::{Attach, DeathZone, Health, Invincibility, Lifetime, Physics, Solid};
use scrollkit::world::World;

const HERO_ANIMATIONS: &str = r#"{
    "idle": { "frame_count": 4, "fps": 8.0, "looped": true },
    "fall": { "frame_count": 2, "fps": 12.0, "looped": true }
}"#;

/// Scrollkit simulation demo
#[derive(Parser)]
#[command(version, about = "Runs a scripted side-scrolling level headless and logs what happens.")]
struct Cli {
    /// INI file with simulation, force and run settings.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Real seconds to run, overriding the config file.
    #[arg(long)]
    seconds: Option<f64>,

    /// Frames per second to feed, overriding the config file.
    #[arg(long)]
    fps: Option<f64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{e}; using defaults");
    }
    if let Some(seconds) = cli.seconds {
        config.seconds = seconds;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if config.fps <= 0.0 {
        return Err(format!("fps must be positive, got {}", config.fps).into());
    }

    let mut world = World::from_config(&config);
    let audio = AudioBridge::connect(&world);
    let mut rng = fastrand::Rng::with_seed(config.seed);

    build_level(&mut world, &mut rng)?;
    let hero = spawn_hero(&mut world)?;
    script_arrow(&world);

    let frames = (config.seconds * config.fps).round() as usize;
    let dt = 1.0 / config.fps;
    let mut steps = 0;
    for _ in 0..frames {
        if let Some(h) = world.get_mut(hero) {
            let vy = h.velocity.y;
            h.signals.set_scalar("vy", vy);
        }
        steps += world.update_time(dt);
        world.update_animation(dt);
        for cmd in audio.drain() {
            info!("audio: {:?}", cmd);
        }
    }

    report(&world, hero, frames, steps);
    audio.shutdown(&world);
    Ok(())
}

fn build_level(world: &mut World, rng: &mut fastrand::Rng) -> Result<(), Box<dyn Error>> {
    let mut floor = Entity::named("floor");
    floor.add_collision_rect(800.0, 20.0, 0.0, 0.0);
    floor.move_to(DVec2::new(0.0, -10.0));
    floor.apply_trait(Solid::new())?;
    world.add_object(floor)?;

    let mut wall = Entity::named("wall");
    wall.add_collision_rect(20.0, 200.0, 0.0, 0.0);
    wall.move_to(DVec2::new(300.0, 100.0));
    wall.apply_trait(Solid::new())?;
    world.add_object(wall)?;

    let mut pit = Entity::named("pit");
    pit.add_collision_rect(2000.0, 20.0, 0.0, 0.0);
    pit.move_to(DVec2::new(0.0, -400.0));
    pit.apply_trait(DeathZone)?;
    world.add_object(pit)?;

    for i in 0..4 {
        let mut crate_box = Entity::named(format!("crate-{i}"));
        crate_box.add_collision_zone(8.0, 0.0, 0.0);
        crate_box.move_to(DVec2::new(rng.f64() * 500.0 - 250.0, 40.0 + rng.f64() * 80.0));
        crate_box.apply_trait(Physics::new(4.0).with_drag(0.5))?;
        crate_box.apply_trait(Health::new(1.0))?;
        world.add_object(crate_box)?;
    }
    Ok(())
}

fn spawn_hero(world: &mut World) -> Result<EntityId, Box<dyn Error>> {
    let mut hero = Entity::named("hero");
    hero.add_collision_rect(12.0, 24.0, 0.0, 0.0);
    hero.move_to(DVec2::new(-100.0, 60.0));

    let animations: BTreeMap<String, AnimationResource> = serde_json::from_str(HERO_ANIMATIONS)?;
    for (key, resource) in animations {
        hero.add_animation(key, resource);
    }
    hero.set_animation_controller(AnimationController::new("idle").with_rule(
        Condition::ScalarCmp {
            key: "vy".into(),
            op: CmpOp::Lt,
            value: -1.0,
        },
        "fall",
    ))?;

    hero.apply_trait(Physics::new(1.0).with_max_speed(600.0))?;
    hero.apply_trait(Health::new(100.0))?;
    hero.apply_trait(Invincibility::new(1.0))?;
    hero.aim = DVec2::new(1.0, 0.0);
    hero.velocity.x = 40.0;
    Ok(world.add_object(hero)?)
}

/// After one second fire an arrow at the wall; once it has had time to land,
/// announce it.
fn script_arrow(world: &World) {
    let tx = world.commands();
    let announce = world.commands();
    let loops = world.loops();
    world
        .wait_for(1.0)
        .and_then(move |fired| {
            info!("firing arrow at tick {:?}", fired.tick);
            let mut arrow = Entity::named("arrow");
            arrow.add_collision_rect(10.0, 2.0, 0.0, 0.0);
            arrow.move_to(DVec2::new(150.0, 80.0));
            arrow.velocity = DVec2::new(300.0, 0.0);
            let mut physics = Physics::new(1.0);
            physics.gravity_scale = 0.0;
            let applied = arrow
                .apply_trait(physics)
                .and_then(|_| arrow.apply_trait(Attach::new()))
                .and_then(|_| arrow.apply_trait(Lifetime::new(5.0)));
            match applied {
                Ok(()) => {
                    let _ = tx.send(WorldCommand::Spawn(Box::new(arrow)));
                }
                Err(e) => warn!("arrow not spawned: {e}"),
            }
            loops.wait_for(1.0)
        })
        .on_resolve(move |_| {
            let _ = announce.send(WorldCommand::EmitAudio("arrow-thunk".into()));
        });
}

fn report(world: &World, hero: EntityId, frames: usize, steps: usize) {
    info!(
        "ran {} frames, {} fixed steps, {:.3}s simulated",
        frames,
        steps,
        world.time().total
    );
    match world.get(hero) {
        Some(h) => info!(
            "hero at ({:.1}, {:.1}) facing {:?}, health {:?}, animation {:?}",
            h.position().x(),
            h.position().y(),
            h.direction,
            h.get_trait::<Health>().map(Health::energy),
            h.animation().map(|a| a.animation_key.as_str())
        ),
        None => info!("hero was removed"),
    }
    if let Some(arrow) = world.find_by_name("arrow").and_then(|id| world.get(id)) {
        info!(
            "arrow at ({:.1}, {:.1}), attached: {}",
            arrow.position().x(),
            arrow.position().y(),
            arrow.get_trait::<Attach>().is_some_and(Attach::is_attached)
        );
    }
    for (id, entity) in world.entities() {
        let colliding = world.collision().colliding_with(id).len();
        info!("{:?} {:?}: colliding with {}", id, entity.name, colliding);
    }
}
