//! Headless симуляция Gunsmith
//!
//! Стрелок с модульной винтовкой против бронированной цели, без рендера.
//! `gunsmith_simulation [seed] [tuning.ron]`

use bevy::prelude::*;
use gunsmith_simulation::*;

const MAX_TICKS: usize = 1200;

fn main() {
    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);

    init_logger();
    log_info(&format!("Starting Gunsmith headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    if let Some(path) = args.next() {
        app.insert_resource(WeaponTuning::load_or_default(path));
    }
    app.add_plugins(SimulationPlugin);

    let world = app.world_mut();
    let rifle = match spawn_weapon(world, WeaponBlueprint::modular_rifle().at(Transform::from_xyz(0.0, 1.5, 0.0))) {
        Ok(rifle) => rifle,
        Err(err) => {
            log_error(&format!("Failed to spawn rifle: {}", err));
            return;
        }
    };
    let shooter = world.spawn(QuickSlots::default().with_weapon(1, rifle)).id();

    let target = world.spawn(Health::new(100.0).with_armor(40.0, 60.0)).id();
    world.spawn((
        Transform::from_xyz(0.0, 1.3, -25.0),
        HitCollider::cuboid(Vec3::new(0.3, 0.45, 0.2)),
        Hitbox::torso(target),
    ));
    world.spawn((
        Transform::from_xyz(0.0, 1.85, -25.0),
        HitCollider::sphere(0.12),
        Hitbox::head(target),
    ));

    world.send_event(WeaponSelectIntent { wielder: shooter, slot: 1 });

    let mut shots = 0;
    let mut hits = 0;
    let mut jams = 0;

    for tick in 0..MAX_TICKS {
        drive_shooter(app.world_mut(), rifle);
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        let world = app.world();
        shots += last_tick_events::<WeaponShot>(world).len();
        hits += last_tick_events::<DamageApplied>(world).len();
        jams += last_tick_events::<WeaponJammed>(world).len();

        if tick % 100 == 0 {
            if let Some(state) = world.get::<WeaponState>(rifle) {
                let snapshot = WeaponSnapshot::from(state);
                log_info(&format!(
                    "Tick {}: ammo {}/{} reloading={} jammed={}",
                    tick, snapshot.magazine_ammo, snapshot.reserve_ammo, snapshot.reloading, snapshot.jammed
                ));
            }
        }

        if let Some(died) = last_tick_events::<EntityDied>(world).first() {
            log_info(&format!("Target down at {:.2}s", died.time_of_death));
            break;
        }
    }

    let health = app.world().get::<Health>(target).copied().unwrap_or_default();
    log_info(&format!(
        "Simulation complete! shots={} hits={} jams={} target hp={:.1} armor={:.0}",
        shots, hits, jams, health.current, health.armor
    ));
}

/// Простейший "игрок": держит курок, перезаряжает пустой магазин, устраняет задержки
fn drive_shooter(world: &mut World, rifle: Entity) {
    let Some(state) = world.get::<WeaponState>(rifle).cloned() else {
        return;
    };
    let Some(mut control) = world.get_mut::<WeaponControl>(rifle) else {
        return;
    };

    if state.jammed {
        control.release_trigger();
        control.unjam_pressed = !state.unjamming;
    } else if state.magazine_ammo == 0 {
        control.release_trigger();
        control.reload_pressed = !state.reloading;
    } else {
        // Semi: каждый tick новый press edge (cooldown сам ограничит темп)
        control.press_trigger();
    }
}
