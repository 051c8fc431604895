//! Gunsmith Simulation Core
//!
//! ECS-симуляция модульного оружия на Bevy 0.16 (headless)
//!
//! Стадии одного tick'а (FixedUpdate, строго по порядку):
//! Attachment → Stats → Handling → Firing → HitResolution → Damage
//!
//! Граница с внешним миром: компоненты/события:
//! - input пишет `WeaponControl` и `WeaponSelectIntent`
//! - inventory кладёт оружие в `QuickSlots`, забирает части по `PartReleased`
//! - transform collaborator двигает `Transform` оружия и `HitCollider` целей
//! - HUD читает `WeaponSnapshot`, VFX читает `WeaponFireEffect` / `ImpactEffect`

use bevy::ecs::event::Events;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod weapons;

// Re-export базовых типов для удобства
pub use combat::{
    resolve_armor, BodyRegion, CombatPlugin, DamageApplied, DamageEvent, DamageType, Dead,
    EntityDied, HitCollider, Hitbox, ImpactEffect, WeaponFireEffect,
};
pub use components::*;
pub use config::{ConfigError, WeaponTuning};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use weapons::*;

/// Стадии симуляции (chained в FixedUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// attach/detach/cleaning requests
    Attachment,
    /// CalculatedStats
    Stats,
    /// select, draw/holster, fire mode, unjam, reload
    Handling,
    /// fire state machine, износ, сброс input edges
    Firing,
    /// hitscan
    HitResolution,
    /// броня, Health, смерть
    Damage,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed/tuning мог выставить хост до plugin'а: не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<WeaponTuning>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Attachment,
                    SimulationSet::Stats,
                    SimulationSet::Handling,
                    SimulationSet::Firing,
                    SimulationSet::HitResolution,
                    SimulationSet::Damage,
                )
                    .chain(),
            )
            .add_plugins((WeaponsPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности: jam roll (Firing) и spread (HitResolution).
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// `SimulationPlugin` добавляет вызывающий (тесты иногда собирают app по частям).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Один детерминированный tick: Time += delta, FixedUpdate ровно один раз
///
/// События предыдущего tick'а уходят в старый буфер (readers успели их прочитать),
/// события этого tick'а после вызова лежат в текущем буфере.
pub fn run_tick(world: &mut World, delta_secs: f32) {
    weapons::swap_event_buffers(world);
    combat::swap_event_buffers(world);

    world
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(delta_secs));
    world.run_schedule(FixedUpdate);
}

/// `run_tick` N раз с шагом 1/60
pub fn run_ticks(world: &mut World, count: usize) {
    for _ in 0..count {
        run_tick(world, FIXED_TICK_SECS);
    }
}

/// Шаг fixed tick'а (60Hz)
pub const FIXED_TICK_SECS: f32 = 1.0 / 60.0;

/// Swap буферов одного типа событий (если он зарегистрирован)
pub(crate) fn swap_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}

/// События типа `E`, записанные за последний `run_tick`
pub fn last_tick_events<E: Event + Clone>(world: &World) -> Vec<E> {
    world
        .get_resource::<Events<E>>()
        .map(|events| events.iter_current_update_events().cloned().collect())
        .unwrap_or_default()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
