//! Combat module: hit resolution + damage model
//!
//! ECS ответственность:
//! - Hitscan: WeaponShot → spread → ray cast по `HitCollider` → DamageEvent
//! - Damage: броня, durability, Health, смерть (`Dead` + `EntityDied`)
//! - Effect requests: WeaponFireEffect, ImpactEffect (для VFX collaborator)

use bevy::prelude::*;

pub mod damage;
pub mod hitbox;
pub mod hitscan;


// Re-export основных типов
pub use damage::{
    apply_damage_to_health, resolve_armor, ArmorResolution, DamageApplied, DamageEvent,
    DamageOutcome, DamageType, Dead, EntityDied,
};
pub use hitbox::{BodyRegion, ColliderShape, HitCollider, Hitbox};
pub use hitscan::{apply_spread, cast_ray, spread_degrees, ImpactEffect, RayHit, WeaponFireEffect};

use crate::{swap_events, SimulationSet};

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. HitResolution: resolve_hitscan
/// 2. Damage: bookkeeping → apply_damage_events
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageEvent>()
            .add_event::<DamageApplied>()
            .add_event::<EntityDied>()
            .add_event::<WeaponFireEffect>()
            .add_event::<ImpactEffect>();

        app.add_systems(
            FixedUpdate,
            hitscan::resolve_hitscan.in_set(SimulationSet::HitResolution),
        )
        .add_systems(
            FixedUpdate,
            (damage::tick_damage_bookkeeping, damage::apply_damage_events)
                .chain()
                .in_set(SimulationSet::Damage),
        );
    }
}

/// Swap буферов combat событий (вызывается `run_tick` в начале tick'а)
pub(crate) fn swap_event_buffers(world: &mut World) {
    swap_events::<DamageEvent>(world);
    swap_events::<DamageApplied>(world);
    swap_events::<EntityDied>(world);
    swap_events::<WeaponFireEffect>(world);
    swap_events::<ImpactEffect>(world);
}
