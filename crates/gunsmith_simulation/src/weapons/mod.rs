//! Weapons module: модульное оружие (части, слоты, статы, стрельба)
//!
//! ECS ответственность:
//! - Data model: WeaponDefinition, WeaponPart, PartSlots, AttachedParts, WeaponState
//! - Rules: attach/detach, stats aggregation, fire/reload/jam state machine, чистка
//! - Events: requests от UI/input, результаты и сигналы для HUD/VFX/hit resolution
//!
//! Снаружи (collaborators): input пишет `WeaponControl`, inventory кладёт оружие в
//! `QuickSlots` и забирает части по `PartReleased`, transform collaborator двигает `Transform`.

use bevy::prelude::*;

pub mod blueprint;
pub mod components;
pub mod events;
pub mod systems;


pub use blueprint::{spawn_part, spawn_weapon, BlueprintError, WeaponBlueprint};
pub use components::*;
pub use events::*;
pub use systems::{aggregate_stats, condition_multiplier, plan_attach, resolve_fire_attempt, wants_to_fire, AttachPlan, FireOutcome};

use crate::{swap_events, SimulationSet};

/// Weapons Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. Attachment: attach → detach → cleaning
/// 2. Stats: пересчёт CalculatedStats
/// 3. Handling: select → draw/holster → fire mode → unjam → reload
/// 4. Firing: fire state machine → износ → сброс input edges
pub struct WeaponsPlugin;

impl Plugin for WeaponsPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<PartAttachRequest>()
            .add_event::<PartDetachRequest>()
            .add_event::<PartAttachResult>()
            .add_event::<PartDetachResult>()
            .add_event::<PartReleased>()
            .add_event::<WeaponModelRefresh>()
            .add_event::<CleaningRequest>()
            .add_event::<CleaningResult>()
            .add_event::<WeaponSelectIntent>()
            .add_event::<WeaponShot>()
            .add_event::<DryFire>()
            .add_event::<WeaponJammed>()
            .add_event::<ReloadStarted>()
            .add_event::<ReloadCompleted>()
            .add_event::<UnjamCompleted>();

        app.add_systems(
            FixedUpdate,
            (
                systems::process_part_attach_requests,
                systems::process_part_detach_requests,
                systems::process_cleaning_requests,
            )
                .chain()
                .in_set(SimulationSet::Attachment),
        )
        .add_systems(
            FixedUpdate,
            systems::recalculate_weapon_stats.in_set(SimulationSet::Stats),
        )
        .add_systems(
            FixedUpdate,
            (
                systems::process_weapon_select,
                systems::advance_draw_progress,
                systems::cycle_fire_modes,
                systems::process_unjam,
                systems::process_reload,
            )
                .chain()
                .in_set(SimulationSet::Handling),
        )
        .add_systems(
            FixedUpdate,
            (
                systems::fire_weapons,
                systems::apply_firing_wear,
                systems::clear_control_edges,
            )
                .chain()
                .in_set(SimulationSet::Firing),
        );
    }
}

/// Swap буферов weapon событий (вызывается `run_tick` в начале tick'а)
pub(crate) fn swap_event_buffers(world: &mut World) {
    swap_events::<PartAttachRequest>(world);
    swap_events::<PartDetachRequest>(world);
    swap_events::<PartAttachResult>(world);
    swap_events::<PartDetachResult>(world);
    swap_events::<PartReleased>(world);
    swap_events::<WeaponModelRefresh>(world);
    swap_events::<CleaningRequest>(world);
    swap_events::<CleaningResult>(world);
    swap_events::<WeaponSelectIntent>(world);
    swap_events::<WeaponShot>(world);
    swap_events::<DryFire>(world);
    swap_events::<WeaponJammed>(world);
    swap_events::<ReloadStarted>(world);
    swap_events::<ReloadCompleted>(world);
    swap_events::<UnjamCompleted>(world);
}
