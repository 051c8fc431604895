//! Firing state machine: fire intent → выстрел / dry-fire / jam
//!
//! Fire attempt допустим только если: не reload, не jammed, cooldown ≤ 0.
//! Магазин пуст → dry-fire (cooldown не трогаем).
//! Иначе jam roll, иначе выстрел (`WeaponShot` → hit resolution).

use bevy::prelude::*;
use rand::Rng;

use crate::components::WieldedBy;
use crate::config::WeaponTuning;
use crate::weapons::components::{
    AttachedParts, FireMode, ItemCondition, WeaponControl, WeaponDefinition, WeaponPart,
    WeaponState,
};
use crate::weapons::events::{DryFire, WeaponJammed, WeaponShot};
use crate::DeterministicRng;

/// Исход одной попытки выстрела
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    DryFire,
    Jammed,
}

/// Хочет ли оружие стрелять в этот tick (по режиму огня)
///
/// Burst: press edge сбрасывает счётчик и начинает очередь,
/// дальше стреляем автоматически пока счётчик в [1, burst_size).
pub fn wants_to_fire(state: &mut WeaponState, control: &WeaponControl, burst_size: u32) -> bool {
    match state.fire_mode {
        FireMode::Safe => false,
        FireMode::Semi | FireMode::BoltAction => control.fire_pressed,
        FireMode::Burst => {
            if control.fire_pressed {
                state.burst_shots_fired = 0;
                true
            } else {
                (1..burst_size).contains(&state.burst_shots_fired)
            }
        }
        FireMode::Auto => control.fire_held,
    }
}

/// Одна попытка выстрела (eligibility уже проверена)
///
/// Мутирует ammo/cooldown/счётчики; jam roll через переданный RNG.
pub fn resolve_fire_attempt<R: Rng>(
    state: &mut WeaponState,
    definition: &WeaponDefinition,
    tuning: &WeaponTuning,
    rng: &mut R,
) -> FireOutcome {
    if state.magazine_ammo == 0 {
        // Очередь на пустом магазине не продолжается
        state.burst_shots_fired = 0;
        return FireOutcome::DryFire;
    }

    let mut jam_chance = state.calculated.jam_chance;
    if state.shots_since_cleaning > tuning.fouling_shot_threshold {
        jam_chance += tuning.fouling_jam_penalty;
    }

    let roll: f32 = rng.gen();
    if roll < jam_chance {
        state.jam();
        return FireOutcome::Jammed;
    }

    state.magazine_ammo -= 1;
    if state.magazine_ammo == 0 {
        state.chambered = false;
    }
    state.fire_cooldown = definition.fire_interval_secs();
    state.time_since_last_shot = 0.0;
    state.shots_since_cleaning += 1;
    state.is_firing = true;
    if state.fire_mode == FireMode::Burst {
        state.burst_shots_fired += 1;
    }

    FireOutcome::Fired
}

/// Система: firing state machine для экипированного оружия
pub fn fire_weapons(
    time: Res<Time>,
    tuning: Res<WeaponTuning>,
    mut rng: ResMut<DeterministicRng>,
    mut weapons: Query<(
        Entity,
        &WeaponDefinition,
        &WeaponControl,
        &mut WeaponState,
        &Transform,
        Option<&WieldedBy>,
    )>,
    mut shots: EventWriter<WeaponShot>,
    mut dry_fires: EventWriter<DryFire>,
    mut jams: EventWriter<WeaponJammed>,
) {
    let delta = time.delta_secs();

    for (entity, definition, control, mut state, transform, wielder) in weapons.iter_mut() {
        if !state.is_ready_in_hands() {
            continue;
        }

        state.fire_cooldown = (state.fire_cooldown - delta).max(0.0);
        state.time_since_last_shot += delta;
        state.trigger_held = control.fire_held;
        state.is_firing = false;

        if state.reloading || state.jammed {
            continue;
        }

        if !wants_to_fire(&mut state, control, definition.burst_size) || state.fire_cooldown > 0.0 {
            continue;
        }

        match resolve_fire_attempt(&mut state, definition, &tuning, &mut rng.rng) {
            FireOutcome::DryFire => {
                dry_fires.write(DryFire { weapon: entity });
                crate::logger::log(&format!("🔫 Weapon {:?} *click* (empty)", entity));
            }
            FireOutcome::Jammed => {
                jams.write(WeaponJammed { weapon: entity });
                crate::logger::log_info(&format!(
                    "⚠️ Weapon {:?} jammed (shots since cleaning: {})",
                    entity, state.shots_since_cleaning
                ));
            }
            FireOutcome::Fired => {
                shots.write(WeaponShot {
                    weapon: entity,
                    shooter: wielder.map(|wielded_by| wielded_by.0),
                    origin: transform.translation,
                    direction: transform.forward(),
                    damage: state.calculated.damage,
                    accuracy: state.calculated.accuracy,
                    range: state.calculated.range,
                    armor_penetration: definition.armor_penetration,
                });
            }
        }
    }
}

/// Система: износ от выстрелов (weapon condition и каждая attached часть)
pub fn apply_firing_wear(
    mut shots: EventReader<WeaponShot>,
    mut weapons: Query<(&WeaponDefinition, &mut ItemCondition, &AttachedParts)>,
    mut parts: Query<&mut WeaponPart>,
) {
    for shot in shots.read() {
        let Ok((definition, mut condition, attached)) = weapons.get_mut(shot.weapon) else {
            continue;
        };

        condition.degrade(definition.degradation_per_shot);

        for part in attached.entities() {
            if let Ok(mut part) = parts.get_mut(part) {
                let rate = part.degradation_rate;
                part.degrade(rate);
            }
        }
    }
}

/// Система: edge флаги input живут один tick
pub fn clear_control_edges(mut controls: Query<&mut WeaponControl>) {
    for mut control in controls.iter_mut() {
        if control.fire_pressed
            || control.reload_pressed
            || control.unjam_pressed
            || control.cycle_fire_mode_pressed
        {
            control.clear_edges();
        }
    }
}
