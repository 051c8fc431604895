//! Weapon handling: выбор слота, draw/holster, режим огня, unjam, reload
//!
//! Порядок в Handling стадии (chain):
//! select → draw/holster progress → fire mode cycle → unjam → reload

use bevy::prelude::*;

use crate::components::{EquippedWeapon, QuickSlots, WieldedBy, QUICK_SLOT_COUNT};
use crate::config::WeaponTuning;
use crate::weapons::components::{WeaponControl, WeaponDefinition, WeaponState};
use crate::weapons::events::{ReloadCompleted, ReloadStarted, UnjamCompleted, WeaponSelectIntent};

/// Нижняя граница holster speed (секунды), чтобы не делить на 0
const MIN_HOLSTER_SECS: f32 = 0.01;

/// Система: quick slot select → equip / holster / swap
///
/// - пустой слот → убрать текущее оружие в кобуру
/// - слот с текущим оружием → toggle holster
/// - другой слот → текущее в кобуру, новое достаём (draw progress с 0)
pub fn process_weapon_select(
    mut commands: Commands,
    mut intents: EventReader<WeaponSelectIntent>,
    mut wielders: Query<(&QuickSlots, &mut EquippedWeapon)>,
    mut weapons: Query<(&mut WeaponState, &WeaponDefinition)>,
) {
    for intent in intents.read() {
        let Ok((slots, mut equipped)) = wielders.get_mut(intent.wielder) else {
            crate::logger::log_warning(&format!(
                "Select intent void: wielder {:?} has no quick slots",
                intent.wielder
            ));
            continue;
        };

        if !(1..=QUICK_SLOT_COUNT as u8).contains(&intent.slot) {
            crate::logger::log_warning(&format!("Select intent: invalid slot {}", intent.slot));
            continue;
        }

        let target = slots
            .get(intent.slot)
            .filter(|weapon| weapons.contains(*weapon));

        match target {
            None => {
                if let Some(current) = equipped.weapon {
                    holster(current, &mut weapons);
                }
            }
            Some(weapon) if equipped.weapon == Some(weapon) => {
                if let Ok((mut state, _)) = weapons.get_mut(weapon) {
                    state.holstered = !state.holstered;
                    if !state.holstered {
                        state.equipped = true;
                    }
                    crate::logger::log(&format!(
                        "🔫 Weapon {:?} {}",
                        weapon,
                        if state.holstered { "holstering" } else { "drawing" }
                    ));
                }
            }
            Some(weapon) => {
                if let Some(current) = equipped.weapon {
                    holster(current, &mut weapons);
                }

                if let Ok((mut state, definition)) = weapons.get_mut(weapon) {
                    state.equipped = true;
                    state.holstered = false;
                    state.draw_progress = 0.0;
                    state.holster_speed = if state.calculated.ergonomics > 0.0 {
                        state.calculated.ergonomics
                    } else {
                        definition.holster_speed
                    };
                }

                equipped.weapon = Some(weapon);
                equipped.slot = Some(intent.slot);
                commands.entity(weapon).insert(WieldedBy(intent.wielder));

                crate::logger::log(&format!(
                    "🔫 {:?} equips weapon {:?} (slot {})",
                    intent.wielder, weapon, intent.slot
                ));
            }
        }
    }
}

fn holster(weapon: Entity, weapons: &mut Query<(&mut WeaponState, &WeaponDefinition)>) {
    if let Ok((mut state, _)) = weapons.get_mut(weapon) {
        if state.equipped {
            state.holstered = true;
        }
    }
}

/// Система: draw/holster progress (dt / holster_speed)
///
/// Достигли 0 при holster → оружие больше не equipped.
pub fn advance_draw_progress(time: Res<Time>, mut weapons: Query<&mut WeaponState>) {
    let delta = time.delta_secs();

    for mut state in weapons.iter_mut() {
        if !state.equipped {
            continue;
        }

        let step = delta / state.holster_speed.max(MIN_HOLSTER_SECS);

        if state.holstered {
            state.draw_progress = (state.draw_progress - step).max(0.0);
            if state.draw_progress <= 0.0 {
                state.equipped = false;
                state.is_firing = false;
                state.trigger_held = false;
            }
        } else if state.draw_progress < 1.0 {
            state.draw_progress = (state.draw_progress + step).min(1.0);
        }
    }
}

/// Система: переключение режима огня по кругу поддерживаемых
pub fn cycle_fire_modes(mut weapons: Query<(Entity, &WeaponDefinition, &WeaponControl, &mut WeaponState)>) {
    for (entity, definition, control, mut state) in weapons.iter_mut() {
        if !control.cycle_fire_mode_pressed || !state.is_ready_in_hands() {
            continue;
        }

        let next = definition.fire_modes.next_after(state.fire_mode);
        if next != state.fire_mode {
            state.fire_mode = next;
            state.burst_shots_fired = 0;
            state.is_firing = false;
            crate::logger::log(&format!("🔫 Weapon {:?} fire mode → {:?}", entity, next));
        }
    }
}

/// Система: устранение задержки
///
/// Старт только по unjam edge и только если заклинило; прогресс dt / unjam_duration.
pub fn process_unjam(
    time: Res<Time>,
    tuning: Res<WeaponTuning>,
    mut weapons: Query<(Entity, &WeaponControl, &mut WeaponState)>,
    mut completed: EventWriter<UnjamCompleted>,
) {
    let delta = time.delta_secs();

    for (entity, control, mut state) in weapons.iter_mut() {
        if !state.is_ready_in_hands() || !state.jammed {
            continue;
        }

        if !state.unjamming {
            if !control.unjam_pressed || !state.start_unjam(tuning.unjam_secs) {
                continue;
            }
            crate::logger::log(&format!("🔧 Weapon {:?} unjamming...", entity));
        }

        state.unjam_progress += delta / state.unjam_duration;
        if state.unjam_progress >= 1.0 {
            state.complete_unjam();
            completed.write(UnjamCompleted { weapon: entity });
            crate::logger::log_info(&format!("🔧 Weapon {:?} cleared", entity));
        }
    }
}

/// Система: перезарядка
///
/// Старт по reload edge или автоматически (fire edge при пустом магазине и есть резерв).
pub fn process_reload(
    time: Res<Time>,
    tuning: Res<WeaponTuning>,
    mut weapons: Query<(Entity, &WeaponDefinition, &WeaponControl, &mut WeaponState)>,
    mut started: EventWriter<ReloadStarted>,
    mut completed: EventWriter<ReloadCompleted>,
) {
    let delta = time.delta_secs();

    for (entity, definition, control, mut state) in weapons.iter_mut() {
        if !state.is_ready_in_hands() || state.jammed {
            continue;
        }

        if state.reloading {
            state.reload_progress += delta / state.reload_duration;
            if state.reload_progress >= 1.0 {
                state.complete_reload(definition.magazine_capacity);
                completed.write(ReloadCompleted { weapon: entity });
                crate::logger::log(&format!(
                    "🔄 Weapon {:?} reloaded: {}/{} (reserve {})",
                    entity, state.magazine_ammo, definition.magazine_capacity, state.reserve_ammo
                ));
            }
            continue;
        }

        let auto_reload = state.magazine_ammo == 0 && control.fire_pressed && state.reserve_ammo > 0;
        if !control.reload_pressed && !auto_reload {
            continue;
        }

        if state.start_reload(definition.magazine_capacity, tuning.reload_base_secs) {
            started.write(ReloadStarted { weapon: entity });
            crate::logger::log(&format!(
                "🔄 Weapon {:?} reloading ({:.2}s)",
                entity, state.reload_duration
            ));
        }
    }
}
