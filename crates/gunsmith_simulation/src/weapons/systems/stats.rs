//! Stats aggregation: definition × condition + вклад частей → CalculatedStats
//!
//! Формула (по шагам):
//! 1. База из `WeaponDefinition`
//! 2. Condition multiplier `m = lerp(0.5, 1.0, condition)`:
//!    accuracy/damage/range × m, recoil/ergonomics ÷ m, jam += max(0, knee − c) × weight
//! 3. Вклад каждой attached части по типу (см. `apply_part`)
//! 4. Нет критичной части (Barrel/FiringPin/Bolt, под которую есть слот) → jam 1.0, accuracy = damage = 0
//! 5. Clamp

use bevy::prelude::*;

use crate::config::WeaponTuning;
use crate::weapons::components::{
    AttachedParts, CalculatedStats, ItemCondition, PartSlots, PartType, StatsDirty,
    WeaponDefinition, WeaponPart, WeaponState,
};

pub const MIN_RECOIL: f32 = 0.1;
pub const MIN_ERGONOMICS: f32 = 0.1;

/// Порог condition части, ниже которого она добавляет jam chance
const PART_DEGRADED_THRESHOLD: f32 = 0.5;

/// `lerp(0.5, 1.0, condition)`
pub fn condition_multiplier(condition: f32) -> f32 {
    let condition = condition.clamp(0.0, 1.0);
    0.5 + 0.5 * condition
}

/// Чистая функция агрегации (без ECS)
pub fn aggregate_stats(
    definition: &WeaponDefinition,
    condition: f32,
    slots: &PartSlots,
    parts: &[&WeaponPart],
    tuning: &WeaponTuning,
) -> CalculatedStats {
    let condition = condition.clamp(0.0, 1.0);
    let multiplier = condition_multiplier(condition);

    let mut stats = CalculatedStats {
        accuracy: definition.base_accuracy * multiplier,
        recoil: definition.base_recoil / multiplier,
        damage: definition.base_damage * multiplier,
        range: definition.effective_range * multiplier,
        jam_chance: definition.base_jam_chance
            + (tuning.condition_jam_knee - condition).max(0.0) * tuning.condition_jam_weight,
        ergonomics: definition.base_ergonomics / multiplier,
    };

    for part in parts {
        apply_part(&mut stats, part);
    }

    let missing_critical = slots
        .critical_types()
        .any(|critical| !parts.iter().any(|part| part.part_type == critical));

    stats.accuracy = stats.accuracy.clamp(0.0, 1.0);
    stats.recoil = stats.recoil.max(MIN_RECOIL);
    stats.damage = stats.damage.max(0.0);
    stats.range = stats.range.max(0.0);
    stats.ergonomics = stats.ergonomics.max(MIN_ERGONOMICS);

    if missing_critical {
        stats.jam_chance = 1.0;
        stats.accuracy = 0.0;
        stats.damage = 0.0;
    } else {
        stats.jam_chance = stats.jam_chance.clamp(0.0, tuning.max_jam_chance);
    }

    stats
}

fn apply_part(stats: &mut CalculatedStats, part: &WeaponPart) {
    let condition = part.clamped_condition();
    let modifiers = &part.modifiers;

    match part.part_type {
        PartType::Barrel => {
            stats.accuracy += modifiers.accuracy * condition;
            stats.range += modifiers.range * condition;
            stats.jam_chance += degraded_jam(part, 0.5);
        }
        PartType::FiringPin => stats.jam_chance += degraded_jam(part, 1.0),
        PartType::Bolt | PartType::Magazine => stats.jam_chance += degraded_jam(part, 0.5),
        PartType::Receiver => stats.jam_chance += degraded_jam(part, 0.3),
        PartType::Stock | PartType::Grip => {
            stats.recoil += modifiers.recoil;
            stats.ergonomics += modifiers.ergonomics;
        }
        PartType::Scope => {
            stats.accuracy += modifiers.accuracy;
            stats.ergonomics += modifiers.ergonomics;
        }
        PartType::Muzzle => {
            stats.recoil += modifiers.recoil;
            stats.accuracy += modifiers.accuracy;
        }
        // Trigger: feel/cosmetic; rail/laser/flashlight пока без числового эффекта
        PartType::Trigger | PartType::Rail | PartType::Laser | PartType::Flashlight => {}
    }
}

/// `jam_contribution × (offset − condition)` когда часть изношена (< 0.5)
fn degraded_jam(part: &WeaponPart, offset: f32) -> f32 {
    let condition = part.clamped_condition();
    if condition < PART_DEGRADED_THRESHOLD {
        part.jam_contribution * (offset - condition)
    } else {
        0.0
    }
}

/// Система: пересчёт статов для экипированного оружия (и помеченного `StatsDirty`)
pub fn recalculate_weapon_stats(
    mut commands: Commands,
    tuning: Res<WeaponTuning>,
    mut weapons: Query<(
        Entity,
        &WeaponDefinition,
        &ItemCondition,
        &PartSlots,
        &AttachedParts,
        &mut WeaponState,
        Has<StatsDirty>,
    )>,
    parts: Query<&WeaponPart>,
) {
    for (entity, definition, condition, slots, attached, mut state, dirty) in weapons.iter_mut() {
        if !state.equipped && !dirty {
            continue;
        }

        // Удалённые entity (part despawn'нули снаружи) просто не участвуют
        let mounted: Vec<&WeaponPart> = attached
            .entities()
            .filter_map(|part| parts.get(part).ok())
            .collect();

        state.calculated = aggregate_stats(definition, condition.condition, slots, &mounted, &tuning);

        if dirty {
            commands.entity(entity).remove::<StatsDirty>();
        }
    }
}
