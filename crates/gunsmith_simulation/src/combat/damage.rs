//! Damage model: DamageEvent → броня → Health → смерть
//!
//! Формула брони:
//! - effective_armor = armor × (1 − penetration)
//! - final = incoming × 100 / (100 + effective_armor)
//! - durability −= incoming × wear_factor (только если armor > 0); ≤ 0 → броня уничтожена
//!
//! Несколько DamageEvent на одну цель за tick применяются по порядку,
//! после смертельного остальные отбрасываются (dead check).

use bevy::prelude::*;

use crate::components::Health;
use crate::config::WeaponTuning;

/// Тип урона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum DamageType {
    Bullet,
    Explosion,
    Melee,
    Fall,
    Anomaly,
    Radiation,
    Bleed,
}

/// Событие: нанести урон цели (живёт один tick)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: Entity,
    pub damage: f32,
    /// [0, 1]
    pub armor_penetration: f32,
    pub hit_position: Vec3,
    pub hit_direction: Vec3,
    pub attacker: Option<Entity>,
    pub damage_type: DamageType,
}

/// Событие: урон применён (для UI, звуков, hit markers)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageApplied {
    pub target: Entity,
    pub attacker: Option<Entity>,
    pub final_damage: f32,
    pub armor_destroyed: bool,
    pub target_died: bool,
}

/// Событие: entity умер (один раз)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    /// `Time::elapsed_secs` на момент смерти
    pub time_of_death: f32,
}

/// Компонент-маркер: entity мертв (Health ≤ 0)
///
/// Деспавн не автоматический: трупы остаются на месте (loot collaborator решает).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Результат расчёта брони
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmorResolution {
    pub effective_armor: f32,
    /// 100 / (100 + effective_armor)
    pub damage_reduction: f32,
    pub final_damage: f32,
}

/// Чистая формула брони
pub fn resolve_armor(incoming: f32, armor_penetration: f32, armor: f32) -> ArmorResolution {
    let incoming = incoming.max(0.0);
    let penetration = armor_penetration.clamp(0.0, 1.0);
    let armor = armor.max(0.0);

    let effective_armor = armor * (1.0 - penetration);
    let damage_reduction = 100.0 / (100.0 + effective_armor);

    ArmorResolution {
        effective_armor,
        damage_reduction,
        final_damage: incoming * damage_reduction,
    }
}

/// Исход применения одного DamageEvent к Health
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Цель мертва или неуязвима, событие отброшено
    Ignored,
    Applied {
        final_damage: f32,
        armor_destroyed: bool,
        killed: bool,
    },
}

/// Применить урон к Health (без ECS)
pub fn apply_damage_to_health(
    health: &mut Health,
    incoming: f32,
    armor_penetration: f32,
    armor_wear_factor: f32,
) -> DamageOutcome {
    if health.dead || health.invulnerable {
        return DamageOutcome::Ignored;
    }

    let resolution = resolve_armor(incoming, armor_penetration, health.armor);

    let mut armor_destroyed = false;
    if health.armor > 0.0 {
        health.armor_durability -= incoming.max(0.0) * armor_wear_factor;
        if health.armor_durability <= 0.0 {
            health.armor = 0.0;
            health.armor_durability = 0.0;
            armor_destroyed = true;
        }
    }

    health.current -= resolution.final_damage;
    health.damage_taken_this_tick += resolution.final_damage;
    health.time_since_last_damage = 0.0;

    let killed = health.current <= 0.0;
    if killed {
        health.current = 0.0;
        health.dead = true;
    }

    DamageOutcome::Applied {
        final_damage: resolution.final_damage,
        armor_destroyed,
        killed,
    }
}

/// Система: per-tick bookkeeping (до применения урона)
pub fn tick_damage_bookkeeping(time: Res<Time>, mut targets: Query<&mut Health>) {
    let delta = time.delta_secs();
    for mut health in targets.iter_mut() {
        health.damage_taken_this_tick = 0.0;
        health.time_since_last_damage += delta;
    }
}

/// Система: применить все DamageEvent этого tick'а
pub fn apply_damage_events(
    mut commands: Commands,
    time: Res<Time>,
    tuning: Res<WeaponTuning>,
    mut damage_events: EventReader<DamageEvent>,
    mut targets: Query<&mut Health>,
    mut applied_events: EventWriter<DamageApplied>,
    mut died_events: EventWriter<EntityDied>,
) {
    for event in damage_events.read() {
        let Ok(mut health) = targets.get_mut(event.target) else {
            crate::logger::log_warning(&format!(
                "DamageEvent void: target {:?} has no Health",
                event.target
            ));
            continue;
        };

        let outcome = apply_damage_to_health(
            &mut health,
            event.damage,
            event.armor_penetration,
            tuning.armor_wear_factor,
        );

        let DamageOutcome::Applied {
            final_damage,
            armor_destroyed,
            killed,
        } = outcome
        else {
            continue;
        };

        applied_events.write(DamageApplied {
            target: event.target,
            attacker: event.attacker,
            final_damage,
            armor_destroyed,
            target_died: killed,
        });

        if armor_destroyed {
            crate::logger::log(&format!("🛡️ Armor of {:?} destroyed", event.target));
        }

        if killed {
            commands.entity(event.target).insert(Dead);
            died_events.write(EntityDied {
                entity: event.target,
                killer: event.attacker,
                time_of_death: time.elapsed_secs(),
            });
            crate::logger::log_info(&format!(
                "💀 Entity {:?} killed by {:?}",
                event.target, event.attacker
            ));
        }
    }
}
