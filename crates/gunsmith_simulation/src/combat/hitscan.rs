//! Hitscan: WeaponShot → spread → ray cast → DamageEvent
//!
//! Spread: `lerp(max_spread, min_spread, accuracy)` градусов, точка равномерно
//! в диске (радиус `sqrt(u) · tan(spread)`), чтобы не было перекоса к центру.
//! Луч идёт до `range`, ближайший коллайдер выигрывает.
//! Коллайдеры самого стрелка (entity стрелка или его hitbox'ы) и оружия игнорируются.

use bevy::math::bounding::RayCast3d;
use bevy::math::Ray3d;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use super::damage::{DamageEvent, DamageType};
use super::hitbox::{HitCollider, Hitbox};
use crate::components::Health;
use crate::config::WeaponTuning;
use crate::weapons::WeaponShot;
use crate::DeterministicRng;

/// Запрос VFX/audio: выстрел (на каждый `WeaponShot`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponFireEffect {
    pub weapon: Entity,
    pub muzzle_position: Vec3,
    /// Направление после spread
    pub muzzle_direction: Dir3,
    /// Точка попадания, либо конец луча при промахе (для трассера)
    pub hit_position: Vec3,
    /// Луч во что-то попал
    pub did_hit: bool,
}

/// Запрос VFX: попадание в поверхность
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ImpactEffect {
    pub surface: Entity,
    pub position: Vec3,
    pub normal: Vec3,
}

/// Ближайшее пересечение луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Половина угла конуса разброса (градусы)
pub fn spread_degrees(accuracy: f32, tuning: &WeaponTuning) -> f32 {
    let accuracy = accuracy.clamp(0.0, 1.0);
    tuning.max_spread_degrees + (tuning.min_spread_degrees - tuning.max_spread_degrees) * accuracy
}

/// Отклонить направление внутрь конуса `spread_degrees` (uniform-in-disc)
pub fn apply_spread<R: Rng>(forward: Dir3, spread_degrees: f32, rng: &mut R) -> Dir3 {
    let axis = *forward;
    let (right, up) = axis.any_orthonormal_pair();

    let angle = rng.gen::<f32>() * TAU;
    let radius = rng.gen::<f32>().sqrt() * spread_degrees.max(0.0).to_radians().tan();
    let offset = (right * angle.cos() + up * angle.sin()) * radius;

    Dir3::new(axis + offset).unwrap_or(forward)
}

/// Ближайшее пересечение луча с набором коллайдеров
///
/// Равные дистанции: выигрывает меньший entity index (детерминизм не зависит от порядка query).
pub fn cast_ray<'a>(
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
    candidates: impl IntoIterator<Item = (Entity, &'a HitCollider, Vec3)>,
) -> Option<RayHit> {
    let ray = RayCast3d::from_ray(Ray3d::new(origin, direction), max_distance.max(0.0));

    let mut best: Option<(Entity, f32, &HitCollider, Vec3)> = None;
    for (entity, collider, center) in candidates {
        let Some(distance) = collider.ray_distance(center, &ray) else {
            continue;
        };

        let closer = match best {
            None => true,
            Some((best_entity, best_distance, _, _)) => {
                distance < best_distance
                    || (distance == best_distance && entity.index() < best_entity.index())
            }
        };
        if closer {
            best = Some((entity, distance, collider, center));
        }
    }

    best.map(|(entity, distance, collider, center)| {
        let point = origin + *direction * distance;
        RayHit {
            entity,
            distance,
            point,
            normal: collider.surface_normal(center, point),
        }
    })
}

/// Система: WeaponShot → hitscan → DamageEvent + effect requests
pub fn resolve_hitscan(
    mut shots: EventReader<WeaponShot>,
    tuning: Res<WeaponTuning>,
    mut rng: ResMut<DeterministicRng>,
    colliders: Query<(Entity, &HitCollider, &Transform, Option<&Hitbox>, Has<Health>)>,
    damageable: Query<(), With<Health>>,
    mut damage_events: EventWriter<DamageEvent>,
    mut fire_effects: EventWriter<WeaponFireEffect>,
    mut impacts: EventWriter<ImpactEffect>,
) {
    for shot in shots.read() {
        let spread = spread_degrees(shot.accuracy, &tuning);
        let direction = apply_spread(shot.direction, spread, &mut rng.rng);

        let candidates = colliders
            .iter()
            .filter(|(entity, _, _, hitbox, _)| {
                let own_entity = Some(*entity) == shot.shooter || *entity == shot.weapon;
                let own_hitbox = hitbox.is_some_and(|hitbox| Some(hitbox.owner) == shot.shooter);
                !own_entity && !own_hitbox
            })
            .map(|(entity, collider, transform, _, _)| (entity, collider, transform.translation));

        let hit = cast_ray(shot.origin, direction, shot.range, candidates);

        fire_effects.write(WeaponFireEffect {
            weapon: shot.weapon,
            muzzle_position: shot.origin,
            muzzle_direction: direction,
            hit_position: hit.map_or(shot.origin + *direction * shot.range, |hit| hit.point),
            did_hit: hit.is_some(),
        });

        let Some(hit) = hit else {
            continue;
        };

        impacts.write(ImpactEffect {
            surface: hit.entity,
            position: hit.point,
            normal: hit.normal,
        });

        // Health напрямую → 1.0; Hitbox → владелец × multiplier; иначе промах
        let Ok((_, _, _, hitbox, has_health)) = colliders.get(hit.entity) else {
            continue;
        };
        let resolved = if has_health {
            Some((hit.entity, 1.0))
        } else {
            hitbox
                .filter(|hitbox| damageable.contains(hitbox.owner))
                .map(|hitbox| (hitbox.owner, hitbox.damage_multiplier))
        };

        let Some((target, multiplier)) = resolved else {
            continue;
        };

        damage_events.write(DamageEvent {
            target,
            damage: shot.damage * multiplier,
            armor_penetration: shot.armor_penetration,
            hit_position: hit.point,
            hit_direction: *direction,
            attacker: shot.shooter,
            damage_type: DamageType::Bullet,
        });

        crate::logger::log(&format!(
            "🎯 Shot from {:?} hit {:?} (×{:.1}) at {:.1}m",
            shot.weapon, target, multiplier, hit.distance
        ));
    }
}
