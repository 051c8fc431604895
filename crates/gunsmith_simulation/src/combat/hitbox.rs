//! Hitbox + collider компоненты для hitscan
//!
//! Архитектура:
//! - `HitCollider`: геометрия, в которую может попасть луч (sphere / axis-aligned box),
//!   позиция из `Transform` entity (физический collaborator двигает её)
//! - `Health` на той же entity → прямое попадание (multiplier 1.0)
//! - `Hitbox` на той же entity → урон владельцу × multiplier части тела
//! - ни того ни другого → стена/пол: impact есть, урона нет

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::prelude::*;

/// Часть тела
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BodyRegion {
    Head,
    Torso,
    ArmLeft,
    ArmRight,
    LegLeft,
    LegRight,
}

impl BodyRegion {
    pub fn default_multiplier(self) -> f32 {
        match self {
            BodyRegion::Head => 2.0,
            BodyRegion::Torso => 1.0,
            BodyRegion::ArmLeft | BodyRegion::ArmRight | BodyRegion::LegLeft | BodyRegion::LegRight => 0.5,
        }
    }
}

/// Hitbox части тела: перенаправляет урон на владельца
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hitbox {
    /// Entity с `Health`
    pub owner: Entity,
    pub region: BodyRegion,
    pub damage_multiplier: f32,
}

impl Hitbox {
    pub fn new(owner: Entity, region: BodyRegion) -> Self {
        Self {
            owner,
            region,
            damage_multiplier: region.default_multiplier(),
        }
    }

    /// Голова: 2.0×
    pub fn head(owner: Entity) -> Self {
        Self::new(owner, BodyRegion::Head)
    }

    pub fn torso(owner: Entity) -> Self {
        Self::new(owner, BodyRegion::Torso)
    }

    /// Конечности: 0.5×
    pub fn limb(owner: Entity, region: BodyRegion) -> Self {
        Self::new(owner, region)
    }
}

/// Форма коллайдера
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Axis-aligned (rotation entity игнорируется)
    Box { half_extents: Vec3 },
}

/// Геометрия для hitscan (центр = `Transform::translation`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HitCollider {
    pub shape: ColliderShape,
}

impl HitCollider {
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Box { half_extents },
        }
    }

    /// Дистанция от начала луча до входа в коллайдер (None = мимо)
    ///
    /// Луч, стартующий внутри коллайдера, попадает на дистанции 0.
    pub fn ray_distance(&self, center: Vec3, ray: &RayCast3d) -> Option<f32> {
        match self.shape {
            ColliderShape::Sphere { radius } => {
                ray.sphere_intersection_at(&BoundingSphere::new(center, radius))
            }
            ColliderShape::Box { half_extents } => {
                ray.aabb_intersection_at(&Aabb3d::new(center, half_extents))
            }
        }
    }

    /// Нормаль поверхности в точке попадания (для impact VFX)
    pub fn surface_normal(&self, center: Vec3, point: Vec3) -> Vec3 {
        let local = point - center;
        match self.shape {
            ColliderShape::Sphere { .. } => local.normalize_or(Vec3::Y),
            ColliderShape::Box { half_extents } => {
                // Ось с наибольшим относительным смещением = грань
                let relative = local / half_extents.max(Vec3::splat(f32::EPSILON));
                let abs = relative.abs();
                if abs.x >= abs.y && abs.x >= abs.z {
                    Vec3::X * relative.x.signum()
                } else if abs.y >= abs.z {
                    Vec3::Y * relative.y.signum()
                } else {
                    Vec3::Z * relative.z.signum()
                }
            }
        }
    }
}
