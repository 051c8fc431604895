//! WeaponBlueprint: construction-time описание оружия + валидация
//!
//! Единственное место, где ошибки конфигурации всплывают наверх (`BlueprintError`).
//! После spawn симуляция не паникует: всё невалидное в runtime = clamp или void request.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::components::{
    AttachedPart, AttachedParts, FireMode, ItemCondition, MountType, MountedOn, PartSlots,
    PartType, SlotDefinition, StatsDirty, WeaponControl, WeaponDefinition, WeaponPart,
    WeaponState,
};

/// Ошибки конфигурации оружия
#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("magazine capacity must be positive")]
    ZeroMagazineCapacity,
    #[error("fire rate must be positive, got {0}")]
    InvalidFireRate(f32),
    #[error("weapon supports no fire modes")]
    NoFireModes,
    #[error("default fire mode {0:?} is not supported by the weapon")]
    DefaultModeUnsupported(FireMode),
    #[error("burst mode requires a positive burst size")]
    ZeroBurstSize,
    #[error("`{field}` must be within [0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f32 },
    #[error("`{field}` must not be negative, got {value}")]
    NegativeValue { field: &'static str, value: f32 },
    #[error("weapon needs required parts but defines no required slot")]
    NoRequiredSlots,
    #[error("slot {0:?} defined more than once")]
    DuplicateSlot(PartType),
    #[error("slot {0:?} has max_count 0")]
    ZeroMaxCount(PartType),
    #[error("starting part {0:?} has no matching slot")]
    PartHasNoSlot(PartType),
    #[error("starting part {part_type:?} with mount {mount:?} does not fit its slot")]
    PartMountMismatch { part_type: PartType, mount: MountType },
    #[error("too many starting parts of type {0:?}")]
    TooManyParts(PartType),
    #[error("starting ammo {ammo} exceeds magazine capacity {capacity}")]
    StartingAmmoExceedsCapacity { ammo: u32, capacity: u32 },
    #[error("failed to parse blueprint: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Описание оружия для spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponBlueprint {
    pub definition: WeaponDefinition,
    pub condition: f32,
    pub slots: Vec<SlotDefinition>,
    /// Стартовые части (spawn'ятся отдельными entity и сразу ставятся)
    pub parts: Vec<WeaponPart>,
    pub magazine_ammo: u32,
    pub reserve_ammo: u32,
    /// Оружие собирается из частей (должен быть хотя бы один required слот)
    pub requires_parts: bool,
    #[serde(skip)]
    pub transform: Transform,
}

impl WeaponBlueprint {
    /// Модульная винтовка: rifle layout + заводские required части
    pub fn modular_rifle() -> Self {
        let slots = PartSlots::rifle_layout().slots;
        let parts = slots
            .iter()
            .filter(|slot| slot.required)
            .map(|slot| WeaponPart::standard(slot.part_type))
            .collect();
        let definition = WeaponDefinition::assault_rifle();
        let magazine_ammo = definition.magazine_capacity;

        Self {
            definition,
            condition: 1.0,
            slots,
            parts,
            magazine_ammo,
            reserve_ammo: 90,
            requires_parts: true,
            transform: Transform::default(),
        }
    }

    /// Оружие без модульных слотов (статы = definition × condition)
    pub fn monolithic(definition: WeaponDefinition) -> Self {
        let magazine_ammo = definition.magazine_capacity;
        Self {
            definition,
            condition: 1.0,
            slots: Vec::new(),
            parts: Vec::new(),
            magazine_ammo,
            reserve_ammo: 0,
            requires_parts: false,
            transform: Transform::default(),
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self, BlueprintError> {
        let blueprint: Self = ron::from_str(source)?;
        blueprint.validate()?;
        Ok(blueprint)
    }

    pub fn with_condition(mut self, condition: f32) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_ammo(mut self, magazine_ammo: u32, reserve_ammo: u32) -> Self {
        self.magazine_ammo = magazine_ammo;
        self.reserve_ammo = reserve_ammo;
        self
    }

    pub fn with_part(mut self, part: WeaponPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn without_part(mut self, part_type: PartType) -> Self {
        self.parts.retain(|part| part.part_type != part_type);
        self
    }

    pub fn at(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn validate(&self) -> Result<(), BlueprintError> {
        self.validate_definition()?;
        self.validate_slots()?;
        self.validate_parts()?;

        if self.magazine_ammo > self.definition.magazine_capacity {
            return Err(BlueprintError::StartingAmmoExceedsCapacity {
                ammo: self.magazine_ammo,
                capacity: self.definition.magazine_capacity,
            });
        }

        Ok(())
    }

    fn validate_definition(&self) -> Result<(), BlueprintError> {
        let definition = &self.definition;

        if definition.magazine_capacity == 0 {
            return Err(BlueprintError::ZeroMagazineCapacity);
        }
        if definition.fire_rate_rpm.is_nan() || definition.fire_rate_rpm <= 0.0 {
            return Err(BlueprintError::InvalidFireRate(definition.fire_rate_rpm));
        }
        if definition.fire_modes.is_empty() {
            return Err(BlueprintError::NoFireModes);
        }
        if !definition.fire_modes.contains(definition.default_fire_mode) {
            return Err(BlueprintError::DefaultModeUnsupported(definition.default_fire_mode));
        }
        if definition.fire_modes.contains(FireMode::Burst) && definition.burst_size == 0 {
            return Err(BlueprintError::ZeroBurstSize);
        }

        check_fraction("armor_penetration", definition.armor_penetration)?;
        check_fraction("base_accuracy", definition.base_accuracy)?;
        check_fraction("base_jam_chance", definition.base_jam_chance)?;
        check_fraction("condition", self.condition)?;

        check_non_negative("base_damage", definition.base_damage)?;
        check_non_negative("base_recoil", definition.base_recoil)?;
        check_non_negative("base_ergonomics", definition.base_ergonomics)?;
        check_non_negative("holster_speed", definition.holster_speed)?;
        check_non_negative("effective_range", definition.effective_range)?;
        check_non_negative("max_range", definition.max_range)?;
        check_non_negative("degradation_per_shot", definition.degradation_per_shot)?;

        Ok(())
    }

    fn validate_slots(&self) -> Result<(), BlueprintError> {
        if self.requires_parts && !self.slots.iter().any(|slot| slot.required) {
            return Err(BlueprintError::NoRequiredSlots);
        }

        for (index, slot) in self.slots.iter().enumerate() {
            if self.slots[..index]
                .iter()
                .any(|earlier| earlier.part_type == slot.part_type)
            {
                return Err(BlueprintError::DuplicateSlot(slot.part_type));
            }
            if slot.max_count == 0 {
                return Err(BlueprintError::ZeroMaxCount(slot.part_type));
            }
        }

        Ok(())
    }

    fn validate_parts(&self) -> Result<(), BlueprintError> {
        for (index, part) in self.parts.iter().enumerate() {
            let Some(slot) = self.slots.iter().find(|slot| slot.part_type == part.part_type) else {
                return Err(BlueprintError::PartHasNoSlot(part.part_type));
            };
            if !slot.accepts_mount(part.mount) {
                return Err(BlueprintError::PartMountMismatch {
                    part_type: part.part_type,
                    mount: part.mount,
                });
            }

            let count = self.parts[..=index]
                .iter()
                .filter(|other| other.part_type == part.part_type)
                .count();
            if count > slot.max_count as usize {
                return Err(BlueprintError::TooManyParts(part.part_type));
            }
        }

        Ok(())
    }
}

fn check_fraction(field: &'static str, value: f32) -> Result<(), BlueprintError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BlueprintError::FractionOutOfRange { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), BlueprintError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(BlueprintError::NegativeValue { field, value })
    }
}

/// Валидирует blueprint и spawn'ит оружие + стартовые части
///
/// Оружие получает `StatsDirty`, чтобы статы посчитались на первом tick'е
/// даже в кобуре.
pub fn spawn_weapon(world: &mut World, blueprint: WeaponBlueprint) -> Result<Entity, BlueprintError> {
    blueprint.validate()?;

    let WeaponBlueprint {
        definition,
        condition,
        slots,
        parts,
        magazine_ammo,
        reserve_ammo,
        transform,
        ..
    } = blueprint;

    let name = definition.name.clone();
    let state = WeaponState::new(&definition, magazine_ammo, reserve_ammo);
    let slots = PartSlots::new(slots);

    let weapon = world
        .spawn((
            definition,
            ItemCondition::new(condition),
            slots.clone(),
            AttachedParts::default(),
            state,
            WeaponControl::default(),
            transform,
            StatsDirty,
        ))
        .id();

    let mut attached = AttachedParts::default();
    for part in parts {
        let part_type = part.part_type;
        let required = slots
            .slot_for(part_type)
            .is_some_and(|slot| slot.required);
        let entity = world
            .spawn((part, MountedOn { weapon: Some(weapon) }))
            .id();
        attached.push(AttachedPart {
            part: entity,
            slot: part_type,
            required,
        });
    }

    let part_count = attached.len();
    world.entity_mut(weapon).insert(attached);

    crate::logger::log(&format!(
        "🔫 Spawned weapon {} {:?} with {} parts",
        name, weapon, part_count
    ));

    Ok(weapon)
}

/// Spawn свободной части (у inventory, ни на чём не стоит)
pub fn spawn_part(world: &mut World, part: WeaponPart) -> Entity {
    world.spawn(part).id()
}
