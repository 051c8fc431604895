//! Части оружия, слоты и attached list
//!
//! Part = отдельная entity (`WeaponPart` + `MountedOn`).
//! Weapon держит `PartSlots` (что можно ставить) и `AttachedParts` (что стоит сейчас).
//! `AttachedParts`: единственная мутабельная связь weapon ↔ part.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Тип части (= тип слота)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum PartType {
    Barrel,
    Receiver,
    Bolt,
    FiringPin,
    Trigger,
    Magazine,
    Grip,
    Stock,
    Scope,
    Muzzle,
    Rail,
    Laser,
    Flashlight,
}

impl PartType {
    /// Без этих частей оружие не стреляет (jam = 1.0)
    pub const CRITICAL: [PartType; 3] = [PartType::Barrel, PartType::FiringPin, PartType::Bolt];

    pub fn is_critical(self) -> bool {
        Self::CRITICAL.contains(&self)
    }
}

/// Способ крепления
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum MountType {
    /// Встроенная часть (ствол, затвор)
    Integrated,
    Picatinny,
    MLok,
    KeyMod,
    /// Только под конкретную модель
    Proprietary,
    /// Слот с Universal принимает любое крепление
    Universal,
}

/// Аддитивные модификаторы части
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PartModifiers {
    pub accuracy: f32,
    /// Отрицательный = меньше отдача
    pub recoil: f32,
    pub range: f32,
    pub ergonomics: f32,
    pub damage: f32,
}

/// Часть оружия (на отдельной entity)
///
/// Инвариант: 0 ≤ condition ≤ max_condition ≤ 1
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[require(MountedOn)]
pub struct WeaponPart {
    pub id: u32,
    pub name: String,
    pub part_type: PartType,
    pub mount: MountType,
    pub condition: f32,
    /// Потеря condition за выстрел
    pub degradation_rate: f32,
    /// Может быть < 1.0 после плохого ремонта
    pub max_condition: f32,
    /// кг
    pub weight: f32,
    pub modifiers: PartModifiers,
    /// Вклад в jam chance при condition < 0.5
    pub jam_contribution: f32,
}

impl WeaponPart {
    /// Стандартная (заводская) часть данного типа
    pub fn standard(part_type: PartType) -> Self {
        let (name, mount, modifiers, jam_contribution, weight) = match part_type {
            PartType::Barrel => (
                "Standard Barrel",
                MountType::Integrated,
                PartModifiers { accuracy: 0.05, range: 50.0, ..default() },
                0.2,
                0.6,
            ),
            PartType::Receiver => ("Standard Receiver", MountType::Integrated, PartModifiers::default(), 0.1, 1.0),
            PartType::Bolt => ("Standard Bolt", MountType::Integrated, PartModifiers::default(), 0.3, 0.3),
            PartType::FiringPin => ("Standard Firing Pin", MountType::Integrated, PartModifiers::default(), 0.4, 0.05),
            PartType::Trigger => ("Standard Trigger", MountType::Integrated, PartModifiers::default(), 0.0, 0.1),
            PartType::Magazine => ("Standard Magazine", MountType::Proprietary, PartModifiers::default(), 0.15, 0.3),
            PartType::Grip => (
                "Vertical Grip",
                MountType::Picatinny,
                PartModifiers { recoil: -0.1, ergonomics: -0.02, ..default() },
                0.0,
                0.15,
            ),
            PartType::Stock => (
                "Standard Stock",
                MountType::Proprietary,
                PartModifiers { recoil: -0.2, ergonomics: 0.03, ..default() },
                0.0,
                0.5,
            ),
            PartType::Scope => (
                "4x Scope",
                MountType::Picatinny,
                PartModifiers { accuracy: 0.1, ergonomics: 0.05, ..default() },
                0.0,
                0.4,
            ),
            PartType::Muzzle => (
                "Compensator",
                MountType::Universal,
                PartModifiers { accuracy: 0.02, recoil: -0.15, ..default() },
                0.0,
                0.2,
            ),
            PartType::Rail => ("Picatinny Rail", MountType::Picatinny, PartModifiers::default(), 0.0, 0.1),
            PartType::Laser => (
                "Laser Module",
                MountType::Picatinny,
                PartModifiers { accuracy: 0.02, ..default() },
                0.0,
                0.1,
            ),
            PartType::Flashlight => ("Flashlight", MountType::Picatinny, PartModifiers::default(), 0.0, 0.15),
        };

        Self {
            id: 0,
            name: name.to_string(),
            part_type,
            mount,
            condition: 1.0,
            degradation_rate: 0.0001,
            max_condition: 1.0,
            weight,
            modifiers,
            jam_contribution,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn with_condition(mut self, condition: f32) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_mount(mut self, mount: MountType) -> Self {
        self.mount = mount;
        self
    }

    pub fn with_modifiers(mut self, modifiers: PartModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_jam_contribution(mut self, jam_contribution: f32) -> Self {
        self.jam_contribution = jam_contribution;
        self
    }

    /// Condition, приведённый к [0, 1] (битые данные не ломают формулы)
    pub fn clamped_condition(&self) -> f32 {
        self.condition.clamp(0.0, 1.0)
    }

    pub fn degrade(&mut self, amount: f32) {
        self.condition = (self.condition - amount.max(0.0)).clamp(0.0, self.max_condition.clamp(0.0, 1.0));
    }

    pub fn restore(&mut self, amount: f32) {
        self.condition = (self.condition + amount.max(0.0)).min(self.max_condition.clamp(0.0, 1.0));
    }
}

/// На каком оружии стоит часть (None = свободна, у inventory)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct MountedOn {
    pub weapon: Option<Entity>,
}

/// Слот оружия (immutable после spawn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub part_type: PartType,
    pub required_mount: MountType,
    /// Без этой части оружие не работает, detach только с заменой
    pub required: bool,
    pub max_count: u32,
}

impl SlotDefinition {
    pub fn required(part_type: PartType, required_mount: MountType) -> Self {
        Self {
            part_type,
            required_mount,
            required: true,
            max_count: 1,
        }
    }

    pub fn optional(part_type: PartType, required_mount: MountType) -> Self {
        Self {
            part_type,
            required_mount,
            required: false,
            max_count: 1,
        }
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn accepts_mount(&self, mount: MountType) -> bool {
        self.required_mount == MountType::Universal || self.required_mount == mount
    }
}

/// Набор слотов оружия
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PartSlots {
    pub slots: Vec<SlotDefinition>,
}

impl PartSlots {
    pub fn new(slots: Vec<SlotDefinition>) -> Self {
        Self { slots }
    }

    /// Стандартная раскладка модульной винтовки
    pub fn rifle_layout() -> Self {
        Self::new(vec![
            SlotDefinition::required(PartType::Barrel, MountType::Integrated),
            SlotDefinition::required(PartType::Receiver, MountType::Integrated),
            SlotDefinition::required(PartType::Bolt, MountType::Integrated),
            SlotDefinition::required(PartType::FiringPin, MountType::Integrated),
            SlotDefinition::required(PartType::Trigger, MountType::Integrated),
            SlotDefinition::required(PartType::Magazine, MountType::Proprietary),
            SlotDefinition::optional(PartType::Grip, MountType::Picatinny),
            SlotDefinition::optional(PartType::Stock, MountType::Proprietary),
            SlotDefinition::optional(PartType::Scope, MountType::Picatinny),
            SlotDefinition::optional(PartType::Muzzle, MountType::Universal),
            SlotDefinition::optional(PartType::Rail, MountType::Picatinny).with_max_count(3),
            SlotDefinition::optional(PartType::Laser, MountType::Picatinny),
            SlotDefinition::optional(PartType::Flashlight, MountType::Picatinny),
        ])
    }

    pub fn slot_for(&self, part_type: PartType) -> Option<&SlotDefinition> {
        self.slots.iter().find(|slot| slot.part_type == part_type)
    }

    pub fn accepts_type(&self, part_type: PartType) -> bool {
        self.slot_for(part_type).is_some()
    }

    /// Сумма max_count по всем слотам (верхняя граница AttachedParts)
    pub fn capacity(&self) -> usize {
        self.slots.iter().map(|slot| slot.max_count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Критичные типы, под которые у оружия есть слот
    pub fn critical_types(&self) -> impl Iterator<Item = PartType> + '_ {
        PartType::CRITICAL
            .into_iter()
            .filter(|part_type| self.accepts_type(*part_type))
    }
}

/// Запись attached list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct AttachedPart {
    pub part: Entity,
    pub slot: PartType,
    pub required: bool,
}

/// Части, стоящие на оружии сейчас (порядок = порядок установки)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AttachedParts {
    pub parts: Vec<AttachedPart>,
}

impl AttachedParts {
    pub fn iter(&self) -> impl Iterator<Item = &AttachedPart> {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, part: Entity) -> bool {
        self.parts.iter().any(|entry| entry.part == part)
    }

    pub fn get(&self, part: Entity) -> Option<&AttachedPart> {
        self.parts.iter().find(|entry| entry.part == part)
    }

    pub fn count_of(&self, part_type: PartType) -> usize {
        self.parts.iter().filter(|entry| entry.slot == part_type).count()
    }

    /// Первая (самая старая) часть данного типа
    pub fn first_of(&self, part_type: PartType) -> Option<&AttachedPart> {
        self.parts.iter().find(|entry| entry.slot == part_type)
    }

    pub fn push(&mut self, entry: AttachedPart) {
        self.parts.push(entry);
    }

    pub fn remove(&mut self, part: Entity) -> Option<AttachedPart> {
        let index = self.parts.iter().position(|entry| entry.part == part)?;
        Some(self.parts.remove(index))
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.parts.iter().map(|entry| entry.part)
    }
}
