//! WeaponDefinition: статические параметры оружия (immutable после spawn)
//!
//! Все runtime изменения живут в `WeaponState` / `ItemCondition`,
//! definition только читается (stats aggregation, firing, hit resolution).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Класс оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum WeaponClass {
    Pistol,
    Smg,
    AssaultRifle,
    SniperRifle,
    Shotgun,
}

/// Режим огня
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum FireMode {
    /// Предохранитель: никогда не стреляет
    Safe,
    /// Один выстрел на press edge
    Semi,
    /// Очередь `burst_size` выстрелов на press edge
    Burst,
    /// Огонь пока зажат курок
    Auto,
    /// Как Semi (ручная перезарядка затвора пока не моделируется)
    BoltAction,
}

impl FireMode {
    /// Порядок переключения режимов
    pub const CYCLE: [FireMode; 5] = [
        FireMode::Safe,
        FireMode::Semi,
        FireMode::Burst,
        FireMode::Auto,
        FireMode::BoltAction,
    ];

    fn bit(self) -> u8 {
        match self {
            FireMode::Safe => 1 << 0,
            FireMode::Semi => 1 << 1,
            FireMode::Burst => 1 << 2,
            FireMode::Auto => 1 << 3,
            FireMode::BoltAction => 1 << 4,
        }
    }

    fn cycle_index(self) -> usize {
        Self::CYCLE
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or(0)
    }
}

/// Bitset поддерживаемых режимов огня
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct FireModes(u8);

impl FireModes {
    pub const NONE: FireModes = FireModes(0);

    pub fn from_modes(modes: &[FireMode]) -> Self {
        modes
            .iter()
            .fold(Self::NONE, |acc, mode| acc.with(*mode))
    }

    pub fn with(self, mode: FireMode) -> Self {
        Self(self.0 | mode.bit())
    }

    pub fn contains(self, mode: FireMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = FireMode> {
        FireMode::CYCLE
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }

    /// Следующий поддерживаемый режим после `current` (по кругу).
    ///
    /// Если поддерживается только `current` (или ничего): возвращает `current`.
    pub fn next_after(self, current: FireMode) -> FireMode {
        let start = current.cycle_index();
        (1..=FireMode::CYCLE.len())
            .map(|offset| FireMode::CYCLE[(start + offset) % FireMode::CYCLE.len()])
            .find(|mode| self.contains(*mode))
            .unwrap_or(current)
    }
}

/// Статические параметры оружия
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct WeaponDefinition {
    pub name: String,
    pub class: WeaponClass,

    // === Damage ===
    pub base_damage: f32,
    /// Доля брони, которую игнорирует выстрел [0, 1]
    pub armor_penetration: f32,

    // === Fire ===
    /// Rounds per minute
    pub fire_rate_rpm: f32,
    pub fire_modes: FireModes,
    pub default_fire_mode: FireMode,
    pub burst_size: u32,

    // === Ammo ===
    pub magazine_capacity: u32,

    // === Handling ===
    /// [0, 1]
    pub base_accuracy: f32,
    /// ≥ 0, unitless multiplier
    pub base_recoil: f32,
    /// Время прицеливания/множитель перезарядки (меньше = лучше)
    pub base_ergonomics: f32,
    /// Время draw/holster (секунды), пока ergonomics не посчитан
    pub holster_speed: f32,

    // === Range (метры) ===
    pub effective_range: f32,
    pub max_range: f32,

    // === Reliability ===
    /// [0, 1]
    pub base_jam_chance: f32,
    /// Потеря condition за выстрел
    pub degradation_per_shot: f32,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self::assault_rifle()
    }
}

impl WeaponDefinition {
    /// AK-подобная штурмовая винтовка (Semi/Auto, 30 патронов)
    pub fn assault_rifle() -> Self {
        Self {
            name: "AK-74".to_string(),
            class: WeaponClass::AssaultRifle,
            base_damage: 45.0,
            armor_penetration: 0.6,
            fire_rate_rpm: 600.0,
            fire_modes: FireModes::from_modes(&[FireMode::Safe, FireMode::Semi, FireMode::Auto]),
            default_fire_mode: FireMode::Semi,
            burst_size: 3,
            magazine_capacity: 30,
            base_accuracy: 0.75,
            base_recoil: 1.2,
            base_ergonomics: 0.35,
            holster_speed: 0.35,
            effective_range: 300.0,
            max_range: 800.0,
            base_jam_chance: 0.01,
            degradation_per_shot: 0.0001,
        }
    }

    /// Пистолет (Semi only)
    pub fn pistol() -> Self {
        Self {
            name: "PM".to_string(),
            class: WeaponClass::Pistol,
            base_damage: 28.0,
            armor_penetration: 0.2,
            fire_rate_rpm: 400.0,
            fire_modes: FireModes::from_modes(&[FireMode::Safe, FireMode::Semi]),
            default_fire_mode: FireMode::Semi,
            burst_size: 3,
            magazine_capacity: 8,
            base_accuracy: 0.65,
            base_recoil: 0.8,
            base_ergonomics: 0.2,
            holster_speed: 0.2,
            effective_range: 50.0,
            max_range: 150.0,
            base_jam_chance: 0.005,
            degradation_per_shot: 0.0002,
        }
    }

    /// Пистолет-пулемёт (Semi/Burst/Auto)
    pub fn smg() -> Self {
        Self {
            name: "MP5".to_string(),
            class: WeaponClass::Smg,
            base_damage: 30.0,
            armor_penetration: 0.3,
            fire_rate_rpm: 800.0,
            fire_modes: FireModes::from_modes(&[
                FireMode::Safe,
                FireMode::Semi,
                FireMode::Burst,
                FireMode::Auto,
            ]),
            default_fire_mode: FireMode::Burst,
            burst_size: 3,
            magazine_capacity: 30,
            base_accuracy: 0.7,
            base_recoil: 0.9,
            base_ergonomics: 0.25,
            holster_speed: 0.25,
            effective_range: 100.0,
            max_range: 250.0,
            base_jam_chance: 0.008,
            degradation_per_shot: 0.00015,
        }
    }

    /// Секунды между выстрелами
    pub fn fire_interval_secs(&self) -> f32 {
        60.0 / self.fire_rate_rpm.max(f32::EPSILON)
    }
}

/// Состояние оружия как предмета (condition)
///
/// Инвариант: 0 ≤ condition ≤ max_condition ≤ 1
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ItemCondition {
    pub condition: f32,
    pub max_condition: f32,
}

impl Default for ItemCondition {
    fn default() -> Self {
        Self::pristine()
    }
}

impl ItemCondition {
    pub fn pristine() -> Self {
        Self {
            condition: 1.0,
            max_condition: 1.0,
        }
    }

    pub fn new(condition: f32) -> Self {
        Self {
            condition: condition.clamp(0.0, 1.0),
            max_condition: 1.0,
        }
    }

    /// Износ (clamp в 0)
    pub fn degrade(&mut self, amount: f32) {
        self.condition = (self.condition - amount.max(0.0)).max(0.0);
    }

    /// Восстановление (clamp в max_condition), возвращает реально восстановленное
    pub fn restore(&mut self, amount: f32) -> f32 {
        let before = self.condition;
        self.condition = (self.condition + amount.max(0.0)).min(self.max_condition.clamp(0.0, 1.0));
        (self.condition - before).max(0.0)
    }
}
