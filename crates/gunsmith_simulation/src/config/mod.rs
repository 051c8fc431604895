//! Tuning: глобальные константы оружейной симуляции
//!
//! Дефолты захардкожены в `WeaponTuning::default()`,
//! override из RON (`WeaponTuning::from_ron_str` / `WeaponTuning::load`).
//! Per-weapon числа живут в `WeaponDefinition`, здесь только общие правила.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Ошибка загрузки tuning файла
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Общие правила стрельбы, износа и брони
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Базовое время перезарядки (секунды), умножается на ergonomics
    pub reload_base_secs: f32,
    /// Время устранения задержки (секунды)
    pub unjam_secs: f32,
    /// Сколько выстрелов без чистки до штрафа к jam chance
    pub fouling_shot_threshold: u32,
    /// Штраф к jam chance после порога
    pub fouling_jam_penalty: f32,
    /// Потолок рассчитанного jam chance (кроме missing critical part)
    pub max_jam_chance: f32,
    /// Condition ниже этого значения начинает добавлять jam chance
    pub condition_jam_knee: f32,
    /// Вес штрафа: (knee - condition) × weight
    pub condition_jam_weight: f32,
    /// Spread при accuracy = 0 (градусы)
    pub max_spread_degrees: f32,
    /// Spread при accuracy = 1 (градусы)
    pub min_spread_degrees: f32,
    /// Какая доля входящего урона идёт в armor durability
    pub armor_wear_factor: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            reload_base_secs: 2.5,
            unjam_secs: 2.0,
            fouling_shot_threshold: 500,
            fouling_jam_penalty: 0.01,
            max_jam_chance: 0.95,
            condition_jam_knee: 0.7,
            condition_jam_weight: 0.1,
            max_spread_degrees: 10.0,
            min_spread_degrees: 0.5,
            armor_wear_factor: 0.1,
        }
    }
}

impl WeaponTuning {
    /// Parse из RON строки (отсутствующие поля = дефолт)
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: Self = ron::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Загрузить из файла
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Загрузить или откатиться на дефолт (с warning в лог)
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(err) => {
                crate::logger::log_warning(&format!(
                    "Tuning {:?} not loaded ({}), using defaults",
                    path.as_ref(),
                    err
                ));
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reload_base_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "reload_base_secs",
                reason: "must be positive",
            });
        }
        if self.unjam_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "unjam_secs",
                reason: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.max_jam_chance) {
            return Err(ConfigError::Invalid {
                field: "max_jam_chance",
                reason: "must be within [0, 1]",
            });
        }
        if self.min_spread_degrees < 0.0 || self.max_spread_degrees < self.min_spread_degrees {
            return Err(ConfigError::Invalid {
                field: "max_spread_degrees",
                reason: "spread range must satisfy 0 <= min <= max",
            });
        }
        // tan() конуса разброса уходит в бесконечность на 90°
        if self.max_spread_degrees >= 90.0 {
            return Err(ConfigError::Invalid {
                field: "max_spread_degrees",
                reason: "must be below 90 degrees",
            });
        }
        if self.armor_wear_factor < 0.0 {
            return Err(ConfigError::Invalid {
                field: "armor_wear_factor",
                reason: "must not be negative",
            });
        }
        if self.fouling_jam_penalty < 0.0 {
            return Err(ConfigError::Invalid {
                field: "fouling_jam_penalty",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
