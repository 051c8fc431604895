//! Набор для чистки оружия (consumable на отдельной entity)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Качество набора (определяет пресет)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum CleaningKitQuality {
    Basic,
    Standard,
    Advanced,
    Professional,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct CleaningKit {
    pub quality: CleaningKitQuality,
    pub uses_remaining: u32,
    pub max_uses: u32,
    /// Сколько condition оружия возвращает одно использование
    pub condition_restored: f32,
    pub restores_parts: bool,
    pub part_condition_restored: f32,
}

impl CleaningKit {
    /// Пресет по качеству (новый, полный набор)
    pub fn new(quality: CleaningKitQuality) -> Self {
        let (max_uses, condition_restored, part_condition_restored) = match quality {
            CleaningKitQuality::Basic => (5, 0.10, 0.0),
            CleaningKitQuality::Standard => (10, 0.15, 0.0),
            CleaningKitQuality::Advanced => (15, 0.25, 0.10),
            CleaningKitQuality::Professional => (20, 0.40, 0.15),
        };

        Self {
            quality,
            uses_remaining: max_uses,
            max_uses,
            condition_restored,
            restores_parts: part_condition_restored > 0.0,
            part_condition_restored,
        }
    }

    pub fn basic() -> Self {
        Self::new(CleaningKitQuality::Basic)
    }

    pub fn standard() -> Self {
        Self::new(CleaningKitQuality::Standard)
    }

    pub fn advanced() -> Self {
        Self::new(CleaningKitQuality::Advanced)
    }

    pub fn professional() -> Self {
        Self::new(CleaningKitQuality::Professional)
    }

    pub fn with_uses(mut self, uses_remaining: u32) -> Self {
        self.uses_remaining = uses_remaining;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.uses_remaining == 0
    }
}
