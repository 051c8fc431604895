//! Базовые компоненты живых entity: Health (+ броня)

use bevy::prelude::*;

/// Здоровье + броня цели
///
/// Инвариант: 0 ≤ current ≤ max, 0 ≤ armor ≤ 100.
/// `dead` выставляется один раз damage системой (вместе с маркером `Dead`).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub dead: bool,
    /// Цель игнорирует урон (cutscene, god mode)
    pub invulnerable: bool,
    /// Armor rating [0, 100]
    pub armor: f32,
    /// Запас прочности брони; ≤ 0 → броня уничтожена
    pub armor_durability: f32,
    /// Сумма урона за текущий tick (сбрасывается в начале Damage стадии)
    pub damage_taken_this_tick: f32,
    pub time_since_last_damage: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            dead: false,
            invulnerable: false,
            armor: 0.0,
            armor_durability: 0.0,
            damage_taken_this_tick: 0.0,
            time_since_last_damage: 0.0,
        }
    }

    /// Builder: надеть броню
    pub fn with_armor(mut self, armor: f32, durability: f32) -> Self {
        self.armor = armor.clamp(0.0, 100.0);
        self.armor_durability = durability.max(0.0);
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && self.current > 0.0
    }

    pub fn has_armor(&self) -> bool {
        self.armor > 0.0
    }

    pub fn health_percent(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn heal(&mut self, amount: f32) {
        if self.dead {
            return;
        }
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_defaults() {
        let health = Health::default();
        assert_eq!(health.current, 100.0);
        assert!(health.is_alive());
        assert!(!health.has_armor());
    }

    #[test]
    fn test_armor_clamped() {
        let health = Health::new(80.0).with_armor(150.0, 40.0);
        assert_eq!(health.armor, 100.0);
        assert_eq!(health.armor_durability, 40.0);
    }

    #[test]
    fn test_heal_capped_and_ignored_when_dead() {
        let mut health = Health::new(100.0);
        health.current = 90.0;
        health.heal(50.0);
        assert_eq!(health.current, 100.0);

        health.current = 0.0;
        health.dead = true;
        health.heal(10.0);
        assert_eq!(health.current, 0.0);
    }
}
