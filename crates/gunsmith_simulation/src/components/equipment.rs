//! Quick slots и связь оружие ↔ владелец
//!
//! **QuickSlots**: 10 слотов (hotkeys 1-0) на владельце. Inventory collaborator
//! кладёт туда weapon entity; select intent выбирает активный.
//!
//! **EquippedWeapon**: какое оружие сейчас в руках (required компонент QuickSlots).
//!
//! **WieldedBy**: на оружии: кто стреляет (attacker для DamageEvent, self-hit фильтр).

use bevy::prelude::*;

pub const QUICK_SLOT_COUNT: usize = 10;

/// Quick slots владельца (slot 1..=10 → index 0..=9)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(EquippedWeapon)]
pub struct QuickSlots {
    pub slots: [Option<Entity>; QUICK_SLOT_COUNT],
}

impl QuickSlots {
    /// Положить оружие в слот (1-based, как на клавиатуре)
    pub fn with_weapon(mut self, slot: u8, weapon: Entity) -> Self {
        self.assign(slot, Some(weapon));
        self
    }

    pub fn assign(&mut self, slot: u8, weapon: Option<Entity>) {
        if let Some(index) = Self::slot_index(slot) {
            self.slots[index] = weapon;
        }
    }

    /// Weapon в слоте (None для пустого или невалидного индекса)
    pub fn get(&self, slot: u8) -> Option<Entity> {
        Self::slot_index(slot).and_then(|index| self.slots[index])
    }

    fn slot_index(slot: u8) -> Option<usize> {
        let slot = slot as usize;
        (1..=QUICK_SLOT_COUNT).contains(&slot).then(|| slot - 1)
    }
}

/// Активное оружие владельца
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct EquippedWeapon {
    pub weapon: Option<Entity>,
    pub slot: Option<u8>,
}

/// Оружие в руках у `0`
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct WieldedBy(pub Entity);
