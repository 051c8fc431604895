//! Runtime state оружия: equip, ammo, cooldown, reload, jam + рассчитанные статы
//!
//! Три ортогональных под-автомата:
//! - Ready / Firing-cooldown
//! - Reloading
//! - Jammed / Unjamming

use bevy::prelude::*;

use super::definition::{FireMode, WeaponDefinition};

/// Шесть производных статов (пересчитываются stats системой)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CalculatedStats {
    pub accuracy: f32,
    pub recoil: f32,
    pub damage: f32,
    pub range: f32,
    pub jam_chance: f32,
    pub ergonomics: f32,
}

impl CalculatedStats {
    /// Базовые значения definition без condition/parts (до первого пересчёта)
    pub fn from_definition(definition: &WeaponDefinition) -> Self {
        Self {
            accuracy: definition.base_accuracy,
            recoil: definition.base_recoil,
            damage: definition.base_damage,
            range: definition.effective_range,
            jam_chance: definition.base_jam_chance,
            ergonomics: definition.base_ergonomics,
        }
    }
}

/// Runtime state оружия
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WeaponState {
    // === Equip / holster ===
    pub equipped: bool,
    pub holstered: bool,
    /// 0 = в кобуре, 1 = в руках
    pub draw_progress: f32,
    /// Секунды на полный draw/holster
    pub holster_speed: f32,

    // === Fire ===
    pub fire_mode: FireMode,
    pub is_firing: bool,
    pub trigger_held: bool,
    /// ≤ 0 → можно стрелять
    pub fire_cooldown: f32,
    pub time_since_last_shot: f32,
    pub burst_shots_fired: u32,

    // === Ammo ===
    pub magazine_ammo: u32,
    pub reserve_ammo: u32,
    pub chambered: bool,

    // === Reload ===
    pub reloading: bool,
    pub reload_progress: f32,
    pub reload_duration: f32,

    // === Jam ===
    pub jammed: bool,
    pub unjamming: bool,
    pub unjam_progress: f32,
    pub unjam_duration: f32,

    pub shots_since_cleaning: u32,

    pub calculated: CalculatedStats,
}

impl WeaponState {
    /// Начальное состояние (не экипировано, магазин заряжен `magazine_ammo`)
    pub fn new(definition: &WeaponDefinition, magazine_ammo: u32, reserve_ammo: u32) -> Self {
        let magazine_ammo = magazine_ammo.min(definition.magazine_capacity);
        Self {
            equipped: false,
            holstered: false,
            draw_progress: 0.0,
            holster_speed: definition.holster_speed,
            fire_mode: definition.default_fire_mode,
            is_firing: false,
            trigger_held: false,
            fire_cooldown: 0.0,
            time_since_last_shot: 0.0,
            burst_shots_fired: 0,
            magazine_ammo,
            reserve_ammo,
            chambered: magazine_ammo > 0,
            reloading: false,
            reload_progress: 0.0,
            reload_duration: 0.0,
            jammed: false,
            unjamming: false,
            unjam_progress: 0.0,
            unjam_duration: 0.0,
            shots_since_cleaning: 0,
            calculated: CalculatedStats::from_definition(definition),
        }
    }

    /// В руках и готово принимать input
    pub fn is_ready_in_hands(&self) -> bool {
        self.equipped && !self.holstered
    }

    pub fn can_start_reload(&self, magazine_capacity: u32) -> bool {
        !self.reloading
            && !self.jammed
            && self.reserve_ammo > 0
            && self.magazine_ammo < magazine_capacity
    }

    /// Начать перезарядку; false если правила не позволяют
    pub fn start_reload(&mut self, magazine_capacity: u32, base_reload_secs: f32) -> bool {
        if !self.can_start_reload(magazine_capacity) {
            return false;
        }
        self.reloading = true;
        self.reload_progress = 0.0;
        // Прерванная очередь не продолжается после перезарядки
        self.burst_shots_fired = 0;
        // Ergonomics хуже → перезарядка дольше
        self.reload_duration = (base_reload_secs * self.calculated.ergonomics).max(f32::EPSILON);
        true
    }

    /// Завершить перезарядку: патроны из резерва в магазин
    pub fn complete_reload(&mut self, magazine_capacity: u32) {
        let needed = magazine_capacity.saturating_sub(self.magazine_ammo);
        let moved = needed.min(self.reserve_ammo);
        self.magazine_ammo += moved;
        self.reserve_ammo -= moved;
        self.chambered = true;
        self.reloading = false;
        self.reload_progress = 0.0;
    }

    /// Начать устранение задержки; false если не заклинило или уже в процессе
    pub fn start_unjam(&mut self, unjam_secs: f32) -> bool {
        if !self.jammed || self.unjamming {
            return false;
        }
        self.unjamming = true;
        self.unjam_progress = 0.0;
        self.unjam_duration = unjam_secs.max(f32::EPSILON);
        true
    }

    pub fn complete_unjam(&mut self) {
        self.jammed = false;
        self.unjamming = false;
        self.unjam_progress = 0.0;
    }

    /// Перейти в Jammed (прогресс unjam сброшен)
    pub fn jam(&mut self) {
        self.jammed = true;
        self.unjamming = false;
        self.unjam_progress = 0.0;
        self.is_firing = false;
        self.burst_shots_fired = 0;
    }
}

/// Input intent на этот tick (пишет input collaborator)
///
/// `*_pressed`: edge флаги, сбрасываются в конце Firing стадии.
/// `fire_held`: уровень, держится пока collaborator его не снимет.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct WeaponControl {
    pub fire_pressed: bool,
    pub fire_held: bool,
    pub reload_pressed: bool,
    pub unjam_pressed: bool,
    pub cycle_fire_mode_pressed: bool,
}

impl WeaponControl {
    /// Нажать курок (edge + held)
    pub fn press_trigger(&mut self) {
        self.fire_pressed = true;
        self.fire_held = true;
    }

    pub fn release_trigger(&mut self) {
        self.fire_pressed = false;
        self.fire_held = false;
    }

    pub fn clear_edges(&mut self) {
        self.fire_pressed = false;
        self.reload_pressed = false;
        self.unjam_pressed = false;
        self.cycle_fire_mode_pressed = false;
    }
}

/// Маркер: статы надо пересчитать даже если оружие не экипировано
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct StatsDirty;

/// Read-only снимок для HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSnapshot {
    pub equipped: bool,
    pub holstered: bool,
    pub draw_progress: f32,
    pub fire_mode: FireMode,
    pub magazine_ammo: u32,
    pub reserve_ammo: u32,
    pub chambered: bool,
    pub reloading: bool,
    pub reload_progress: f32,
    pub jammed: bool,
    pub unjam_progress: f32,
    pub stats: CalculatedStats,
}

impl WeaponSnapshot {
    pub fn from_state(state: &WeaponState) -> Self {
        Self {
            equipped: state.equipped,
            holstered: state.holstered,
            draw_progress: state.draw_progress,
            fire_mode: state.fire_mode,
            magazine_ammo: state.magazine_ammo,
            reserve_ammo: state.reserve_ammo,
            chambered: state.chambered,
            reloading: state.reloading,
            reload_progress: state.reload_progress,
            jammed: state.jammed,
            unjam_progress: state.unjam_progress,
            stats: state.calculated,
        }
    }
}

impl From<&WeaponState> for WeaponSnapshot {
    fn from(state: &WeaponState) -> Self {
        Self::from_state(state)
    }
}
