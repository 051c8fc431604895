//! Weapon events (requests от collaborators + результаты/сигналы наружу)
//!
//! Все события живут один tick: reader читает их в стадии, где они нужны,
//! непрочитанные не переносятся.

use bevy::prelude::*;
use thiserror::Error;

// ============================================================================
// Attachment
// ============================================================================

/// Причина отказа attach/detach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum PartFailure {
    #[error("part does not fit any slot of this weapon")]
    Incompatible,
    #[error("slot is full")]
    SlotFull,
    #[error("part not found")]
    PartNotFound,
    #[error("part is required and cannot be removed without a replacement")]
    RequiredPart,
}

/// Запрос: поставить часть на оружие
#[derive(Event, Debug, Clone, Copy)]
pub struct PartAttachRequest {
    pub weapon: Entity,
    pub part: Entity,
}

/// Запрос: снять часть (опционально сразу заменить)
#[derive(Event, Debug, Clone, Copy)]
pub struct PartDetachRequest {
    pub weapon: Entity,
    pub part: Entity,
    pub replacement: Option<Entity>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PartAttachResult {
    pub weapon: Entity,
    pub part: Entity,
    pub result: Result<(), PartFailure>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PartDetachResult {
    pub weapon: Entity,
    pub part: Entity,
    pub replacement: Option<Entity>,
    pub result: Result<(), PartFailure>,
}

/// Часть снята с оружия (ownership возвращается inventory)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartReleased {
    pub weapon: Entity,
    pub part: Entity,
}

/// Визуальная модель оружия устарела (для render collaborator)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponModelRefresh {
    pub weapon: Entity,
}

// ============================================================================
// Cleaning
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CleaningFailure {
    #[error("cleaning kit not found")]
    KitNotFound,
    #[error("entity is not a cleaning kit")]
    InvalidKit,
    #[error("cleaning kit is empty")]
    KitEmpty,
}

/// Запрос: почистить оружие набором `kit`
#[derive(Event, Debug, Clone, Copy)]
pub struct CleaningRequest {
    pub weapon: Entity,
    pub kit: Entity,
}

/// Результат чистки: Ok(реально восстановленный condition)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CleaningResult {
    pub weapon: Entity,
    pub kit: Entity,
    pub result: Result<f32, CleaningFailure>,
}

// ============================================================================
// Handling / firing
// ============================================================================

/// Intent: выбрать quick slot (1..=10)
#[derive(Event, Debug, Clone, Copy)]
pub struct WeaponSelectIntent {
    pub wielder: Entity,
    pub slot: u8,
}

/// Успешный выстрел (вход hit resolution)
///
/// Статы захвачены в момент выстрела.
#[derive(Event, Debug, Clone, Copy)]
pub struct WeaponShot {
    pub weapon: Entity,
    pub shooter: Option<Entity>,
    pub origin: Vec3,
    pub direction: Dir3,
    pub damage: f32,
    pub accuracy: f32,
    pub range: f32,
    pub armor_penetration: f32,
}

/// Щелчок пустого магазина
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryFire {
    pub weapon: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponJammed {
    pub weapon: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadStarted {
    pub weapon: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadCompleted {
    pub weapon: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnjamCompleted {
    pub weapon: Entity,
}
