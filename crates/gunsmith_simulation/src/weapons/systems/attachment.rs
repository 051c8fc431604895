//! Part attachment manager: attach/detach requests → AttachedParts
//!
//! Правила attach (в этом порядке):
//! 1. part существует → иначе `PartNotFound`
//! 2. есть слот этого типа с подходящим креплением → иначе `Incompatible`
//!    (часть уже стоит на другом оружии → тоже `Incompatible`)
//! 3. count < max_count → ставим
//! 4. max_count == 1 и слот занят → замена (старая часть уходит в inventory)
//! 5. иначе `SlotFull`
//!
//! Detach: required часть снимается только с replacement в том же запросе.

use bevy::prelude::*;

use crate::weapons::components::{
    AttachedPart, AttachedParts, MountType, MountedOn, PartSlots, PartType, StatsDirty, WeaponPart,
};
use crate::weapons::events::{
    PartAttachRequest, PartAttachResult, PartDetachRequest, PartDetachResult, PartFailure,
    PartReleased, WeaponModelRefresh,
};

/// Результат проверки attach: куда ставим и кого вытесняем
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachPlan {
    pub required: bool,
    pub replaces: Option<Entity>,
}

/// Проверка слотов без мутаций (правила 2-5)
pub fn plan_attach(
    slots: &PartSlots,
    attached: &AttachedParts,
    part: Entity,
    part_type: PartType,
    mount: MountType,
) -> Result<AttachPlan, PartFailure> {
    let Some(slot) = slots.slot_for(part_type) else {
        return Err(PartFailure::Incompatible);
    };
    if !slot.accepts_mount(mount) {
        return Err(PartFailure::Incompatible);
    }
    if attached.contains(part) {
        return Err(PartFailure::SlotFull);
    }

    let count = attached.count_of(part_type);
    if count < slot.max_count as usize {
        return Ok(AttachPlan {
            required: slot.required,
            replaces: None,
        });
    }

    if slot.max_count == 1 {
        return Ok(AttachPlan {
            required: slot.required,
            replaces: attached.first_of(part_type).map(|entry| entry.part),
        });
    }

    Err(PartFailure::SlotFull)
}

/// Система: обработка attach запросов
pub fn process_part_attach_requests(
    mut commands: Commands,
    mut requests: EventReader<PartAttachRequest>,
    mut weapons: Query<(&PartSlots, &mut AttachedParts)>,
    mut parts: Query<(&WeaponPart, &mut MountedOn)>,
    mut results: EventWriter<PartAttachResult>,
    mut released: EventWriter<PartReleased>,
    mut refresh: EventWriter<WeaponModelRefresh>,
) {
    for request in requests.read() {
        let Ok((slots, mut attached)) = weapons.get_mut(request.weapon) else {
            crate::logger::log_warning(&format!(
                "Attach request void: weapon {:?} not found",
                request.weapon
            ));
            continue;
        };

        let result = attach_part(
            request.weapon,
            request.part,
            slots,
            &mut attached,
            &mut parts,
            &mut released,
        );

        match result {
            Ok(()) => {
                commands.entity(request.weapon).insert(StatsDirty);
                refresh.write(WeaponModelRefresh { weapon: request.weapon });
                crate::logger::log(&format!(
                    "🔧 Part {:?} attached to {:?}",
                    request.part, request.weapon
                ));
            }
            Err(reason) => {
                crate::logger::log(&format!(
                    "🔧 Attach {:?} → {:?} rejected: {}",
                    request.part, request.weapon, reason
                ));
            }
        }

        results.write(PartAttachResult {
            weapon: request.weapon,
            part: request.part,
            result,
        });
    }
}

/// Система: обработка detach запросов
pub fn process_part_detach_requests(
    mut commands: Commands,
    mut requests: EventReader<PartDetachRequest>,
    mut weapons: Query<(&PartSlots, &mut AttachedParts)>,
    mut parts: Query<(&WeaponPart, &mut MountedOn)>,
    mut results: EventWriter<PartDetachResult>,
    mut released: EventWriter<PartReleased>,
    mut refresh: EventWriter<WeaponModelRefresh>,
) {
    for request in requests.read() {
        let Ok((slots, mut attached)) = weapons.get_mut(request.weapon) else {
            crate::logger::log_warning(&format!(
                "Detach request void: weapon {:?} not found",
                request.weapon
            ));
            continue;
        };

        let result = detach_part(request, slots, &mut attached, &mut parts, &mut released);

        match result {
            Ok(()) => {
                commands.entity(request.weapon).insert(StatsDirty);
                refresh.write(WeaponModelRefresh { weapon: request.weapon });
                crate::logger::log(&format!(
                    "🔧 Part {:?} detached from {:?} (replacement: {:?})",
                    request.part, request.weapon, request.replacement
                ));
            }
            Err(reason) => {
                crate::logger::log(&format!(
                    "🔧 Detach {:?} from {:?} rejected: {}",
                    request.part, request.weapon, reason
                ));
            }
        }

        results.write(PartDetachResult {
            weapon: request.weapon,
            part: request.part,
            replacement: request.replacement,
            result,
        });
    }
}

/// Тип/крепление части + проверка, что она не стоит на чужом оружии
fn lookup_free_part(
    weapon: Entity,
    part: Entity,
    parts: &Query<(&WeaponPart, &mut MountedOn)>,
) -> Result<(PartType, MountType), PartFailure> {
    let Ok((record, mounted)) = parts.get(part) else {
        return Err(PartFailure::PartNotFound);
    };
    if mounted.weapon.is_some_and(|other| other != weapon) {
        return Err(PartFailure::Incompatible);
    }
    Ok((record.part_type, record.mount))
}

fn attach_part(
    weapon: Entity,
    part: Entity,
    slots: &PartSlots,
    attached: &mut AttachedParts,
    parts: &mut Query<(&WeaponPart, &mut MountedOn)>,
    released: &mut EventWriter<PartReleased>,
) -> Result<(), PartFailure> {
    let (part_type, mount) = lookup_free_part(weapon, part, parts)?;
    let plan = plan_attach(slots, attached, part, part_type, mount)?;

    if let Some(old) = plan.replaces {
        attached.remove(old);
        release_part(weapon, old, parts, released);
    }

    attached.push(AttachedPart {
        part,
        slot: part_type,
        required: plan.required,
    });
    mount_part(weapon, part, parts);

    Ok(())
}

fn detach_part(
    request: &PartDetachRequest,
    slots: &PartSlots,
    attached: &mut AttachedParts,
    parts: &mut Query<(&WeaponPart, &mut MountedOn)>,
    released: &mut EventWriter<PartReleased>,
) -> Result<(), PartFailure> {
    let weapon = request.weapon;
    let Some(entry) = attached.get(request.part).copied() else {
        return Err(PartFailure::PartNotFound);
    };

    let Some(replacement) = request.replacement else {
        if entry.required {
            return Err(PartFailure::RequiredPart);
        }
        attached.remove(request.part);
        release_part(weapon, request.part, parts, released);
        return Ok(());
    };

    // Часть уже стоит в этом слоте: заменить саму собой нельзя
    if replacement == request.part {
        return Err(PartFailure::SlotFull);
    }

    // Replacement встаёт в тот же слот: сначала валидируем её на списке без старой части
    let (part_type, mount) = lookup_free_part(weapon, replacement, parts)?;
    if part_type != entry.slot {
        return Err(PartFailure::Incompatible);
    }

    let mut staged = attached.clone();
    staged.remove(request.part);
    let plan = plan_attach(slots, &staged, replacement, part_type, mount)?;

    if let Some(other) = plan.replaces {
        staged.remove(other);
        release_part(weapon, other, parts, released);
    }
    staged.push(AttachedPart {
        part: replacement,
        slot: part_type,
        required: plan.required,
    });
    *attached = staged;

    mount_part(weapon, replacement, parts);
    release_part(weapon, request.part, parts, released);

    Ok(())
}

fn mount_part(weapon: Entity, part: Entity, parts: &mut Query<(&WeaponPart, &mut MountedOn)>) {
    if let Ok((_, mut mounted)) = parts.get_mut(part) {
        mounted.weapon = Some(weapon);
    }
}

/// Часть уходит с оружия (entity могла уже исчезнуть: событие всё равно шлём)
fn release_part(
    weapon: Entity,
    part: Entity,
    parts: &mut Query<(&WeaponPart, &mut MountedOn)>,
    released: &mut EventWriter<PartReleased>,
) {
    if let Ok((_, mut mounted)) = parts.get_mut(part) {
        mounted.weapon = None;
    }
    released.write(PartReleased { weapon, part });
}
