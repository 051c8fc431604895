//! Чистка оружия: CleaningRequest → condition оружия/частей, расход набора

use bevy::prelude::*;

use crate::weapons::components::{
    AttachedParts, CleaningKit, ItemCondition, StatsDirty, WeaponPart, WeaponState,
};
use crate::weapons::events::{CleaningFailure, CleaningRequest, CleaningResult};

/// Система: обработка запросов на чистку
///
/// Пустой после использования набор despawn'ится.
pub fn process_cleaning_requests(
    mut commands: Commands,
    mut requests: EventReader<CleaningRequest>,
    mut weapons: Query<(&mut ItemCondition, &mut WeaponState, &AttachedParts)>,
    mut kits: Query<Option<&mut CleaningKit>>,
    mut parts: Query<&mut WeaponPart>,
    mut results: EventWriter<CleaningResult>,
) {
    for request in requests.read() {
        let Ok((mut condition, mut state, attached)) = weapons.get_mut(request.weapon) else {
            crate::logger::log_warning(&format!(
                "Cleaning request void: weapon {:?} not found",
                request.weapon
            ));
            continue;
        };

        let result = match kits.get_mut(request.kit) {
            Err(_) => Err(CleaningFailure::KitNotFound),
            Ok(None) => Err(CleaningFailure::InvalidKit),
            Ok(Some(kit)) if kit.is_empty() => Err(CleaningFailure::KitEmpty),
            Ok(Some(mut kit)) => {
                let restored = condition.restore(kit.condition_restored);
                state.shots_since_cleaning = 0;

                if kit.restores_parts {
                    for part in attached.entities() {
                        if let Ok(mut part) = parts.get_mut(part) {
                            part.restore(kit.part_condition_restored);
                        }
                    }
                }

                kit.uses_remaining -= 1;
                if kit.is_empty() {
                    commands.entity(request.kit).despawn();
                }

                commands.entity(request.weapon).insert(StatsDirty);
                Ok(restored)
            }
        };

        match &result {
            Ok(restored) => crate::logger::log_info(&format!(
                "🧽 Weapon {:?} cleaned: +{:.0}% condition",
                request.weapon,
                restored * 100.0
            )),
            Err(reason) => crate::logger::log(&format!(
                "🧽 Cleaning {:?} failed: {}",
                request.weapon, reason
            )),
        }

        results.write(CleaningResult {
            weapon: request.weapon,
            kit: request.kit,
            result,
        });
    }
}
