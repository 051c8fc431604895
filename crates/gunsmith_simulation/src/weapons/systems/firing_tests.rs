//! Tests for the firing state machine (semi/burst/auto, dry-fire, jam, wear)

#[cfg(test)]
mod tests {
    use super::super::firing::*;
    use crate::config::WeaponTuning;
    use crate::weapons::components::*;
    use crate::weapons::events::*;
    use crate::weapons::{spawn_weapon, WeaponBlueprint};
    use crate::{create_headless_app, last_tick_events, run_tick, run_ticks, SimulationPlugin, FIXED_TICK_SECS};
    use bevy::prelude::*;
    use rand::rngs::mock::StepRng;

    fn app() -> App {
        let mut app = create_headless_app(3);
        app.add_plugins(SimulationPlugin);
        app
    }

    /// Модульная винтовка без случайных задержек
    fn reliable_rifle() -> WeaponBlueprint {
        let mut blueprint = WeaponBlueprint::modular_rifle();
        blueprint.definition.base_jam_chance = 0.0;
        blueprint
    }

    /// Spawn + сразу в руках (draw завершён), статы посчитаны
    fn spawn_in_hands(app: &mut App, blueprint: WeaponBlueprint) -> Entity {
        let weapon = spawn_weapon(app.world_mut(), blueprint).expect("valid blueprint");
        {
            let mut state = app.world_mut().get_mut::<WeaponState>(weapon).unwrap();
            state.equipped = true;
            state.holstered = false;
            state.draw_progress = 1.0;
        }
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        weapon
    }

    fn control(app: &mut App, weapon: Entity) -> Mut<'_, WeaponControl> {
        app.world_mut().get_mut::<WeaponControl>(weapon).unwrap()
    }

    fn state(app: &App, weapon: Entity) -> WeaponState {
        app.world().get::<WeaponState>(weapon).unwrap().clone()
    }

    /// Тикаем `ticks` раз и считаем выстрелы
    fn count_shots(app: &mut App, ticks: usize) -> usize {
        let mut shots = 0;
        for _ in 0..ticks {
            run_tick(app.world_mut(), FIXED_TICK_SECS);
            shots += last_tick_events::<WeaponShot>(app.world()).len();
        }
        shots
    }

    #[test]
    fn test_wants_to_fire_by_mode() {
        let definition = WeaponDefinition::smg();
        let mut state = WeaponState::new(&definition, 30, 0);
        let pressed = WeaponControl { fire_pressed: true, fire_held: true, ..default() };
        let held = WeaponControl { fire_held: true, ..default() };

        state.fire_mode = FireMode::Safe;
        assert!(!wants_to_fire(&mut state, &pressed, 3));

        state.fire_mode = FireMode::Semi;
        assert!(wants_to_fire(&mut state, &pressed, 3));
        assert!(!wants_to_fire(&mut state, &held, 3));

        state.fire_mode = FireMode::Auto;
        assert!(wants_to_fire(&mut state, &held, 3));

        state.fire_mode = FireMode::Burst;
        state.burst_shots_fired = 2;
        assert!(wants_to_fire(&mut state, &held, 3));
        state.burst_shots_fired = 3;
        assert!(!wants_to_fire(&mut state, &held, 3));
        // Новый press начинает очередь заново
        assert!(wants_to_fire(&mut state, &pressed, 3));
        assert_eq!(state.burst_shots_fired, 0);
    }

    #[test]
    fn test_fouling_penalty_after_threshold() {
        let definition = WeaponDefinition::assault_rifle();
        let tuning = WeaponTuning::default();
        // StepRng(0, 0) → roll всегда 0.0
        let mut rng = StepRng::new(0, 0);

        let mut clean = WeaponState::new(&definition, 30, 0);
        clean.calculated.jam_chance = 0.0;
        clean.shots_since_cleaning = tuning.fouling_shot_threshold;
        assert_eq!(resolve_fire_attempt(&mut clean, &definition, &tuning, &mut rng), FireOutcome::Fired);

        let mut fouled = WeaponState::new(&definition, 30, 0);
        fouled.calculated.jam_chance = 0.0;
        fouled.shots_since_cleaning = tuning.fouling_shot_threshold + 1;
        assert_eq!(resolve_fire_attempt(&mut fouled, &definition, &tuning, &mut rng), FireOutcome::Jammed);
        assert!(fouled.jammed);
        assert_eq!(fouled.magazine_ammo, 30);
    }

    #[test]
    fn test_fire_attempt_bookkeeping() {
        let definition = WeaponDefinition::assault_rifle();
        let tuning = WeaponTuning::default();
        let mut rng = StepRng::new(u64::MAX, 0);

        let mut state = WeaponState::new(&definition, 1, 0);
        state.calculated.jam_chance = 0.0;

        assert_eq!(resolve_fire_attempt(&mut state, &definition, &tuning, &mut rng), FireOutcome::Fired);
        assert_eq!(state.magazine_ammo, 0);
        assert!(!state.chambered);
        assert_eq!(state.shots_since_cleaning, 1);
        assert!((state.fire_cooldown - 0.1).abs() < 1e-6);

        // Пустой магазин: ни cooldown, ни счётчики не меняются
        state.fire_cooldown = 0.0;
        assert_eq!(resolve_fire_attempt(&mut state, &definition, &tuning, &mut rng), FireOutcome::DryFire);
        assert_eq!(state.fire_cooldown, 0.0);
        assert_eq!(state.shots_since_cleaning, 1);
    }

    #[test]
    fn test_semi_fires_once_per_press() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle());

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        let shots = last_tick_events::<WeaponShot>(app.world());
        assert_eq!(shots.len(), 1);
        assert_eq!(state(&app, weapon).magazine_ammo, 29);
        assert!(state(&app, weapon).fire_cooldown > 0.0);

        // Курок зажат, но edge уже сброшен
        assert_eq!(count_shots(&mut app, 30), 0);
        assert_eq!(state(&app, weapon).magazine_ammo, 29);
    }

    #[test]
    fn test_semi_press_during_cooldown_ignored() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle());

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        control(&mut app, weapon).press_trigger();
        assert_eq!(count_shots(&mut app, 1), 0);

        run_ticks(app.world_mut(), 10);
        control(&mut app, weapon).press_trigger();
        assert_eq!(count_shots(&mut app, 1), 1);
        assert_eq!(state(&app, weapon).magazine_ammo, 28);
    }

    #[test]
    fn test_shot_carries_calculated_stats() {
        let mut app = app();
        let blueprint = reliable_rifle().at(Transform::from_xyz(1.0, 2.0, 3.0));
        let weapon = spawn_in_hands(&mut app, blueprint);

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        let shots = last_tick_events::<WeaponShot>(app.world());
        let shot = shots[0];
        let calculated = state(&app, weapon).calculated;
        assert_eq!(shot.weapon, weapon);
        assert_eq!(shot.shooter, None);
        assert_eq!(shot.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(shot.direction, Dir3::NEG_Z);
        assert_eq!(shot.damage, calculated.damage);
        assert_eq!(shot.accuracy, calculated.accuracy);
        assert_eq!(shot.range, calculated.range);
        assert_eq!(shot.armor_penetration, 0.6);
    }

    #[test]
    fn test_auto_respects_fire_rate() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle());
        app.world_mut().get_mut::<WeaponState>(weapon).unwrap().fire_mode = FireMode::Auto;

        control(&mut app, weapon).press_trigger();
        // 600 rpm → 10 выстрелов в секунду
        let shots = count_shots(&mut app, 60);
        assert!((8..=10).contains(&shots), "shots = {}", shots);
        assert_eq!(state(&app, weapon).magazine_ammo, 30 - shots as u32);

        control(&mut app, weapon).release_trigger();
        assert_eq!(count_shots(&mut app, 20), 0);
    }

    #[test]
    fn test_burst_fires_exactly_burst_size() {
        let mut app = app();
        let mut definition = WeaponDefinition::smg();
        definition.base_jam_chance = 0.0;
        let weapon = spawn_in_hands(&mut app, WeaponBlueprint::monolithic(definition));
        assert_eq!(state(&app, weapon).fire_mode, FireMode::Burst);

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        let mut shots = last_tick_events::<WeaponShot>(app.world()).len();
        control(&mut app, weapon).release_trigger();

        shots += count_shots(&mut app, 60);
        assert_eq!(shots, 3);
        assert_eq!(state(&app, weapon).magazine_ammo, 27);
    }

    #[test]
    fn test_burst_stops_on_empty_magazine() {
        let mut app = app();
        let mut definition = WeaponDefinition::smg();
        definition.base_jam_chance = 0.0;
        let weapon = spawn_in_hands(&mut app, WeaponBlueprint::monolithic(definition).with_ammo(2, 0));

        control(&mut app, weapon).press_trigger();
        let shots = count_shots(&mut app, 60);
        assert_eq!(shots, 2);
        assert_eq!(state(&app, weapon).burst_shots_fired, 0);
    }

    #[test]
    fn test_burst_interrupted_by_reload_does_not_resume() {
        let mut app = app();
        let mut definition = WeaponDefinition::smg();
        definition.base_jam_chance = 0.0;
        let weapon = spawn_in_hands(&mut app, WeaponBlueprint::monolithic(definition).with_ammo(30, 60));

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        assert_eq!(last_tick_events::<WeaponShot>(app.world()).len(), 1);
        control(&mut app, weapon).release_trigger();

        // Перезарядка посреди очереди
        control(&mut app, weapon).reload_pressed = true;
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        assert!(state(&app, weapon).reloading);
        assert_eq!(state(&app, weapon).burst_shots_fired, 0);

        // После перезарядки очередь сама не продолжается
        let shots = count_shots(&mut app, 120);
        assert_eq!(shots, 0);
        let after = state(&app, weapon);
        assert!(!after.reloading);
        assert_eq!(after.magazine_ammo, 30);
    }

    #[test]
    fn test_dry_fire_on_empty_magazine() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle().with_ammo(0, 0));

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        assert_eq!(last_tick_events::<DryFire>(app.world()), vec![DryFire { weapon }]);
        assert!(last_tick_events::<WeaponShot>(app.world()).is_empty());

        let state = state(&app, weapon);
        assert_eq!(state.magazine_ammo, 0);
        assert_eq!(state.fire_cooldown, 0.0);
        assert!(!state.reloading);
    }

    #[test]
    fn test_empty_magazine_with_reserve_auto_reloads() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle().with_ammo(0, 90));

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        assert_eq!(last_tick_events::<ReloadStarted>(app.world()), vec![ReloadStarted { weapon }]);
        assert!(last_tick_events::<DryFire>(app.world()).is_empty());
        assert!(state(&app, weapon).reloading);
    }

    #[test]
    fn test_guaranteed_jam() {
        let mut app = app();
        app.world_mut().resource_mut::<WeaponTuning>().max_jam_chance = 1.0;
        let mut blueprint = reliable_rifle();
        blueprint.definition.base_jam_chance = 1.0;
        let weapon = spawn_in_hands(&mut app, blueprint);

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        assert_eq!(last_tick_events::<WeaponJammed>(app.world()), vec![WeaponJammed { weapon }]);
        assert!(last_tick_events::<WeaponShot>(app.world()).is_empty());
        let jammed = state(&app, weapon);
        assert!(jammed.jammed);
        assert_eq!(jammed.magazine_ammo, 30);

        // Заклинило: курок и reload ничего не делают
        control(&mut app, weapon).press_trigger();
        control(&mut app, weapon).reload_pressed = true;
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        assert!(last_tick_events::<WeaponShot>(app.world()).is_empty());
        assert!(last_tick_events::<WeaponJammed>(app.world()).is_empty());
        assert!(!state(&app, weapon).reloading);
    }

    #[test]
    fn test_missing_bolt_always_jams() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle().without_part(PartType::Bolt));
        assert_eq!(state(&app, weapon).calculated.jam_chance, 1.0);

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        assert_eq!(last_tick_events::<WeaponJammed>(app.world()).len(), 1);
        assert_eq!(state(&app, weapon).magazine_ammo, 30);
    }

    #[test]
    fn test_no_fire_while_reloading() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle().with_ammo(10, 90));

        control(&mut app, weapon).reload_pressed = true;
        run_tick(app.world_mut(), FIXED_TICK_SECS);
        assert!(state(&app, weapon).reloading);

        control(&mut app, weapon).press_trigger();
        assert_eq!(count_shots(&mut app, 5), 0);
        assert_eq!(state(&app, weapon).magazine_ammo, 10);
    }

    #[test]
    fn test_holstered_weapon_does_not_fire() {
        let mut app = app();
        let weapon = spawn_weapon(app.world_mut(), reliable_rifle()).expect("valid blueprint");

        control(&mut app, weapon).press_trigger();
        assert_eq!(count_shots(&mut app, 1), 0);
        assert_eq!(state(&app, weapon).magazine_ammo, 30);
    }

    #[test]
    fn test_firing_wears_weapon_and_parts() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle());
        let barrel = app
            .world()
            .get::<AttachedParts>(weapon)
            .unwrap()
            .first_of(PartType::Barrel)
            .unwrap()
            .part;

        control(&mut app, weapon).press_trigger();
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        let condition = app.world().get::<ItemCondition>(weapon).unwrap().condition;
        assert!((condition - (1.0 - 0.0001)).abs() < 1e-6, "condition = {}", condition);
        let part_condition = app.world().get::<WeaponPart>(barrel).unwrap().condition;
        assert!(part_condition < 1.0);
        assert_eq!(state(&app, weapon).shots_since_cleaning, 1);
    }

    #[test]
    fn test_control_edges_cleared_after_tick() {
        let mut app = app();
        let weapon = spawn_in_hands(&mut app, reliable_rifle());

        {
            let mut control = control(&mut app, weapon);
            control.press_trigger();
            control.cycle_fire_mode_pressed = true;
        }
        run_tick(app.world_mut(), FIXED_TICK_SECS);

        let control = *app.world().get::<WeaponControl>(weapon).unwrap();
        assert!(!control.fire_pressed);
        assert!(!control.cycle_fire_mode_pressed);
        assert!(control.fire_held);
    }
}
