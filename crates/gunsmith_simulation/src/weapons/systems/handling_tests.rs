//! Tests for weapon handling (select/holster, fire mode, reload, unjam)

#[cfg(test)]
mod tests {
    use crate::components::{EquippedWeapon, QuickSlots, WieldedBy};
    use crate::weapons::components::*;
    use crate::weapons::events::*;
    use crate::weapons::{spawn_weapon, WeaponBlueprint};
    use crate::{create_headless_app, last_tick_events, run_tick, run_ticks, SimulationPlugin, FIXED_TICK_SECS};
    use bevy::prelude::*;

    struct Armory {
        app: App,
        wielder: Entity,
        rifle: Entity,
        pistol: Entity,
    }

    /// Владелец с винтовкой в слоте 1 и пистолетом в слоте 2
    fn armory() -> Armory {
        let mut app = create_headless_app(5);
        app.add_plugins(SimulationPlugin);

        let mut rifle = WeaponBlueprint::modular_rifle().with_ammo(10, 90);
        rifle.definition.base_jam_chance = 0.0;
        let rifle = spawn_weapon(app.world_mut(), rifle).expect("valid blueprint");
        let pistol = spawn_weapon(app.world_mut(), WeaponBlueprint::monolithic(WeaponDefinition::pistol()))
            .expect("valid blueprint");

        let wielder = app
            .world_mut()
            .spawn(QuickSlots::default().with_weapon(1, rifle).with_weapon(2, pistol))
            .id();

        Armory { app, wielder, rifle, pistol }
    }

    impl Armory {
        fn select(&mut self, slot: u8) {
            self.app.world_mut().send_event(WeaponSelectIntent { wielder: self.wielder, slot });
            run_tick(self.app.world_mut(), FIXED_TICK_SECS);
        }

        fn state(&self, weapon: Entity) -> WeaponState {
            self.app.world().get::<WeaponState>(weapon).unwrap().clone()
        }

        fn equipped(&self) -> EquippedWeapon {
            *self.app.world().get::<EquippedWeapon>(self.wielder).unwrap()
        }

        fn control(&mut self, weapon: Entity) -> Mut<'_, WeaponControl> {
            self.app.world_mut().get_mut::<WeaponControl>(weapon).unwrap()
        }

        fn ticks(&mut self, count: usize) {
            run_ticks(self.app.world_mut(), count);
        }

        /// Достать винтовку и дождаться конца draw
        fn draw_rifle(&mut self) {
            self.select(1);
            self.ticks(30);
        }
    }

    #[test]
    fn test_select_equips_weapon() {
        let mut armory = armory();
        armory.select(1);

        let state = armory.state(armory.rifle);
        assert!(state.equipped);
        assert!(!state.holstered);
        assert!(state.draw_progress > 0.0 && state.draw_progress < 1.0);
        // holster speed = ergonomics
        assert!((state.holster_speed - 0.35).abs() < 1e-5);

        assert_eq!(armory.equipped(), EquippedWeapon { weapon: Some(armory.rifle), slot: Some(1) });
        assert_eq!(
            armory.app.world().get::<WieldedBy>(armory.rifle),
            Some(&WieldedBy(armory.wielder))
        );
    }

    #[test]
    fn test_draw_completes_after_holster_speed() {
        let mut armory = armory();
        armory.select(1);

        // 0.35s ≈ 21 tick
        armory.ticks(15);
        assert!(armory.state(armory.rifle).draw_progress < 1.0);
        armory.ticks(10);
        assert_eq!(armory.state(armory.rifle).draw_progress, 1.0);
    }

    #[test]
    fn test_same_slot_toggles_holster() {
        let mut armory = armory();
        armory.draw_rifle();

        armory.select(1);
        assert!(armory.state(armory.rifle).holstered);
        assert!(armory.state(armory.rifle).equipped);

        armory.ticks(30);
        let holstered = armory.state(armory.rifle);
        assert!(!holstered.equipped);
        assert_eq!(holstered.draw_progress, 0.0);

        // Снова тот же слот → достаём
        armory.select(1);
        let drawing = armory.state(armory.rifle);
        assert!(drawing.equipped);
        assert!(!drawing.holstered);
        assert!(drawing.draw_progress > 0.0);
    }

    #[test]
    fn test_swap_weapons() {
        let mut armory = armory();
        armory.draw_rifle();

        armory.select(2);
        assert!(armory.state(armory.rifle).holstered);

        let pistol = armory.state(armory.pistol);
        assert!(pistol.equipped);
        assert!(!pistol.holstered);
        assert!(pistol.draw_progress < 1.0);
        assert!((pistol.holster_speed - 0.2).abs() < 1e-5);
        assert_eq!(armory.equipped(), EquippedWeapon { weapon: Some(armory.pistol), slot: Some(2) });

        armory.ticks(30);
        assert!(!armory.state(armory.rifle).equipped);
        assert_eq!(armory.state(armory.pistol).draw_progress, 1.0);
    }

    #[test]
    fn test_empty_slot_holsters_current() {
        let mut armory = armory();
        armory.draw_rifle();

        armory.select(5);
        assert!(armory.state(armory.rifle).holstered);
        assert_eq!(armory.equipped().weapon, Some(armory.rifle));
    }

    #[test]
    fn test_invalid_slot_ignored() {
        let mut armory = armory();
        armory.draw_rifle();
        let before = armory.state(armory.rifle);

        armory.select(0);
        armory.select(11);
        let after = armory.state(armory.rifle);
        assert_eq!(after.equipped, before.equipped);
        assert_eq!(after.holstered, before.holstered);
        assert_eq!(armory.equipped().slot, Some(1));
    }

    #[test]
    fn test_shot_attributed_to_wielder() {
        let mut armory = armory();
        armory.draw_rifle();

        let rifle = armory.rifle;
        armory.control(rifle).press_trigger();
        armory.ticks(1);

        let shots = last_tick_events::<WeaponShot>(armory.app.world());
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].shooter, Some(armory.wielder));
    }

    #[test]
    fn test_cycle_fire_modes() {
        let mut armory = armory();
        armory.draw_rifle();
        let rifle = armory.rifle;

        let mut seen = Vec::new();
        for _ in 0..3 {
            armory.control(rifle).cycle_fire_mode_pressed = true;
            armory.ticks(1);
            seen.push(armory.state(rifle).fire_mode);
        }
        // Semi → Auto → Safe → Semi (Burst у винтовки нет)
        assert_eq!(seen, vec![FireMode::Auto, FireMode::Safe, FireMode::Semi]);
    }

    #[test]
    fn test_safe_mode_never_fires() {
        let mut armory = armory();
        armory.draw_rifle();
        let rifle = armory.rifle;
        armory.app.world_mut().get_mut::<WeaponState>(rifle).unwrap().fire_mode = FireMode::Safe;

        armory.control(rifle).press_trigger();
        armory.ticks(1);
        assert!(last_tick_events::<WeaponShot>(armory.app.world()).is_empty());
        assert_eq!(armory.state(rifle).magazine_ammo, 10);
    }

    #[test]
    fn test_cycle_ignored_when_holstered() {
        let mut armory = armory();
        let rifle = armory.rifle;

        armory.control(rifle).cycle_fire_mode_pressed = true;
        armory.ticks(1);
        assert_eq!(armory.state(rifle).fire_mode, FireMode::Semi);
    }

    #[test]
    fn test_reload_timing() {
        let mut armory = armory();
        armory.draw_rifle();
        let rifle = armory.rifle;

        armory.control(rifle).reload_pressed = true;
        armory.ticks(1);
        assert_eq!(
            last_tick_events::<ReloadStarted>(armory.app.world()),
            vec![ReloadStarted { weapon: rifle }]
        );
        // 2.5 × 0.35 = 0.875s
        let state = armory.state(rifle);
        assert!(state.reloading);
        assert!((state.reload_duration - 0.875).abs() < 1e-5);

        armory.ticks(50);
        assert!(armory.state(rifle).reloading);
        assert_eq!(armory.state(rifle).magazine_ammo, 10);

        let mut completed = 0;
        for _ in 0..5 {
            armory.ticks(1);
            completed += last_tick_events::<ReloadCompleted>(armory.app.world()).len();
        }
        assert_eq!(completed, 1);

        let state = armory.state(rifle);
        assert!(!state.reloading);
        assert_eq!(state.magazine_ammo, 30);
        assert_eq!(state.reserve_ammo, 70);
        assert!(state.chambered);
    }

    #[test]
    fn test_reload_limited_by_reserve() {
        let mut state = WeaponState::new(&WeaponDefinition::assault_rifle(), 0, 5);
        assert!(state.start_reload(30, 2.5));
        state.complete_reload(30);
        assert_eq!(state.magazine_ammo, 5);
        assert_eq!(state.reserve_ammo, 0);
    }

    #[test]
    fn test_reload_rejected_with_full_magazine() {
        let mut armory = armory();
        armory.draw_rifle();
        let rifle = armory.rifle;
        armory.app.world_mut().get_mut::<WeaponState>(rifle).unwrap().magazine_ammo = 30;

        armory.control(rifle).reload_pressed = true;
        armory.ticks(1);
        assert!(last_tick_events::<ReloadStarted>(armory.app.world()).is_empty());
        assert!(!armory.state(rifle).reloading);
    }

    #[test]
    fn test_unjam_timing() {
        let mut armory = armory();
        armory.draw_rifle();
        let rifle = armory.rifle;
        armory.app.world_mut().get_mut::<WeaponState>(rifle).unwrap().jam();

        armory.control(rifle).unjam_pressed = true;
        armory.ticks(1);
        let state = armory.state(rifle);
        assert!(state.unjamming);
        assert!(state.jammed);

        // 2.0s = 120 tick
        armory.ticks(110);
        assert!(armory.state(rifle).jammed);

        let mut completed = 0;
        for _ in 0..15 {
            armory.ticks(1);
            completed += last_tick_events::<UnjamCompleted>(armory.app.world()).len();
        }
        assert_eq!(completed, 1);
        let state = armory.state(rifle);
        assert!(!state.jammed);
        assert!(!state.unjamming);
    }

    #[test]
    fn test_unjam_requires_jam() {
        let mut armory = armory();
        armory.draw_rifle();
        let rifle = armory.rifle;

        armory.control(rifle).unjam_pressed = true;
        armory.ticks(1);
        assert!(!armory.state(rifle).unjamming);
        assert!(last_tick_events::<UnjamCompleted>(armory.app.world()).is_empty());
    }

    #[test]
    fn test_select_without_quick_slots_is_void() {
        let mut armory = armory();
        let stranger = armory.app.world_mut().spawn_empty().id();

        armory.app.world_mut().send_event(WeaponSelectIntent { wielder: stranger, slot: 1 });
        armory.ticks(1);
        assert!(!armory.state(armory.rifle).equipped);
    }
}
