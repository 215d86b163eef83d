//! Client-side mirrors of the contract's assertions, used only to disable
//! controls preemptively. The contract re-validates every call; if these
//! drift from the deployed balance the only cost is a rejected transaction,
//! which the error path surfaces.

use tamagosui_chain::types::{
    GameBalance,
    Pet,
};

pub fn can_feed(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping
        && (pet.stats.hunger as u64) < balance.max_stat
        && pet.game_data.coins >= balance.feed_coins_cost
}

pub fn can_play(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping
        && pet.stats.energy as u64 >= balance.play_energy_loss
        && pet.stats.hunger as u64 >= balance.play_hunger_loss
}

pub fn can_work(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping
        && pet.stats.energy as u64 >= balance.work_energy_loss
        && pet.stats.happiness as u64 >= balance.work_happiness_loss
        && pet.stats.hunger as u64 >= balance.work_hunger_loss
}

pub fn can_exercise(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping
        && pet.stats.energy as u64 >= balance.exercise_energy_loss
        && pet.stats.hunger as u64 >= balance.exercise_hunger_loss
}

pub fn can_study(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping && pet.stats.energy as u64 >= balance.study_energy_loss
}

pub fn can_rest(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping && (pet.stats.energy as u64) < balance.max_stat
}

pub fn can_level_up(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping
        && pet.game_data.experience >= pet.game_data.level as u64 * balance.exp_per_level
}

pub fn can_evolve(pet: &Pet, balance: &GameBalance) -> bool {
    !pet.is_sleeping && pet.game_data.level as u64 >= balance.evolve_level_requirement
}

pub fn can_combo_care(pet: &Pet, balance: &GameBalance) -> bool {
    can_feed(pet, balance) && can_play(pet, balance)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tamagosui_chain::types::{
        ObjectId,
        Personality,
        PetGameData,
        PetStats,
    };

    fn pet() -> Pet {
        Pet {
            id: ObjectId([1u8; 32]),
            name: "Ron".to_string(),
            image_url: String::new(),
            adopted_at_ms: 0,
            stats: PetStats {
                energy: 60,
                happiness: 50,
                hunger: 40,
            },
            game_data: PetGameData {
                coins: 20,
                experience: 0,
                level: 1,
            },
            personality: Personality::Balanced,
            is_sleeping: false,
        }
    }

    #[test]
    fn sleeping_pet__can_do_nothing_but_wake() {
        let balance = GameBalance::default();
        let mut sleeping = pet();
        sleeping.is_sleeping = true;

        assert!(!can_feed(&sleeping, &balance));
        assert!(!can_play(&sleeping, &balance));
        assert!(!can_work(&sleeping, &balance));
        assert!(!can_exercise(&sleeping, &balance));
        assert!(!can_study(&sleeping, &balance));
        assert!(!can_rest(&sleeping, &balance));
        assert!(!can_level_up(&sleeping, &balance));
        assert!(!can_evolve(&sleeping, &balance));
    }

    #[test]
    fn can_feed__requires_appetite_and_coins() {
        let balance = GameBalance::default();
        let mut p = pet();
        assert!(can_feed(&p, &balance));

        p.stats.hunger = 100;
        assert!(!can_feed(&p, &balance));

        p.stats.hunger = 40;
        p.game_data.coins = balance.feed_coins_cost - 1;
        assert!(!can_feed(&p, &balance));
    }

    #[test]
    fn can_work__needs_all_three_stats() {
        let balance = GameBalance::default();
        let mut p = pet();
        assert!(can_work(&p, &balance));

        p.stats.happiness = (balance.work_happiness_loss - 1) as u8;
        assert!(!can_work(&p, &balance));
    }

    #[test]
    fn can_level_up__uses_level_scaled_threshold() {
        let balance = GameBalance::default();
        let mut p = pet();
        p.game_data.level = 2;
        p.game_data.experience = 2 * balance.exp_per_level - 1;
        assert!(!can_level_up(&p, &balance));
        p.game_data.experience = 2 * balance.exp_per_level;
        assert!(can_level_up(&p, &balance));
    }

    #[test]
    fn can_rest__only_when_energy_below_max() {
        let balance = GameBalance::default();
        let mut p = pet();
        p.stats.energy = 100;
        assert!(!can_rest(&p, &balance));
        p.stats.energy = 99;
        assert!(can_rest(&p, &balance));
    }
}
