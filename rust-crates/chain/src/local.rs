use crate::{
    events::{
        ChainEvent,
        EventKind,
    },
    ledger::{
        Ledger,
        LedgerError,
        TxStatus,
    },
    tx::{
        Call,
        CallArg,
        EntryPoint,
        SignedTransaction,
    },
    types::{
        Accessory,
        AccessoryKind,
        AccessoryListing,
        Address,
        GameBalance,
        ObjectId,
        Pet,
        PetGameData,
        PetListing,
        PetStats,
        Personality,
        TxDigest,
    },
};
use chrono::Utc;
use sha2::{
    Digest,
    Sha256,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
};
use tokio::sync::watch;

// Abort strings reported by the contract on failed assertions. These are the
// messages the client surfaces verbatim to the user.
pub const E_ALREADY_ADOPTED: &str = "E_ALREADY_ADOPTED";
pub const E_NO_PET: &str = "E_NO_PET";
pub const E_NOT_PET_OWNER: &str = "E_NOT_PET_OWNER";
pub const E_PET_IS_ASLEEP: &str = "E_PET_IS_ASLEEP";
pub const E_PET_IS_AWAKE: &str = "E_PET_IS_AWAKE";
pub const E_PET_NOT_HUNGRY: &str = "E_PET_NOT_HUNGRY";
pub const E_PET_TOO_HUNGRY: &str = "E_PET_TOO_HUNGRY";
pub const E_PET_TOO_TIRED: &str = "E_PET_TOO_TIRED";
pub const E_PET_UNHAPPY: &str = "E_PET_UNHAPPY";
pub const E_NOT_ENOUGH_COINS: &str = "E_NOT_ENOUGH_COINS";
pub const E_ENERGY_FULL: &str = "E_ENERGY_FULL";
pub const E_NOT_ENOUGH_EXP: &str = "E_NOT_ENOUGH_EXP";
pub const E_LEVEL_TOO_LOW: &str = "E_LEVEL_TOO_LOW";
pub const E_ITEM_NOT_OWNED: &str = "E_ITEM_NOT_OWNED";
pub const E_SLOT_OCCUPIED: &str = "E_SLOT_OCCUPIED";
pub const E_SLOT_EMPTY: &str = "E_SLOT_EMPTY";
pub const E_LISTING_NOT_FOUND: &str = "E_LISTING_NOT_FOUND";
pub const E_LISTING_INACTIVE: &str = "E_LISTING_INACTIVE";
pub const E_NOT_SELLER: &str = "E_NOT_SELLER";
pub const E_WRONG_PAYMENT: &str = "E_WRONG_PAYMENT";
pub const E_INSUFFICIENT_GAS: &str = "E_INSUFFICIENT_GAS";
pub const E_INVALID_KIND: &str = "E_INVALID_KIND";
pub const E_INVALID_ARGS: &str = "E_INVALID_ARGS";

/// The mutable on-chain world. Cloned wholesale before a transaction runs so
/// a failing call sequence rolls back atomically.
#[derive(Clone, Default)]
struct World {
    gas: HashMap<Address, u64>,
    pets: HashMap<Address, Pet>,
    sleeping_since: HashMap<ObjectId, u64>,
    accessories: HashMap<Address, Vec<Accessory>>,
    equipped: HashMap<ObjectId, Vec<(AccessoryKind, Accessory)>>,
    pet_listings: HashMap<ObjectId, PetListing>,
    accessory_listings: HashMap<ObjectId, AccessoryListing>,
    events: Vec<ChainEvent>,
}

#[derive(Clone, Copy)]
enum ClockSource {
    System,
    Manual(u64),
}

impl ClockSource {
    fn now_ms(&self) -> u64 {
        match self {
            ClockSource::System => Utc::now().timestamp_millis().max(0) as u64,
            ClockSource::Manual(ms) => *ms,
        }
    }
}

struct LedgerState {
    balance: GameBalance,
    clock: ClockSource,
    world: World,
    statuses: HashMap<TxDigest, TxStatus>,
    held: bool,
    fail_next: Option<String>,
    submissions: u64,
}

/// An in-process ledger executing the Tamagosui contract rules. Backs the
/// `--local` network target and the integration tests: transactions execute
/// synchronously at submit time, and confirmations can be held back or forced
/// to fail to exercise the client's error paths.
#[derive(Clone)]
pub struct LocalLedger {
    state: Arc<Mutex<LedgerState>>,
    release: Arc<watch::Sender<u64>>,
}

impl LocalLedger {
    pub fn new() -> Self {
        Self::with_clock(ClockSource::System)
    }

    /// A ledger whose clock only moves via [`advance_time`](Self::advance_time).
    pub fn with_manual_clock(start_ms: u64) -> Self {
        Self::with_clock(ClockSource::Manual(start_ms))
    }

    fn with_clock(clock: ClockSource) -> Self {
        let (release, _) = watch::channel(0u64);
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                balance: GameBalance::default(),
                clock,
                world: World::default(),
                statuses: HashMap::new(),
                held: false,
                fail_next: None,
                submissions: 0,
            })),
            release: Arc::new(release),
        }
    }

    pub fn set_balance(&self, balance: GameBalance) {
        self.state.lock().unwrap().balance = balance;
    }

    /// Credit gas to an address, the local stand-in for a faucet.
    pub fn faucet(&self, address: Address, amount: u64) {
        let mut state = self.state.lock().unwrap();
        *state.world.gas.entry(address).or_insert(0) += amount;
    }

    pub fn gas_balance(&self, address: &Address) -> u64 {
        self.state
            .lock()
            .unwrap()
            .world
            .gas
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    pub fn now_ms(&self) -> u64 {
        self.state.lock().unwrap().clock.now_ms()
    }

    /// Advance the manual clock. Has no effect on a system-clock ledger.
    pub fn advance_time(&self, ms: u64) {
        let mut state = self.state.lock().unwrap();
        if let ClockSource::Manual(current) = state.clock {
            state.clock = ClockSource::Manual(current + ms);
        }
    }

    /// Hold all confirmations: `wait_for_confirmation` blocks until
    /// [`release_confirmations`](Self::release_confirmations).
    pub fn hold_confirmations(&self) {
        self.state.lock().unwrap().held = true;
    }

    pub fn release_confirmations(&self) {
        self.state.lock().unwrap().held = false;
        self.release.send_modify(|epoch| *epoch += 1);
    }

    /// Make the next submitted transaction fail with the given contract
    /// error, without touching state.
    pub fn fail_next_with(&self, error: impl Into<String>) {
        self.state.lock().unwrap().fail_next = Some(error.into());
    }

    pub fn submission_count(&self) -> u64 {
        self.state.lock().unwrap().submissions
    }

    pub fn emitted_events(&self) -> Vec<ChainEvent> {
        self.state.lock().unwrap().world.events.clone()
    }

    fn execute_signed(&self, signed: &SignedTransaction) -> (TxDigest, TxStatus) {
        let mut state = self.state.lock().unwrap();
        state.submissions += 1;
        let digest = digest_for(state.submissions, &signed.sender);
        let now = state.clock.now_ms();
        let balance = state.balance.clone();
        let status = if let Some(error) = state.fail_next.take() {
            TxStatus::Failure { error }
        } else {
            let snapshot = state.world.clone();
            match execute_calls(
                &mut state.world,
                &balance,
                now,
                &signed.sender,
                &signed.tx.calls,
            ) {
                Ok(()) => TxStatus::Success,
                Err(error) => {
                    state.world = snapshot;
                    TxStatus::Failure { error }
                }
            }
        };
        state.statuses.insert(digest, status.clone());
        (digest, status)
    }
}

impl Default for LocalLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for LocalLedger {
    async fn submit(&self, tx: SignedTransaction) -> Result<TxDigest, LedgerError> {
        let (digest, status) = self.execute_signed(&tx);
        tracing::debug!(%digest, ?status, calls = tx.tx.calls.len(), "executed transaction");
        Ok(digest)
    }

    async fn wait_for_confirmation(
        &self,
        digest: &TxDigest,
    ) -> Result<TxStatus, LedgerError> {
        let mut release = self.release.subscribe();
        loop {
            {
                let state = self.state.lock().unwrap();
                if !state.held {
                    return state
                        .statuses
                        .get(digest)
                        .cloned()
                        .ok_or(LedgerError::UnknownDigest(*digest));
                }
            }
            release
                .changed()
                .await
                .map_err(|_| LedgerError::Transport("confirmation gate closed".into()))?;
        }
    }

    async fn owned_pet(&self, owner: &Address) -> Result<Option<Pet>, LedgerError> {
        Ok(self.state.lock().unwrap().world.pets.get(owner).cloned())
    }

    async fn owned_accessories(
        &self,
        owner: &Address,
    ) -> Result<Vec<Accessory>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .world
            .accessories
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn equipped_accessories(
        &self,
        pet: &ObjectId,
    ) -> Result<Vec<(AccessoryKind, Accessory)>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .world
            .equipped
            .get(pet)
            .cloned()
            .unwrap_or_default())
    }

    async fn game_balance(&self) -> Result<GameBalance, LedgerError> {
        Ok(self.state.lock().unwrap().balance.clone())
    }

    async fn query_events(
        &self,
        kind: EventKind,
        limit: usize,
    ) -> Result<Vec<ChainEvent>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .world
            .events
            .iter()
            .rev()
            .filter(|event| event.kind() == kind)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn pet_listing(&self, id: &ObjectId) -> Result<Option<PetListing>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .world
            .pet_listings
            .get(id)
            .cloned())
    }

    async fn accessory_listing(
        &self,
        id: &ObjectId,
    ) -> Result<Option<AccessoryListing>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .world
            .accessory_listings
            .get(id)
            .cloned())
    }
}

fn digest_for(seq: u64, sender: &Address) -> TxDigest {
    let mut hasher = Sha256::new();
    hasher.update(b"tamagosui-tx");
    hasher.update(seq.to_be_bytes());
    hasher.update(sender.as_bytes());
    TxDigest(hasher.finalize().into())
}

fn new_object_id() -> ObjectId {
    ObjectId(rand::random())
}

fn execute_calls(
    world: &mut World,
    balance: &GameBalance,
    now: u64,
    sender: &Address,
    calls: &[Call],
) -> Result<(), String> {
    let mut results: Vec<Option<ObjectId>> = Vec::with_capacity(calls.len());
    for call in calls {
        let created = execute_call(world, balance, now, sender, call, &results)?;
        results.push(created);
    }
    Ok(())
}

fn execute_call(
    world: &mut World,
    balance: &GameBalance,
    now: u64,
    sender: &Address,
    call: &Call,
    results: &[Option<ObjectId>],
) -> Result<Option<ObjectId>, String> {
    match call.entry {
        EntryPoint::AdoptPet => {
            let name = str_arg(&call.args, 0)?;
            adopt_pet(world, now, sender, name)
        }
        EntryPoint::FeedPet => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if pet.stats.hunger as u64 >= balance.max_stat {
                return Err(E_PET_NOT_HUNGRY.into());
            }
            if pet.game_data.coins < balance.feed_coins_cost {
                return Err(E_NOT_ENOUGH_COINS.into());
            }
            pet.game_data.coins -= balance.feed_coins_cost;
            pet.stats.hunger = gain(pet.stats.hunger, balance.feed_hunger_gain, balance.max_stat);
            pet.game_data.experience += balance.feed_experience_gain;
            Ok(None)
        }
        EntryPoint::PlayWithPet => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if (pet.stats.energy as u64) < balance.play_energy_loss {
                return Err(E_PET_TOO_TIRED.into());
            }
            if (pet.stats.hunger as u64) < balance.play_hunger_loss {
                return Err(E_PET_TOO_HUNGRY.into());
            }
            pet.stats.energy = lose(pet.stats.energy, balance.play_energy_loss);
            pet.stats.hunger = lose(pet.stats.hunger, balance.play_hunger_loss);
            pet.stats.happiness =
                gain(pet.stats.happiness, balance.play_happiness_gain, balance.max_stat);
            pet.game_data.experience += balance.play_experience_gain;
            Ok(None)
        }
        EntryPoint::WorkForCoins => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if (pet.stats.energy as u64) < balance.work_energy_loss {
                return Err(E_PET_TOO_TIRED.into());
            }
            if (pet.stats.happiness as u64) < balance.work_happiness_loss {
                return Err(E_PET_UNHAPPY.into());
            }
            if (pet.stats.hunger as u64) < balance.work_hunger_loss {
                return Err(E_PET_TOO_HUNGRY.into());
            }
            pet.stats.energy = lose(pet.stats.energy, balance.work_energy_loss);
            pet.stats.happiness = lose(pet.stats.happiness, balance.work_happiness_loss);
            pet.stats.hunger = lose(pet.stats.hunger, balance.work_hunger_loss);
            pet.game_data.coins += balance.work_coins_gain;
            Ok(None)
        }
        EntryPoint::Exercise => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if (pet.stats.energy as u64) < balance.exercise_energy_loss {
                return Err(E_PET_TOO_TIRED.into());
            }
            if (pet.stats.hunger as u64) < balance.exercise_hunger_loss {
                return Err(E_PET_TOO_HUNGRY.into());
            }
            pet.stats.energy = lose(pet.stats.energy, balance.exercise_energy_loss);
            pet.stats.hunger = lose(pet.stats.hunger, balance.exercise_hunger_loss);
            pet.stats.happiness = gain(
                pet.stats.happiness,
                balance.exercise_happiness_gain,
                balance.max_stat,
            );
            pet.game_data.experience += balance.exercise_experience_gain;
            Ok(None)
        }
        EntryPoint::Study => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if (pet.stats.energy as u64) < balance.study_energy_loss {
                return Err(E_PET_TOO_TIRED.into());
            }
            pet.stats.energy = lose(pet.stats.energy, balance.study_energy_loss);
            pet.stats.happiness = lose(pet.stats.happiness, balance.study_happiness_loss);
            pet.game_data.experience += balance.study_experience_gain;
            Ok(None)
        }
        EntryPoint::Rest => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if pet.stats.energy as u64 >= balance.max_stat {
                return Err(E_ENERGY_FULL.into());
            }
            pet.stats.energy = gain(pet.stats.energy, balance.rest_energy_gain, balance.max_stat);
            Ok(None)
        }
        EntryPoint::LetPetSleep => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            pet.is_sleeping = true;
            world.sleeping_since.insert(id, now);
            Ok(None)
        }
        EntryPoint::WakeUpPet => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = pet_mut(&mut world.pets, sender, &id)?;
            if !pet.is_sleeping {
                return Err(E_PET_IS_AWAKE.into());
            }
            let since = world.sleeping_since.remove(&id).unwrap_or(now);
            let elapsed = now.saturating_sub(since);
            pet.stats.energy = gain(
                pet.stats.energy,
                elapsed / balance.sleep_energy_gain_ms.max(1),
                balance.max_stat,
            );
            pet.stats.hunger =
                lose(pet.stats.hunger, elapsed / balance.sleep_hunger_loss_ms.max(1));
            pet.stats.happiness = lose(
                pet.stats.happiness,
                elapsed / balance.sleep_happiness_loss_ms.max(1),
            );
            pet.is_sleeping = false;
            Ok(None)
        }
        EntryPoint::CheckAndLevelUp => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            let threshold = pet.game_data.level as u64 * balance.exp_per_level;
            if pet.game_data.experience < threshold {
                return Err(E_NOT_ENOUGH_EXP.into());
            }
            pet.game_data.experience -= threshold;
            pet.game_data.level += 1;
            Ok(None)
        }
        EntryPoint::TryEvolve => {
            let id = object_arg(&call.args, 0, results)?;
            let pet = awake_pet_mut(&mut world.pets, sender, &id)?;
            if (pet.game_data.level as u64) < balance.evolve_level_requirement {
                return Err(E_LEVEL_TOO_LOW.into());
            }
            pet.image_url = evolved_image_url(&pet.id);
            Ok(None)
        }
        EntryPoint::MintAccessory => mint(world, sender, AccessoryKind::Glasses),
        EntryPoint::MintHat => mint(world, sender, AccessoryKind::Hat),
        EntryPoint::MintToy => mint(world, sender, AccessoryKind::Toy),
        EntryPoint::EquipAccessoryWithKind => {
            let pet_id = object_arg(&call.args, 0, results)?;
            let accessory_id = object_arg(&call.args, 1, results)?;
            let kind = AccessoryKind::from_wire(u8_arg(&call.args, 2)?)
                .ok_or(E_INVALID_KIND)?;
            pet_mut(&mut world.pets, sender, &pet_id)?;
            let owned = world.accessories.entry(*sender).or_default();
            let position = owned
                .iter()
                .position(|a| a.id == accessory_id)
                .ok_or(E_ITEM_NOT_OWNED)?;
            let slots = world.equipped.entry(pet_id).or_default();
            if slots.iter().any(|(k, _)| *k == kind) {
                return Err(E_SLOT_OCCUPIED.into());
            }
            let accessory = world
                .accessories
                .entry(*sender)
                .or_default()
                .remove(position);
            world.equipped.entry(pet_id).or_default().push((kind, accessory));
            Ok(None)
        }
        EntryPoint::UnequipAccessory => {
            let pet_id = object_arg(&call.args, 0, results)?;
            let kind = AccessoryKind::from_wire(u8_arg(&call.args, 1)?)
                .ok_or(E_INVALID_KIND)?;
            pet_mut(&mut world.pets, sender, &pet_id)?;
            let slots = world.equipped.entry(pet_id).or_default();
            let position = slots
                .iter()
                .position(|(k, _)| *k == kind)
                .ok_or(E_SLOT_EMPTY)?;
            let (_, accessory) = slots.remove(position);
            world.accessories.entry(*sender).or_default().push(accessory);
            Ok(None)
        }
        EntryPoint::ListPet => {
            let pet_id = object_arg(&call.args, 0, results)?;
            let price = u64_arg(&call.args, 1)?;
            {
                let pet = pet_mut(&mut world.pets, sender, &pet_id)?;
                if pet.is_sleeping {
                    return Err(E_PET_IS_ASLEEP.into());
                }
            }
            let pet = world.pets.remove(sender).ok_or(E_NO_PET)?;
            let listing_id = new_object_id();
            world.pet_listings.insert(
                listing_id,
                PetListing {
                    id: listing_id,
                    seller: *sender,
                    price,
                    pet: Some(pet),
                },
            );
            world.events.push(ChainEvent::PetListed {
                listing_id,
                pet_id,
                seller: *sender,
                price,
            });
            Ok(Some(listing_id))
        }
        EntryPoint::CancelPetListing => {
            let listing_id = object_arg(&call.args, 0, results)?;
            let listing = world
                .pet_listings
                .get_mut(&listing_id)
                .ok_or(E_LISTING_NOT_FOUND)?;
            if listing.seller != *sender {
                return Err(E_NOT_SELLER.into());
            }
            let pet = listing.pet.take().ok_or(E_LISTING_INACTIVE)?;
            if world.pets.contains_key(sender) {
                return Err(E_ALREADY_ADOPTED.into());
            }
            world.pets.insert(*sender, pet);
            world.events.push(ChainEvent::PetListingCancelled {
                listing_id,
                seller: *sender,
            });
            Ok(None)
        }
        EntryPoint::ListAccessory => {
            let accessory_id = object_arg(&call.args, 0, results)?;
            let price = u64_arg(&call.args, 1)?;
            let owned = world.accessories.entry(*sender).or_default();
            let position = owned
                .iter()
                .position(|a| a.id == accessory_id)
                .ok_or(E_ITEM_NOT_OWNED)?;
            let accessory = owned.remove(position);
            let listing_id = new_object_id();
            world.accessory_listings.insert(
                listing_id,
                AccessoryListing {
                    id: listing_id,
                    seller: *sender,
                    price,
                    accessory: Some(accessory),
                },
            );
            world.events.push(ChainEvent::AccessoryListed {
                listing_id,
                accessory_id,
                seller: *sender,
                price,
            });
            Ok(Some(listing_id))
        }
        EntryPoint::CancelAccessoryListing => {
            let listing_id = object_arg(&call.args, 0, results)?;
            let listing = world
                .accessory_listings
                .get_mut(&listing_id)
                .ok_or(E_LISTING_NOT_FOUND)?;
            if listing.seller != *sender {
                return Err(E_NOT_SELLER.into());
            }
            let accessory = listing.accessory.take().ok_or(E_LISTING_INACTIVE)?;
            world.accessories.entry(*sender).or_default().push(accessory);
            world.events.push(ChainEvent::AccessoryListingCancelled {
                listing_id,
                seller: *sender,
            });
            Ok(None)
        }
        EntryPoint::BuyListedAccessory => {
            let listing_id = object_arg(&call.args, 0, results)?;
            let payment = u64_arg(&call.args, 1)?;
            let listing = world
                .accessory_listings
                .get_mut(&listing_id)
                .ok_or(E_LISTING_NOT_FOUND)?;
            if !listing.is_active() {
                return Err(E_LISTING_INACTIVE.into());
            }
            if payment != listing.price {
                return Err(E_WRONG_PAYMENT.into());
            }
            let buyer_gas = world.gas.get(sender).copied().unwrap_or(0);
            if buyer_gas < payment {
                return Err(E_INSUFFICIENT_GAS.into());
            }
            let seller = listing.seller;
            let accessory = listing.accessory.take().ok_or(E_LISTING_INACTIVE)?;
            world.gas.insert(*sender, buyer_gas - payment);
            *world.gas.entry(seller).or_insert(0) += payment;
            world.accessories.entry(*sender).or_default().push(accessory);
            world.events.push(ChainEvent::AccessorySold {
                listing_id,
                buyer: *sender,
                price: payment,
            });
            Ok(None)
        }
    }
}

fn adopt_pet(
    world: &mut World,
    now: u64,
    sender: &Address,
    name: &str,
) -> Result<Option<ObjectId>, String> {
    if world.pets.contains_key(sender) {
        return Err(E_ALREADY_ADOPTED.into());
    }
    let id = new_object_id();
    let personality = Personality::from_wire(id.as_bytes()[0] % 4);
    let pet = Pet {
        id,
        name: name.to_string(),
        image_url: base_image_url(&id),
        adopted_at_ms: now,
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
        personality,
        is_sleeping: false,
    };
    world.pets.insert(*sender, pet);
    world.events.push(ChainEvent::PetAdopted {
        pet_id: id,
        owner: *sender,
    });
    Ok(Some(id))
}

fn mint(
    world: &mut World,
    sender: &Address,
    kind: AccessoryKind,
) -> Result<Option<ObjectId>, String> {
    let id = new_object_id();
    let name = match kind {
        AccessoryKind::Glasses => "cool glasses",
        AccessoryKind::Hat => "dapper hat",
        AccessoryKind::Toy => "squeaky toy",
    };
    world.accessories.entry(*sender).or_default().push(Accessory {
        id,
        name: name.to_string(),
        image_url: accessory_image_url(kind),
        kind,
    });
    Ok(Some(id))
}

fn pet_mut<'a>(
    pets: &'a mut HashMap<Address, Pet>,
    sender: &Address,
    id: &ObjectId,
) -> Result<&'a mut Pet, String> {
    let pet = pets.get_mut(sender).ok_or(E_NO_PET)?;
    if pet.id != *id {
        return Err(E_NOT_PET_OWNER.into());
    }
    Ok(pet)
}

fn awake_pet_mut<'a>(
    pets: &'a mut HashMap<Address, Pet>,
    sender: &Address,
    id: &ObjectId,
) -> Result<&'a mut Pet, String> {
    let pet = pet_mut(pets, sender, id)?;
    if pet.is_sleeping {
        return Err(E_PET_IS_ASLEEP.into());
    }
    Ok(pet)
}

fn gain(stat: u8, amount: u64, max: u64) -> u8 {
    (stat as u64 + amount).min(max).min(u8::MAX as u64) as u8
}

fn lose(stat: u8, amount: u64) -> u8 {
    (stat as u64).saturating_sub(amount) as u8
}

fn object_arg(
    args: &[CallArg],
    index: usize,
    results: &[Option<ObjectId>],
) -> Result<ObjectId, String> {
    match args.get(index) {
        Some(CallArg::Object(id)) => Ok(*id),
        Some(CallArg::CallResult(call_index)) => results
            .get(*call_index as usize)
            .copied()
            .flatten()
            .ok_or_else(|| E_INVALID_ARGS.to_string()),
        _ => Err(E_INVALID_ARGS.into()),
    }
}

fn u64_arg(args: &[CallArg], index: usize) -> Result<u64, String> {
    match args.get(index) {
        Some(CallArg::U64(value)) => Ok(*value),
        _ => Err(E_INVALID_ARGS.into()),
    }
}

fn u8_arg(args: &[CallArg], index: usize) -> Result<u8, String> {
    match args.get(index) {
        Some(CallArg::U8(value)) => Ok(*value),
        _ => Err(E_INVALID_ARGS.into()),
    }
}

fn str_arg(args: &[CallArg], index: usize) -> Result<&str, String> {
    match args.get(index) {
        Some(CallArg::Str(value)) => Ok(value),
        _ => Err(E_INVALID_ARGS.into()),
    }
}

fn base_image_url(id: &ObjectId) -> String {
    format!("https://cdn.tamagosui.io/pets/{:02x}/base.png", id.as_bytes()[0])
}

fn evolved_image_url(id: &ObjectId) -> String {
    format!(
        "https://cdn.tamagosui.io/pets/{:02x}/evolved.png",
        id.as_bytes()[0]
    )
}

fn accessory_image_url(kind: AccessoryKind) -> String {
    format!("https://cdn.tamagosui.io/accessories/{}.png", kind.label())
}
