use tamagosui_chain::types::{
    Accessory,
    AccessoryKind,
    AccessoryListing,
    GameBalance,
    Pet,
    PetListing,
};
use tokio::sync::mpsc;

/// Keys of the cached read-views, one per entity collection the UI renders.
/// These are the invalidation targets the mutation wrappers name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    OwnedPet,
    OwnedAccessories,
    EquippedAccessory,
    GameBalance,
    PetListings,
    AccessoryListings,
}

pub const ALL_QUERY_KEYS: [QueryKey; 6] = [
    QueryKey::OwnedPet,
    QueryKey::OwnedAccessories,
    QueryKey::EquippedAccessory,
    QueryKey::GameBalance,
    QueryKey::PetListings,
    QueryKey::AccessoryListings,
];

struct View<T> {
    value: Option<T>,
    stale: bool,
}

impl<T> Default for View<T> {
    fn default() -> Self {
        View {
            value: None,
            stale: true,
        }
    }
}

impl<T> View<T> {
    fn store(&mut self, value: T) {
        self.value = Some(value);
        self.stale = false;
    }
}

/// A keyed store of read-views with explicit staleness and subscriber
/// notification. Marking a key stale does not drop the cached value (the UI
/// keeps rendering it until a re-fetch lands); it just flags the next read
/// cycle to go back to the ledger.
pub struct QueryCache {
    owned_pet: View<Option<Pet>>,
    owned_accessories: View<Vec<Accessory>>,
    equipped: View<Vec<(AccessoryKind, Accessory)>>,
    game_balance: View<GameBalance>,
    pet_listings: View<Vec<PetListing>>,
    accessory_listings: View<Vec<AccessoryListing>>,
    subscribers: Vec<mpsc::UnboundedSender<QueryKey>>,
}

impl QueryCache {
    pub fn new() -> Self {
        QueryCache {
            owned_pet: View::default(),
            owned_accessories: View::default(),
            equipped: View::default(),
            game_balance: View::default(),
            pet_listings: View::default(),
            accessory_listings: View::default(),
            subscribers: Vec::new(),
        }
    }

    /// Register for invalidation notifications. Each invalidated key is
    /// delivered once per `invalidate` call.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<QueryKey> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Mark the given read-views stale and notify subscribers. Dropped
    /// receivers are pruned on the way through.
    pub fn invalidate(&mut self, keys: &[QueryKey]) {
        for key in keys {
            self.view_stale_flag(*key);
        }
        self.subscribers.retain(|subscriber| {
            keys.iter().all(|key| subscriber.send(*key).is_ok())
        });
    }

    fn view_stale_flag(&mut self, key: QueryKey) {
        match key {
            QueryKey::OwnedPet => self.owned_pet.stale = true,
            QueryKey::OwnedAccessories => self.owned_accessories.stale = true,
            QueryKey::EquippedAccessory => self.equipped.stale = true,
            QueryKey::GameBalance => self.game_balance.stale = true,
            QueryKey::PetListings => self.pet_listings.stale = true,
            QueryKey::AccessoryListings => self.accessory_listings.stale = true,
        }
    }

    /// A never-fetched view counts as stale.
    pub fn is_stale(&self, key: QueryKey) -> bool {
        match key {
            QueryKey::OwnedPet => self.owned_pet.stale,
            QueryKey::OwnedAccessories => self.owned_accessories.stale,
            QueryKey::EquippedAccessory => self.equipped.stale,
            QueryKey::GameBalance => self.game_balance.stale,
            QueryKey::PetListings => self.pet_listings.stale,
            QueryKey::AccessoryListings => self.accessory_listings.stale,
        }
    }

    pub fn store_owned_pet(&mut self, pet: Option<Pet>) {
        self.owned_pet.store(pet);
    }

    pub fn store_owned_accessories(&mut self, accessories: Vec<Accessory>) {
        self.owned_accessories.store(accessories);
    }

    pub fn store_equipped(&mut self, equipped: Vec<(AccessoryKind, Accessory)>) {
        self.equipped.store(equipped);
    }

    pub fn store_game_balance(&mut self, balance: GameBalance) {
        self.game_balance.store(balance);
    }

    pub fn store_pet_listings(&mut self, listings: Vec<PetListing>) {
        self.pet_listings.store(listings);
    }

    pub fn store_accessory_listings(&mut self, listings: Vec<AccessoryListing>) {
        self.accessory_listings.store(listings);
    }

    /// `None` until the first fetch; `Some(None)` when the account has no pet.
    pub fn owned_pet(&self) -> Option<&Option<Pet>> {
        self.owned_pet.value.as_ref()
    }

    pub fn owned_accessories(&self) -> Option<&Vec<Accessory>> {
        self.owned_accessories.value.as_ref()
    }

    pub fn equipped(&self) -> Option<&Vec<(AccessoryKind, Accessory)>> {
        self.equipped.value.as_ref()
    }

    pub fn game_balance(&self) -> Option<&GameBalance> {
        self.game_balance.value.as_ref()
    }

    pub fn pet_listings(&self) -> Option<&Vec<PetListing>> {
        self.pet_listings.value.as_ref()
    }

    pub fn accessory_listings(&self) -> Option<&Vec<AccessoryListing>> {
        self.accessory_listings.value.as_ref()
    }

    pub(crate) fn accessory_listings_mut(&mut self) -> Option<&mut Vec<AccessoryListing>> {
        self.accessory_listings.value.as_mut()
    }

    pub(crate) fn restore_accessory_listings(
        &mut self,
        listings: Option<Vec<AccessoryListing>>,
    ) {
        self.accessory_listings.value = listings;
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn invalidate__flags_only_named_keys() {
        // given
        let mut cache = QueryCache::new();
        cache.store_owned_pet(None);
        cache.store_pet_listings(Vec::new());

        // when
        cache.invalidate(&[QueryKey::OwnedPet]);

        // then
        assert!(cache.is_stale(QueryKey::OwnedPet));
        assert!(!cache.is_stale(QueryKey::PetListings));
    }

    #[test]
    fn invalidate__keeps_cached_value_for_rendering() {
        let mut cache = QueryCache::new();
        cache.store_owned_accessories(Vec::new());

        cache.invalidate(&[QueryKey::OwnedAccessories]);

        assert!(cache.is_stale(QueryKey::OwnedAccessories));
        assert!(cache.owned_accessories().is_some());
    }

    #[test]
    fn subscribe__receives_each_invalidated_key() {
        // given
        let mut cache = QueryCache::new();
        let mut rx = cache.subscribe();

        // when
        cache.invalidate(&[QueryKey::OwnedPet, QueryKey::AccessoryListings]);

        // then
        assert_eq!(rx.try_recv().unwrap(), QueryKey::OwnedPet);
        assert_eq!(rx.try_recv().unwrap(), QueryKey::AccessoryListings);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn subscribe__dropped_receiver_is_pruned() {
        let mut cache = QueryCache::new();
        let rx = cache.subscribe();
        drop(rx);

        // must not wedge or grow the subscriber list
        cache.invalidate(&[QueryKey::GameBalance]);
        cache.invalidate(&[QueryKey::GameBalance]);
        assert!(cache.is_stale(QueryKey::GameBalance));
    }

    #[test]
    fn never_fetched_view__reports_stale() {
        let cache = QueryCache::new();
        for key in ALL_QUERY_KEYS {
            assert!(cache.is_stale(key), "{key:?} should start stale");
        }
    }
}
