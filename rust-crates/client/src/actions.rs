use crate::{
    cache::{
        ALL_QUERY_KEYS,
        QueryCache,
        QueryKey,
    },
    error::ActionError,
    optimistic::SpeculativeRemoval,
    queries,
};
use std::sync::{
    Arc,
    Mutex,
    atomic::{
        AtomicBool,
        Ordering,
    },
};
use tamagosui_chain::{
    ledger::{
        Ledger,
        LedgerError,
        Signer,
        TxStatus,
    },
    tx::{
        CallArg,
        EntryPoint,
        Transaction,
    },
    types::{
        AccessoryKind,
        Address,
        ObjectId,
        TxDigest,
    },
};
use tracing::error;

const MAX_ERRORS: usize = 50;

/// Client-side mutual exclusion: while any one mutation is in flight no other
/// handler may submit. This is a UI courtesy flag, not a lock on the ledger.
struct PendingGate {
    busy: AtomicBool,
    label: Mutex<&'static str>,
}

impl PendingGate {
    fn new() -> Self {
        PendingGate {
            busy: AtomicBool::new(false),
            label: Mutex::new(""),
        }
    }

    fn try_acquire(
        gate: &Arc<PendingGate>,
        label: &'static str,
    ) -> Result<PendingGuard, ActionError> {
        if gate
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ActionError::ActionInFlight(*gate.label.lock().unwrap()));
        }
        *gate.label.lock().unwrap() = label;
        Ok(PendingGuard {
            gate: Arc::clone(gate),
        })
    }

    fn in_flight(&self) -> Option<&'static str> {
        self.busy
            .load(Ordering::Acquire)
            .then(|| *self.label.lock().unwrap())
    }
}

/// Releases the gate when dropped, including when the in-flight future is
/// cancelled mid-await.
struct PendingGuard {
    gate: Arc<PendingGate>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

struct StatusFeed {
    status: String,
    errors: Vec<String>,
}

/// The mutation/query synchronization layer. Every state-changing user
/// action goes through one wrapper here, and every wrapper runs the same
/// cycle: build transaction, sign, submit, await the terminal status, then
/// invalidate exactly the read-views the action implicates. On failure the
/// cache is left in its pre-action state.
pub struct AppController<L, S> {
    ledger: L,
    signer: Option<S>,
    clock_id: ObjectId,
    cache: Arc<Mutex<QueryCache>>,
    pending: Arc<PendingGate>,
    feed: Arc<Mutex<StatusFeed>>,
}

impl<L: Clone, S: Clone> Clone for AppController<L, S> {
    fn clone(&self) -> Self {
        AppController {
            ledger: self.ledger.clone(),
            signer: self.signer.clone(),
            clock_id: self.clock_id,
            cache: Arc::clone(&self.cache),
            pending: Arc::clone(&self.pending),
            feed: Arc::clone(&self.feed),
        }
    }
}

impl<L: Ledger, S: Signer> AppController<L, S> {
    /// `signer` is `None` in watch-only mode: reads work, every mutation
    /// fails fast with `NoAccount`. `clock_id` is the shared clock object
    /// the wake call references.
    pub fn new(ledger: L, signer: Option<S>, clock_id: ObjectId) -> Self {
        AppController {
            ledger,
            signer,
            clock_id,
            cache: Arc::new(Mutex::new(QueryCache::new())),
            pending: Arc::new(PendingGate::new()),
            feed: Arc::new(Mutex::new(StatusFeed {
                status: String::from("Ready"),
                errors: Vec::new(),
            })),
        }
    }

    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(|signer| signer.address())
    }

    pub fn status(&self) -> String {
        self.feed.lock().unwrap().status.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.feed.lock().unwrap().errors.clone()
    }

    pub fn pending_action(&self) -> Option<&'static str> {
        self.pending.in_flight()
    }

    /// Read the cached views under the lock.
    pub fn read_views<R>(&self, read: impl FnOnce(&QueryCache) -> R) -> R {
        read(&self.cache.lock().unwrap())
    }

    /// Subscribe to invalidation notifications.
    pub fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<QueryKey> {
        self.cache.lock().unwrap().subscribe()
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let mut feed = self.feed.lock().unwrap();
        feed.status = status.into();
        feed.errors.clear();
    }

    fn push_error(&self, message: String) {
        error!("{message}");
        let mut feed = self.feed.lock().unwrap();
        feed.errors.push(message);
        if feed.errors.len() > MAX_ERRORS {
            let drain = feed.errors.len() - MAX_ERRORS;
            feed.errors.drain(0..drain);
        }
    }

    fn fail(&self, label: &str, err: ActionError) -> ActionError {
        self.push_error(format!("{label} failed: {err}"));
        err
    }

    // ---- read-view refreshers -------------------------------------------

    pub async fn refresh_owned_pet(&self) -> Result<(), LedgerError> {
        let pet = match self.address() {
            Some(address) => self.ledger.owned_pet(&address).await?,
            None => None,
        };
        self.cache.lock().unwrap().store_owned_pet(pet);
        Ok(())
    }

    pub async fn refresh_owned_accessories(&self) -> Result<(), LedgerError> {
        let accessories = match self.address() {
            Some(address) => self.ledger.owned_accessories(&address).await?,
            None => Vec::new(),
        };
        self.cache
            .lock()
            .unwrap()
            .store_owned_accessories(accessories);
        Ok(())
    }

    pub async fn refresh_equipped(&self) -> Result<(), LedgerError> {
        let pet_id = self
            .cache
            .lock()
            .unwrap()
            .owned_pet()
            .and_then(|pet| pet.as_ref())
            .map(|pet| pet.id);
        let equipped = match pet_id {
            Some(pet_id) => self.ledger.equipped_accessories(&pet_id).await?,
            None => Vec::new(),
        };
        self.cache.lock().unwrap().store_equipped(equipped);
        Ok(())
    }

    pub async fn refresh_game_balance(&self) -> Result<(), LedgerError> {
        let balance = self.ledger.game_balance().await?;
        self.cache.lock().unwrap().store_game_balance(balance);
        Ok(())
    }

    pub async fn refresh_pet_listings(&self) -> Result<(), LedgerError> {
        let listings = queries::fetch_pet_listings(&self.ledger).await?;
        self.cache.lock().unwrap().store_pet_listings(listings);
        Ok(())
    }

    pub async fn refresh_accessory_listings(&self) -> Result<(), LedgerError> {
        let listings = queries::fetch_accessory_listings(&self.ledger).await?;
        self.cache
            .lock()
            .unwrap()
            .store_accessory_listings(listings);
        Ok(())
    }

    /// Re-fetch every view currently marked stale.
    pub async fn refresh_stale(&self) -> Result<(), LedgerError> {
        for key in ALL_QUERY_KEYS {
            if !self.cache.lock().unwrap().is_stale(key) {
                continue;
            }
            self.refresh_key(key).await?;
        }
        Ok(())
    }

    pub async fn refresh_key(&self, key: QueryKey) -> Result<(), LedgerError> {
        match key {
            QueryKey::OwnedPet => self.refresh_owned_pet().await,
            QueryKey::OwnedAccessories => self.refresh_owned_accessories().await,
            QueryKey::EquippedAccessory => self.refresh_equipped().await,
            QueryKey::GameBalance => self.refresh_game_balance().await,
            QueryKey::PetListings => self.refresh_pet_listings().await,
            QueryKey::AccessoryListings => self.refresh_accessory_listings().await,
        }
    }

    // ---- mutation wrappers ----------------------------------------------

    pub async fn adopt(&self, name: &str) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::AdoptPet,
            vec![CallArg::Str(name.to_string())],
        );
        let digest = self
            .execute("adopt", &[QueryKey::OwnedPet], tx)
            .await?;
        self.set_status(format!("Adopted {name}!"));
        Ok(digest)
    }

    pub async fn feed(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("feed", EntryPoint::FeedPet, pet).await
    }

    pub async fn play(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("play", EntryPoint::PlayWithPet, pet).await
    }

    pub async fn work(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("work", EntryPoint::WorkForCoins, pet).await
    }

    pub async fn exercise(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("exercise", EntryPoint::Exercise, pet).await
    }

    pub async fn study(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("study", EntryPoint::Study, pet).await
    }

    pub async fn rest(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("rest", EntryPoint::Rest, pet).await
    }

    pub async fn sleep(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("sleep", EntryPoint::LetPetSleep, pet).await
    }

    pub async fn wake(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::WakeUpPet,
            vec![CallArg::Object(pet), CallArg::Object(self.clock_id)],
        );
        self.execute("wake", &[QueryKey::OwnedPet], tx).await
    }

    pub async fn check_level_up(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("level up", EntryPoint::CheckAndLevelUp, pet)
            .await
    }

    pub async fn try_evolve(&self, pet: ObjectId) -> Result<TxDigest, ActionError> {
        self.pet_action("evolve", EntryPoint::TryEvolve, pet).await
    }

    /// Feed + play (+ optional level check) as one atomic submission.
    pub async fn combo_care(
        &self,
        pet: ObjectId,
        with_level_check: bool,
    ) -> Result<TxDigest, ActionError> {
        let mut tx = Transaction::new()
            .call(EntryPoint::FeedPet, vec![CallArg::Object(pet)])
            .call(EntryPoint::PlayWithPet, vec![CallArg::Object(pet)]);
        if with_level_check {
            tx = tx.call(EntryPoint::CheckAndLevelUp, vec![CallArg::Object(pet)]);
        }
        self.execute("combo care", &[QueryKey::OwnedPet], tx).await
    }

    /// Wake up, feed, optionally play. Only meaningful while the pet sleeps.
    pub async fn morning_routine(
        &self,
        pet: ObjectId,
        include_play: bool,
    ) -> Result<TxDigest, ActionError> {
        let mut tx = Transaction::new()
            .call(
                EntryPoint::WakeUpPet,
                vec![CallArg::Object(pet), CallArg::Object(self.clock_id)],
            )
            .call(EntryPoint::FeedPet, vec![CallArg::Object(pet)]);
        if include_play {
            tx = tx.call(EntryPoint::PlayWithPet, vec![CallArg::Object(pet)]);
        }
        self.execute("morning routine", &[QueryKey::OwnedPet], tx)
            .await
    }

    pub async fn mint(&self, kind: AccessoryKind) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(mint_entry(kind), vec![]);
        self.execute(
            "mint accessory",
            &[QueryKey::OwnedPet, QueryKey::OwnedAccessories],
            tx,
        )
        .await
    }

    /// Mint an accessory and equip it to the pet in one atomic submission;
    /// the equip call consumes the mint call's output.
    pub async fn mint_and_equip(
        &self,
        pet: ObjectId,
        kind: AccessoryKind,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::new().call(mint_entry(kind), vec![]).call(
            EntryPoint::EquipAccessoryWithKind,
            vec![
                CallArg::Object(pet),
                CallArg::CallResult(0),
                CallArg::U8(kind.wire_code()),
            ],
        );
        self.execute(
            "mint and equip",
            &[
                QueryKey::OwnedPet,
                QueryKey::OwnedAccessories,
                QueryKey::EquippedAccessory,
            ],
            tx,
        )
        .await
    }

    pub async fn equip(
        &self,
        pet: ObjectId,
        accessory: ObjectId,
        kind: AccessoryKind,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::EquipAccessoryWithKind,
            vec![
                CallArg::Object(pet),
                CallArg::Object(accessory),
                CallArg::U8(kind.wire_code()),
            ],
        );
        self.execute(
            "equip accessory",
            &[
                QueryKey::OwnedPet,
                QueryKey::OwnedAccessories,
                QueryKey::EquippedAccessory,
            ],
            tx,
        )
        .await
    }

    pub async fn unequip(
        &self,
        pet: ObjectId,
        kind: AccessoryKind,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::UnequipAccessory,
            vec![CallArg::Object(pet), CallArg::U8(kind.wire_code())],
        );
        self.execute(
            "unequip accessory",
            &[
                QueryKey::OwnedPet,
                QueryKey::OwnedAccessories,
                QueryKey::EquippedAccessory,
            ],
            tx,
        )
        .await
    }

    pub async fn list_pet(
        &self,
        pet: ObjectId,
        price: u64,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::ListPet,
            vec![CallArg::Object(pet), CallArg::U64(price)],
        );
        self.execute(
            "list pet",
            &[QueryKey::OwnedPet, QueryKey::PetListings],
            tx,
        )
        .await
    }

    pub async fn cancel_pet_listing(
        &self,
        listing: ObjectId,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::CancelPetListing,
            vec![CallArg::Object(listing)],
        );
        self.execute(
            "cancel pet listing",
            &[QueryKey::OwnedPet, QueryKey::PetListings],
            tx,
        )
        .await
    }

    pub async fn list_accessory(
        &self,
        accessory: ObjectId,
        price: u64,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::ListAccessory,
            vec![CallArg::Object(accessory), CallArg::U64(price)],
        );
        self.execute(
            "list accessory",
            &[QueryKey::OwnedAccessories, QueryKey::AccessoryListings],
            tx,
        )
        .await
    }

    /// The one optimistic flow: the cached accessory-listings view drops the
    /// listing before confirmation, and the pre-mutation snapshot is restored
    /// exactly if the ledger reports failure.
    pub async fn cancel_accessory_listing(
        &self,
        listing: ObjectId,
    ) -> Result<TxDigest, ActionError> {
        const LABEL: &str = "cancel accessory listing";
        let Some(signer) = self.signer.as_ref() else {
            return Err(self.fail(LABEL, ActionError::NoAccount));
        };
        let _guard = match PendingGate::try_acquire(&self.pending, LABEL) {
            Ok(guard) => guard,
            Err(err) => return Err(self.fail(LABEL, err)),
        };
        let speculative = SpeculativeRemoval::remove_accessory_listing(
            &mut self.cache.lock().unwrap(),
            listing,
        );
        self.set_status("Cancelling accessory listing...");

        let tx = Transaction::single(
            EntryPoint::CancelAccessoryListing,
            vec![CallArg::Object(listing)],
        );
        let outcome = self.sign_submit_wait(signer, tx).await;

        match outcome {
            Ok(digest) => {
                let mut cache = self.cache.lock().unwrap();
                speculative.commit(&mut cache);
                drop(cache);
                self.set_status("Accessory listing cancelled");
                Ok(digest)
            }
            Err(err) => {
                let mut cache = self.cache.lock().unwrap();
                speculative.revert(&mut cache);
                drop(cache);
                Err(self.fail(LABEL, err))
            }
        }
    }

    pub async fn buy_accessory(
        &self,
        listing: ObjectId,
        price: u64,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(
            EntryPoint::BuyListedAccessory,
            vec![CallArg::Object(listing), CallArg::U64(price)],
        );
        self.execute(
            "buy accessory",
            &[QueryKey::AccessoryListings, QueryKey::OwnedAccessories],
            tx,
        )
        .await
    }

    // ---- the shared cycle -----------------------------------------------

    async fn pet_action(
        &self,
        label: &'static str,
        entry: EntryPoint,
        pet: ObjectId,
    ) -> Result<TxDigest, ActionError> {
        let tx = Transaction::single(entry, vec![CallArg::Object(pet)]);
        self.execute(label, &[QueryKey::OwnedPet], tx).await
    }

    /// submit → wait → invalidate. The implicated views are touched only
    /// after the ledger reports success.
    async fn execute(
        &self,
        label: &'static str,
        implicated: &[QueryKey],
        tx: Transaction,
    ) -> Result<TxDigest, ActionError> {
        let Some(signer) = self.signer.as_ref() else {
            return Err(self.fail(label, ActionError::NoAccount));
        };
        let _guard = match PendingGate::try_acquire(&self.pending, label) {
            Ok(guard) => guard,
            Err(err) => return Err(self.fail(label, err)),
        };
        self.set_status(format!("Submitting {label}..."));
        match self.sign_submit_wait(signer, tx).await {
            Ok(digest) => {
                self.cache.lock().unwrap().invalidate(implicated);
                self.set_status(format!("Confirmed {label} ({digest})"));
                Ok(digest)
            }
            Err(err) => Err(self.fail(label, err)),
        }
    }

    async fn sign_submit_wait(
        &self,
        signer: &S,
        tx: Transaction,
    ) -> Result<TxDigest, ActionError> {
        let signed = signer.sign(tx).map_err(|_| ActionError::WalletRejected)?;
        let digest = self.ledger.submit(signed).await?;
        match self.ledger.wait_for_confirmation(&digest).await? {
            TxStatus::Success => Ok(digest),
            TxStatus::Failure { error } => Err(ActionError::ExecutionFailure(error)),
        }
    }
}

fn mint_entry(kind: AccessoryKind) -> EntryPoint {
    match kind {
        AccessoryKind::Glasses => EntryPoint::MintAccessory,
        AccessoryKind::Hat => EntryPoint::MintHat,
        AccessoryKind::Toy => EntryPoint::MintToy,
    }
}
