use crate::types::{
    Address,
    ObjectId,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Contract entry points this client calls. Names on the wire match the
/// published module one-to-one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPoint {
    AdoptPet,
    FeedPet,
    PlayWithPet,
    WorkForCoins,
    Exercise,
    Study,
    Rest,
    LetPetSleep,
    WakeUpPet,
    CheckAndLevelUp,
    TryEvolve,
    MintAccessory,
    MintHat,
    MintToy,
    EquipAccessoryWithKind,
    UnequipAccessory,
    ListPet,
    CancelPetListing,
    ListAccessory,
    CancelAccessoryListing,
    BuyListedAccessory,
}

impl EntryPoint {
    pub fn wire_name(self) -> &'static str {
        match self {
            EntryPoint::AdoptPet => "adopt_pet",
            EntryPoint::FeedPet => "feed_pet",
            EntryPoint::PlayWithPet => "play_with_pet",
            EntryPoint::WorkForCoins => "work_for_coins",
            EntryPoint::Exercise => "exercise",
            EntryPoint::Study => "study",
            EntryPoint::Rest => "rest",
            EntryPoint::LetPetSleep => "let_pet_sleep",
            EntryPoint::WakeUpPet => "wake_up_pet",
            EntryPoint::CheckAndLevelUp => "check_and_level_up",
            EntryPoint::TryEvolve => "try_evolve",
            EntryPoint::MintAccessory => "mint_accessory",
            EntryPoint::MintHat => "mint_hat",
            EntryPoint::MintToy => "mint_toy",
            EntryPoint::EquipAccessoryWithKind => "equip_accessory_with_kind",
            EntryPoint::UnequipAccessory => "unequip_accessory",
            EntryPoint::ListPet => "list_pet",
            EntryPoint::CancelPetListing => "cancel_pet_listing",
            EntryPoint::ListAccessory => "list_accessory",
            EntryPoint::CancelAccessoryListing => "cancel_accessory_listing",
            EntryPoint::BuyListedAccessory => "buy_listed_accessory",
        }
    }
}

/// An argument to a single call. `CallResult` references the object produced
/// by an earlier call in the same transaction, which is how a mint-and-equip
/// bundle hands the freshly minted accessory to the equip call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    Object(ObjectId),
    U64(u64),
    U8(u8),
    Str(String),
    CallResult(u16),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub entry: EntryPoint,
    pub args: Vec<CallArg>,
}

/// An ordered bundle of calls executed atomically by the ledger: either every
/// call takes effect or none does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub calls: Vec<Call>,
}

impl Transaction {
    pub fn new() -> Self {
        Transaction { calls: Vec::new() }
    }

    pub fn single(entry: EntryPoint, args: Vec<CallArg>) -> Self {
        Transaction::new().call(entry, args)
    }

    pub fn call(mut self, entry: EntryPoint, args: Vec<CallArg>) -> Self {
        self.calls.push(Call { entry, args });
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub [u8; 32]);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub sender: Address,
    pub signature: Signature,
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn transaction__builder_preserves_call_order() {
        // given
        let pet = ObjectId([1u8; 32]);

        // when
        let tx = Transaction::new()
            .call(EntryPoint::WakeUpPet, vec![CallArg::Object(pet)])
            .call(EntryPoint::FeedPet, vec![CallArg::Object(pet)])
            .call(EntryPoint::PlayWithPet, vec![CallArg::Object(pet)]);

        // then
        let entries: Vec<EntryPoint> = tx.calls.iter().map(|c| c.entry).collect();
        assert_eq!(
            entries,
            vec![
                EntryPoint::WakeUpPet,
                EntryPoint::FeedPet,
                EntryPoint::PlayWithPet
            ]
        );
    }

    #[test]
    fn entry_point__wire_names_match_contract_module() {
        assert_eq!(EntryPoint::AdoptPet.wire_name(), "adopt_pet");
        assert_eq!(
            EntryPoint::EquipAccessoryWithKind.wire_name(),
            "equip_accessory_with_kind"
        );
        assert_eq!(
            EntryPoint::BuyListedAccessory.wire_name(),
            "buy_listed_accessory"
        );
    }
}
