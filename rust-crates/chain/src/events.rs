use crate::types::{
    Address,
    ObjectId,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Filter used when querying recently emitted events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    PetAdopted,
    PetListed,
    PetListingCancelled,
    AccessoryListed,
    AccessoryListingCancelled,
    AccessorySold,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ChainEvent {
    PetAdopted {
        pet_id: ObjectId,
        owner: Address,
    },
    PetListed {
        listing_id: ObjectId,
        pet_id: ObjectId,
        seller: Address,
        price: u64,
    },
    PetListingCancelled {
        listing_id: ObjectId,
        seller: Address,
    },
    AccessoryListed {
        listing_id: ObjectId,
        accessory_id: ObjectId,
        seller: Address,
        price: u64,
    },
    AccessoryListingCancelled {
        listing_id: ObjectId,
        seller: Address,
    },
    AccessorySold {
        listing_id: ObjectId,
        buyer: Address,
        price: u64,
    },
}

impl ChainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChainEvent::PetAdopted { .. } => EventKind::PetAdopted,
            ChainEvent::PetListed { .. } => EventKind::PetListed,
            ChainEvent::PetListingCancelled { .. } => EventKind::PetListingCancelled,
            ChainEvent::AccessoryListed { .. } => EventKind::AccessoryListed,
            ChainEvent::AccessoryListingCancelled { .. } => {
                EventKind::AccessoryListingCancelled
            }
            ChainEvent::AccessorySold { .. } => EventKind::AccessorySold,
        }
    }

    /// The listing id an event refers to, when it refers to one at all.
    pub fn listing_id(&self) -> Option<ObjectId> {
        match self {
            ChainEvent::PetAdopted { .. } => None,
            ChainEvent::PetListed { listing_id, .. }
            | ChainEvent::PetListingCancelled { listing_id, .. }
            | ChainEvent::AccessoryListed { listing_id, .. }
            | ChainEvent::AccessoryListingCancelled { listing_id, .. }
            | ChainEvent::AccessorySold { listing_id, .. } => Some(*listing_id),
        }
    }
}
