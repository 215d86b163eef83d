use tamagosui_chain::{
    events::{
        ChainEvent,
        EventKind,
    },
    ledger::{
        Ledger,
        LedgerError,
    },
    types::{
        AccessoryListing,
        ObjectId,
        PetListing,
    },
};

/// How many recent "Listed" events to consider when deriving the marketplace
/// views. Older listings fall out of the window; this is an accepted
/// eventual-consistency gap, not an error.
pub const LISTING_EVENT_WINDOW: usize = 50;

/// Derive the active pet listings: collect recent PetListed events, dedupe
/// listing ids preserving recency order, resolve each listing object, and
/// keep only listings that still embed their pet.
pub async fn fetch_pet_listings<L: Ledger>(
    ledger: &L,
) -> Result<Vec<PetListing>, LedgerError> {
    let events = ledger
        .query_events(EventKind::PetListed, LISTING_EVENT_WINDOW)
        .await?;
    let ids = dedupe_listing_ids(&events);

    let mut listings = Vec::new();
    for id in ids {
        let Some(listing) = ledger.pet_listing(&id).await? else {
            continue;
        };
        if listing.is_active() {
            listings.push(listing);
        }
    }
    Ok(listings)
}

pub async fn fetch_accessory_listings<L: Ledger>(
    ledger: &L,
) -> Result<Vec<AccessoryListing>, LedgerError> {
    let events = ledger
        .query_events(EventKind::AccessoryListed, LISTING_EVENT_WINDOW)
        .await?;
    let ids = dedupe_listing_ids(&events);

    let mut listings = Vec::new();
    for id in ids {
        let Some(listing) = ledger.accessory_listing(&id).await? else {
            continue;
        };
        if listing.is_active() {
            listings.push(listing);
        }
    }
    Ok(listings)
}

fn dedupe_listing_ids(events: &[ChainEvent]) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    for event in events {
        if let Some(id) = event.listing_id()
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tamagosui_chain::types::Address;

    fn listed(id: u8) -> ChainEvent {
        ChainEvent::PetListed {
            listing_id: ObjectId([id; 32]),
            pet_id: ObjectId([id.wrapping_add(100); 32]),
            seller: Address([1u8; 32]),
            price: 10,
        }
    }

    #[test]
    fn dedupe_listing_ids__preserves_order_and_drops_duplicates() {
        let events = vec![listed(3), listed(1), listed(3), listed(2)];
        let ids = dedupe_listing_ids(&events);
        assert_eq!(
            ids,
            vec![ObjectId([3; 32]), ObjectId([1; 32]), ObjectId([2; 32])]
        );
    }
}
