use crate::cache::{
    QueryCache,
    QueryKey,
};
use tamagosui_chain::types::{
    AccessoryListing,
    ObjectId,
};

/// One reversible speculative mutation of a cached read-view: the pre-state
/// snapshot is captured when the mutation is applied, and the entry is then
/// either committed (leave the speculative value, invalidate the key so the
/// next refresh reconciles) or reverted (restore the snapshot exactly).
///
/// Only the accessory-listing cancellation flow arms this; every other
/// mutation waits for confirmation before touching the cache.
pub struct SpeculativeRemoval {
    key: QueryKey,
    snapshot: Option<Vec<AccessoryListing>>,
}

impl SpeculativeRemoval {
    /// Speculatively drop the listing with the given id from the cached
    /// accessory-listings view, keeping every other entry in place and in
    /// order.
    pub fn remove_accessory_listing(cache: &mut QueryCache, id: ObjectId) -> Self {
        let snapshot = cache.accessory_listings().cloned();
        if let Some(listings) = cache.accessory_listings_mut() {
            listings.retain(|listing| listing.id != id);
        }
        SpeculativeRemoval {
            key: QueryKey::AccessoryListings,
            snapshot,
        }
    }

    /// Confirmation landed: keep the speculative state and mark the view
    /// stale so the next refresh reconciles with the ledger.
    pub fn commit(self, cache: &mut QueryCache) {
        cache.invalidate(&[self.key]);
    }

    /// Confirmation failed: put the pre-mutation snapshot back exactly.
    pub fn revert(self, cache: &mut QueryCache) {
        cache.restore_accessory_listings(self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tamagosui_chain::types::{
        Accessory,
        AccessoryKind,
        Address,
    };

    fn listing(id: u8) -> AccessoryListing {
        AccessoryListing {
            id: ObjectId([id; 32]),
            seller: Address([9u8; 32]),
            price: 10,
            accessory: Some(Accessory {
                id: ObjectId([id.wrapping_add(50); 32]),
                name: "squeaky toy".to_string(),
                image_url: String::new(),
                kind: AccessoryKind::Toy,
            }),
        }
    }

    #[test]
    fn remove__drops_exactly_the_target_listing() {
        // given
        let mut cache = QueryCache::new();
        cache.store_accessory_listings(vec![listing(1), listing(2), listing(3)]);

        // when
        let _speculative =
            SpeculativeRemoval::remove_accessory_listing(&mut cache, ObjectId([2; 32]));

        // then
        let ids: Vec<ObjectId> = cache
            .accessory_listings()
            .unwrap()
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![ObjectId([1; 32]), ObjectId([3; 32])]);
    }

    #[test]
    fn revert__restores_exact_contents_and_ordering() {
        // given
        let mut cache = QueryCache::new();
        let original = vec![listing(3), listing(1), listing(2)];
        cache.store_accessory_listings(original.clone());
        let speculative =
            SpeculativeRemoval::remove_accessory_listing(&mut cache, ObjectId([1; 32]));

        // when
        speculative.revert(&mut cache);

        // then
        assert_eq!(cache.accessory_listings().unwrap(), &original);
        // a revert is not an invalidation
        assert!(!cache.is_stale(QueryKey::AccessoryListings));
    }

    #[test]
    fn commit__keeps_speculative_state_and_marks_view_stale() {
        // given
        let mut cache = QueryCache::new();
        cache.store_accessory_listings(vec![listing(1), listing(2)]);
        let speculative =
            SpeculativeRemoval::remove_accessory_listing(&mut cache, ObjectId([1; 32]));

        // when
        speculative.commit(&mut cache);

        // then
        assert_eq!(cache.accessory_listings().unwrap().len(), 1);
        assert!(cache.is_stale(QueryKey::AccessoryListings));
    }

    #[test]
    fn remove__on_unfetched_view_is_a_no_op_and_reverts_to_unfetched() {
        let mut cache = QueryCache::new();
        let speculative =
            SpeculativeRemoval::remove_accessory_listing(&mut cache, ObjectId([1; 32]));
        assert!(cache.accessory_listings().is_none());
        speculative.revert(&mut cache);
        assert!(cache.accessory_listings().is_none());
    }
}
