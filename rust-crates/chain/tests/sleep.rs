#![allow(non_snake_case)]
use tamagosui_chain::{
    ledger::{
        Ledger,
        Signer,
        TxStatus,
    },
    local::{
        E_PET_IS_AWAKE,
        LocalLedger,
    },
    signer::KeySigner,
    test_helpers::TestContext,
    tx::{
        CallArg,
        EntryPoint,
        Transaction,
    },
    types::ObjectId,
};

async fn execute(ledger: &LocalLedger, signer: &KeySigner, tx: Transaction) -> TxStatus {
    let signed = signer.sign(tx).unwrap();
    let digest = ledger.submit(signed).await.unwrap();
    ledger.wait_for_confirmation(&digest).await.unwrap()
}

fn pet_call(entry: EntryPoint, pet: ObjectId) -> Transaction {
    Transaction::single(entry, vec![CallArg::Object(pet)])
}

#[tokio::test]
async fn wake_up_pet__applies_elapsed_sleep_deltas_with_clamping() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    execute(
        &ledger,
        &alice,
        Transaction::single(EntryPoint::AdoptPet, vec![CallArg::Str("Ron".into())]),
    )
    .await;
    let before = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();

    let status = execute(&ledger, &alice, pet_call(EntryPoint::LetPetSleep, before.id)).await;
    assert_eq!(status, TxStatus::Success);
    let sleeping = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert!(sleeping.is_sleeping);

    // sleep 10s: +10 energy (gain 1/s), -20 hunger (loss 1/500ms),
    // happiness -14 (loss 1/700ms)
    ctx.advance_time(10_000);

    // when
    let status = execute(&ledger, &alice, pet_call(EntryPoint::WakeUpPet, before.id)).await;

    // then
    assert_eq!(status, TxStatus::Success);
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert!(!after.is_sleeping);
    assert_eq!(after.stats.energy, before.stats.energy + 10);
    assert_eq!(after.stats.hunger, before.stats.hunger - 20);
    assert_eq!(after.stats.happiness, before.stats.happiness - 14);
}

#[tokio::test]
async fn wake_up_pet__long_sleep_clamps_energy_at_max_and_losses_at_zero() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    execute(
        &ledger,
        &alice,
        Transaction::single(EntryPoint::AdoptPet, vec![CallArg::Str("Ron".into())]),
    )
    .await;
    let pet = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    execute(&ledger, &alice, pet_call(EntryPoint::LetPetSleep, pet.id)).await;

    // a full day asleep
    ctx.advance_time(86_400_000);

    // when
    execute(&ledger, &alice, pet_call(EntryPoint::WakeUpPet, pet.id)).await;

    // then
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(after.stats.energy, 100);
    assert_eq!(after.stats.hunger, 0);
    assert_eq!(after.stats.happiness, 0);
}

#[tokio::test]
async fn wake_up_pet__fails_when_pet_is_not_sleeping() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    execute(
        &ledger,
        &alice,
        Transaction::single(EntryPoint::AdoptPet, vec![CallArg::Str("Ron".into())]),
    )
    .await;
    let pet = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();

    // when
    let status = execute(&ledger, &alice, pet_call(EntryPoint::WakeUpPet, pet.id)).await;

    // then
    assert_eq!(
        status,
        TxStatus::Failure {
            error: E_PET_IS_AWAKE.to_string()
        }
    );
}

#[tokio::test]
async fn morning_routine_bundle__wakes_then_feeds_in_one_transaction() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    execute(
        &ledger,
        &alice,
        Transaction::single(EntryPoint::AdoptPet, vec![CallArg::Str("Ron".into())]),
    )
    .await;
    let pet = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    execute(&ledger, &alice, pet_call(EntryPoint::LetPetSleep, pet.id)).await;
    ctx.advance_time(5_000);

    // when: wake then feed as one atomic submission
    let tx = Transaction::new()
        .call(
            EntryPoint::WakeUpPet,
            vec![CallArg::Object(pet.id), CallArg::Object(ObjectId::zeroed())],
        )
        .call(EntryPoint::FeedPet, vec![CallArg::Object(pet.id)]);
    let status = execute(&ledger, &alice, tx).await;

    // then
    assert_eq!(status, TxStatus::Success);
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert!(!after.is_sleeping);
    assert_eq!(after.game_data.coins, pet.game_data.coins - 5);
}
