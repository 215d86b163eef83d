#![allow(non_snake_case)]
use tamagosui_chain::{
    ledger::{
        Ledger,
        Signer,
        TxStatus,
    },
    local::{
        E_NOT_ENOUGH_COINS,
        E_PET_IS_ASLEEP,
        E_PET_TOO_HUNGRY,
        LocalLedger,
    },
    signer::KeySigner,
    test_helpers::TestContext,
    tx::{
        CallArg,
        EntryPoint,
        Transaction,
    },
    types::{
        GameBalance,
        ObjectId,
        Pet,
    },
};

async fn execute(ledger: &LocalLedger, signer: &KeySigner, tx: Transaction) -> TxStatus {
    let signed = signer.sign(tx).unwrap();
    let digest = ledger.submit(signed).await.unwrap();
    ledger.wait_for_confirmation(&digest).await.unwrap()
}

async fn adopt(ledger: &LocalLedger, signer: &KeySigner, name: &str) -> Pet {
    let tx = Transaction::single(EntryPoint::AdoptPet, vec![CallArg::Str(name.into())]);
    assert_eq!(execute(ledger, signer, tx).await, TxStatus::Success);
    ledger.owned_pet(&signer.address()).await.unwrap().unwrap()
}

fn pet_call(entry: EntryPoint, pet: ObjectId) -> Transaction {
    Transaction::single(entry, vec![CallArg::Object(pet)])
}

#[tokio::test]
async fn feed_pet__spends_coins_and_raises_hunger_and_experience() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    let before = adopt(&ledger, &alice, "Ron").await;
    let balance = GameBalance::default();

    // when
    let status = execute(&ledger, &alice, pet_call(EntryPoint::FeedPet, before.id)).await;

    // then
    assert_eq!(status, TxStatus::Success);
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(
        after.game_data.coins,
        before.game_data.coins - balance.feed_coins_cost
    );
    assert_eq!(
        after.stats.hunger as u64,
        before.stats.hunger as u64 + balance.feed_hunger_gain
    );
    assert_eq!(
        after.game_data.experience,
        before.game_data.experience + balance.feed_experience_gain
    );
}

#[tokio::test]
async fn feed_pet__fails_without_coins_and_leaves_pet_untouched() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    // one meal costs the whole starting purse
    ledger.set_balance(GameBalance {
        feed_coins_cost: 20,
        ..GameBalance::default()
    });
    let alice = ctx.alice();
    let pet = adopt(&ledger, &alice, "Ron").await;

    let status = execute(&ledger, &alice, pet_call(EntryPoint::FeedPet, pet.id)).await;
    assert_eq!(status, TxStatus::Success);
    let before = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();

    // when
    let status = execute(&ledger, &alice, pet_call(EntryPoint::FeedPet, pet.id)).await;

    // then
    assert_eq!(
        status,
        TxStatus::Failure {
            error: E_NOT_ENOUGH_COINS.to_string()
        }
    );
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn play_with_pet__fails_when_too_hungry() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    let pet = adopt(&ledger, &alice, "Ron").await;

    // burn hunger below the play threshold: 40 - 2*15 = 10 < 15
    for _ in 0..2 {
        let status =
            execute(&ledger, &alice, pet_call(EntryPoint::PlayWithPet, pet.id)).await;
        assert_eq!(status, TxStatus::Success);
    }

    // when
    let status = execute(&ledger, &alice, pet_call(EntryPoint::PlayWithPet, pet.id)).await;

    // then
    assert_eq!(
        status,
        TxStatus::Failure {
            error: E_PET_TOO_HUNGRY.to_string()
        }
    );
}

#[tokio::test]
async fn care_actions__fail_while_pet_is_sleeping() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    let pet = adopt(&ledger, &alice, "Ron").await;
    let status = execute(&ledger, &alice, pet_call(EntryPoint::LetPetSleep, pet.id)).await;
    assert_eq!(status, TxStatus::Success);

    for entry in [
        EntryPoint::FeedPet,
        EntryPoint::PlayWithPet,
        EntryPoint::WorkForCoins,
        EntryPoint::Exercise,
        EntryPoint::Study,
        EntryPoint::Rest,
    ] {
        // when
        let status = execute(&ledger, &alice, pet_call(entry, pet.id)).await;

        // then
        assert_eq!(
            status,
            TxStatus::Failure {
                error: E_PET_IS_ASLEEP.to_string()
            },
            "{entry:?} should be rejected while sleeping"
        );
    }
}

#[tokio::test]
async fn bundled_calls__roll_back_atomically_when_a_later_call_fails() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    let pet = adopt(&ledger, &alice, "Ron").await;
    let before = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();

    // feed succeeds on its own, but the bundled level-up cannot (0 exp), so
    // the whole transaction must leave no trace
    let tx = Transaction::new()
        .call(EntryPoint::FeedPet, vec![CallArg::Object(pet.id)])
        .call(EntryPoint::CheckAndLevelUp, vec![CallArg::Object(pet.id)]);

    // when
    let status = execute(&ledger, &alice, tx).await;

    // then
    assert!(matches!(status, TxStatus::Failure { .. }));
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn check_and_level_up__consumes_threshold_experience() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    ledger.set_balance(GameBalance {
        exp_per_level: 10,
        feed_experience_gain: 10,
        ..GameBalance::default()
    });
    let alice = ctx.alice();
    let pet = adopt(&ledger, &alice, "Ron").await;

    let status = execute(&ledger, &alice, pet_call(EntryPoint::FeedPet, pet.id)).await;
    assert_eq!(status, TxStatus::Success);

    // when
    let status =
        execute(&ledger, &alice, pet_call(EntryPoint::CheckAndLevelUp, pet.id)).await;

    // then
    assert_eq!(status, TxStatus::Success);
    let after = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(after.game_data.level, 2);
    assert_eq!(after.game_data.experience, 0);
}
