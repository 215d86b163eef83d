#![allow(non_snake_case)]
use tamagosui_chain::{
    ledger::{
        Ledger,
        Signer,
        TxStatus,
    },
    local::{
        E_ALREADY_ADOPTED,
        LocalLedger,
    },
    signer::KeySigner,
    test_helpers::TestContext,
    tx::{
        CallArg,
        EntryPoint,
        Transaction,
    },
    types::Personality,
};

async fn execute(
    ledger: &LocalLedger,
    signer: &KeySigner,
    tx: Transaction,
) -> TxStatus {
    let signed = signer.sign(tx).unwrap();
    let digest = ledger.submit(signed).await.unwrap();
    ledger.wait_for_confirmation(&digest).await.unwrap()
}

fn adopt_tx(name: &str) -> Transaction {
    Transaction::single(EntryPoint::AdoptPet, vec![CallArg::Str(name.to_string())])
}

#[tokio::test]
async fn adopt_pet__creates_pet_with_given_name_and_awake() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();

    // when
    let status = execute(&ledger, &alice, adopt_tx("Ron")).await;

    // then
    assert_eq!(status, TxStatus::Success);
    let pet = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(pet.name, "Ron");
    assert!(!pet.is_sleeping);
    assert_eq!(pet.game_data.level, 1);
    assert!(matches!(
        pet.personality,
        Personality::Balanced
            | Personality::Athletic
            | Personality::Studious
            | Personality::Lazy
    ));
}

#[tokio::test]
async fn adopt_pet__fails_when_sender_already_has_a_pet() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    execute(&ledger, &alice, adopt_tx("Ron")).await;

    // when
    let status = execute(&ledger, &alice, adopt_tx("Hermione")).await;

    // then
    assert_eq!(
        status,
        TxStatus::Failure {
            error: E_ALREADY_ADOPTED.to_string()
        }
    );
    let pet = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    assert_eq!(pet.name, "Ron");
}

#[tokio::test]
async fn adopt_pet__two_accounts_each_get_their_own_pet() {
    let ctx = TestContext::new();
    let ledger = ctx.ledger();
    let alice = ctx.alice();
    let bob = ctx.bob();

    // when
    execute(&ledger, &alice, adopt_tx("Ron")).await;
    execute(&ledger, &bob, adopt_tx("Errol")).await;

    // then
    let alices = ledger.owned_pet(&alice.address()).await.unwrap().unwrap();
    let bobs = ledger.owned_pet(&bob.address()).await.unwrap().unwrap();
    assert_eq!(alices.name, "Ron");
    assert_eq!(bobs.name, "Errol");
    assert_ne!(alices.id, bobs.id);
}
