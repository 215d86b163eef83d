use crate::ui::{
    self,
    UserEvent,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use std::time::Duration;
use tamagosui_chain::{
    ledger::Ledger,
    signer::KeySigner,
    types::{
        Accessory,
        AccessoryKind,
        AccessoryListing,
        Address,
        GameBalance,
        Pet,
        PetListing,
    },
};
use tamagosui_client::{
    actions::AppController,
    sleep::{
        DisplayStats,
        SleepTicker,
    },
};
use tokio::{
    sync::{
        mpsc,
        watch,
    },
    time,
};
use tracing::warn;

const READ_VIEW_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Everything one frame of the dashboard needs, cloned out of the query
/// cache so drawing never holds the cache lock.
#[derive(Clone, Debug)]
pub struct DashboardSnapshot {
    pub address: Option<Address>,
    pub watch_only: bool,
    pub network: String,
    pub pet: Option<Pet>,
    pub display_stats: Option<DisplayStats>,
    pub balance: Option<GameBalance>,
    pub owned_accessories: Vec<Accessory>,
    pub equipped: Vec<(AccessoryKind, Accessory)>,
    pub pet_listings: Vec<PetListing>,
    pub accessory_listings: Vec<AccessoryListing>,
    pub pending: Option<&'static str>,
    pub status: String,
    pub errors: Vec<String>,
}

enum RefreshCommand {
    FetchNow,
    Shutdown,
}

pub async fn run_app<L>(
    controller: AppController<L, KeySigner>,
    network: String,
    watch_only: bool,
) -> Result<()>
where
    L: Ledger + Clone + Send + Sync + 'static,
{
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("starting dashboard");
    ui::terminal_enter(&mut ui_state)?;
    let result = run_loop(
        controller,
        &mut ui_state,
        &mut input_events,
        network,
        watch_only,
    )
    .await;
    ui::terminal_exit()?;
    result
}

/// Periodically re-fetches whatever views are stale, and on demand when a
/// confirmed action just invalidated something.
async fn refresh_worker<L>(
    controller: AppController<L, KeySigner>,
    mut commands: mpsc::UnboundedReceiver<RefreshCommand>,
    refreshed: mpsc::UnboundedSender<()>,
) -> Result<()>
where
    L: Ledger + Clone + Send + Sync + 'static,
{
    let mut ticker = time::interval(READ_VIEW_POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = controller.refresh_stale().await {
                    warn!(?err, "read-view refresh failed");
                }
                if refreshed.send(()).is_err() {
                    break;
                }
            }
            command = commands.recv() => {
                match command {
                    Some(RefreshCommand::FetchNow) => {
                        if let Err(err) = controller.refresh_stale().await {
                            warn!(?err, "read-view refresh failed");
                        }
                        if refreshed.send(()).is_err() {
                            break;
                        }
                    }
                    Some(RefreshCommand::Shutdown) | None => break,
                }
            }
        }
    }
    Ok(())
}

async fn run_loop<L>(
    controller: AppController<L, KeySigner>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
    network: String,
    watch_only: bool,
) -> Result<()>
where
    L: Ledger + Clone + Send + Sync + 'static,
{
    if let Err(err) = controller.refresh_stale().await {
        warn!(?err, "initial read-view fetch failed");
    }

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (refreshed_tx, mut refreshed_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(refresh_worker(controller.clone(), command_rx, refreshed_tx));

    let mut sleep_ticker: Option<SleepTicker> = None;
    let mut sleep_rx: Option<watch::Receiver<DisplayStats>> = None;
    let mut display_stats: Option<DisplayStats> = None;

    let mut snapshot = build_snapshot(&controller, &network, watch_only, display_stats);
    manage_sleep_ticker(
        &snapshot,
        &mut sleep_ticker,
        &mut sleep_rx,
        &mut display_stats,
    );
    ui::draw(ui_state, &snapshot)?;

    loop {
        tokio::select! {
            refreshed = refreshed_rx.recv() => {
                if refreshed.is_none() {
                    warn!("refresh worker channel closed");
                    break;
                }
            }
            stats = next_sleep_tick(&mut sleep_rx) => {
                match stats {
                    Some(stats) => display_stats = Some(stats),
                    None => sleep_rx = None,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            raw = ui::next_raw_event(input_events) => {
                let event = raw?;
                let Some(user_event) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match user_event {
                    UserEvent::Quit => break,
                    UserEvent::Redraw => {}
                    UserEvent::RefreshNow => {
                        let _ = command_tx.send(RefreshCommand::FetchNow);
                    }
                    action => {
                        if !ui::action_enabled(&snapshot, &action) {
                            controller.set_status("That action is not available right now");
                        } else {
                            dispatch(&controller, &snapshot, action).await;
                            let _ = command_tx.send(RefreshCommand::FetchNow);
                        }
                    }
                }
            }
        }

        snapshot = build_snapshot(&controller, &network, watch_only, display_stats);
        manage_sleep_ticker(
            &snapshot,
            &mut sleep_ticker,
            &mut sleep_rx,
            &mut display_stats,
        );
        snapshot.display_stats = display_stats;
        ui::draw(ui_state, &snapshot).wrap_err("drawing dashboard failed")?;
    }

    let _ = command_tx.send(RefreshCommand::Shutdown);
    match worker.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err).wrap_err("refresh worker failed"),
        Err(err) => Err(eyre!(err)).wrap_err("refresh worker panicked"),
    }
}

/// Resolves once the sleep simulation publishes a tick; pends forever while
/// no ticker is running so the select arm stays quiet.
async fn next_sleep_tick(
    rx: &mut Option<watch::Receiver<DisplayStats>>,
) -> Option<DisplayStats> {
    match rx {
        Some(receiver) => match receiver.changed().await {
            Ok(()) => Some(*receiver.borrow()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

/// Keep the simulation task in lockstep with the sleeping flag: spawn it on
/// the sleep transition, drop it (aborting the timer) when sleep ends. The
/// extrapolated stats are discarded as soon as the authoritative view says
/// the pet is awake.
fn manage_sleep_ticker(
    snapshot: &DashboardSnapshot,
    ticker: &mut Option<SleepTicker>,
    rx: &mut Option<watch::Receiver<DisplayStats>>,
    display: &mut Option<DisplayStats>,
) {
    let sleeping = snapshot.pet.as_ref().is_some_and(|pet| pet.is_sleeping);
    if sleeping {
        if ticker.is_none()
            && let (Some(pet), Some(balance)) = (&snapshot.pet, &snapshot.balance)
        {
            let initial = DisplayStats::from_stats(&pet.stats);
            let (task, receiver) = SleepTicker::spawn(initial, balance.clone());
            *ticker = Some(task);
            *rx = Some(receiver);
            *display = Some(initial);
        }
    } else if ticker.is_some() || display.is_some() {
        *ticker = None;
        *rx = None;
        *display = None;
    }
}

fn build_snapshot<L>(
    controller: &AppController<L, KeySigner>,
    network: &str,
    watch_only: bool,
    display_stats: Option<DisplayStats>,
) -> DashboardSnapshot
where
    L: Ledger,
{
    let address = controller.address();
    let status = controller.status();
    let errors = controller.errors();
    let pending = controller.pending_action();
    controller.read_views(|views| DashboardSnapshot {
        address,
        watch_only,
        network: network.to_string(),
        pet: views.owned_pet().cloned().flatten(),
        display_stats,
        balance: views.game_balance().cloned(),
        owned_accessories: views.owned_accessories().cloned().unwrap_or_default(),
        equipped: views.equipped().cloned().unwrap_or_default(),
        pet_listings: views.pet_listings().cloned().unwrap_or_default(),
        accessory_listings: views.accessory_listings().cloned().unwrap_or_default(),
        pending,
        status,
        errors,
    })
}

/// Route a user intent to its mutation wrapper. Failures are already
/// recorded on the controller's status feed; they only get a log line here.
async fn dispatch<L>(
    controller: &AppController<L, KeySigner>,
    snapshot: &DashboardSnapshot,
    event: UserEvent,
) where
    L: Ledger + Clone + Send + Sync + 'static,
{
    let pet_id = snapshot.pet.as_ref().map(|pet| pet.id);
    let can_level = match (&snapshot.pet, &snapshot.balance) {
        (Some(pet), Some(balance)) => {
            tamagosui_client::rules::can_level_up(pet, balance)
        }
        _ => false,
    };

    let result = match event {
        UserEvent::Adopt { name } => controller.adopt(&name).await,
        UserEvent::Feed => {
            let Some(id) = pet_id else { return };
            controller.feed(id).await
        }
        UserEvent::Play => {
            let Some(id) = pet_id else { return };
            controller.play(id).await
        }
        UserEvent::Work => {
            let Some(id) = pet_id else { return };
            controller.work(id).await
        }
        UserEvent::Exercise => {
            let Some(id) = pet_id else { return };
            controller.exercise(id).await
        }
        UserEvent::Study => {
            let Some(id) = pet_id else { return };
            controller.study(id).await
        }
        UserEvent::Rest => {
            let Some(id) = pet_id else { return };
            controller.rest(id).await
        }
        UserEvent::Sleep => {
            let Some(id) = pet_id else { return };
            controller.sleep(id).await
        }
        UserEvent::Wake => {
            let Some(id) = pet_id else { return };
            controller.wake(id).await
        }
        UserEvent::LevelUp => {
            let Some(id) = pet_id else { return };
            controller.check_level_up(id).await
        }
        UserEvent::Evolve => {
            let Some(id) = pet_id else { return };
            controller.try_evolve(id).await
        }
        UserEvent::ComboCare => {
            let Some(id) = pet_id else { return };
            controller.combo_care(id, can_level).await
        }
        UserEvent::MorningRoutine => {
            let Some(id) = pet_id else { return };
            controller.morning_routine(id, true).await
        }
        UserEvent::MintAndEquip(kind) => match pet_id {
            Some(id) => controller.mint_and_equip(id, kind).await,
            None => controller.mint(kind).await,
        },
        UserEvent::Equip { accessory, kind } => {
            let Some(id) = pet_id else { return };
            controller.equip(id, accessory, kind).await
        }
        UserEvent::Unequip(kind) => {
            let Some(id) = pet_id else { return };
            controller.unequip(id, kind).await
        }
        UserEvent::ListPet { price } => {
            let Some(id) = pet_id else { return };
            controller.list_pet(id, price).await
        }
        UserEvent::ListAccessory { accessory, price } => {
            controller.list_accessory(accessory, price).await
        }
        UserEvent::CancelPetListing { listing } => {
            controller.cancel_pet_listing(listing).await
        }
        UserEvent::CancelAccessoryListing { listing } => {
            controller.cancel_accessory_listing(listing).await
        }
        UserEvent::BuyAccessory { listing, price } => {
            controller.buy_accessory(listing, price).await
        }
        UserEvent::Quit | UserEvent::Redraw | UserEvent::RefreshNow => return,
    };

    if let Err(err) = result {
        warn!(%err, "action did not complete");
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tamagosui_chain::{
        local::LocalLedger,
        test_helpers::TestContext,
    };

    #[tokio::test]
    async fn build_snapshot__reflects_cached_views_and_wallet() {
        // given
        let ctx = TestContext::new();
        let ledger = ctx.ledger();
        let alice = ctx.alice();
        let controller: AppController<LocalLedger, KeySigner> = AppController::new(
            ledger,
            Some(alice.clone()),
            tamagosui_chain::types::ObjectId::zeroed(),
        );
        controller.adopt("Ron").await.unwrap();
        controller.refresh_stale().await.unwrap();

        // when
        let snapshot = build_snapshot(&controller, "local", false, None);

        // then
        assert_eq!(snapshot.network, "local");
        assert!(snapshot.address.is_some());
        assert_eq!(snapshot.pet.as_ref().unwrap().name, "Ron");
        assert!(snapshot.balance.is_some());
        assert!(!snapshot.watch_only);
    }

    #[tokio::test]
    async fn manage_sleep_ticker__spawns_on_sleep_and_clears_on_wake() {
        let ctx = TestContext::new();
        let ledger = ctx.ledger();
        let alice = ctx.alice();
        let controller: AppController<LocalLedger, KeySigner> = AppController::new(
            ledger,
            Some(alice),
            tamagosui_chain::types::ObjectId::zeroed(),
        );
        controller.adopt("Ron").await.unwrap();
        controller.refresh_stale().await.unwrap();
        let pet_id = controller
            .read_views(|views| views.owned_pet().unwrap().clone())
            .unwrap()
            .id;

        controller.sleep(pet_id).await.unwrap();
        controller.refresh_stale().await.unwrap();

        let snapshot = build_snapshot(&controller, "local", false, None);
        let mut ticker = None;
        let mut rx = None;
        let mut display = None;
        manage_sleep_ticker(&snapshot, &mut ticker, &mut rx, &mut display);
        assert!(ticker.is_some());
        assert!(display.is_some());

        controller.wake(pet_id).await.unwrap();
        controller.refresh_stale().await.unwrap();
        let snapshot = build_snapshot(&controller, "local", false, display);
        manage_sleep_ticker(&snapshot, &mut ticker, &mut rx, &mut display);
        assert!(ticker.is_none());
        assert!(display.is_none());
    }
}
