use crate::app::DashboardSnapshot;
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEventKind,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use itertools::Itertools;
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::stdout;
use tamagosui_chain::types::{
    AccessoryKind,
    ObjectId,
};
use tamagosui_client::rules;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

pub enum UserEvent {
    Quit,
    Redraw,
    RefreshNow,
    Adopt { name: String },
    Feed,
    Play,
    Work,
    Exercise,
    Study,
    Rest,
    Sleep,
    Wake,
    LevelUp,
    Evolve,
    ComboCare,
    MorningRoutine,
    MintAndEquip(AccessoryKind),
    Equip { accessory: ObjectId, kind: AccessoryKind },
    Unequip(AccessoryKind),
    ListPet { price: u64 },
    ListAccessory { accessory: ObjectId, price: u64 },
    CancelPetListing { listing: ObjectId },
    CancelAccessoryListing { listing: ObjectId },
    BuyAccessory { listing: ObjectId, price: u64 },
}

#[derive(Clone, Debug)]
struct ListingRow {
    id: ObjectId,
    label: String,
    price: u64,
    mine: bool,
}

pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
    // caches of the last drawn snapshot, for modal selections
    owned_accessories: Vec<(ObjectId, String, AccessoryKind)>,
    pet_listing_rows: Vec<ListingRow>,
    accessory_listing_rows: Vec<ListingRow>,
    has_pet: bool,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            terminal: None,
            owned_accessories: Vec::new(),
            pet_listing_rows: Vec::new(),
            accessory_listing_rows: Vec::new(),
            has_pet: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Mode {
    #[default]
    Normal,
    AdoptModal(AdoptState),
    PetPriceModal(PriceState),
    AccessoryListModal(AccessoryListState),
    WardrobeModal(WardrobeState),
    MarketModal(MarketState),
    QuitModal,
}

#[derive(Clone, Debug, Default)]
struct AdoptState {
    name: String,
}

#[derive(Clone, Debug)]
struct PriceState {
    price: u64,
}

impl Default for PriceState {
    fn default() -> Self {
        PriceState { price: 1 }
    }
}

#[derive(Clone, Debug)]
struct AccessoryListState {
    idx: usize,
    price: u64,
}

impl Default for AccessoryListState {
    fn default() -> Self {
        AccessoryListState { idx: 0, price: 1 }
    }
}

#[derive(Clone, Debug, Default)]
struct WardrobeState {
    idx: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum MarketTab {
    #[default]
    Pets,
    Accessories,
}

#[derive(Clone, Debug, Default)]
struct MarketState {
    tab: MarketTab,
    idx: usize,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<Event>;

/// Pump crossterm events from a blocking reader thread into the async loop.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    events
        .recv()
        .await
        .ok_or_else(|| eyre!("input event stream closed"))
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &DashboardSnapshot) -> Result<()> {
    // cache the rows modal interactions index into
    state.owned_accessories = snap
        .owned_accessories
        .iter()
        .map(|accessory| (accessory.id, accessory.name.clone(), accessory.kind))
        .collect();
    state.pet_listing_rows = snap
        .pet_listings
        .iter()
        .map(|listing| ListingRow {
            id: listing.id,
            label: listing
                .pet
                .as_ref()
                .map(|pet| format!("{} (lvl {})", pet.name, pet.game_data.level))
                .unwrap_or_else(|| "<unknown>".to_string()),
            price: listing.price,
            mine: Some(listing.seller) == snap.address,
        })
        .collect();
    state.accessory_listing_rows = snap
        .accessory_listings
        .iter()
        .map(|listing| ListingRow {
            id: listing.id,
            label: listing
                .accessory
                .as_ref()
                .map(|accessory| accessory.name.clone())
                .unwrap_or_else(|| "<unknown>".to_string()),
            price: listing.price,
            mine: Some(listing.seller) == snap.address,
        })
        .collect();
    state.has_pet = snap.pet.is_some();

    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Translate a raw terminal event into a user intent, driving modal state on
/// the way. `None` means "nothing to do".
pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let Event::Key(key) = event else {
        return Some(UserEvent::Redraw);
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match &mut state.mode {
        Mode::QuitModal => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::AdoptModal(adopt) => match key.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let name = adopt.name.trim().to_string();
                if name.is_empty() {
                    return Some(UserEvent::Redraw);
                }
                state.mode = Mode::Normal;
                Some(UserEvent::Adopt { name })
            }
            KeyCode::Backspace => {
                adopt.name.pop();
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) if adopt.name.width() < 24 => {
                adopt.name.push(c);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::PetPriceModal(price) => match key.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let chosen = price.price.max(1);
                state.mode = Mode::Normal;
                Some(UserEvent::ListPet { price: chosen })
            }
            KeyCode::Backspace => {
                price.price /= 10;
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let d = c.to_digit(10).unwrap_or(0) as u64;
                price.price = price.price.saturating_mul(10).saturating_add(d);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::AccessoryListModal(list) => match key.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                list.idx = list.idx.saturating_sub(1);
                Some(UserEvent::Redraw)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = state.owned_accessories.len().saturating_sub(1);
                list.idx = (list.idx + 1).min(max);
                Some(UserEvent::Redraw)
            }
            KeyCode::Backspace => {
                list.price /= 10;
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let d = c.to_digit(10).unwrap_or(0) as u64;
                list.price = list.price.saturating_mul(10).saturating_add(d);
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let selected = state.owned_accessories.get(list.idx).cloned();
                let price = list.price.max(1);
                state.mode = Mode::Normal;
                selected.map(|(accessory, _, _)| UserEvent::ListAccessory {
                    accessory,
                    price,
                })
            }
            _ => None,
        },
        Mode::WardrobeModal(wardrobe) => match key.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                wardrobe.idx = wardrobe.idx.saturating_sub(1);
                Some(UserEvent::Redraw)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = state.owned_accessories.len().saturating_sub(1);
                wardrobe.idx = (wardrobe.idx + 1).min(max);
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let selected = state.owned_accessories.get(wardrobe.idx).cloned();
                state.mode = Mode::Normal;
                selected.map(|(accessory, _, kind)| UserEvent::Equip { accessory, kind })
            }
            KeyCode::Char('1') => {
                state.mode = Mode::Normal;
                Some(UserEvent::Unequip(AccessoryKind::Glasses))
            }
            KeyCode::Char('2') => {
                state.mode = Mode::Normal;
                Some(UserEvent::Unequip(AccessoryKind::Hat))
            }
            KeyCode::Char('3') => {
                state.mode = Mode::Normal;
                Some(UserEvent::Unequip(AccessoryKind::Toy))
            }
            _ => None,
        },
        Mode::MarketModal(market) => {
            let rows = match market.tab {
                MarketTab::Pets => &state.pet_listing_rows,
                MarketTab::Accessories => &state.accessory_listing_rows,
            };
            match key.code {
                KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                    market.tab = match market.tab {
                        MarketTab::Pets => MarketTab::Accessories,
                        MarketTab::Accessories => MarketTab::Pets,
                    };
                    market.idx = 0;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    market.idx = market.idx.saturating_sub(1);
                    Some(UserEvent::Redraw)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let max = rows.len().saturating_sub(1);
                    market.idx = (market.idx + 1).min(max);
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char('x') => {
                    let row = rows.get(market.idx)?;
                    if !row.mine {
                        return Some(UserEvent::Redraw);
                    }
                    let listing = row.id;
                    let tab = market.tab;
                    state.mode = Mode::Normal;
                    Some(match tab {
                        MarketTab::Pets => UserEvent::CancelPetListing { listing },
                        MarketTab::Accessories => {
                            UserEvent::CancelAccessoryListing { listing }
                        }
                    })
                }
                KeyCode::Char('b') => {
                    if market.tab != MarketTab::Accessories {
                        return Some(UserEvent::Redraw);
                    }
                    let row = rows.get(market.idx)?;
                    if row.mine {
                        return Some(UserEvent::Redraw);
                    }
                    let (listing, price) = (row.id, row.price);
                    state.mode = Mode::Normal;
                    Some(UserEvent::BuyAccessory { listing, price })
                }
                _ => None,
            }
        }
        Mode::Normal => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                state.mode = Mode::QuitModal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('a') if !state.has_pet => {
                state.mode = Mode::AdoptModal(AdoptState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('f') => Some(UserEvent::Feed),
            KeyCode::Char('p') => Some(UserEvent::Play),
            KeyCode::Char('w') => Some(UserEvent::Work),
            KeyCode::Char('e') => Some(UserEvent::Exercise),
            KeyCode::Char('s') => Some(UserEvent::Study),
            KeyCode::Char('r') => Some(UserEvent::Rest),
            KeyCode::Char('z') => Some(UserEvent::Sleep),
            KeyCode::Char('k') => Some(UserEvent::Wake),
            KeyCode::Char('u') => Some(UserEvent::LevelUp),
            KeyCode::Char('v') => Some(UserEvent::Evolve),
            KeyCode::Char('c') => Some(UserEvent::ComboCare),
            KeyCode::Char('m') => Some(UserEvent::MorningRoutine),
            KeyCode::Char('1') => Some(UserEvent::MintAndEquip(AccessoryKind::Glasses)),
            KeyCode::Char('2') => Some(UserEvent::MintAndEquip(AccessoryKind::Hat)),
            KeyCode::Char('3') => Some(UserEvent::MintAndEquip(AccessoryKind::Toy)),
            KeyCode::Char('t') => {
                state.mode = Mode::WardrobeModal(WardrobeState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('g') => {
                state.mode = Mode::MarketModal(MarketState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('l') if state.has_pet => {
                state.mode = Mode::PetPriceModal(PriceState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('o') => {
                state.mode = Mode::AccessoryListModal(AccessoryListState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('.') => Some(UserEvent::RefreshNow),
            _ => None,
        },
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &DashboardSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // wallet + network
            Constraint::Length(10), // pet card
            Constraint::Min(8),     // wardrobe + marketplace
            Constraint::Length(5),  // status + errors
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_header(f, chunks[0], snap);
    draw_pet_card(f, chunks[1], snap);
    draw_middle(f, chunks[2], snap);
    draw_status(f, chunks[3], snap);
    draw_help(f, chunks[4], snap);
    draw_modals(f, state, snap);
}

fn draw_header(f: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let wallet = match snap.address {
        Some(address) => short_hex(&address.to_string()),
        None => "<watch-only>".to_string(),
    };
    let pending = snap
        .pending
        .map(|label| format!(" | busy: {label}"))
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled("TAMAGOSUI ", Style::default().bold().fg(Color::Magenta)),
        Span::raw(format!("net: {} | wallet: {}{}", snap.network, wallet, pending)),
    ]);
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_pet_card(f: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let block = Block::default().borders(Borders::ALL).title(" Pet ");
    let Some(pet) = &snap.pet else {
        let hint = if snap.watch_only {
            "No pet to show. Connect a wallet to adopt one."
        } else {
            "No pet yet. Press 'a' to adopt one!"
        };
        f.render_widget(Paragraph::new(hint).block(block), area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    let sleeping_tag = if pet.is_sleeping { "  [sleeping]" } else { "" };
    let equipped = snap
        .equipped
        .iter()
        .map(|(kind, accessory)| format!("{}: {}", kind.label(), accessory.name))
        .join(", ");
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}{}", pet.name, sleeping_tag),
            Style::default().bold(),
        )),
        Line::from(format!(
            "Level {} | {} xp | {}",
            pet.game_data.level,
            pet.game_data.experience,
            pet.personality.label()
        )),
        Line::from(format!("Coins: {}", pet.game_data.coins)),
        Line::from(format!(
            "Wearing: {}",
            if equipped.is_empty() {
                "nothing"
            } else {
                equipped.as_str()
            }
        )),
    ];
    if pet.is_sleeping && let Some(balance) = &snap.balance {
        let energy_per_second = 1_000.0 / balance.sleep_energy_gain_ms.max(1) as f64;
        let hunger_per_second = 1_000.0 / balance.sleep_hunger_loss_ms.max(1) as f64;
        lines.push(Line::from(format!(
            "+{energy_per_second:.1} energy/s  -{hunger_per_second:.1} hunger/s"
        )));
    }
    f.render_widget(Paragraph::new(lines), cols[0]);

    let max_stat = snap
        .balance
        .as_ref()
        .map(|balance| balance.max_stat)
        .unwrap_or(100) as f64;
    let (energy, happiness, hunger) = match snap.display_stats {
        Some(stats) => (stats.energy, stats.happiness, stats.hunger),
        None => (
            pet.stats.energy as f64,
            pet.stats.happiness as f64,
            pet.stats.hunger as f64,
        ),
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(cols[1]);
    draw_stat_gauge(f, rows[0], "Energy", energy, max_stat, Color::Green);
    draw_stat_gauge(f, rows[1], "Happiness", happiness, max_stat, Color::Magenta);
    draw_stat_gauge(f, rows[2], "Hunger", hunger, max_stat, Color::Yellow);
}

fn draw_stat_gauge(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: f64,
    max: f64,
    color: Color,
) {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::default().title(label))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(format!("{value:.0}/{max:.0}"));
    f.render_widget(gauge, area);
}

fn draw_middle(f: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let accessories: Vec<ListItem> = if snap.owned_accessories.is_empty() {
        vec![ListItem::new("  (none)")]
    } else {
        snap.owned_accessories
            .iter()
            .map(|accessory| {
                ListItem::new(format!(
                    "  {} [{}]",
                    truncate(&accessory.name, 24),
                    accessory.kind.label()
                ))
            })
            .collect()
    };
    f.render_widget(
        List::new(accessories)
            .block(Block::default().borders(Borders::ALL).title(" Inventory ")),
        cols[0],
    );

    f.render_widget(
        listing_list(&snap_pet_rows(snap), " Pet Listings "),
        cols[1],
    );
    f.render_widget(
        listing_list(&snap_accessory_rows(snap), " Accessory Listings "),
        cols[2],
    );
}

fn snap_pet_rows(snap: &DashboardSnapshot) -> Vec<String> {
    snap.pet_listings
        .iter()
        .map(|listing| {
            let name = listing
                .pet
                .as_ref()
                .map(|pet| truncate(&pet.name, 16))
                .unwrap_or_else(|| "<unknown>".to_string());
            let mine = if Some(listing.seller) == snap.address {
                " (yours)"
            } else {
                ""
            };
            format!("  {} - {} coins{}", name, listing.price, mine)
        })
        .collect()
}

fn snap_accessory_rows(snap: &DashboardSnapshot) -> Vec<String> {
    snap.accessory_listings
        .iter()
        .map(|listing| {
            let name = listing
                .accessory
                .as_ref()
                .map(|accessory| truncate(&accessory.name, 16))
                .unwrap_or_else(|| "<unknown>".to_string());
            let mine = if Some(listing.seller) == snap.address {
                " (yours)"
            } else {
                ""
            };
            format!("  {} - {} coins{}", name, listing.price, mine)
        })
        .collect()
}

fn listing_list<'a>(rows: &[String], title: &'a str) -> List<'a> {
    let items: Vec<ListItem> = if rows.is_empty() {
        vec![ListItem::new("  No active listings.")]
    } else {
        rows.iter().map(|row| ListItem::new(row.clone())).collect()
    };
    List::new(items).block(Block::default().borders(Borders::ALL).title(title))
}

fn draw_status(f: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let mut lines = vec![Line::from(Span::styled(
        snap.status.clone(),
        Style::default().fg(Color::Cyan),
    ))];
    for error in snap.errors.iter().rev().take(3) {
        lines.push(Line::from(Span::styled(
            truncate(error, area.width.saturating_sub(2) as usize),
            Style::default().fg(Color::Red),
        )));
    }
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Status ")),
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect, snap: &DashboardSnapshot) {
    let help = match &snap.pet {
        None => "a adopt | g market | . refresh | q quit".to_string(),
        Some(pet) if pet.is_sleeping => {
            "k wake | m morning routine | g market | q quit".to_string()
        }
        Some(_) => {
            let mut keys = vec!["f feed", "p play", "w work", "e exercise", "s study"];
            keys.extend(["r rest", "z sleep", "c combo", "u level", "v evolve"]);
            keys.extend(["1/2/3 mint", "t wardrobe", "l list pet", "o list acc"]);
            keys.extend(["g market", "q quit"]);
            keys.join(" | ")
        }
    };
    f.render_widget(
        Paragraph::new(help).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_modals(f: &mut Frame, state: &UiState, snap: &DashboardSnapshot) {
    match &state.mode {
        Mode::Normal => {}
        Mode::QuitModal => {
            popup(f, 30, 5, " Quit? ", vec![Line::from("y to quit, n to stay")]);
        }
        Mode::AdoptModal(adopt) => {
            popup(
                f,
                44,
                6,
                " Adopt a pet ",
                vec![
                    Line::from("Name your pet and press Enter:"),
                    Line::from(Span::styled(
                        format!("> {}_", adopt.name),
                        Style::default().bold(),
                    )),
                ],
            );
        }
        Mode::PetPriceModal(price) => {
            popup(
                f,
                44,
                6,
                " List pet ",
                vec![
                    Line::from("Type a price in coins, Enter to list:"),
                    Line::from(Span::styled(
                        format!("> {}_", price.price),
                        Style::default().bold(),
                    )),
                ],
            );
        }
        Mode::AccessoryListModal(list) => {
            let mut lines = vec![Line::from("j/k select, digits set price, Enter lists:")];
            for (i, (_, name, kind)) in state.owned_accessories.iter().enumerate() {
                let marker = if i == list.idx { ">" } else { " " };
                lines.push(Line::from(format!(
                    "{marker} {} [{}]",
                    truncate(name, 24),
                    kind.label()
                )));
            }
            lines.push(Line::from(format!("price: {}", list.price)));
            popup(f, 48, (lines.len() + 2) as u16, " List accessory ", lines);
        }
        Mode::WardrobeModal(wardrobe) => {
            let mut lines =
                vec![Line::from("Enter equips selection, 1/2/3 unequips slot:")];
            for (i, (_, name, kind)) in state.owned_accessories.iter().enumerate() {
                let marker = if i == wardrobe.idx { ">" } else { " " };
                lines.push(Line::from(format!(
                    "{marker} {} [{}]",
                    truncate(name, 24),
                    kind.label()
                )));
            }
            if state.owned_accessories.is_empty() {
                lines.push(Line::from("  (no loose accessories)"));
            }
            lines.push(Line::from(format!(
                "equipped: {}",
                snap.equipped
                    .iter()
                    .map(|(kind, accessory)| format!("{} {}", kind.label(), accessory.name))
                    .join(", ")
            )));
            popup(f, 52, (lines.len() + 2) as u16, " Wardrobe ", lines);
        }
        Mode::MarketModal(market) => {
            let (rows, title) = match market.tab {
                MarketTab::Pets => (&state.pet_listing_rows, " Market: pets "),
                MarketTab::Accessories => {
                    (&state.accessory_listing_rows, " Market: accessories ")
                }
            };
            let mut lines =
                vec![Line::from("Tab switches, x cancels yours, b buys:")];
            for (i, row) in rows.iter().enumerate() {
                let marker = if i == market.idx { ">" } else { " " };
                let mine = if row.mine { " (yours)" } else { "" };
                lines.push(Line::from(format!(
                    "{marker} {} - {} coins{}",
                    truncate(&row.label, 24),
                    row.price,
                    mine
                )));
            }
            if rows.is_empty() {
                lines.push(Line::from("  No active listings."));
            }
            popup(f, 56, (lines.len() + 2) as u16, title, lines);
        }
    }
}

fn popup(f: &mut Frame, width: u16, height: u16, title: &str, lines: Vec<Line>) {
    let area = centered_rect(f.area(), width, height);
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn short_hex(raw: &str) -> String {
    if raw.len() <= 12 {
        return raw.to_string();
    }
    format!("{}..{}", &raw[..8], &raw[raw.len() - 4..])
}

fn truncate(raw: &str, max_width: usize) -> String {
    if raw.width() <= max_width {
        return raw.to_string();
    }
    let mut out = String::new();
    for ch in raw.chars() {
        if out.width() + 1 >= max_width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

/// Whether the action key should currently be considered live; mirrors the
/// button disabling on the web dashboard.
pub fn action_enabled(snap: &DashboardSnapshot, event: &UserEvent) -> bool {
    if snap.pending.is_some() {
        return false;
    }
    let Some(pet) = &snap.pet else {
        return matches!(
            event,
            UserEvent::Adopt { .. }
                | UserEvent::RefreshNow
                | UserEvent::Quit
                | UserEvent::Redraw
        );
    };
    let Some(balance) = &snap.balance else {
        return false;
    };
    match event {
        UserEvent::Feed => rules::can_feed(pet, balance),
        UserEvent::Play => rules::can_play(pet, balance),
        UserEvent::Work => rules::can_work(pet, balance),
        UserEvent::Exercise => rules::can_exercise(pet, balance),
        UserEvent::Study => rules::can_study(pet, balance),
        UserEvent::Rest => rules::can_rest(pet, balance),
        UserEvent::LevelUp => rules::can_level_up(pet, balance),
        UserEvent::Evolve => rules::can_evolve(pet, balance),
        UserEvent::ComboCare => rules::can_combo_care(pet, balance),
        UserEvent::Sleep => !pet.is_sleeping,
        UserEvent::Wake | UserEvent::MorningRoutine => pet.is_sleeping,
        UserEvent::MintAndEquip(_) | UserEvent::Equip { .. } | UserEvent::Unequip(_) => {
            !pet.is_sleeping
        }
        UserEvent::Adopt { .. } => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn truncate__keeps_short_strings_untouched() {
        assert_eq!(truncate("Ron", 10), "Ron");
    }

    #[test]
    fn truncate__appends_ellipsis_when_cutting() {
        let cut = truncate("a very long accessory name", 8);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 8);
    }

    #[test]
    fn short_hex__compresses_long_ids() {
        let raw = format!("0x{}", "ab".repeat(32));
        let short = short_hex(&raw);
        assert!(short.len() < raw.len());
        assert!(short.starts_with("0x"));
    }
}
