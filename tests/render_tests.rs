//! Render smoke tests using RenderHarness.

mod common;

use common::{CHARMANDER, LISTING, START};
use pokedex::action::Action;
use pokedex::config::ClientConfig;
use pokedex::detail::parse_card;
use pokedex::reducer::reducer;
use pokedex::session::Slot;
use pokedex::state::AppState;
use pokedex::ui;
use tui_dispatch::testing::*;

fn browsing() -> AppState {
    let mut state = AppState::default();
    let _ = reducer(&mut state, Action::CatalogDidLoad(LISTING.to_string()));
    state
}

fn with_card(mut state: AppState) -> AppState {
    let _ = reducer(&mut state, Action::DexSelect(1));
    let _ = reducer(&mut state, Action::DexConfirm);
    let card = parse_card(CHARMANDER, &ClientConfig::default()).expect("card");
    let _ = reducer(
        &mut state,
        Action::DetailDidLoad {
            slot: Slot::Player,
            card,
        },
    );
    state
}

#[test]
fn pokedex_hides_unfound_labels() {
    let state = browsing();
    let mut render = RenderHarness::new(80, 24);
    let output = render.render_to_string_plain(|frame| ui::render_app(frame, frame.area(), &state));
    assert!(output.contains("Bulbasaur"));
    assert!(output.contains("???"));
    assert!(!output.contains("Pikachu"));
}

#[test]
fn card_lists_moves_with_power() {
    let state = with_card(browsing());
    let mut render = RenderHarness::new(80, 24);
    let output = render.render_to_string_plain(|frame| ui::render_app(frame, frame.area(), &state));
    assert!(output.contains("CHARMANDER"));
    assert!(output.contains("Ember"));
    assert!(output.contains("40 DP"));
    assert!(!output.contains("http://"));
}

#[test]
fn battle_shows_both_sides_and_flee() {
    let mut state = with_card(browsing());
    let _ = reducer(&mut state, Action::BattleStart);
    let _ = reducer(&mut state, Action::BattleDidLoad(START.to_string()));
    let mut render = RenderHarness::new(80, 24);
    let output = render.render_to_string_plain(|frame| ui::render_app(frame, frame.area(), &state));
    assert!(output.contains("PIKACHU"));
    assert!(output.contains("Thunder Shock 40 DP"));
    assert!(output.contains("39/39"));
    assert!(output.contains("Flee"));
}
