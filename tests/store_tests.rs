//! Reducer tests through the store, the way the runtime drives it.

mod common;

use common::{turn, CHARMANDER, LISTING, START};
use pokedex::action::Action;
use pokedex::config::ClientConfig;
use pokedex::detail::parse_card;
use pokedex::effect::Effect;
use pokedex::reducer::reducer;
use pokedex::session::{Slot, ViewState};
use pokedex::state::AppState;
use tui_dispatch::EffectStore;

fn charmander() -> pokedex::detail::PokemonCard {
    parse_card(CHARMANDER, &ClientConfig::default()).expect("card")
}

#[test]
fn init_then_catalog_load() {
    let mut store = EffectStore::new(AppState::new(ClientConfig::default()), reducer);
    let result = store.dispatch(Action::Init);
    assert!(matches!(result.effects[0], Effect::LoadCatalog));
    assert!(store.state().is_busy());

    store.dispatch(Action::CatalogDidLoad(LISTING.to_string()));
    assert!(!store.state().catalog_loading);
    assert_eq!(store.state().session.catalog().len(), 4);
    assert_eq!(store.state().session.catalog().found_count(), 3);
}

#[test]
fn catalog_failure_surfaces_error() {
    let mut store = EffectStore::new(AppState::new(ClientConfig::default()), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::CatalogDidError(
        pokedex::error::ClientError::Transport("dns".to_string()),
    ));
    assert!(!store.state().catalog_loading);
    assert_eq!(store.state().error.as_deref(), Some("request failed: dns"));
}

#[test]
fn full_round_through_store() {
    let mut store = EffectStore::new(AppState::new(ClientConfig::default()), reducer);
    store.dispatch(Action::CatalogDidLoad(LISTING.to_string()));
    store.dispatch(Action::DexSelect(1));
    let result = store.dispatch(Action::DexConfirm);
    assert!(matches!(
        &result.effects[0],
        Effect::LoadDetail { slot: Slot::Player, identifier } if identifier == "charmander"
    ));

    store.dispatch(Action::DetailDidLoad {
        slot: Slot::Player,
        card: charmander(),
    });
    assert!(!store.state().detail_loading);

    let result = store.dispatch(Action::BattleStart);
    assert!(matches!(result.effects[0], Effect::StartBattle { .. }));
    assert!(store.state().session.is_starting());

    // A second start while the first is in flight is refused.
    let result = store.dispatch(Action::BattleStart);
    assert!(result.effects.is_empty());

    store.dispatch(Action::BattleDidLoad(START.to_string()));
    assert_eq!(store.state().view(), ViewState::InBattle);
    assert_eq!(store.state().command_count(), 3);

    store.dispatch(Action::MoveConfirm);
    assert_eq!(store.state().view(), ViewState::AwaitingTurnResult);
    store.dispatch(Action::TurnDidLoad(turn(
        (20, 39),
        (6, 35),
        "ember",
        Some("thundershock"),
    )));
    assert_eq!(store.state().view(), ViewState::InBattle);
    let opponent = store.state().opponent().expect("opponent");
    assert!(opponent.low_health);
    assert!(store
        .state()
        .battle_log
        .iter()
        .any(|line| line == "Pikachu is low on health!"));
    assert!(store
        .state()
        .battle_log
        .iter()
        .any(|line| line == "Player 2 played thundershock and hit!"));

    store.dispatch(Action::BattleFlee);
    store.dispatch(Action::TurnDidLoad(turn((0, 39), (6, 35), "flee", None)));
    assert_eq!(store.state().view(), ViewState::BattleEnded);
    assert_eq!(store.state().message.as_deref(), Some("You lost!"));
    assert!(!store.state().session.catalog().is_found("pikachu"));

    store.dispatch(Action::BattleAcknowledge);
    assert_eq!(store.state().view(), ViewState::Browsing);
    assert_eq!(store.state().session.selected(), None);
}

#[test]
fn acknowledge_outside_end_is_refused() {
    let mut store = EffectStore::new(AppState::new(ClientConfig::default()), reducer);
    store.dispatch(Action::CatalogDidLoad(LISTING.to_string()));
    let result = store.dispatch(Action::BattleAcknowledge);
    assert!(result.effects.is_empty());
    assert!(store.state().error.is_some());
    assert_eq!(store.state().view(), ViewState::Browsing);
}

#[test]
fn reselecting_during_start_is_refused() {
    let mut store = EffectStore::new(AppState::new(ClientConfig::default()), reducer);
    store.dispatch(Action::CatalogDidLoad(LISTING.to_string()));
    store.dispatch(Action::DexSelect(1));
    store.dispatch(Action::DexConfirm);
    store.dispatch(Action::DetailDidLoad {
        slot: Slot::Player,
        card: charmander(),
    });
    store.dispatch(Action::BattleStart);

    store.dispatch(Action::DexSelect(0));
    let result = store.dispatch(Action::DexConfirm);
    assert!(result.effects.is_empty());
    assert!(store
        .state()
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("not allowed right now")));
    assert_eq!(store.state().session.selected(), Some("charmander"));

    let bulbasaur = parse_card(
        r#"{"name":"Bulbasaur","shortname":"bulbasaur","hp":45,
            "moves":[{"name":"Tackle","type":"normal","dp":40}]}"#,
        &ClientConfig::default(),
    )
    .expect("card");
    let result = store.dispatch(Action::DetailDidLoad {
        slot: Slot::Player,
        card: bulbasaur,
    });
    assert!(result.effects.is_empty());
    assert_eq!(
        store.state().player().map(|p| p.identifier()),
        Some("charmander")
    );

    // Start reply without p1: the declared combatant is the one that fights.
    let start_without_p1 = r#"{"guid":"game-2","pid":"player-3",
        "p2":{"name":"Pikachu","shortname":"pikachu","hp":35,
              "moves":[{"name":"Thunder Shock","type":"electric","dp":40}]}}"#;
    store.dispatch(Action::BattleDidLoad(start_without_p1.to_string()));
    assert_eq!(store.state().view(), ViewState::InBattle);
    assert_eq!(
        store.state().player().map(|p| p.identifier()),
        Some("charmander")
    );
}

#[test]
fn failed_catalog_can_be_reloaded() {
    let mut store = EffectStore::new(AppState::new(ClientConfig::default()), reducer);
    store.dispatch(Action::Init);
    store.dispatch(Action::CatalogDidError(
        pokedex::error::ClientError::Transport("dns".to_string()),
    ));
    assert!(store.state().session.catalog().is_empty());

    let result = store.dispatch(Action::Init);
    assert!(matches!(result.effects[0], Effect::LoadCatalog));
    assert!(store.state().catalog_loading);
    assert_eq!(store.state().error, None);

    store.dispatch(Action::CatalogDidLoad(LISTING.to_string()));
    assert_eq!(store.state().session.catalog().len(), 4);
}
