use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::error::ClientError;
use crate::session::{MoveChoice, Outcome, SessionEvent, Slot, ViewState};
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    let result = reduce(state, action);
    absorb_events(state);
    result
}

fn reduce(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog_loading = true;
            state.error = None;
            DispatchResult::changed_with(Effect::LoadCatalog)
        }
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::Tick => {
            if state.is_busy() {
                state.tick = state.tick.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::CatalogDidLoad(raw) => {
            state.catalog_loading = false;
            let count = state.session.load_catalog(&raw);
            state.dex_cursor = state.dex_cursor.min(count.saturating_sub(1));
            state.error = None;
            if count == 0 {
                state.message = Some("The pokedex is empty.".to_string());
            }
            DispatchResult::changed()
        }
        Action::CatalogDidError(error) => {
            state.catalog_loading = false;
            fail(state, error)
        }
        Action::DexSelect(index) => {
            let len = state.session.catalog().len();
            if index < len && index != state.dex_cursor {
                state.dex_cursor = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::DexConfirm => {
            let Some(identifier) = state.cursor_entry().map(|e| e.identifier.clone()) else {
                return DispatchResult::unchanged();
            };
            match state.session.select_combatant(&identifier) {
                Ok(()) => {
                    state.error = None;
                    if state.player().is_some() {
                        return DispatchResult::changed();
                    }
                    state.detail_loading = true;
                    DispatchResult::changed_with(Effect::LoadDetail {
                        slot: Slot::Player,
                        identifier,
                    })
                }
                Err(error) => fail(state, error),
            }
        }
        Action::DetailDidLoad { slot, card } => {
            let identifier = card.identifier.clone();
            match state.session.apply_detail(slot, card) {
                Ok(()) => {
                    state.detail_loading = false;
                    DispatchResult::changed()
                }
                Err(error) => {
                    // A late response for an entry the user has moved away from.
                    tracing::debug!(%identifier, slot = slot.label(), %error, "detail ignored");
                    DispatchResult::unchanged()
                }
            }
        }
        Action::DetailDidError {
            slot: _,
            identifier,
            error,
        } => {
            if state.session.selected() != Some(identifier.as_str()) {
                return DispatchResult::unchanged();
            }
            state.detail_loading = false;
            fail(state, error)
        }

        Action::BattleStart => match state.session.begin_battle() {
            Ok(payload) => {
                state.error = None;
                state.message = Some("Looking for an opponent...".to_string());
                DispatchResult::changed_with(Effect::StartBattle { payload })
            }
            Err(error) => fail(state, error),
        },
        Action::BattleDidLoad(body) => finish_start(state, Ok(body)),
        Action::BattleDidError(error) => finish_start(state, Err(error)),
        Action::MoveSelect(index) => {
            if index < state.command_count() && index != state.move_cursor {
                state.move_cursor = index;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::MoveConfirm => {
            let moves = state.command_count() - 1;
            let choice = if state.move_cursor >= moves {
                MoveChoice::Flee
            } else {
                MoveChoice::Move(state.move_cursor)
            };
            submit(state, choice)
        }
        Action::BattleFlee => submit(state, MoveChoice::Flee),
        Action::TurnDidLoad(body) => finish_turn(state, Ok(body)),
        Action::TurnDidError(error) => finish_turn(state, Err(error)),
        Action::BattleAcknowledge => match state.session.acknowledge_end() {
            Ok(()) => {
                state.move_cursor = 0;
                state.battle_log.clear();
                state.message = None;
                state.error = None;
                DispatchResult::changed()
            }
            Err(error) => fail(state, error),
        },

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn finish_start(state: &mut AppState, result: Result<String, ClientError>) -> DispatchResult<Effect> {
    match state.session.complete_battle(result) {
        Ok(()) => {
            state.move_cursor = 0;
            state.battle_log.clear();
            state.error = None;
            state.message = state
                .opponent()
                .map(|o| format!("A wild {} appeared!", o.display_name()));
            DispatchResult::changed()
        }
        Err(error) => {
            state.message = None;
            fail(state, error)
        }
    }
}

fn submit(state: &mut AppState, choice: MoveChoice) -> DispatchResult<Effect> {
    match state.session.begin_turn(choice) {
        Ok(payload) => {
            state.error = None;
            state.message = None;
            DispatchResult::changed_with(Effect::SubmitTurn { payload })
        }
        Err(error) => fail(state, error),
    }
}

fn finish_turn(state: &mut AppState, result: Result<String, ClientError>) -> DispatchResult<Effect> {
    match state.session.complete_turn(result) {
        Ok(report) => {
            state.error = None;
            state.message = report.outcome.map(|outcome| match outcome {
                Outcome::Won => "You won!".to_string(),
                Outcome::Lost => "You lost!".to_string(),
            });
            DispatchResult::changed()
        }
        Err(error) => fail(state, error),
    }
}

fn fail(state: &mut AppState, error: ClientError) -> DispatchResult<Effect> {
    if error.is_remote() {
        tracing::warn!(%error, view = ?state.view(), "remote call failed");
    } else {
        tracing::debug!(%error, view = ?state.view(), "action refused");
    }
    state.error = Some(error.to_string());
    DispatchResult::changed()
}

fn absorb_events(state: &mut AppState) {
    for event in state.session.drain_events() {
        match event {
            SessionEvent::TurnNarrated { slot, narration } => {
                let actor = match slot {
                    Slot::Player => "Player 1",
                    Slot::Opponent => "Player 2",
                };
                state.push_log(narration.sentence(actor));
            }
            SessionEvent::LowHealth { slot } => {
                let name = state
                    .session
                    .combatant(slot)
                    .map(|c| c.display_name().to_string())
                    .unwrap_or_else(|| slot.label().to_string());
                state.push_log(format!("{name} is low on health!"));
            }
            SessionEvent::EntryUnlocked { identifier } => {
                state.push_log(format!("{identifier} was added to your pokedex!"));
            }
            SessionEvent::BattleEnded { outcome } => {
                tracing::info!(?outcome, "battle over");
            }
            SessionEvent::ViewChanged { from, to } => {
                tracing::debug!(?from, ?to, "view changed");
                if to == ViewState::InBattle {
                    state.move_cursor = state.move_cursor.min(state.command_count() - 1);
                }
            }
            other => tracing::trace!(event = ?other, "session event"),
        }
    }
}
