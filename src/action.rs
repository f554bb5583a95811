use serde::{Deserialize, Serialize};

use crate::detail::PokemonCard;
use crate::error::ClientError;
use crate::session::Slot;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),
    Tick,

    // Pokedex
    CatalogDidLoad(String),
    CatalogDidError(ClientError),
    DexSelect(usize),
    DexConfirm,
    DetailDidLoad {
        slot: Slot,
        card: PokemonCard,
    },
    DetailDidError {
        slot: Slot,
        identifier: String,
        error: ClientError,
    },

    // Battle
    BattleStart,
    BattleDidLoad(String),
    BattleDidError(ClientError),
    BattleFlee,
    BattleAcknowledge,
    MoveSelect(usize),
    MoveConfirm,
    TurnDidLoad(String),
    TurnDidError(ClientError),

    Quit,
}
