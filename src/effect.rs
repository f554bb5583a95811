use crate::gateway::Payload;
use crate::session::Slot;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog,
    LoadDetail { slot: Slot, identifier: String },
    StartBattle { payload: Payload },
    SubmitTurn { payload: Payload },
}
