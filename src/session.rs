//! Battle session state machine.
//!
//! `Browsing -> InBattle -> AwaitingTurnResult -> InBattle ... -> BattleEnded -> Browsing`
//!
//! Each exchange is split into a `begin_*` step, which checks the current view
//! and builds the request, and a `complete_*` step, which takes the gateway
//! result. State is only written after a response has been fully parsed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::config::ClientConfig;
use crate::detail::PokemonCard;
use crate::error::ClientError;
use crate::gateway::{Endpoint, Gateway, Payload};
use crate::protocol::{self, HealthReading, Narration, FLEE_MOVE};

/// Health percentage at or below which a side is flagged as low.
pub const LOW_HEALTH_PERCENT: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ViewState {
    Browsing,
    InBattle,
    AwaitingTurnResult,
    BattleEnded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Slot {
    Player,
    Opponent,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Slot::Player => "player",
            Slot::Opponent => "opponent",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MoveChoice {
    /// Index into the player's move list.
    Move(usize),
    Flee,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Session {
    pub session_id: String,
    pub combatant_session_id: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Combatant {
    pub card: PokemonCard,
    pub max_health: u32,
    pub current_health: u32,
    /// Sticky for the rest of the battle once set.
    pub low_health: bool,
}

impl Combatant {
    pub fn fresh(card: PokemonCard) -> Self {
        Self {
            max_health: card.hp,
            current_health: card.hp,
            low_health: false,
            card,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.card.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.card.name
    }

    pub fn health_percent(&self) -> f64 {
        health_percent(self.current_health, self.max_health)
    }

    fn apply(&mut self, reading: HealthReading) -> HealthSnapshot {
        self.current_health = reading.current;
        self.max_health = reading.max;
        let percent = self.health_percent();
        self.low_health |= percent <= LOW_HEALTH_PERCENT;
        HealthSnapshot {
            current: self.current_health,
            max: self.max_health,
            percent,
            low_health: self.low_health,
        }
    }
}

pub fn health_percent(current: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    current as f64 / max as f64 * 100.0
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthSnapshot {
    pub current: u32,
    pub max: u32,
    pub percent: f64,
    pub low_health: bool,
}

/// Interpreted result of one turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TurnReport {
    pub player_move: Narration,
    pub opponent_move: Option<Narration>,
    pub player: HealthSnapshot,
    pub opponent: HealthSnapshot,
    pub outcome: Option<Outcome>,
}

/// Change notifications for whoever renders the session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    ViewChanged { from: ViewState, to: ViewState },
    CombatantLoaded { slot: Slot, identifier: String },
    HealthChanged { slot: Slot, snapshot: HealthSnapshot },
    LowHealth { slot: Slot },
    TurnNarrated { slot: Slot, narration: Narration },
    BattleEnded { outcome: Outcome },
    EntryUnlocked { identifier: String },
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionController {
    config: ClientConfig,
    view: ViewState,
    catalog: CatalogIndex,
    selected: Option<String>,
    player: Option<Combatant>,
    opponent: Option<Combatant>,
    session: Option<Session>,
    /// A battle-start exchange is outstanding.
    starting: bool,
    last_turn: Option<TurnReport>,
    outcome: Option<Outcome>,
    #[serde(skip)]
    events: Vec<SessionEvent>,
}

impl SessionController {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            view: ViewState::Browsing,
            catalog: CatalogIndex::default(),
            selected: None,
            player: None,
            opponent: None,
            session: None,
            starting: false,
            last_turn: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    pub fn with_catalog(config: ClientConfig, catalog: CatalogIndex) -> Self {
        let mut controller = Self::new(config);
        controller.catalog = catalog;
        controller
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    /// Replaces the catalog from a raw listing, seeding the configured starters.
    pub fn load_catalog(&mut self, raw: &str) -> usize {
        self.catalog = CatalogIndex::parse(raw, &self.config.starters);
        tracing::info!(
            entries = self.catalog.len(),
            found = self.catalog.found_count(),
            "catalog loaded"
        );
        self.catalog.len()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn combatant(&self, slot: Slot) -> Option<&Combatant> {
        match slot {
            Slot::Player => self.player.as_ref(),
            Slot::Opponent => self.opponent.as_ref(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.active)
    }

    pub fn is_starting(&self) -> bool {
        self.starting
    }

    pub fn last_turn(&self) -> Option<&TurnReport> {
        self.last_turn.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== Browsing =====

    /// Picks the player's combatant. The detail record is loaded separately and
    /// handed back through [`SessionController::apply_detail`].
    pub fn select_combatant(&mut self, identifier: &str) -> Result<(), ClientError> {
        self.expect_idle("select a combatant")?;
        if !self.catalog.is_found(identifier) {
            return Err(ClientError::invalid_state(format!(
                "{identifier} has not been found yet"
            )));
        }
        if self.selected.as_deref() != Some(identifier) {
            self.player = None;
        }
        self.selected = Some(identifier.to_string());
        Ok(())
    }

    pub fn apply_detail(&mut self, slot: Slot, card: PokemonCard) -> Result<(), ClientError> {
        match slot {
            Slot::Opponent => Err(ClientError::invalid_state(
                "the opponent comes from the battle-start response",
            )),
            Slot::Player => {
                self.expect_idle("load the player's card")?;
                if self.selected.as_deref() != Some(card.identifier.as_str()) {
                    return Err(ClientError::invalid_state(format!(
                        "{} is not the selected combatant",
                        card.identifier
                    )));
                }
                self.events.push(SessionEvent::CombatantLoaded {
                    slot,
                    identifier: card.identifier.clone(),
                });
                self.player = Some(Combatant::fresh(card));
                Ok(())
            }
        }
    }

    // ===== Battle start =====

    pub fn begin_battle(&mut self) -> Result<Payload, ClientError> {
        self.expect_idle("start a battle")?;
        let player = self
            .player
            .as_ref()
            .ok_or_else(|| ClientError::invalid_state("no combatant selected"))?;
        let payload = protocol::start_payload(player.display_name());
        self.starting = true;
        tracing::debug!(combatant = player.identifier(), "battle start requested");
        Ok(payload)
    }

    pub fn complete_battle(&mut self, result: Result<String, ClientError>) -> Result<(), ClientError> {
        if !self.starting || self.view != ViewState::Browsing {
            return Err(ClientError::invalid_state("no battle start is outstanding"));
        }
        self.starting = false;
        let reply = protocol::parse_start(&result?, &self.config)?;

        let player_card = match (reply.player, self.player.take()) {
            (Some(card), _) => card,
            (None, Some(current)) => current.card,
            (None, None) => {
                return Err(ClientError::invalid_state("player card vanished during start"))
            }
        };
        let player = Combatant::fresh(player_card);
        let opponent = Combatant::fresh(reply.opponent);
        tracing::info!(
            player = player.identifier(),
            opponent = opponent.identifier(),
            "battle started"
        );
        self.events.push(SessionEvent::CombatantLoaded {
            slot: Slot::Opponent,
            identifier: opponent.identifier().to_string(),
        });
        self.player = Some(player);
        self.opponent = Some(opponent);
        self.session = Some(Session {
            session_id: reply.session_id,
            combatant_session_id: reply.combatant_session_id,
            active: true,
        });
        self.last_turn = None;
        self.outcome = None;
        self.transition(ViewState::InBattle);
        Ok(())
    }

    pub async fn start_battle(&mut self, gateway: &Gateway) -> Result<(), ClientError> {
        let payload = self.begin_battle()?;
        let result = gateway.send(Endpoint::Game, payload).await;
        self.complete_battle(result)
    }

    // ===== Turns =====

    /// Builds the turn request and enters `AwaitingTurnResult` before anything
    /// is sent.
    pub fn begin_turn(&mut self, choice: MoveChoice) -> Result<Payload, ClientError> {
        if self.view != ViewState::InBattle {
            return Err(ClientError::invalid_state(format!(
                "cannot submit a move while {:?}",
                self.view
            )));
        }
        let session = self
            .session
            .as_ref()
            .filter(|s| s.active)
            .ok_or_else(|| ClientError::invalid_state("no active session"))?;
        let move_name = match choice {
            MoveChoice::Flee => FLEE_MOVE.to_string(),
            MoveChoice::Move(index) => self
                .player
                .as_ref()
                .and_then(|p| p.card.moves.get(index))
                .map(|mv| mv.wire_name())
                .ok_or_else(|| ClientError::invalid_state(format!("no move at index {index}")))?,
        };
        let payload =
            protocol::turn_payload(&session.session_id, &session.combatant_session_id, &move_name);
        tracing::debug!(movename = %move_name, "turn submitted");
        self.transition(ViewState::AwaitingTurnResult);
        Ok(payload)
    }

    pub fn complete_turn(
        &mut self,
        result: Result<String, ClientError>,
    ) -> Result<TurnReport, ClientError> {
        if self.view != ViewState::AwaitingTurnResult {
            return Err(ClientError::invalid_state("no turn is outstanding"));
        }
        let reply = match result.and_then(|body| protocol::parse_turn(&body)) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "turn failed");
                self.transition(ViewState::InBattle);
                return Err(err);
            }
        };
        let Some((was_low, player_health, opponent_health, opponent_id)) =
            self.apply_health(reply.player, reply.opponent)
        else {
            self.transition(ViewState::InBattle);
            return Err(ClientError::invalid_state("battle has no combatants"));
        };

        self.events.push(SessionEvent::TurnNarrated {
            slot: Slot::Player,
            narration: reply.player_move.clone(),
        });
        if let Some(narration) = reply.opponent_move.clone() {
            self.events.push(SessionEvent::TurnNarrated {
                slot: Slot::Opponent,
                narration,
            });
        }
        for (idx, (slot, snapshot)) in [(Slot::Player, player_health), (Slot::Opponent, opponent_health)]
            .into_iter()
            .enumerate()
        {
            self.events.push(SessionEvent::HealthChanged { slot, snapshot });
            if snapshot.low_health && !was_low[idx] {
                self.events.push(SessionEvent::LowHealth { slot });
            }
        }

        // Player loss is checked first, so a double knockout counts as a loss.
        let outcome = if player_health.current == 0 {
            Some(Outcome::Lost)
        } else if opponent_health.current == 0 {
            Some(Outcome::Won)
        } else {
            None
        };

        match outcome {
            Some(outcome) => self.finish(outcome, &opponent_id),
            None => self.transition(ViewState::InBattle),
        }

        let report = TurnReport {
            player_move: reply.player_move,
            opponent_move: reply.opponent_move,
            player: player_health,
            opponent: opponent_health,
            outcome,
        };
        self.last_turn = Some(report.clone());
        Ok(report)
    }

    pub async fn submit_move(
        &mut self,
        gateway: &Gateway,
        choice: MoveChoice,
    ) -> Result<TurnReport, ClientError> {
        let payload = self.begin_turn(choice)?;
        let result = gateway.send(Endpoint::Game, payload).await;
        self.complete_turn(result)
    }

    // ===== Ending =====

    pub fn acknowledge_end(&mut self) -> Result<(), ClientError> {
        if self.view != ViewState::BattleEnded {
            return Err(ClientError::invalid_state("the battle has not ended"));
        }
        self.session = None;
        self.player = None;
        self.opponent = None;
        self.selected = None;
        self.last_turn = None;
        self.outcome = None;
        self.events.push(SessionEvent::Cleared);
        self.transition(ViewState::Browsing);
        Ok(())
    }

    fn apply_health(
        &mut self,
        player_reading: HealthReading,
        opponent_reading: HealthReading,
    ) -> Option<([bool; 2], HealthSnapshot, HealthSnapshot, String)> {
        let (player, opponent) = match (self.player.as_mut(), self.opponent.as_mut()) {
            (Some(player), Some(opponent)) => (player, opponent),
            _ => return None,
        };
        let was_low = [player.low_health, opponent.low_health];
        let player_health = player.apply(player_reading);
        let opponent_health = opponent.apply(opponent_reading);
        Some((
            was_low,
            player_health,
            opponent_health,
            opponent.identifier().to_string(),
        ))
    }

    fn finish(&mut self, outcome: Outcome, opponent_id: &str) {
        if outcome == Outcome::Won && self.catalog.mark_found(opponent_id) {
            self.events.push(SessionEvent::EntryUnlocked {
                identifier: opponent_id.to_string(),
            });
        }
        if let Some(session) = self.session.as_mut() {
            session.active = false;
        }
        self.outcome = Some(outcome);
        tracing::info!(?outcome, opponent = opponent_id, "battle ended");
        self.events.push(SessionEvent::BattleEnded { outcome });
        self.transition(ViewState::BattleEnded);
    }

    fn transition(&mut self, to: ViewState) {
        let from = self.view;
        if from != to {
            self.view = to;
            self.events.push(SessionEvent::ViewChanged { from, to });
        }
    }

    /// Browsing with no battle start outstanding. Slot 1 is frozen once its
    /// name has been sent as `mypokemon`.
    fn expect_idle(&self, what: &str) -> Result<(), ClientError> {
        if self.view != ViewState::Browsing {
            return Err(ClientError::invalid_state(format!(
                "cannot {what} while {:?}",
                self.view
            )));
        }
        if self.starting {
            return Err(ClientError::invalid_state(format!(
                "cannot {what} while a battle is starting"
            )));
        }
        Ok(())
    }
}
