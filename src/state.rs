use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::catalog::CatalogEntry;
use crate::config::ClientConfig;
use crate::session::{Combatant, SessionController, Slot, ViewState};

/// Battle log lines kept for display.
pub const LOG_CAPACITY: usize = 50;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub session: SessionController,
    pub catalog_loading: bool,
    pub detail_loading: bool,
    pub dex_cursor: usize,
    /// Index into the player's moves; one past the last move is "flee".
    pub move_cursor: usize,
    pub message: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub battle_log: Vec<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl AppState {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            terminal_size: (80, 24),
            session: SessionController::new(config),
            catalog_loading: false,
            detail_loading: false,
            dex_cursor: 0,
            move_cursor: 0,
            message: None,
            error: None,
            battle_log: Vec::new(),
            tick: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        self.session.view()
    }

    pub fn cursor_entry(&self) -> Option<&CatalogEntry> {
        self.session.catalog().entries().get(self.dex_cursor)
    }

    pub fn player(&self) -> Option<&Combatant> {
        self.session.combatant(Slot::Player)
    }

    pub fn opponent(&self) -> Option<&Combatant> {
        self.session.combatant(Slot::Opponent)
    }

    /// Number of entries in the battle command list, flee included.
    pub fn command_count(&self) -> usize {
        self.player().map(|p| p.card.moves.len()).unwrap_or(0) + 1
    }

    pub fn push_log(&mut self, line: String) {
        self.battle_log.push(line);
        if self.battle_log.len() > LOG_CAPACITY {
            let excess = self.battle_log.len() - LOG_CAPACITY;
            self.battle_log.drain(..excess);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.catalog_loading
            || self.detail_loading
            || self.session.is_starting()
            || self.view() == ViewState::AwaitingTurnResult
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![
            DebugSection::new("View")
                .entry("view", ron_string(&self.view()))
                .entry("message", ron_string(&self.message))
                .entry("error", ron_string(&self.error)),
            DebugSection::new("Pokedex")
                .entry("entries", ron_string(&self.session.catalog().len()))
                .entry("found", ron_string(&self.session.catalog().found_count()))
                .entry("cursor", ron_string(&self.dex_cursor))
                .entry("selected", ron_string(&self.session.selected())),
        ];

        if let Some(session) = self.session.session() {
            let mut section = DebugSection::new("Battle")
                .entry("guid", ron_string(&session.session_id))
                .entry("pid", ron_string(&session.combatant_session_id))
                .entry("active", ron_string(&session.active));
            for (label, combatant) in [("player", self.player()), ("opponent", self.opponent())] {
                if let Some(c) = combatant {
                    section = section.entry(
                        label,
                        format!("{} {}/{}", c.identifier(), c.current_health, c.max_health),
                    );
                }
            }
            sections.push(section);
        }

        sections
    }
}
