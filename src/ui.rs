use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{EventKind, EventOutcome, RenderContext};

use crate::action::Action;
use crate::detail::{Move, PokemonCard};
use crate::session::{Combatant, Outcome, ViewState};
use crate::state::AppState;

const BG_BASE: Color = Color::Rgb(30, 24, 28);
const BG_PANEL: Color = Color::Rgb(52, 36, 40);
const BG_PANEL_ALT: Color = Color::Rgb(42, 30, 34);
const TEXT_MAIN: Color = Color::Rgb(238, 230, 222);
const TEXT_DIM: Color = Color::Rgb(170, 156, 150);
const ACCENT_RED: Color = Color::Rgb(222, 82, 74);
const ACCENT_GOLD: Color = Color::Rgb(232, 198, 104);
const ACCENT_GREEN: Color = Color::Rgb(112, 200, 120);
const HIGHLIGHT_TEXT: Color = Color::Rgb(28, 20, 22);
const BORDER_ACCENT: Color = Color::Rgb(112, 76, 80);
const HP_BAR_WIDTH: usize = 16;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, area: Rect, state: &AppState, _ctx: RenderContext) {
    render_app(frame, area, state);
}

pub fn render_app(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)])
        .split(area);

    match state.view() {
        ViewState::Browsing => render_pokedex(frame, layout[0], state),
        ViewState::InBattle | ViewState::AwaitingTurnResult | ViewState::BattleEnded => {
            render_battle(frame, layout[0], state)
        }
    }
    render_status(frame, layout[1], state);
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return EventOutcome::action(Action::Quit);
    }
    match state.view() {
        ViewState::Browsing => handle_pokedex_key(key, state),
        ViewState::InBattle => handle_battle_key(key, state),
        ViewState::AwaitingTurnResult => EventOutcome::ignored(),
        ViewState::BattleEnded => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc => {
                EventOutcome::action(Action::BattleAcknowledge)
            }
            _ => EventOutcome::ignored(),
        },
    }
}

fn handle_pokedex_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let len = state.session.catalog().len();
    if len == 0 {
        return match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::F(5) if !state.catalog_loading => {
                EventOutcome::action(Action::Init)
            }
            _ => EventOutcome::ignored(),
        };
    }
    let starting = state.session.is_starting();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            let index = if state.dex_cursor == 0 {
                len - 1
            } else {
                state.dex_cursor - 1
            };
            EventOutcome::action(Action::DexSelect(index))
        }
        KeyCode::Down | KeyCode::Char('j') => {
            EventOutcome::action(Action::DexSelect((state.dex_cursor + 1) % len))
        }
        KeyCode::PageUp => EventOutcome::action(Action::DexSelect(
            state.dex_cursor.saturating_sub(10),
        )),
        KeyCode::PageDown => {
            EventOutcome::action(Action::DexSelect((state.dex_cursor + 10).min(len - 1)))
        }
        KeyCode::Enter if !starting => EventOutcome::action(Action::DexConfirm),
        KeyCode::Char('s') | KeyCode::Char('b') if !starting => {
            EventOutcome::action(Action::BattleStart)
        }
        _ => EventOutcome::ignored(),
    }
}

fn handle_battle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    let count = state.command_count();
    match key.code {
        KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
            let index = if state.move_cursor == 0 {
                count - 1
            } else {
                state.move_cursor - 1
            };
            EventOutcome::action(Action::MoveSelect(index))
        }
        KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
            EventOutcome::action(Action::MoveSelect((state.move_cursor + 1) % count))
        }
        KeyCode::Enter | KeyCode::Char(' ') => EventOutcome::action(Action::MoveConfirm),
        KeyCode::Char('f') => EventOutcome::action(Action::BattleFlee),
        _ => EventOutcome::ignored(),
    }
}

// ===== Pokedex =====

fn render_pokedex(frame: &mut Frame, area: Rect, state: &AppState) {
    let catalog = state.session.catalog();
    let title = format!(" POKEDEX {}/{} ", catalog.found_count(), catalog.len());
    let block = panel_block(title.as_str(), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(24)])
        .split(inner);

    render_dex_list(frame, layout[0], state);
    render_card(frame, layout[1], state);
}

fn render_dex_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("Entries", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.catalog_loading {
        let loading = Paragraph::new(format!("{} loading pokedex", spinner(state)))
            .style(Style::default().fg(TEXT_DIM));
        frame.render_widget(loading, inner);
        return;
    }

    let entries = state.session.catalog().entries();
    let visible = inner.height as usize;
    let start = if visible == 0 || entries.len() <= visible {
        0
    } else {
        state
            .dex_cursor
            .saturating_sub(visible / 2)
            .min(entries.len() - visible)
    };

    let selected = state.session.selected();
    let lines: Vec<Line<'static>> = entries
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(idx, entry)| {
            let marker = if selected == Some(entry.identifier.as_str()) {
                "*"
            } else {
                " "
            };
            let label = if entry.found {
                format!("{marker}{:>3} {}", entry.ordinal + 1, entry.label)
            } else {
                format!("{marker}{:>3} ???", entry.ordinal + 1)
            };
            let style = if entry.found {
                Style::default().fg(TEXT_MAIN)
            } else {
                Style::default().fg(TEXT_DIM)
            };
            if idx == state.dex_cursor {
                Line::from(Span::styled(
                    label,
                    style
                        .fg(HIGHLIGHT_TEXT)
                        .bg(if entry.found { ACCENT_GOLD } else { TEXT_DIM })
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(label, style))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("Card", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(player) = state.player() else {
        let hint = if state.detail_loading {
            format!("{} loading card", spinner(state))
        } else if state.session.catalog().is_empty() {
            String::new()
        } else {
            "Pick a found entry and press Enter.".to_string()
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        return;
    };

    let card = &player.card;
    let mut lines = vec![
        Line::from(Span::styled(
            card.name.to_ascii_uppercase(),
            Style::default()
                .fg(ACCENT_GOLD)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{}HP", card.hp)),
    ];
    lines.extend(tag_line(card));
    lines.push(Line::from(""));
    for mv in &card.moves {
        lines.push(move_line(mv, false));
    }
    if !card.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            card.description.clone(),
            Style::default().fg(TEXT_DIM),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "S: Choose this Pokemon!",
        Style::default().fg(ACCENT_GREEN),
    )));

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

// ===== Battle =====

fn render_battle(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(6),
        ])
        .split(area);

    render_combatant(frame, layout[0], "Player 2", state.opponent());
    render_combatant(frame, layout[1], "Player 1", state.player());

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(layout[2]);
    render_commands(frame, bottom[0], state);
    render_log(frame, bottom[1], state);
}

fn render_combatant(frame: &mut Frame, area: Rect, side: &str, combatant: Option<&Combatant>) {
    let title = match combatant {
        Some(c) => format!(" {side}: {} ", c.display_name().to_ascii_uppercase()),
        None => format!(" {side} "),
    };
    let block = panel_block(title.as_str(), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(combatant) = combatant else {
        return;
    };
    let card = &combatant.card;
    let mut lines = vec![hp_line(
        combatant.current_health,
        combatant.max_health,
        combatant.low_health,
    )];
    lines.extend(tag_line(card));
    let moves = card
        .moves
        .iter()
        .map(|mv| match mv.power_label() {
            Some(power) => format!("{} {power}", mv.name),
            None => mv.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(" | ");
    lines.push(Line::from(moves));
    if !card.description.is_empty() {
        lines.push(Line::from(Span::styled(
            card.description.clone(),
            Style::default().fg(TEXT_DIM),
        )));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_commands(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("COMMAND", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    match state.view() {
        ViewState::AwaitingTurnResult => {
            lines.push(Line::from(Span::styled(
                format!("{} waiting for the turn", spinner(state)),
                Style::default().fg(TEXT_DIM),
            )));
        }
        ViewState::BattleEnded => {
            let (text, color) = match state.session.outcome() {
                Some(Outcome::Won) => ("You won!", ACCENT_GREEN),
                Some(Outcome::Lost) | None => ("You lost!", ACCENT_RED),
            };
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter: Back to Pokedex",
                Style::default().fg(TEXT_DIM),
            )));
        }
        _ => {
            if let Some(player) = state.player() {
                for (idx, mv) in player.card.moves.iter().enumerate() {
                    lines.push(move_line(mv, idx == state.move_cursor));
                }
            }
            let flee_selected = state.move_cursor + 1 >= state.command_count();
            lines.push(menu_line("Flee", flee_selected));
            lines.push(Line::from(Span::styled(
                "Enter: Use  |  F: Flee",
                Style::default().fg(TEXT_DIM),
            )));
        }
    }
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn render_log(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("Battle Log", BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let skip = state.battle_log.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .battle_log
        .iter()
        .skip(skip)
        .map(|line| Line::from(line.as_str()))
        .collect();
    let paragraph = Paragraph::new(Text::from(lines)).style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(paragraph, inner);
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let line = if let Some(error) = state.error.as_deref() {
        let text = if state.view() == ViewState::Browsing && state.session.catalog().is_empty() {
            format!("{error}  (R: Reload)")
        } else {
            error.to_string()
        };
        Line::from(Span::styled(text, Style::default().fg(ACCENT_RED)))
    } else if let Some(message) = state.message.as_deref() {
        Line::from(Span::styled(message.to_string(), Style::default().fg(ACCENT_GOLD)))
    } else {
        let hint = match state.view() {
            ViewState::Browsing if state.session.catalog().is_empty() => "R: Reload  Q: Quit",
            ViewState::Browsing => "↑/↓: Browse  Enter: Pick  S: Battle  Q: Quit",
            _ => "Q: Quit",
        };
        Line::from(Span::styled(hint, Style::default().fg(TEXT_DIM)))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn hp_line(current: u32, max: u32, low: bool) -> Line<'static> {
    let ratio = if max == 0 {
        0.0
    } else {
        current as f32 / max as f32
    };
    let filled = ((ratio * HP_BAR_WIDTH as f32).round() as usize).min(HP_BAR_WIDTH);
    let empty = HP_BAR_WIDTH.saturating_sub(filled);
    let color = if low {
        ACCENT_RED
    } else if ratio > 0.5 {
        ACCENT_GREEN
    } else {
        ACCENT_GOLD
    };
    Line::from(vec![
        Span::raw("HP "),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::raw(format!(" {current}/{max}")),
    ])
}

fn tag_line(card: &PokemonCard) -> Option<Line<'static>> {
    let mut tags = Vec::new();
    if let Some(type_tag) = card.type_tag.as_deref() {
        tags.push(format!("type: {}", format_name(type_tag)));
    }
    if let Some(weakness) = card.weakness.as_deref() {
        tags.push(format!("weak to: {}", format_name(weakness)));
    }
    if tags.is_empty() {
        return None;
    }
    Some(Line::from(Span::styled(
        tags.join("  "),
        Style::default().fg(TEXT_DIM),
    )))
}

fn move_line(mv: &Move, selected: bool) -> Line<'static> {
    let label = match mv.power_label() {
        Some(power) => format!("{:<16}{power}", mv.name),
        None => mv.name.clone(),
    };
    menu_line(&label, selected)
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(ACCENT_GOLD)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    Line::from(Span::styled(label.to_string(), style))
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn spinner(state: &AppState) -> &'static str {
    SPINNER[(state.tick as usize) % SPINNER.len()]
}

fn format_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
