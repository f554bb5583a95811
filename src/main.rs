use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

use pokedex::action::Action;
use pokedex::config::{ClientConfig, DEFAULT_API_URL};
use pokedex::detail;
use pokedex::effect::Effect;
use pokedex::gateway::{Endpoint, Gateway};
use pokedex::reducer::reducer;
use pokedex::state::AppState;
use pokedex::{api, ui};

#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Browse your pokedex and battle other players")]
struct Args {
    /// Base URL of the pokedex service
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Entry unlocked from the start (repeatable, defaults to the three classic starters)
    #[arg(long = "starter")]
    starters: Vec<String>,

    /// Write tracing output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

/// Handles shared with spawned effect tasks.
struct Remote {
    gateway: Gateway,
    config: ClientConfig,
}

static REMOTE: OnceLock<Remote> = OnceLock::new();

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_tracing(path)?;
    }

    let config = ClientConfig::new(args.api_url, args.starters);
    tracing::info!(api_url = %config.api_url, starters = ?config.starters, "starting");
    let _ = REMOTE.set(Remote {
        gateway: api::gateway(&config),
        config: config.clone(),
    });

    let debug = DebugSession::new(args.debug);
    let state = debug
        .load_state_or_else_async(move || {
            let config = config.clone();
            async move { Ok::<AppState, io::Error>(AppState::new(config)) }
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn init_tracing(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(120), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let Some(remote) = REMOTE.get() else {
        tracing::error!(?effect, "effect dropped before the gateway was ready");
        return;
    };
    let gateway = remote.gateway.clone();
    match effect {
        Effect::LoadCatalog => {
            ctx.tasks().spawn(TaskKey::new("catalog"), async move {
                match api::fetch_catalog(&gateway).await {
                    Ok(raw) => Action::CatalogDidLoad(raw),
                    Err(error) => Action::CatalogDidError(error),
                }
            });
        }
        Effect::LoadDetail { slot, identifier } => {
            let config = remote.config.clone();
            let key = format!("detail_{}", slot.label());
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match detail::fetch_detail(&gateway, &config, &identifier).await {
                    Ok(card) => Action::DetailDidLoad { slot, card },
                    Err(error) => Action::DetailDidError {
                        slot,
                        identifier,
                        error,
                    },
                }
            });
        }
        Effect::StartBattle { payload } => {
            ctx.tasks().spawn(TaskKey::new("battle_start"), async move {
                match gateway.send(Endpoint::Game, payload).await {
                    Ok(body) => Action::BattleDidLoad(body),
                    Err(error) => Action::BattleDidError(error),
                }
            });
        }
        Effect::SubmitTurn { payload } => {
            ctx.tasks().spawn(TaskKey::new("turn"), async move {
                match gateway.send(Endpoint::Game, payload).await {
                    Ok(body) => Action::TurnDidLoad(body),
                    Err(error) => Action::TurnDidError(error),
                }
            });
        }
    }
}
