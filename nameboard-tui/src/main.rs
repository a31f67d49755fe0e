mod actions;
mod app;
mod cli;
mod forms;
mod logo;
mod ui;

use actions::Action;
use app::App;
use clap::Parser;
use cli::Cli;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::execute;
use log::info;
use nameboard::config::ClientConfig;
use nameboard::controller::{Command, Completed, Session};
use nameboard::identity::open_store;
use nameboard::{BoardClient, Controller, Tab};
use ratatui::{prelude::*, Terminal};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;

fn init_logging(config: &ClientConfig, tui: bool) -> Result<(), Box<dyn Error>> {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.log_level);
    if tui {
        let path = log_path(config);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else {
        builder.target(env_logger::Target::Stderr);
    }
    builder.init();
    Ok(())
}

fn log_path(config: &ClientConfig) -> PathBuf {
    if config.ephemeral {
        std::env::temp_dir().join("nameboard.log")
    } else {
        config.data_dir.join("nameboard.log")
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_logging(&config, cli.is_tui())?;
    info!("backend at {}", config.api_base);

    let store = open_store(config.identity_path().as_deref())?;
    let client = BoardClient::new(&config.api_base)?;
    let mut controller = Controller::new(Session::new(store, client));
    if let Some(viewer) = &cli.viewer {
        controller.dispatch(Command::SetViewerName(viewer.clone())).await;
    }

    match cli.command.clone() {
        Some(sub) if !cli.is_tui() => Ok(cli::run_command(&mut controller, sub).await),
        _ => {
            run_tui(controller).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tui(controller: Controller) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::unbounded_channel::<Completed>();
    let mut app = App::new(controller, tx);
    app.submit(Command::SwitchTab(Tab::Board));
    let res = run_app(&mut terminal, &mut app, rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut rx: mpsc::UnboundedReceiver<Completed>,
) -> Result<(), Box<dyn Error>> {
    loop {
        while let Ok(done) = rx.try_recv() {
            app.complete(done);
        }
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.form.is_some() {
                    app.handle_form_key(key);
                    continue;
                }
                match Action::from_key(key) {
                    Action::Quit => return Ok(()),
                    action => app.perform(action),
                }
            }
        }
        tokio::task::yield_now().await;
    }
}
