use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use tabview::{App, AppConfig, AppEvent, Args, ConfigManager, TableOptions, APP_NAME};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let options = TableOptions::from_args_and_config(args, &config);
    let mut app = App::new(config);
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(options))?;

    loop {
        if crossterm::event::poll(std::time::Duration::from_millis(25))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        // Poll the debounce window while a typed search is waiting to apply.
        if app.search_pending() {
            tx.send(AppEvent::Tick)?;
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn load_config() -> AppConfig {
    match ConfigManager::new(APP_NAME).and_then(|manager| manager.load_config()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: using default config: {}", e);
            AppConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    color_eyre::install()?;
    let config = load_config();
    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
