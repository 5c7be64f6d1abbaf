use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use soubitui::{
    resolve_source, App, AppConfig, AppEvent, Args, ConfigManager, OpenOptions, Theme, APP_NAME,
};
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: &AppConfig) -> Result<()> {
    let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to build theme: {}. Using fallback.", e);
        Theme {
            colors: std::collections::HashMap::new(),
        }
    });

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config.clone());
    if args.debug {
        app.enable_debug();
    }

    let options = OpenOptions::from_args_and_config(args, config);
    let source = resolve_source(args.source.as_deref(), config);

    // Draw one frame before loading so the gauge is visible during the fetch
    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(source, options))?;

    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
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

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        let config_path = config_manager.write_default_config(args.force)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(Some(()));
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if handle_early_exit_flags(&args)?.is_some() {
        return Ok(());
    }

    let config = AppConfig::load(APP_NAME).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal, &args, &config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
