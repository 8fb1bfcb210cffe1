// ABOUTME: Command-line entry point: runs the shortcut service or edits the stored bindings
// ABOUTME: The service loads config, starts the key monitors, and blocks in the platform event loop

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hotswitch::config::Config;
use hotswitch::platform::Platform;
use hotswitch::record::record_shortcut;
use hotswitch::store::BindingStore;
use hotswitch::{Error, HotkeyService, Normalizer, Shortcut, ShortcutRegistry, logging};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hotswitch", version, about = "Global shortcuts that launch, focus, and hide applications")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for shortcuts (default)
    Run,
    /// Show every stored application and its shortcut
    List,
    /// Add an application without a shortcut
    Add {
        application_id: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Assign a shortcut such as "Cmd+Shift+1"
    Bind {
        application_id: String,
        shortcut: String,
    },
    /// Bind the next key press to an application
    Record {
        application_id: String,
        /// Seconds to wait for a key press
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
    /// Clear an application's shortcut
    Unbind { application_id: String },
    /// Change what invoking the shortcut does
    Set {
        application_id: String,
        #[arg(long)]
        launch: Option<bool>,
        #[arg(long)]
        toggle: Option<bool>,
    },
    /// Forget an application
    Remove { application_id: String },
    /// Write the default configuration file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config_path),
        Command::InitConfig => init_config(&config_path),
        command => edit_bindings(&config_path, command),
    }
}

fn run(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path);
    logging::init(&config.logging.level);
    tracing::info!("Starting hotswitch with {}", config_path.display());

    Platform::prepare_event_loop()?;

    let bindings_path = config.bindings_path(config_path);
    let mut service = HotkeyService::new(&config, &bindings_path)?;
    service.start()?;

    let reports = service.take_reports();
    let result = Platform::run_event_loop(reports);

    service.shutdown();
    result
}

fn init_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!("Configuration already exists: {}", config_path.display());
    }
    Config::save_default_config(config_path)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

fn edit_bindings(config_path: &Path, command: Command) -> Result<()> {
    let config = if config_path.exists() {
        let mut config = Config::load_from_file(config_path)?;
        config.expand_path()?;
        config
    } else {
        Config::default()
    };
    logging::init("warn");

    let mut store = BindingStore::open(&config.bindings_path(config_path))?;
    let registry = ShortcutRegistry::new();
    registry.load_all(store.bindings().iter().cloned());

    match command {
        Command::List => {
            if store.bindings().is_empty() {
                println!("No applications configured");
            }
            for binding in store.bindings() {
                println!(
                    "{:<16} {} ({}) launch={} toggle={}",
                    binding.shortcut.to_string(),
                    binding.display_name(),
                    binding.application_id,
                    binding.launch_on_invoke,
                    binding.toggle_on_invoke
                );
            }
            return Ok(());
        }
        Command::Add {
            application_id,
            name,
        } => {
            if !store.add_application(&application_id, name) {
                bail!("{} is already configured", application_id);
            }
        }
        Command::Bind {
            application_id,
            shortcut,
        } => {
            let shortcut = Shortcut::parse(&shortcut)?;
            store.assign_shortcut(&registry, &application_id, shortcut)?;
        }
        Command::Record {
            application_id,
            timeout,
        } => {
            if store.get(&application_id).is_none() {
                bail!(Error::UnknownApplication(application_id));
            }
            Platform::prepare_event_loop()?;
            let mut source = Platform::key_source();
            if !source.check_accessibility(config.monitor.prompt_for_accessibility) {
                tracing::warn!("Accessibility permission not granted; key presses in other applications are not seen");
            }

            println!("Press the shortcut for {} ...", application_id);
            let shortcut = record_shortcut(
                source.as_mut(),
                Normalizer::native(),
                Duration::from_secs(timeout),
                Platform::recv_with_events,
            )?;
            store.assign_shortcut(&registry, &application_id, shortcut.clone())?;
            println!("{} is now bound to {}", application_id, shortcut);
        }
        Command::Unbind { application_id } => {
            store.clear_shortcut(&registry, &application_id)?;
        }
        Command::Set {
            application_id,
            launch,
            toggle,
        } => {
            if launch.is_none() && toggle.is_none() {
                bail!("Nothing to change: pass --launch and/or --toggle");
            }
            if let Some(enabled) = launch {
                store.set_launch_on_invoke(&registry, &application_id, enabled)?;
            }
            if let Some(enabled) = toggle {
                store.set_toggle_on_invoke(&registry, &application_id, enabled)?;
            }
        }
        Command::Remove { application_id } => {
            store.remove_application(&registry, &application_id)?;
        }
        Command::Run | Command::InitConfig => bail!("Not a binding command"),
    }

    store
        .save()
        .with_context(|| format!("Failed to update {}", store.path().display()))
}
