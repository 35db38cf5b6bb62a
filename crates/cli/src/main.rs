use anyhow::Result;
use blechat_core::{
    init, open_chat_list, open_theme, BluetoothEvent, ChatCore, CommandProcessor, CommandResult,
    Config, ContactInsert, Location, SessionUpdate, Storage, ThemeMode,
};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "blechat")]
#[command(about = "Peer-to-peer chat over Bluetooth Low Energy")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set device name
    #[arg(short, long)]
    name: Option<String>,

    /// Set data directory
    #[arg(long)]
    data_dir: Option<String>,

    /// Load settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat mode
    Chat {
        /// Latitude appended to outgoing messages
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude appended to outgoing messages
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Scan for a while and list nearby devices
    Devices {
        /// Seconds to scan
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,
    },
    /// Manage the contact list
    Contacts {
        #[command(subcommand)]
        action: Option<ContactAction>,
    },
    /// Show or change the theme preference
    Theme {
        /// New mode: system, light or dark
        mode: Option<String>,
    },
    /// Write the effective configuration to a file
    SaveConfig {
        path: PathBuf,
    },
    /// Clear all data
    Clear,
}

#[derive(Subcommand)]
enum ContactAction {
    /// List contacts and groups
    List,
    /// Add a contact
    Add { name: String },
    /// Create a group from existing contacts
    Group {
        /// Group name
        name: String,
        /// Member contact names
        #[arg(required = true)]
        members: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    // Create config
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(name) = cli.name {
        config.device_name = name;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir.into();
    }
    if cli.debug {
        config.verbose_logging = true;
    }

    info!("Starting BLE chat CLI with device name: {}", config.device_name);

    match cli.command {
        Some(Commands::Chat { lat, lon }) => {
            if let (Some(lat), Some(lon)) = (lat, lon) {
                config.location = Some(Location::new(lat, lon));
            }
            run_interactive_mode(config).await
        }
        Some(Commands::Devices { seconds }) => list_devices(config, seconds).await,
        Some(Commands::Contacts { action }) => manage_contacts(config, action.unwrap_or(ContactAction::List)),
        Some(Commands::Theme { mode }) => manage_theme(config, mode),
        Some(Commands::SaveConfig { path }) => {
            config.save_to_file(&path)?;
            println!("✅ Config written to {}", path.display());
            Ok(())
        }
        Some(Commands::Clear) => clear_data(config),
        None => run_interactive_mode(config).await,
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

fn print_update(update: SessionUpdate) {
    match update {
        SessionUpdate::Status(status) => println!("📶 {}", status),
        SessionUpdate::Message(msg) => println!("💬 {}", msg.text),
    }
}

async fn run_interactive_mode(config: Config) -> Result<()> {
    println!("🔗 BLE Chat - peer-to-peer messaging over Bluetooth LE");
    println!("Device: {}", config.device_name);
    println!("Data: {}", config.data_dir.display());
    println!("Type /help for commands, /quit to exit\n");

    let core = Arc::new(init(config).await?);

    let Some(mut event_receiver) = core.take_bluetooth_events().await else {
        println!("⚠️  Could not get Bluetooth event receiver");
        return Ok(());
    };

    if !core.bluetooth().is_available() {
        println!("⚠️  Bluetooth unavailable - scanning and sending will fail");
    }

    let mut processor = CommandProcessor::new(core.clone());

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    prompt()?;

    loop {
        tokio::select! {
            // Handle Bluetooth events
            event = event_receiver.recv() => {
                let Some(event) = event else { break };
                if let BluetoothEvent::MessageSent { chunks } = &event {
                    info!("chunks written: {}", chunks);
                }
                if let Some(update) = processor.handle_event(event) {
                    println!();
                    print_update(update);
                    prompt()?;
                }
            }

            // Handle user input
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();

                if line.is_empty() {
                    prompt()?;
                    continue;
                }

                match processor.process_input(line).await {
                    CommandResult::Success(text) => println!("{}", text),
                    CommandResult::Error(text) => println!("❌ {}", text),
                    CommandResult::Exit => {
                        println!("Shutting down...");
                        break;
                    }
                }

                prompt()?;
            }
        }
    }

    core.stop().await?;
    println!("👋 Goodbye!");
    Ok(())
}

async fn list_devices(config: Config, seconds: u64) -> Result<()> {
    let core: ChatCore = init(config).await?;
    let bluetooth = core.bluetooth();

    println!("🔍 Scanning for {}s...", seconds);
    bluetooth.start_scan().await?;
    tokio::time::sleep(tokio::time::Duration::from_secs(seconds)).await;
    bluetooth.stop_scan().await?;

    let devices = bluetooth.discovered_devices().await;
    if devices.is_empty() {
        println!("No devices found");
    } else {
        println!("Found {} device(s):", devices.len());
        for (i, (address, name)) in devices.iter().enumerate() {
            println!("  [{}] {} ({})", i, name.as_deref().unwrap_or(address), address);
        }
    }

    Ok(())
}

fn manage_contacts(config: Config, action: ContactAction) -> Result<()> {
    let storage = Storage::new(&config.data_dir)?;
    let mut chats = open_chat_list(&storage)?;

    match action {
        ContactAction::List => {
            if chats.is_empty() {
                println!("No chats yet");
            } else {
                for chat in chats.chats() {
                    println!("  {}", chat.name);
                }
            }
        }
        ContactAction::Add { name } => match chats.add_contact(&name)? {
            ContactInsert::Added => println!("✅ Added {}", name.trim()),
            ContactInsert::EmptyName => println!("❌ Name must not be empty"),
            ContactInsert::Duplicate => println!("❌ {} already exists", name.trim()),
        },
        ContactAction::Group { name, members } => match chats.create_group(&name, &members)? {
            Some(group) => println!("✅ Created {}", group.name),
            None => println!("❌ Group name must not be empty"),
        },
    }

    Ok(())
}

fn manage_theme(config: Config, mode: Option<String>) -> Result<()> {
    let storage = Storage::new(&config.data_dir)?;
    let theme = open_theme(&storage);

    match mode {
        Some(mode) => {
            let mode: ThemeMode = mode.parse()?;
            theme.set(mode)?;
            println!("✅ Theme set to {}", mode);
        }
        None => println!("Theme: {}", theme.get()?),
    }

    Ok(())
}

fn clear_data(config: Config) -> Result<()> {
    println!("Clearing all chat data...");

    if !config.data_dir.exists() {
        println!("No data directory found");
        return Ok(());
    }

    Storage::new(&config.data_dir)?.clear_all()?;
    println!("✅ Data cleared from: {}", config.data_dir.display());

    Ok(())
}
