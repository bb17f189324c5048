mod host;
mod render;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use rentalier_core::actions::UserAction;
use rentalier_core::persistence::PreferenceStore;
use rentalier_core::providers::SystemClock;
use rentalier_core::providers::UuidIds;
use rentalier_core::seed::SeedData;
use rentalier_core::state::UiTheme;
use tracing_subscriber::EnvFilter;

use crate::host::Host;
use crate::host::HostOptions;

/// Host activation journey and community channels.
#[derive(Parser)]
#[command(name = "rentalier", version, about, long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults to the per-user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preferences file (JSON). Defaults to the per-user data directory.
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Seed document (YAML) replacing the built-in demo workspace.
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Member id the session acts as.
    #[arg(long, global = true, default_value = "7")]
    member: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show activation progress and next actions (default)
    Progress {
        /// Print the progress report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Complete journey steps in order, then show progress
    Complete {
        #[arg(required = true)]
        step_ids: Vec<String>,
    },
    /// List channels with unread counts
    Channels,
    /// Open a channel, optionally post, react or search, and print the feed
    Chat {
        #[arg(short, long, default_value = "general")]
        channel: String,
        /// Toggle a reaction, given as MESSAGE_ID:EMOJI (repeatable)
        #[arg(long = "react", value_name = "MESSAGE_ID:EMOJI")]
        reactions: Vec<String>,
        /// Filter the feed by content or author name
        #[arg(long)]
        search: Option<String>,
        /// Message to post
        message: Vec<String>,
    },
    /// Set the UI theme, or cycle to the next one
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    System,
    Light,
    Dark,
}

impl From<ThemeArg> for UiTheme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::System => Self::System,
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = settings::load_config(cli.config.as_deref())?;
    let seed = match &cli.seed {
        Some(path) => SeedData::from_yaml_str(&std::fs::read_to_string(path)?)?,
        None => SeedData::builtin()?,
    };
    let prefs_path = cli.prefs.clone().or_else(settings::default_preferences_path);
    let preferences = prefs_path.map(PreferenceStore::open).transpose()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async move {
        let mut host = Host::new(HostOptions {
            config,
            seed,
            current_member: cli.member,
            preferences,
            ids: Box::new(UuidIds),
            clock: Box::new(SystemClock),
        })?;
        execute(&mut host, cli.command.unwrap_or(Commands::Progress { json: false })).await
    })
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rentalier={default_level},rentalier_core={default_level},rentalier_exec={default_level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn execute(host: &mut Host, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Progress { json: false } => {
            print!("{}", render::progress(&host.state.activation));
        }
        Commands::Progress { json: true } => {
            println!(
                "{}",
                serde_json::to_string_pretty(&host.state.activation.report)?
            );
        }
        Commands::Complete { step_ids } => {
            for step_id in step_ids {
                host.user(UserAction::CompleteStep { step_id })?;
                for event in host.take_celebrations() {
                    println!("{}", render::celebration(event));
                }
            }
            print!("{}", render::progress(&host.state.activation));
        }
        Commands::Channels => {
            print!(
                "{}",
                render::channels(&host.services.board.categories(), &host.state.chat)
            );
            print!(
                "{}",
                render::online_members(&host.services.board.online_members())
            );
        }
        Commands::Chat {
            channel,
            reactions,
            search,
            message,
        } => {
            if host.services.board.channel(&channel).is_none() {
                return Err(format!("unknown channel: {channel}").into());
            }
            host.user(UserAction::OpenChannel {
                channel_id: channel.clone(),
            })?;
            for reaction in reactions {
                let Some((message_id, emoji)) = reaction.split_once(':') else {
                    return Err(format!("--react expects MESSAGE_ID:EMOJI, got {reaction}").into());
                };
                host.user(UserAction::ToggleReaction {
                    channel_id: channel.clone(),
                    message_id: message_id.to_string(),
                    emoji: emoji.to_string(),
                })?;
            }
            if !message.is_empty() {
                host.user(UserAction::SendMessage {
                    channel_id: channel.clone(),
                    content: message.join(" "),
                })?;
                if host.state.chat.is_typing(&channel) {
                    let assistant = &host.state.config.chat.assistant_member_id;
                    let name = host
                        .services
                        .board
                        .members()
                        .into_iter()
                        .find(|member| &member.id == assistant)
                        .map_or_else(|| assistant.clone(), |member| member.name);
                    println!("{name} is typing...");
                }
                host.settle().await?;
            }
            if let Some(query) = search {
                host.user(UserAction::SetSearchQuery(query))?;
            }
            let view = host.services.visible_messages(&host.state, &channel);
            print!(
                "{}",
                render::messages(
                    &view,
                    &host.services.board.members(),
                    &host.state.chat.search_query
                )
            );
            host.user(UserAction::CloseCommunity)?;
        }
        Commands::Theme { theme } => {
            let action = match theme {
                Some(theme) => UserAction::SetTheme(theme.into()),
                None => UserAction::CycleTheme,
            };
            host.user(action)?;
            println!("theme: {}", host.state.preferences.theme.label());
        }
    }
    Ok(())
}
