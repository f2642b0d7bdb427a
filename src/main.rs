use std::{error::Error, io, process};

use clap::{command, Parser, ValueHint};
use log::{debug, error, info, warn, LevelFilter};

use tunelink::{
    config::Config,
    resolver::{ResolvedItem, Resolver},
};

/// Profile to display when not built in release mode.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Profile to display when not built release mode.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Secrets file
    ///
    /// Optional TOML file with catalog credentials. Without it,
    /// resolution falls back to the credential-free strategies and
    /// Spotify links cannot be resolved.
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath, default_value_t = String::from("secrets.toml"))]
    secrets_file: String,

    /// Also fetch a stream URL
    ///
    /// Locates a stream for the resolved track, the same way a playback
    /// host would at playback start.
    #[arg(long, default_value_t = false)]
    stream: bool,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,

    /// Track URL, id or `ytsearch:` query to resolve
    #[arg(value_name = "IDENTIFIER")]
    identifier: String,
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
///
/// # Panics
///
/// Panics when a logger facade is already initialized.
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should
        // probably also change the verbosity levels below.
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            0 => {
                // Quiet and verbose are mutually exclusive, and `verbose` is 0
                // by default. So this arm means: quiet mode.
                LevelFilter::Warn
            }
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module(module_path!(), level);
    }

    logger.init();
}

/// Loads the configuration, falling back to defaults when the secrets
/// file does not exist. All credentials are optional.
fn load_config(secrets_file: &str) -> io::Result<Config> {
    match Config::from_secrets_file(secrets_file) {
        Ok(config) => Ok(config),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("no secrets file at {secrets_file}, continuing without credentials");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.secrets_file)?;
    let resolver = Resolver::new(config)?;

    match resolver.resolve(&args.identifier).await? {
        None => {
            warn!("identifier not recognized: {}", args.identifier);
        }
        Some(ResolvedItem::Item(item)) => {
            info!(
                "{} - {} ({:.0?}{})",
                item.artist(),
                item.title(),
                item.duration(),
                if item.is_live() { ", live" } else { "" },
            );

            if args.stream {
                let descriptor = item.stream().await?;
                info!("stream: {} ({})", descriptor.url, descriptor.content_type);
            }
        }
        Some(ResolvedItem::Collection(collection)) => {
            info!("{} ({} tracks)", collection.name, collection.items.len());
            for (position, item) in collection.items.iter().enumerate() {
                info!("{:>3}. {} - {}", position + 1, item.artist(), item.title());
            }
        }
    }

    Ok(())
}

/// Main entry point of the application.
///
/// This function initializes the logger facade, parses the command line
/// arguments, and resolves the given identifier.
#[tokio::main]
async fn main() {
    // `clap` handles our command line arguments and help text.
    let args = Args::parse();
    init_logger(&args);

    // Dump command line arguments before we do anything more.
    // This aids in debugging of whatever comes next.
    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();

    info!("starting {name}/{version}; {BUILD_PROFILE}");

    if let Err(e) = run(args).await {
        error!("{e}");
        process::exit(1);
    }
}
