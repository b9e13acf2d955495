use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

use mc_reconcile::IntentEvent;

#[derive(Parser)]
#[command(name = "mc")]
#[command(about = "Multicluster mesh config reconciler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> cluster -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Plan the mesh config writes for one intent event. Prints JSON; writes nothing.
    Plan {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Store snapshot: YAML stream of config documents
        #[arg(long)]
        store: String,

        /// Converter output recorded per intent
        #[arg(long)]
        rendered: String,

        /// The intent document that changed
        #[arg(long)]
        intent: String,

        /// What happened to the intent
        #[arg(long, value_enum)]
        event: EventArg,

        /// Treat unused config keys as an error instead of a warning
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EventArg {
    Add,
    Modify,
    Delete,
}

impl From<EventArg> for IntentEvent {
    fn from(e: EventArg) -> Self {
        match e {
            EventArg::Add => IntentEvent::Added,
            EventArg::Modify => IntentEvent::Modified,
            EventArg::Delete => IntentEvent::Deleted,
        }
    }
}

fn main() -> Result<()> {
    // Load .env.local if present. Silent when absent.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            commands::init_tracing(None);
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = mc_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Plan {
            config_paths,
            store,
            rendered,
            intent,
            event,
            strict_config,
        } => {
            commands::plan::run(commands::plan::PlanArgs {
                config_paths: &config_paths,
                store_path: &store,
                rendered_path: &rendered,
                intent_path: &intent,
                event: event.into(),
                strict_config,
            })?;
        }
    }

    Ok(())
}
