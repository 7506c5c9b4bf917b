use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ideaforge::cli::commands::{chart, config, generate, ideas, serve, tasks};
use ideaforge::cli::{CommandContext, Output};
use ideaforge::storage::DiagnosisKind;
use ideaforge::{ConfigLoader, ForgeError, diagnose};

#[derive(Parser)]
#[command(name = "ideaforge")]
#[command(version, about = "Validate product ideas and turn them into build blueprints")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Act as this user against the database (anonymous: session file only)
    #[arg(long, short, global = true, env = "IDEAFORGE_USER")]
    user: Option<String>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        #[arg(long, help = "Bind address (overrides server.host)")]
        host: Option<String>,
        #[arg(long, short, help = "Port (overrides server.port)")]
        port: Option<u16>,
    },

    /// Generate a blueprint for an idea
    Generate {
        title: String,
        description: String,
        #[arg(long, short, help = "Save the project after generating")]
        save: bool,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Manage saved and staged ideas
    Ideas {
        #[command(subcommand)]
        action: IdeasAction,
    },

    /// Manage a blueprint's tasks
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },

    /// Render an idea's pillar radar chart as SVG
    Chart {
        idea_id: String,
        #[arg(long, short, help = "Write to file instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long, help = "Device pixel ratio")]
        dpr: Option<f64>,
        #[arg(long, help = "Pillar to highlight")]
        active: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum IdeasAction {
    /// List session and saved ideas
    List {
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },
    /// Show one project
    Show {
        id: String,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },
    /// Save the project staged by the last `generate`
    Save,
    /// Delete a project and its blueprint
    Delete { id: String },
}

#[derive(Subcommand)]
enum TasksAction {
    /// Show the task board
    List {
        idea_id: String,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },
    /// Set a task's status (todo, in-progress, done)
    Set {
        idea_id: String,
        task_id: String,
        status: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, yaml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mideaforge encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let diagnosis = e.downcast_ref::<ForgeError>().map(diagnose);
            let message = match diagnosis {
                Some(d) if d.kind != DiagnosisKind::Other => d.message,
                _ => e.to_string(),
            };
            Output::new().error(&message);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn,ideaforge=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let user = cli.user;
    match cli.command {
        Commands::Serve { host, port } => {
            let rt = Runtime::new()?;
            rt.block_on(serve::run(ConfigLoader::load()?, host, port))?;
        }
        Commands::Generate {
            title,
            description,
            save,
            format,
        } => {
            let ctx = CommandContext::load(user)?;
            let rt = Runtime::new()?;
            rt.block_on(generate::run(
                &ctx,
                generate::GenerateOptions {
                    title,
                    description,
                    save,
                    format,
                },
            ))?;
        }
        Commands::Ideas { action } => {
            let ctx = CommandContext::load(user)?;
            let rt = Runtime::new()?;
            match action {
                IdeasAction::List { format } => {
                    rt.block_on(ideas::list(&ctx, &format))?;
                }
                IdeasAction::Show { id, format } => {
                    rt.block_on(ideas::show(&ctx, &id, &format))?;
                }
                IdeasAction::Save => {
                    rt.block_on(ideas::save(&ctx))?;
                }
                IdeasAction::Delete { id } => {
                    rt.block_on(ideas::delete(&ctx, &id))?;
                }
            }
        }
        Commands::Tasks { action } => {
            let ctx = CommandContext::load(user)?;
            let rt = Runtime::new()?;
            match action {
                TasksAction::List { idea_id, format } => {
                    rt.block_on(tasks::list(&ctx, &idea_id, &format))?;
                }
                TasksAction::Set {
                    idea_id,
                    task_id,
                    status,
                } => {
                    rt.block_on(tasks::set(&ctx, &idea_id, &task_id, &status))?;
                }
            }
        }
        Commands::Chart {
            idea_id,
            output,
            width,
            height,
            dpr,
            active,
        } => {
            let ctx = CommandContext::load(user)?;
            let rt = Runtime::new()?;
            rt.block_on(chart::run(
                &ctx,
                chart::ChartOptions {
                    idea_id,
                    output,
                    width,
                    height,
                    dpr,
                    active,
                },
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => config::show(global, &format)?,
            ConfigAction::Path => config::path()?,
            ConfigAction::Init { global, force } => config::init(global, force)?,
        },
    }

    Ok(())
}
