use clap::{ArgAction, Parser, Subcommand};
use commands::{config, interactive, lookup, watched, Context};

mod commands;
mod logging;
mod output;
mod render;
mod ui;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "popcorn - search movies and keep a rated list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse interactively: search, open details, rate and manage the watched list
    #[command(long_about = "Start the interactive browser. Type /<text> to search, select a result to load its details, rate it to add it to your watched list. This is the default when no command is given.")]
    Interactive {
        /// Keep the watched list in memory only (nothing is written to disk)
        #[arg(long, action = ArgAction::SetTrue)]
        ephemeral: bool,
    },
    /// Search titles once and print the results
    Search {
        /// Title text to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show the details of one title by IMDB id
    Show {
        /// IMDB id, e.g. tt0111161
        id: String,
    },
    /// Inspect or edit the watched list
    #[command(long_about = "Work with the stored watched list without going online. Running without a subcommand lists the entries.")]
    Watched {
        #[command(subcommand)]
        cmd: Option<WatchedCommands>,
    },
    /// Show or change configuration
    #[command(long_about = "Manage the OMDb API settings and where the watched list is stored. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched titles
    List,
    /// Remove a title by IMDB id
    Remove {
        id: String,
    },
    /// Print count and average ratings/runtime
    Summary,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Change settings; prompts for the API key when no option is given
    Set {
        /// OMDb API key
        #[arg(long)]
        api_key: Option<String>,

        /// OMDb base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Name of the persistence slot for the watched list
        #[arg(long)]
        slot: Option<String>,
    },
    /// Print the config file path
    Path,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let ctx = Context::load()?;

    // The interactive screen owns the terminal, so its logs go to a file
    let log_file = match cli.command {
        None | Some(Commands::Interactive { .. }) => Some(ctx.paths.log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        None => interactive::run_interactive(&ctx, false, &output).await,
        Some(Commands::Interactive { ephemeral }) => interactive::run_interactive(&ctx, ephemeral, &output).await,
        Some(Commands::Search { query }) => lookup::run_search(&ctx, &query.join(" "), &output).await,
        Some(Commands::Show { id }) => lookup::run_show(&ctx, &id, &output).await,
        Some(Commands::Watched { cmd }) => watched::run_watched(&ctx, cmd.unwrap_or(WatchedCommands::List), &output),
        Some(Commands::Config { cmd }) => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(&ctx, cmd, &output)
        }
    }
}
