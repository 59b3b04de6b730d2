use anyhow::Result;
use clap::{Parser, Subcommand};
use flowcurrent::cli::{self, OutputHandler, OutputMode};
use flowcurrent::config::FlowcurrentConfig;
use flowcurrent::logging;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "flowcurrent")]
#[command(about = "Declarative workflows - sequence steps, pass args forward, back up, abandon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory holding .flowcurrent/ (defaults to current)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress everything but prompts and the result
    #[arg(long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Console)]
    output: OutputMode,

    /// Write logs to this file as well
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write logs to the default per-run file under the config directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow interactively
    Run {
        /// Workflow name
        workflow: String,

        /// Launch args: `key=value` pairs or free text
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Validate a workflow without running
    Validate {
        /// Workflow name
        workflow: String,
    },

    /// Show a workflow's steps
    Show {
        /// Workflow name
        workflow: String,
    },
}

impl Commands {
    fn workflow(&self) -> &str {
        match self {
            Commands::Run { workflow, .. }
            | Commands::Validate { workflow }
            | Commands::Show { workflow } => workflow,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_dir = cli.dir.as_deref();
    let config = FlowcurrentConfig::load(project_dir)?;

    let log_file = match (cli.log_file.clone(), cli.log) {
        (Some(path), _) => Some(path),
        (None, true) => Some(logging::default_log_path(cli.command.workflow())?),
        (None, false) => config.defaults.log_file()?,
    };
    logging::init_logging(cli.debug, cli.quiet, log_file)?;

    let mode = if cli.quiet { OutputMode::Quiet } else { cli.output };
    let handler: Rc<dyn OutputHandler> = Rc::from(cli::create_handler(mode, cli.debug));

    let code = match cli.command {
        Commands::Run { workflow, args } => {
            let stdin = std::io::stdin();
            cli::run_workflow(&workflow, &args, project_dir, &config, handler, stdin.lock())?
        }
        Commands::Validate { workflow } => {
            cli::validate_workflow(&workflow, project_dir, handler.as_ref())
        }
        Commands::Show { workflow } => {
            cli::show_workflow(&workflow, project_dir, &config, handler.as_ref())?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
