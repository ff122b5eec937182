use clap::{Parser, Subcommand};
use squarefit::config::{self, Config};
use squarefit::imaging::OutputFormat;
use squarefit::server::Server;
use squarefit::{batch, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "squarefit")]
#[command(version)]
#[command(about = "Letterbox images onto a black square canvas")]
#[command(long_about = "\
Letterbox images onto a black square canvas

Every image is fit-resized so its longer edge matches its shorter edge, then
centered on an opaque black square of that size:

  1920x1080 → 1080x1080 (photo 1080x608, black bars above and below)
  600x800   → 600x600   (photo 450x600, black bars left and right)

Modes:
  serve   POST /upload with a multipart \"file\" field (image/jpeg, image/jpg,
          image/png) returns the squared image as a download. Every other path
          is served from the public directory.
  batch   Writes name-resize.ext next to every file under a directory. Stops at
          the first file that fails.

Configuration precedence: stock defaults < --config file < PORT < flags.
Run 'squarefit gen-config' for a documented config file.")]
struct Cli {
    /// Config file (TOML). Stock defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format policy, overrides imaging.output
    #[arg(long, value_enum, global = true)]
    output_format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the upload endpoint and static files
    Serve(ServeArgs),
    /// Square every file under a directory
    Batch {
        /// Directory to walk
        root: PathBuf,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Bind address, overrides server.addr
    #[arg(long)]
    addr: Option<String>,

    /// TCP port, overrides server.port and PORT
    #[arg(long)]
    port: Option<u16>,

    /// Static file directory, overrides server.public_dir
    #[arg(long)]
    public: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve(args) => {
            let mut config = load(cli.config.as_deref(), cli.output_format)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            if let Some(addr) = args.addr {
                config.server.addr = addr;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            if let Some(public) = args.public {
                config.server.public_dir = public;
            }
            config.validate()?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(Server::new(config).run())?;
        }
        Command::Batch { root } => {
            let config = load(cli.config.as_deref(), cli.output_format)?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::run(&root, &config.imaging.params(), Some(tx));
            printer
                .join()
                .map_err(|_| "batch output thread panicked")?;
            let summary = result?;
            println!("Done: {}", summary);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file (if any) and apply the global output flag.
fn load(
    path: Option<&Path>,
    output_format: Option<OutputFormat>,
) -> Result<Config, config::ConfigError> {
    let mut config = config::load_config(path)?;
    if let Some(output) = output_format {
        config.imaging.output = output;
    }
    Ok(config)
}

/// Log to stderr so batch progress on stdout stays clean.
///
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("squarefit={level},tower_http={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
