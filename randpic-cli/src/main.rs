use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use randpic_core::runtime::{MemoryStore, RandomPicRuntime};
use randpic_core::{run, BuildSettings, RuntimeConfig, DEFAULT_OUTPUT_DIR};

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Debug, Parser)]
#[command(name = "randpic", version, about = "Static random picture API builder")]
struct Args {
    /// Log at debug level (RUST_LOG overrides this).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shuffle `ri/h` and `ri/v` into the output folder and emit the
    /// script and pages. The output folder is deleted first.
    Build {
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Defaults to `<root>/dist`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Public URL prefix; overrides DOMAIN and config.json.
        #[arg(long)]
        domain: Option<String>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        no_gallery: bool,
    },
    /// Print the URLs a browser with the given user agent would get.
    Preview {
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        dist: PathBuf,

        #[arg(long, default_value = DESKTOP_UA)]
        user_agent: String,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn preview(dist: PathBuf, user_agent: &str, seed: Option<u64>) -> randpic_core::Result<()> {
    let config = RuntimeConfig::read(&dist)?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut runtime = RandomPicRuntime::new(config, MemoryStore::new(), rng, user_agent);

    let show = |url: String| if url.is_empty() { "(none)".to_string() } else { url };
    println!("horizontal: {}", show(runtime.pick_horizontal()));
    println!("vertical:   {}", show(runtime.pick_vertical()));
    println!("device:     {}", show(runtime.pick_by_device()));
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Command::Build {
            root,
            output,
            domain,
            seed,
            no_gallery,
        } => {
            let settings = BuildSettings {
                root,
                output,
                domain,
                seed,
                gallery: !no_gallery,
            };
            run(&settings).map(|summary| {
                for path in &summary.written {
                    tracing::debug!("wrote {}", path.display());
                }
            })
        }
        Command::Preview {
            dist,
            user_agent,
            seed,
        } => preview(dist, &user_agent, seed),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
