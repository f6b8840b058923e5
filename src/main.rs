use clap::{Parser, Subcommand};
use stagepage::config::{self, ProjectConfig};
use stagepage::content::load_content;
use stagepage::generate::{self, BuildOptions};
use stagepage::optimize::{self, OptimizeOptions};
use stagepage::output;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagepage")]
#[command(about = "Single-page musician website builder")]
#[command(long_about = "\
Single-page musician website builder

Everything on the page comes from one JSON document. Edit the copy, links and
image filenames there, then rebuild.

Project structure:

  my-site/
  ├── stagepage.toml        # Optional config (run 'stagepage gen-config')
  ├── content.json          # All page copy, links and image filenames
  ├── styles.css            # Stylesheet referenced by the page
  ├── Images/               # Source images named in content.json
  └── Images_originals/     # Created by 'optimize' on first run

Commands:

  build      Render index.html. Images are embedded as base64 by default;
             --no-embed links them under images/ instead.
  optimize   Back up Images/ once, then downscale to 1400px and recompress
             every image in place.
  check      Parse content.json and report what the page will contain.")]
#[command(version)]
struct Cli {
    /// Project directory; all configured paths are relative to it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the page from the content document
    Build {
        /// Reference images by relative path instead of embedding them
        #[arg(long)]
        no_embed: bool,

        /// Content document (overrides content_file)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Output file (overrides output_file)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Back up and downscale/recompress images in place
    Optimize,
    /// Validate the content document without writing anything
    Check,
    /// Print a stock stagepage.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            no_embed,
            content,
            output: output_file,
        } => {
            let config = config::load_config(&cli.root)?;
            let options = BuildOptions {
                content_path: content
                    .map(|p| cli.root.join(p))
                    .unwrap_or_else(|| config.content_path(&cli.root)),
                images_dir: config.images_path(&cli.root),
                output_path: output_file
                    .map(|p| cli.root.join(p))
                    .unwrap_or_else(|| config.output_path(&cli.root)),
                mode: config.image_mode(no_embed),
                link_prefix: config.build.link_prefix.clone(),
            };
            println!("{}", output::format_build_header(options.mode));
            let report = generate::build(&options)?;
            output::print_build_report(&report);
        }
        Command::Optimize => {
            let config = config::load_config(&cli.root)?;
            init_thread_pool(&config.processing);
            let options = OptimizeOptions {
                images_dir: config.images_path(&cli.root),
                backup_dir: config.backup_path(&cli.root),
                normalize: config.optimize.normalize_config(),
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_optimize_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = optimize::optimize(&options, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_optimize_summary(&result?);
        }
        Command::Check => {
            let config = config::load_config(&cli.root)?;
            check(&config, &cli.root)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Parse the content document and list referenced images missing on disk.
fn check(config: &ProjectConfig, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content_path = config.content_path(root);
    let content = load_content(&content_path)?;
    let images_dir = config.images_path(root);
    let missing: Vec<&str> = content
        .image_refs()
        .into_iter()
        .filter(|name| !images_dir.join(name).is_file())
        .collect();
    output::print_check_output(&content, &content_path, &missing);
    println!("==> Content is valid");
    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
