//! mathmark CLI - Markdown + LaTeX live preview renderer

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use mathmark::{
    FileSurface, LivePreview, Preview, PreviewError, PreviewOptions, PreviewResult,
    DEFAULT_DEBOUNCE_MS,
};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::time::Duration;
#[cfg(feature = "cli")]
use tracing::{debug, info, warn};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathmark")]
#[command(version)]
#[command(about = "mathmark - Render Markdown with embedded LaTeX math to HTML", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (reads from stdin if not provided)
    input_file: Option<PathBuf>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    /// Options file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Args, Clone, Default)]
struct RenderArgs {
    /// Emit only the HTML fragment, without the document shell
    #[arg(long)]
    fragment: bool,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Math engine script URL
    #[arg(long)]
    mathjax_url: Option<String>,

    /// Run code blocks and code spans through the math stages too
    #[arg(long)]
    no_code_shield: bool,

    /// Pass raw HTML in the source through to the output
    #[arg(long)]
    allow_raw_html: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Render a file to a complete HTML document (default action)
    Render {
        /// Input file path
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the protected Markdown that would be handed to the renderer
    Protect {
        /// Input file path
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run code blocks and code spans through the math stages too
        #[arg(long)]
        no_code_shield: bool,
    },

    /// Re-render a file into an HTML document whenever it changes
    Watch {
        /// Source file to watch
        input: PathBuf,

        /// HTML file to keep up to date
        #[arg(short, long)]
        output: PathBuf,

        /// Quiet interval before re-rendering, in milliseconds
        #[arg(long, env = "MATHMARK_DEBOUNCE_MS")]
        debounce_ms: Option<u64>,

        /// How often to check the source file, in milliseconds
        #[arg(long, default_value_t = 100)]
        poll_ms: u64,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show version and pipeline info
    Info,
}

#[cfg(feature = "cli")]
fn main() -> PreviewResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let base = match cli.config {
        Some(ref path) => {
            debug!(path = %path.display(), "loading options");
            PreviewOptions::load(path)?
        }
        None => PreviewOptions::default(),
    };

    match cli.command {
        Some(Commands::Render {
            input,
            output,
            render,
        }) => run_render(input.as_deref(), output.as_deref(), &render, base),
        Some(Commands::Protect {
            input,
            output,
            no_code_shield,
        }) => {
            let options = PreviewOptions {
                shield_code: base.shield_code && !no_code_shield,
                ..base
            };
            let text = read_input(input.as_deref())?;
            let protected = Preview::new(options).protect(&text);
            write_output(output.as_deref(), &protected)
        }
        Some(Commands::Watch {
            input,
            output,
            debounce_ms,
            poll_ms,
            render,
        }) => {
            let mut options = apply_render_args(base, &render);
            if let Some(ms) = debounce_ms {
                options.debounce_ms = ms;
            }
            options.validate()?;
            if poll_ms == 0 {
                return Err(PreviewError::invalid("--poll-ms must be greater than zero"));
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(watch(input, output, options, Duration::from_millis(poll_ms)))
        }
        Some(Commands::Info) => {
            print_info();
            Ok(())
        }
        None => run_render(
            cli.input_file.as_deref(),
            cli.output.as_deref(),
            &cli.render,
            base,
        ),
    }
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn apply_render_args(base: PreviewOptions, args: &RenderArgs) -> PreviewOptions {
    PreviewOptions {
        shield_code: base.shield_code && !args.no_code_shield,
        allow_raw_html: base.allow_raw_html || args.allow_raw_html,
        mathjax_url: args.mathjax_url.clone().unwrap_or(base.mathjax_url),
        title: args.title.clone().or(base.title),
        ..base
    }
}

#[cfg(feature = "cli")]
fn run_render(
    input: Option<&Path>,
    output: Option<&Path>,
    args: &RenderArgs,
    base: PreviewOptions,
) -> PreviewResult<()> {
    let options = apply_render_args(base, args);
    options.validate()?;

    let text = read_input(input)?;
    let preview = Preview::new(options);
    let result = if args.fragment {
        preview.render_fragment(&text)
    } else {
        preview.render_document(&text)
    };
    write_output(output, &result)
}

#[cfg(feature = "cli")]
async fn watch(
    input: PathBuf,
    output: PathBuf,
    options: PreviewOptions,
    poll: Duration,
) -> PreviewResult<()> {
    info!(
        input = %input.display(),
        output = %output.display(),
        debounce_ms = options.debounce_ms,
        "watching for changes (Ctrl-C to stop)"
    );

    let live = LivePreview::spawn(Preview::new(options), FileSurface::new(&output));
    let mut last_seen: Option<String> = None;
    let mut ticker = tokio::time::interval(poll);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => match tokio::fs::read_to_string(&input).await {
                Ok(text) if last_seen.as_deref() != Some(text.as_str()) => {
                    debug!(len = text.len(), "source changed");
                    live.text_changed(text.clone())?;
                    last_seen = Some(text);
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "failed to read source"),
            },
            _ = &mut shutdown => {
                info!("stopping");
                break;
            }
        }
    }

    live.shutdown().await
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&Path>) -> PreviewResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn write_output(path: Option<&Path>, content: &str) -> PreviewResult<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("✓ Output written to: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_info() {
    println!("mathmark - Markdown + LaTeX live preview renderer");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Pipeline:");
    println!("  1. Shield tables and code");
    println!("  2. Normalize \\[ \\] and \\( \\) to $$ $$ and $ $");
    println!("  3. Escape _ {{ }} \\ inside math spans");
    println!("  4. Rewrite equation / align environments");
    println!("  5. Restore shielded blocks");
    println!("  6. Render Markdown (comrak, tables + fenced code)");
    println!("  7. Wrap in a MathJax-enabled HTML document");
    println!();
    println!("Watch mode debounce: {} ms by default", DEFAULT_DEBOUNCE_MS);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mathmark --features cli");
    eprintln!("  mathmark [OPTIONS] [INPUT_FILE]");
}
