//! CLI binary for pdf-summarizer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_summarizer::provider::DEFAULT_API_BASE;
use pdf_summarizer::server::{serve, AppState};
use pdf_summarizer::{
    summarize_file, summarize_to_file, ProgressHook, SummaryConfig, SummaryProgress, DEFAULT_MODEL,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress hook using indicatif ────────────────────────────────────────

/// Terminal progress hook: renders a live progress bar and per-topic log
/// lines using [indicatif]. Definition calls within a topic complete
/// out-of-order; only whole topics advance the bar.
struct CliProgress {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-topic wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Count of chat calls that degraded to placeholder text.
    degraded: AtomicUsize,
}

impl CliProgress {
    /// Create a hook whose progress-bar length is set dynamically by
    /// `on_run_start` (called once the topic count is known).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            degraded: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} topics  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Summarizing");
        self.bar.reset_eta();
    }
}

impl SummaryProgress for CliProgress {
    fn on_run_start(&self, total_topics: usize) {
        self.activate_bar(total_topics);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Summarizing {total_topics} topics…"))
        ));
    }

    fn on_topic_start(&self, topic_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(topic_num, Instant::now());
        self.bar.set_message(format!("topic {topic_num}"));
    }

    fn on_call_degraded(&self, topic_num: usize, error: String) {
        self.degraded.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };
        self.bar
            .println(format!("  {} Topic {:>3}  {}", red("✗"), topic_num, red(&msg)));
    }

    fn on_topic_complete(&self, topic_num: usize, total: usize, term_count: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&topic_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Topic {:>3}/{:<3}  {:<9}  {}",
            green("✓"),
            topic_num,
            total,
            dim(&format!("{term_count:>2} terms")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_topics: usize, clean_topics: usize) {
        let degraded = self.degraded.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if degraded == 0 {
            eprintln!(
                "{} {} topics summarized successfully",
                green("✔"),
                bold(&total_topics.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} topics clean  ({} calls degraded)",
                if clean_topics == 0 { red("✘") } else { cyan("⚠") },
                bold(&clean_topics.to_string()),
                total_topics,
                red(&degraded.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize to summary_output.pdf
  pdfsum paper.pdf

  # Choose the output file
  pdfsum paper.pdf -o notes/paper-summary.pdf

  # Plain-text report on stdout
  pdfsum --text paper.pdf

  # Structured JSON (topics, terms, stats)
  pdfsum --json paper.pdf > summary.json

  # Serve the web upload UI
  pdfsum --serve --addr 0.0.0.0:8080

  # Faster model, more definition concurrency
  pdfsum --model llama-3.1-8b-instant -c 8 paper.pdf

MODELS:
  Model                      Notes
  ─────────────────────────  ─────────────────────────────────────────
  llama-3.1-70b-versatile    Default; strongest summaries (Groq)
  llama-3.1-8b-instant       Fastest and cheapest, terser definitions
  mixtral-8x7b-32768         32k context for very dense topics

  Any model behind an OpenAI-compatible endpoint works via --api-base.

ENVIRONMENT VARIABLES:
  GROQ_API_KEY        API credential (required unless a provider is injected)
  PDFSUM_OUTPUT       Default output path
  PDFSUM_MODEL        Override model ID
  PDFSUM_API_BASE     OpenAI-compatible endpoint base URL
  PDFSUM_CONCURRENCY  Concurrent definition calls per topic
  PDFSUM_MAX_RETRIES  Retries per failed chat call
  PDFSUM_API_TIMEOUT  Per-call timeout in seconds
  PDFSUM_ADDR         Listen address for --serve

SETUP:
  1. Set API key:   export GROQ_API_KEY=gsk_...
  2. Summarize:     pdfsum paper.pdf
  3. Or serve:      pdfsum --serve     (then open http://127.0.0.1:8080)
"#;

/// Summarize PDFs and define their technical terms using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsum",
    version,
    about = "Summarize PDFs and define their technical terms using LLMs",
    long_about = "Summarize a PDF topic by topic using a chat model (Groq by default), define the \
technical terms each topic uses, and render the result as a styled summary PDF. Also ships a \
small web UI for drag-and-drop use (--serve).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to summarize.
    #[arg(required_unless_present = "serve")]
    input: Option<PathBuf>,

    /// Write the summary PDF to this file.
    #[arg(short, long, env = "PDFSUM_OUTPUT", default_value = "summary_output.pdf")]
    output: PathBuf,

    /// Chat model ID.
    #[arg(
        long,
        env = "PDFSUM_MODEL",
        default_value = DEFAULT_MODEL,
        long_help = "Chat model to use. Default: llama-3.1-70b-versatile (Groq).\n\
          Any model served by an OpenAI-compatible endpoint works together with --api-base."
    )]
    model: String,

    /// Base URL of the OpenAI-compatible chat endpoint.
    #[arg(long, env = "PDFSUM_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Number of concurrent definition calls per topic.
    #[arg(short, long, env = "PDFSUM_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Retries per chat call on failure (0 = fail straight to placeholder).
    #[arg(long, env = "PDFSUM_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-call API timeout in seconds.
    #[arg(long, env = "PDFSUM_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print the flat report text to stdout instead of writing a PDF.
    #[arg(long, conflicts_with = "json")]
    text: bool,

    /// Output structured JSON (SummaryOutput) instead of writing a PDF.
    #[arg(long, env = "PDFSUM_JSON")]
    json: bool,

    /// Serve the web upload UI instead of summarizing a file.
    #[arg(long, env = "PDFSUM_SERVE")]
    serve: bool,

    /// Listen address for --serve.
    #[arg(long, env = "PDFSUM_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// Disable progress bar.
    #[arg(long, env = "PDFSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSUM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.serve;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Server mode ──────────────────────────────────────────────────────
    if cli.serve {
        let config = build_config(&cli, None)?;
        let state = AppState::with_output_path(config, &cli.output);
        serve(&cli.addr, state).await.context("Server failed")?;
        return Ok(());
    }

    let input = cli
        .input
        .as_ref()
        .context("missing input PDF (or pass --serve)")?;

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar starts as a spinner (no topic count yet);
    // `on_run_start` resizes it once the PDF has been segmented.
    let progress: Option<ProgressHook> = if show_progress {
        Some(CliProgress::new_dynamic() as Arc<dyn SummaryProgress>)
    } else {
        None
    };
    let config = build_config(&cli, progress)?;

    // ── Run summarization ────────────────────────────────────────────────
    if cli.json || cli.text {
        let output = summarize_file(input, &config)
            .await
            .context("Summarization failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let text = output.report_text();
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        // Summary to stderr (the progress hook already printed its own).
        if !cli.quiet && !show_progress {
            eprintln!(
                "Summarized {}/{} topics in {}ms",
                output.stats.clean_topics, output.stats.total_topics, output.stats.total_duration_ms
            );
            if output.stats.degraded_calls > 0 {
                eprintln!(
                    "  {} calls degraded to placeholders",
                    output.stats.degraded_calls
                );
            }
        } else if !cli.quiet && !cli.json {
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&output.stats.total_input_tokens.to_string()),
                dim(&output.stats.total_output_tokens.to_string()),
            );
        }
    } else {
        let stats = summarize_to_file(input, &cli.output, &config)
            .await
            .context("Summarization failed")?;

        // Summary line (the hook already printed the per-topic log).
        if !cli.quiet {
            eprintln!(
                "{}  {}/{} topics  {}ms  →  {}",
                if stats.degraded_calls == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.clean_topics,
                stats.total_topics,
                stats.total_duration_ms,
                bold(&cli.output.display().to_string()),
            );
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&stats.total_input_tokens.to_string()),
                dim(&stats.total_output_tokens.to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressHook>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .model(cli.model.clone())
        .api_base(cli.api_base.clone())
        .concurrency(cli.concurrency)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);

    if let Some(hook) = progress {
        builder = builder.progress(hook);
    }

    builder.build().context("Invalid configuration")
}
