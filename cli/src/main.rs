//! lexcheck CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`lexcheck_engine`] (configuration, intake, session state) and
//! [`lexcheck_tui`] (rendering), providing RAII-based terminal management with
//! guaranteed cleanup.
//!
//! ```text
//! main() -> prepare() -> Prepared { client, request, ... }
//!                            |
//!            +---------------+----------------+
//!            v               v                v
//!        run_tui()      run_plain()       run_json()
//! ```
//!
//! # Event Loop
//!
//! The inline TUI uses a fixed 8ms (~120 FPS) render cadence while the request
//! runs concurrently:
//!
//! 1. Wait for the next frame tick or the request to complete
//! 2. Apply retry notices to the session
//! 3. Drain input (Esc / Ctrl+C cancels)
//! 4. Advance session state (`session.tick()`)
//! 5. Flush the finished report into scrollback
//! 6. Render frame
//!
//! # Exit codes
//!
//! `0` success, `1` analysis failed or was cancelled, `2` input or configuration error.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{TerminalOptions, Viewport, layout::Position, prelude::*};
use std::{
    env,
    fs::{self, OpenOptions},
    io::{IsTerminal, Stdout, Write, stdout},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lexcheck_engine::config::{DEFAULT_SAVE_DIR, ENDPOINT_ENV};
use lexcheck_engine::lexcheck_client::{Analysis, AnalysisClient, RetryNotice};
use lexcheck_engine::lexcheck_types::{AnalysisDomain, AnalyzeRequest};
use lexcheck_engine::{
    BannerKind, LexcheckConfig, Overrides, Phase, Session, Settings, TextSource, load_document,
    save_results,
};
use lexcheck_tui::{
    INLINE_VIEWPORT_HEIGHT, RenderOptions, ReportOutput, draw_inline, plain_report,
};

const EXIT_ANALYSIS_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

const FRAME_DURATION: Duration = Duration::from_millis(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Live inline view, report left in scrollback
    Tui,
    /// Unstyled report text
    Plain,
    /// Raw response JSON
    Json,
}

/// Analyze a legal document for privacy, IP or contract compliance.
#[derive(Debug, Parser)]
#[command(name = "lexcheck", version, about)]
struct Cli {
    /// Document to analyze (.txt, .doc, .docx). Defaults to Target.txt.
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Text to analyze; `-` reads standard input
    #[arg(short, long, value_name = "TEXT")]
    text: Option<String>,

    /// Analysis domain: privacy, intellectual_property or contract
    #[arg(short, long, value_name = "DOMAIN")]
    domain: Option<AnalysisDomain>,

    /// Ask the server to use its professional knowledge base
    #[arg(long)]
    professional_kb: bool,

    /// Analysis endpoint URL (overrides config and LEXCHECK_ENDPOINT)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Output format; defaults to `tui` on a terminal and `plain` otherwise
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Save the raw response to DIR/analysis_results.json
    #[arg(
        long,
        value_name = "DIR",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SAVE_DIR
    )]
    save: Option<PathBuf>,

    /// Include the related context passage in the report
    #[arg(long)]
    show_context: bool,

    /// Use ASCII-only glyphs
    #[arg(long)]
    ascii: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            domain: self.domain,
            professional_kb: self.professional_kb.then_some(true),
            save_dir: self.save.clone(),
            ascii_only: self.ascii.then_some(true),
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.lexcheck/logs/lexcheck.log
    if let Some(config_path) = LexcheckConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("lexcheck.log"));
    }

    // Fallback: ./.lexcheck/logs/lexcheck.log
    candidates.push(PathBuf::from(".lexcheck").join("logs").join("lexcheck.log"));

    candidates
}

/// Everything needed to run one analysis, validated before any request.
struct Prepared {
    client: AnalysisClient,
    request: AnalyzeRequest,
    format: OutputFormat,
    render: RenderOptions,
    save_dir: Option<PathBuf>,
}

fn prepare(cli: Cli) -> Result<Prepared> {
    let config = LexcheckConfig::load().context("failed to load configuration")?;
    let settings = Settings::resolve(
        config.as_ref(),
        env::var(ENDPOINT_ENV).ok(),
        &cli.overrides(),
    )?;

    let source = TextSource::from_args(cli.file, cli.text);
    let document = load_document(&source)?;
    tracing::info!(origin = %document.origin, domain = %settings.domain, "Document ready");

    let mut request = AnalyzeRequest::new(document.text, settings.domain);
    if settings.professional_kb {
        request = request.with_professional_kb(true);
    }

    let client = AnalysisClient::new(settings.client)?;
    let format = cli.format.unwrap_or_else(|| {
        if stdout().is_terminal() {
            OutputFormat::Tui
        } else {
            OutputFormat::Plain
        }
    });

    Ok(Prepared {
        client,
        request,
        format,
        render: RenderOptions {
            ui: settings.ui,
            show_context: cli.show_context,
        },
        save_dir: settings.save_dir,
    })
}

/// RAII wrapper for the inline terminal viewport.
///
/// Raw mode keeps keystrokes out of the viewport. On drop the cursor is parked
/// below the last frame so the final view stays on screen.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = match Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(INLINE_VIEWPORT_HEIGHT),
            },
        ) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let bottom = self.terminal.get_frame().area().bottom();
        let _ = self
            .terminal
            .set_cursor_position(Position::new(0, bottom.saturating_sub(1)));
        let _ = self.terminal.show_cursor();
        let backend = self.terminal.backend_mut();
        let _ = backend.write_all(b"\r\n");
        let _ = std::io::Write::flush(backend);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    Finished,
    Cancelled,
}

/// Esc or Ctrl+C pressed since the last frame.
fn cancel_requested() -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let ctrl_c =
                key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
            if ctrl_c || key.code == KeyCode::Esc {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Drive the viewport until the request finishes or `cancel` reports true.
async fn run_inline<B>(
    terminal: &mut Terminal<B>,
    prepared: &Prepared,
    session: &mut Session,
    mut cancel: impl FnMut() -> Result<bool>,
) -> Result<RunEnd>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let (retry_tx, mut retry_rx) = mpsc::unbounded_channel::<RetryNotice>();
    let analysis = prepared.client.analyze(&prepared.request, move |notice| {
        let _ = retry_tx.send(notice);
    });
    tokio::pin!(analysis);

    let mut output = ReportOutput::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        let finished = tokio::select! {
            result = &mut analysis, if session.is_busy() => Some(result),
            _ = frames.tick() => None,
        };

        while let Ok(notice) = retry_rx.try_recv() {
            session.on_retry(notice, Instant::now());
        }
        if let Some(result) = finished {
            session.finish(result, Instant::now());
        }

        if session.is_busy() && cancel()? {
            tracing::info!("Analysis cancelled by user");
            session.show_banner(
                BannerKind::Error,
                "Analysis cancelled".to_string(),
                Instant::now(),
            );
            terminal.draw(|frame| draw_inline(frame, session, &prepared.render))?;
            return Ok(RunEnd::Cancelled);
        }

        session.tick(Instant::now());
        output.flush(terminal, session, &prepared.render)?;
        terminal.draw(|frame| draw_inline(frame, session, &prepared.render))?;

        if session.is_finished() {
            return Ok(RunEnd::Finished);
        }
    }
}

async fn run_tui(prepared: &Prepared, session: &mut Session) -> Result<RunEnd> {
    let mut terminal = TerminalSession::new()?;
    run_inline(&mut terminal.terminal, prepared, session, cancel_requested).await
}

/// Run the request without a viewport, reporting retries on stderr.
async fn run_headless(prepared: &Prepared, session: &mut Session) {
    let result = prepared
        .client
        .analyze(&prepared.request, |notice| {
            eprintln!(
                "Connection failed, retrying ({}/{})...",
                notice.failed_attempt, notice.max_attempts
            );
            session.on_retry(notice, Instant::now());
        })
        .await;
    session.finish(result, Instant::now());
}

fn emit_report(analysis: &Analysis, prepared: &Prepared) -> Result<()> {
    let mut out = stdout().lock();
    match prepared.format {
        OutputFormat::Tui => {}
        OutputFormat::Plain => {
            out.write_all(plain_report(&analysis.report, &prepared.render).as_bytes())?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &analysis.raw)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

async fn execute(prepared: &Prepared) -> Result<ExitCode> {
    let mut session = Session::new(prepared.client.endpoint().as_str());
    session.begin(prepared.client.retry_policy().attempts(), Instant::now())?;

    let end = match prepared.format {
        OutputFormat::Tui => run_tui(prepared, &mut session).await?,
        OutputFormat::Plain | OutputFormat::Json => {
            run_headless(prepared, &mut session).await;
            RunEnd::Finished
        }
    };

    if matches!(end, RunEnd::Cancelled) {
        eprintln!("Analysis cancelled");
        return Ok(ExitCode::from(EXIT_ANALYSIS_FAILED));
    }

    match session.phase() {
        Phase::Done(analysis) => {
            emit_report(analysis, prepared)?;
            if let Some(dir) = &prepared.save_dir {
                let path = save_results(dir, &analysis.raw)?;
                eprintln!("Results saved to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Phase::Failed { message, .. } => {
            eprintln!("{message}");
            Ok(ExitCode::from(EXIT_ANALYSIS_FAILED))
        }
        Phase::Idle | Phase::Analyzing { .. } => Ok(ExitCode::from(EXIT_ANALYSIS_FAILED)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let prepared = match prepare(cli) {
        Ok(prepared) => prepared,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "Invalid input");
            eprintln!("Error: {err:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match execute(&prepared).await {
        Ok(code) => code,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "Run failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_ANALYSIS_FAILED)
        }
    }
}
