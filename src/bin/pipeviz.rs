use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pipeviz::generate::Unavailable;
use pipeviz::{
    Clock as _, DiagramController, ExplanationGenerator, ExplanationRequestFlow, GeminiClient,
    ManualClock, Millis, PanelView, PipevizConfig, RequestOutcome, STAGES, StageAnimator, StageId,
    SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "pipeviz", version)]
struct Cli {
    /// JSON config file. Environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the stage catalogue.
    Stages,
    /// Sample every stage at one instant and print the frame as JSON.
    Frame(FrameArgs),
    /// Print the states a stage enters over a number of cycles.
    Timeline(TimelineArgs),
    /// Run the animation loop in real time.
    Watch(WatchArgs),
    /// Ask for a stage explanation and print the panel.
    Explain(ExplainArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Time since mount, in milliseconds.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Stage name, e.g. `block-building`.
    #[arg(long)]
    stage: StageId,

    #[arg(long, default_value_t = 1)]
    cycles: u64,
}

#[derive(Parser, Debug)]
struct WatchArgs {
    /// Stop after this many milliseconds.
    #[arg(long, default_value_t = 10_000)]
    duration_ms: u64,

    /// Select this stage at start, which also requests its explanation. Further stages can be
    /// selected by writing their names to stdin, one per line.
    #[arg(long)]
    select: Option<StageId>,

    /// Print every frame as a JSON line instead of state changes.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ExplainArgs {
    #[arg(long)]
    stage: StageId,

    /// Parse a saved response instead of calling the model.
    #[arg(long)]
    raw_file: Option<PathBuf>,

    /// Print the panel as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = PipevizConfig::load(cli.config.as_deref()).context("load configuration")?;
    match cli.cmd {
        Command::Stages => cmd_stages(),
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Timeline(args) => cmd_timeline(&cfg, args),
        Command::Watch(args) => cmd_watch(&cfg, args).await,
        Command::Explain(args) => cmd_explain(&cfg, args).await,
    }
}

fn generator(cfg: &PipevizConfig) -> Arc<dyn ExplanationGenerator> {
    match GeminiClient::from_env(cfg.gemini.clone()) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::warn!(error = %err, "explanations unavailable");
            Arc::new(Unavailable(err))
        }
    }
}

fn mount(cfg: &PipevizConfig, now: Millis) -> anyhow::Result<DiagramController> {
    let flow = ExplanationRequestFlow::new(generator(cfg), cfg.flow);
    DiagramController::mount(flow, now, cfg.animation).context("mount diagram")
}

fn cmd_stages() -> anyhow::Result<()> {
    for stage in &STAGES {
        println!("{:<20} {:<20} {}", stage.id.slug(), stage.title, stage.description);
    }
    Ok(())
}

fn cmd_frame(cfg: &PipevizConfig, args: FrameArgs) -> anyhow::Result<()> {
    let clock = ManualClock::new();
    let mut controller = mount(cfg, clock.now())?;
    clock.set(Millis(args.at_ms));
    let frame = controller
        .tick(clock.now())?
        .context("diagram stopped before the first frame")?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&frame)
    } else {
        serde_json::to_string(&frame)
    }
    .context("encode frame JSON")?;
    println!("{out}");
    Ok(())
}

fn cmd_timeline(cfg: &PipevizConfig, args: TimelineArgs) -> anyhow::Result<()> {
    let animator = StageAnimator::mount(
        args.stage,
        Millis::ZERO,
        CancellationToken::new(),
        cfg.animation,
    )
    .with_context(|| format!("mount {}", args.stage))?;
    let period = animator.period();
    let entries = animator.entries();

    println!("{} (period {period})", args.stage.stage().title);
    for cycle in 0..args.cycles {
        for (offset, state) in &entries {
            let at = Millis(cycle * period.0 + offset.0);
            println!("{:>10}  {state}", at.to_string());
        }
    }
    Ok(())
}

async fn cmd_watch(cfg: &PipevizConfig, args: WatchArgs) -> anyhow::Result<()> {
    let clock = SystemClock::start();
    let mut controller = mount(cfg, clock.now())?;

    let (clicks, rx) = mpsc::channel(16);
    if let Some(stage) = args.select {
        clicks.send(stage).await.context("queue initial selection")?;
    }
    std::thread::spawn(move || read_clicks(clicks));

    let mut opts = cfg.drive;
    opts.max_duration_ms = Some(args.duration_ms);
    let mut last_panel: Option<PanelView> = None;
    let stats = pipeviz::drive(&mut controller, &clock, opts, rx, |frame| {
        if args.json {
            match serde_json::to_string(&frame) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::warn!(error = %err, "frame not encodable"),
            }
            return;
        }
        for view in frame.stages.iter().filter(|v| v.tick.entered) {
            println!("{:>10}  {:<20} {}", frame.at.to_string(), view.tick.stage, view.tick.state);
        }
        if last_panel.as_ref() != Some(&frame.panel) {
            println!("{:>10}  panel\n{}", frame.at.to_string(), frame.panel);
            last_panel = Some(frame.panel);
        }
    })
    .await?;

    controller.teardown();
    tracing::info!(
        frames = stats.frames,
        requests = stats.requests,
        at = %stats.ended_at,
        "watch finished"
    );
    Ok(())
}

/// Forward stage names typed on stdin as clicks until stdin closes or the loop stops listening.
fn read_clicks(clicks: mpsc::Sender<StageId>) {
    for line in std::io::stdin().lines() {
        let Ok(line) = line else { break };
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        match name.parse::<StageId>() {
            Ok(stage) => {
                if clicks.blocking_send(stage).is_err() {
                    break;
                }
            }
            Err(err) => tracing::warn!(input = name, error = %err, "ignoring click"),
        }
    }
}

async fn cmd_explain(cfg: &PipevizConfig, args: ExplainArgs) -> anyhow::Result<()> {
    let outcome = match &args.raw_file {
        Some(path) => RequestOutcome::from_text(args.stage, &read_text(path)?),
        None => {
            let flow = ExplanationRequestFlow::new(generator(cfg), cfg.flow);
            flow.run(args.stage)
                .await
                .context("explanation superseded before it arrived")?
        }
    };

    let panel = PanelView::derive(Some(args.stage), &outcome);
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&panel).context("encode panel JSON")?
        );
    } else {
        println!("{panel}");
    }

    if let RequestOutcome::Failed { failure, .. } = outcome {
        anyhow::bail!("explanation failed ({:?})", failure.kind);
    }
    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read response '{}'", path.display()))
}
