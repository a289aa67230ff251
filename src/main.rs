//! Replay tool: drives recorded input traces through the gesture engine
//! against synthetic hosts and prints the resulting snapshots.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gesture_stream::gesture::{aggregate, AggregateConfig, GestureHost, ObservableConfig};
use gesture_stream::input::types::{
    DeltaMode, EventKind, KeyInfo, ModifierFlags, RawInputEvent, WheelDelta,
};
use gesture_stream::input::{InputSurface, ManualTimer, SyntheticSurface, TimerService};
use gesture_stream::{GestureState, Trace};

#[derive(Parser)]
#[command(name = "gesture-replay")]
#[command(about = "Replay recorded input traces through the gesture engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a built-in demo trace and print gesture snapshots
    Demo,
    /// Write the built-in demo trace to a JSON file
    Synth {
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Replay a trace file and print gesture snapshots
    Replay {
        /// Trace file to replay
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Demo => run_replay(&demo_trace()),
        Commands::Synth { output } => {
            let trace = demo_trace();
            trace
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "wrote trace '{}' ({} events, {} ms) to {}",
                trace.name,
                trace.events.len(),
                trace.duration_ms(),
                output.display()
            );
            Ok(())
        }
        Commands::Replay { input } => {
            let trace = Trace::load(&input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            tracing::info!(name = %trace.name, events = trace.events.len(), "replaying trace");
            run_replay(&trace)
        }
    }
}

/// A short trace exercising every device: a mouse drag, a wheel burst with a
/// momentum tail, and a held arrow key.
fn demo_trace() -> Trace {
    let mut trace = Trace::new("demo");
    let flags = ModifierFlags::default();

    trace.push(RawInputEvent::mouse(EventKind::MouseDown, 0, 10.0, 10.0, flags));
    trace.push(RawInputEvent::mouse(EventKind::MouseMove, 20, 18.0, 12.0, flags));
    trace.push(RawInputEvent::mouse(EventKind::MouseMove, 40, 25.0, 15.0, flags));
    trace.push(RawInputEvent::mouse(EventKind::MouseUp, 60, 25.0, 15.0, flags));

    let spin = |time: u64, notches: f64| {
        RawInputEvent::wheel(
            time,
            0.0,
            0.0,
            WheelDelta {
                delta_y: notches * 40.0,
                mode: DeltaMode::Pixel,
                spin_y: Some(notches),
                ..Default::default()
            },
            flags,
        )
    };
    trace.push(spin(200, 1.0));
    trace.push(spin(220, 1.0));
    trace.push(spin(240, 0.05));
    trace.push(spin(260, 0.05));

    trace.push(RawInputEvent::keyboard(
        EventKind::KeyDown,
        600,
        KeyInfo::new("ArrowRight"),
        flags,
    ));
    trace.push(RawInputEvent::keyboard(
        EventKind::KeyDown,
        640,
        KeyInfo::new("ArrowRight"),
        flags,
    ));
    trace.push(RawInputEvent::keyboard(
        EventKind::KeyUp,
        680,
        KeyInfo::new("ArrowRight"),
        flags,
    ));

    trace
}

fn run_replay(trace: &Trace) -> Result<()> {
    let surface = Rc::new(SyntheticSurface::new());
    let timer = Rc::new(ManualTimer::new());
    let host = GestureHost::new(
        Rc::clone(&surface) as Rc<dyn InputSurface>,
        Rc::clone(&timer) as Rc<dyn TimerService>,
    );

    let observable = aggregate(&host, &AggregateConfig::all(&ObservableConfig::default()))?;
    let subscription = observable.subscribe(|state: &GestureState| {
        match serde_json::to_string(state) {
            Ok(line) => println!("{line}"),
            Err(error) => tracing::error!(%error, "failed to serialize snapshot"),
        }
    });

    for event in &trace.events {
        timer.advance_to(event.time);
        surface.dispatch(event);
    }
    // Let the wheel debounce settle so trailing bursts terminate.
    timer.advance(1000);

    subscription.unsubscribe();
    Ok(())
}
