//! Digital logic simulator CLI.
//!
//! This binary drives the SAP-1 computer built from the gatesim component library. It provides:
//! 1. **Program run:** Load a raw or `.hex` program image into RAM and clock the machine until
//!    it halts or runs out of cycles.
//! 2. **Demos:** Run one of the built-in sample programs by name.
//! 3. **Microcode dump:** Print the control-word sequence of every defined opcode.
//!
//! Logging follows `RUST_LOG` (for example `RUST_LOG=gatesim_core=debug`).

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gatesim_core::config::Config;
use gatesim_core::cpu::sap1::{self, RunSummary, Sap1, Sap1State, programs};
use gatesim_core::sim::load_program;
use gatesim_core::{Circuit, SimResult, SimStats};

#[derive(Parser, Debug)]
#[command(
    name = "gatesim",
    author,
    version,
    about = "Discrete-event digital logic simulator",
    long_about = "Simulate an 8-bit SAP-1 computer built gate by gate.\n\nExamples:\n  gatesim demo add\n  gatesim run program.hex --max-cycles 500 --stats\n  gatesim run program.bin --config timing.json --json\n  gatesim microcode"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program image (raw binary, or hex text if the name ends in `.hex`).
    Run {
        /// Program image to load at address 0.
        program: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Run a built-in sample program.
    Demo {
        /// Program name: add, subtract, memory, halt or count.
        name: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Print the SAP-1 microcode.
    Microcode,
}

#[derive(Args, Debug)]
struct RunOptions {
    /// JSON configuration file (timing, scheduler limits).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many clock cycles if the program has not halted.
    #[arg(short, long, default_value_t = 10_000)]
    max_cycles: u64,

    /// Clock half-period in ticks.
    #[arg(long, default_value_t = 1)]
    half_period: u64,

    /// Print the final state as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Print simulation statistics; optionally restrict to sections (summary, scheduler, netlist).
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    stats: Option<Vec<String>>,
}

#[derive(Serialize)]
struct Report<'a> {
    program: &'a str,
    summary: RunSummary,
    state: Sap1State,
    stats: SimStats,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Run { program, options }) => cmd_run(&program, &options),
        Some(Commands::Demo { name, options }) => cmd_demo(&name, &options),
        Some(Commands::Microcode) => cmd_microcode(),
        None => {
            eprintln!("gatesim: pass a subcommand");
            eprintln!();
            eprintln!("  gatesim run <program>      Run a .bin or .hex image");
            eprintln!("  gatesim demo <name>        Run a sample ({})", programs::NAMES.join(", "));
            eprintln!("  gatesim microcode          Dump the control ROM");
            eprintln!();
            eprintln!("  gatesim --help  for full options");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("\n[!] {e}");
        process::exit(1);
    }
}

/// Loads a program image from disk and runs it.
fn cmd_run(path: &std::path::Path, options: &RunOptions) -> SimResult<()> {
    let image = load_program(path)?;
    simulate(&path.display().to_string(), &image, options)
}

/// Runs a built-in sample program.
fn cmd_demo(name: &str, options: &RunOptions) -> SimResult<()> {
    let Some(image) = programs::by_name(name) else {
        eprintln!("Error: unknown demo '{name}'");
        eprintln!("  available: {}", programs::NAMES.join(", "));
        process::exit(1);
    };
    simulate(name, image, options)
}

/// Builds a SAP-1, loads `image`, clocks it and reports the result.
fn simulate(label: &str, image: &[u8], options: &RunOptions) -> SimResult<()> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut circuit = Circuit::new(config)?;
    let cpu = Sap1::with_clock(&mut circuit, options.half_period)?;
    cpu.load(&mut circuit, image)?;
    info!(program = label, bytes = image.len(), "program loaded");

    let summary = cpu.run(&mut circuit, options.max_cycles)?;
    let state = cpu.snapshot(&circuit);
    let stats = circuit.stats();

    if options.json {
        let report = Report {
            program: label,
            summary,
            state,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("[*] Program: {label} ({} bytes)", image.len());
    if summary.halted {
        println!("[*] Halted after {} cycles", summary.cycles);
    } else {
        println!("[*] Stopped after {} cycles (no HLT)", summary.cycles);
    }
    print_state(&state);
    if let Some(sections) = &options.stats {
        stats.print_sections(sections);
    }
    Ok(())
}

fn print_state(state: &Sap1State) {
    println!();
    println!("  OUT  {:#04x} ({})", state.out, state.out);
    println!("  A    {:#04x}    B    {:#04x}", state.a, state.b);
    println!("  PC   {:#04x}    MAR  {:#04x}", state.pc, state.mar);
    println!("  IR   {:#04x}    BUS  {:#04x}", state.ir, state.bus);
    println!("  STEP {}       CTRL {:#06x}", state.step, state.control);
}

/// Prints each opcode that does more than fetch, with its control words.
fn cmd_microcode() -> SimResult<()> {
    let table = sap1::microcode()?;
    println!(
        "SAP-1 microcode: {} opcode bits, {} steps per instruction, {}-bit control words",
        table.opcode_bits(),
        table.steps_per_instruction(),
        table.word_bits()
    );
    for opcode in 0..1u64 << table.opcode_bits() {
        let sequence = table.sequence(opcode);
        if opcode != sap1::op::NOP && sequence.len() == table.fetch_len() {
            continue;
        }
        let words: Vec<String> = sequence.iter().map(|w| format!("{w:#06x}")).collect();
        println!("  {opcode:#04x}  {}", words.join(" "));
    }
    Ok(())
}
