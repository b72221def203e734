use clap::Parser;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::{error::Error, io};
use tmsim::scheduler::lock;
use tmsim::{
    DefinitionLoader, HaltReason, MachineDefinition, RunConfig, RunEvent, RunScheduler,
    RunStatus, SampleManager, TuringMachine,
};
use tracing::info;

/// Blank cells shown around the written tape region in the final summary.
const TAPE_PADDING: i64 = 3;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli --sample palindrome --input 10101
  tmsim-cli --machine machines/binary-increment.json --input 1011 --delay 50 --debug
  cat machines/even-length.json | tmsim-cli --input 0110")]
struct Cli {
    /// The machine definition file (JSON) to execute
    #[clap(short, long, conflicts_with = "sample")]
    machine: Option<String>,

    /// Name of a built-in sample machine
    #[clap(short, long)]
    sample: Option<String>,

    /// The input written to the tape, one symbol per character
    #[clap(short, long)]
    input: Option<String>,

    /// Delay between steps in milliseconds (50-2000)
    #[clap(long, default_value_t = tmsim::config::DEFAULT_DELAY_MS)]
    delay: u64,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// List the built-in sample machines and exit
    #[clap(long)]
    list: bool,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tmsim=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    if cli.list {
        for index in 0..SampleManager::count() {
            if let Ok(info) = SampleManager::info(index) {
                println!(
                    "{:<20} states: {:<3} transitions: {:<3} input: {}",
                    info.name, info.state_count, info.transition_count, info.input
                );
            }
        }
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(RunStatus::Halted(HaltReason::Accepted)) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Loads the definition from a file, a sample, or stdin, in that order.
fn load_definition(cli: &Cli) -> Result<(MachineDefinition, Option<String>), Box<dyn Error>> {
    if let Some(path) = &cli.machine {
        Ok((DefinitionLoader::load(Path::new(path))?, None))
    } else if let Some(name) = &cli.sample {
        let sample = SampleManager::by_name(name)?;
        Ok((sample.definition, Some(sample.input)))
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok((DefinitionLoader::load_from_str(&buffer)?, None))
    } else {
        Err("no machine given; use --machine, --sample or pipe a definition via stdin".into())
    }
}

async fn run(cli: Cli) -> Result<RunStatus, Box<dyn Error>> {
    let (definition, sample_input) = load_definition(&cli)?;
    let input = cli.input.or(sample_input).unwrap_or_default();
    info!(machine = %definition.name, input = %input, "loaded");

    let mut scheduler = RunScheduler::new(TuringMachine::new(definition))?;
    let mut events = scheduler.subscribe();
    scheduler.initialize_str(&input)?;
    scheduler.start(&RunConfig::new(cli.delay))?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(RunEvent::Step(step)) if cli.debug => println!("{}", step),
                Some(RunEvent::Halted(_)) | Some(RunEvent::Cancelled) | None => break,
                Some(_) => {}
            },
            _ = tokio::signal::ctrl_c() => {
                scheduler.cancel();
            }
        }
    }

    let status = scheduler.wait().await;
    let machine = scheduler.machine();
    let machine = lock(&machine);

    println!("\nStatus: {}", status);
    println!("Steps: {}", machine.step_count());
    if let (Some(state), Some(head), Some(tape)) = (machine.state(), machine.head(), machine.tape()) {
        println!("State: {}, Head: {}", state, head);
        let window = tape.window(head, TAPE_PADDING, &machine.blank());
        let cells: String = window.iter().map(|cell| cell.symbol.as_str()).collect();
        let marker: String = window
            .iter()
            .map(|cell| {
                let pad = if cell.index == head { "^" } else { " " };
                pad.repeat(cell.symbol.chars().count().max(1))
            })
            .collect();
        println!("Tape: {}", cells);
        println!("      {}", marker);
    }

    Ok(status)
}
