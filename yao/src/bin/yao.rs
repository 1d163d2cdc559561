//! Run one party of a Yao garbled circuit computation.
//!
//! Start the evaluator first, then the garbler, e.g.
//! `cargo run --bin yao -- --party evaluator` and
//! `cargo run --bin yao -- --party garbler --circuit-id AND2 --input 1`.
//!
//! Without `--input` the evaluator prompts once the bundle arrives, while the garbler
//! waits on the socket with its read timeout (`timeout_secs`, 30 by default). Pass
//! `--input` on both sides, or `--timeout-secs 0` on the garbler, for interactive runs.

use std::io::{self, BufRead, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use circuit::{Circuit, CircuitFile};
use crypto_core::NetChannel;
use structopt::StructOpt;
use tracing::metadata::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};
use yao::config::{parse_config_file, OtMode, Party, ProtocolConfig};
use yao::{ChannelTransport, EvaluatorParty, GarblerParty};

/// Fields loaded from the command line, they override the configuration file.
#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "yao", about = "Yao garbled circuit two-party computation")]
struct CliFields {
    /// Configuration file location
    #[structopt(long)]
    config_file: Option<String>,

    /// garbler or evaluator
    #[structopt(long)]
    party: Option<Party>,

    /// Send both labels of every evaluator input in the bundle. Not secure.
    #[structopt(long)]
    no_oblivious_transfer: bool,

    /// Keep the output on the evaluator's side
    #[structopt(long)]
    no_share_output: bool,

    #[structopt(long)]
    address: Option<String>,

    /// Read timeout in seconds, 0 disables it
    #[structopt(long)]
    timeout_secs: Option<u64>,

    /// JSON circuit file, or a Bristol-fashion file with --bristol
    #[structopt(long, parse(from_os_str), default_value = "circuit/circuit_files/json/basic.json")]
    circuit_file: PathBuf,

    #[structopt(long)]
    bristol: bool,

    /// Circuit to garble, every circuit of the file when missing
    #[structopt(long)]
    circuit_id: Option<String>,

    /// Input bits such as "101", prompted for when missing
    #[structopt(long)]
    input: Option<String>,

    #[structopt(long)]
    log_level: Option<String>,
}

fn load_config(cli: &CliFields) -> Result<ProtocolConfig> {
    let mut config: ProtocolConfig = match &cli.config_file {
        Some(location) => parse_config_file(location)
            .with_context(|| format!("Failed to load config file {location}"))?,
        None => ProtocolConfig::default(),
    };
    if let Some(party) = cli.party {
        config.party = party;
    }
    if cli.no_oblivious_transfer {
        config.oblivious_transfer = OtMode::Disabled;
    }
    if cli.no_share_output {
        config.share_output = false;
    }
    if let Some(address) = &cli.address {
        config.address = address.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = Some(secs);
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
        config.log.filter = None;
    }
    Ok(config)
}

fn init_tracing(config: &ProtocolConfig) -> Result<()> {
    let directives = config
        .log
        .filter
        .clone()
        .unwrap_or_else(|| config.log.level.clone());
    // if fail to parse log filter, then set INFO level logging for all crates
    let env_filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives);

    let format_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_thread_ids(true)
        .with_thread_names(true);

    Registry::default()
        .with(env_filter_layer)
        .with(format_layer)
        .try_init()?;

    Ok(())
}

fn load_circuits(cli: &CliFields) -> Result<Vec<Circuit>> {
    if cli.bristol {
        return Ok(vec![Circuit::load_bristol(&cli.circuit_file)?]);
    }
    let file = CircuitFile::load(&cli.circuit_file)?;
    match &cli.circuit_id {
        Some(id) => Ok(vec![file.circuit(id)?]),
        None => file
            .ids()
            .map(|id| file.circuit(id).map_err(anyhow::Error::from))
            .collect(),
    }
}

/// Parse bits written as `101` or `1 0 1`.
fn parse_bits(s: &str, n: usize) -> Result<Vec<bool>> {
    let bits = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(anyhow!("invalid bit {c:?}")),
        })
        .collect::<Result<Vec<_>>>()?;
    if bits.len() != n {
        bail!("expected {n} bits, got {}", bits.len());
    }
    Ok(bits)
}

fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

/// Serializes prompts of concurrent runs.
static PROMPT: Mutex<()> = Mutex::new(());

fn read_bits(preset: &Option<String>, who: &str, circ: &Circuit, wires: &[usize]) -> Result<Vec<bool>> {
    if let Some(s) = preset {
        return parse_bits(s, wires.len());
    }
    if wires.is_empty() {
        return Ok(vec![]);
    }
    let _guard = PROMPT.lock().map_err(|_| anyhow!("prompt lock poisoned"))?;
    print!("{who} input for {} (wires {:?}): ", circ.id, wires);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_bits(&line, wires.len())
}

fn run_garbler(cli: &CliFields, config: &ProtocolConfig) -> Result<()> {
    for circ in load_circuits(cli)? {
        let inputs = read_bits(&cli.input, "garbler", &circ, &circ.garbler_inputs)?;

        let channel = NetChannel::connect(&config.address)
            .with_context(|| format!("Failed to connect to {}", config.address))?;
        channel.set_timeout(config.timeout())?;
        let mut garbler = GarblerParty::new(ChannelTransport::new(channel), config.clone());

        match garbler.run(&circ, &inputs)? {
            Some(outputs) => println!("{}: output {}", circ.id, format_bits(&outputs)),
            None => println!("{}: done, output kept by the evaluator", circ.id),
        }
    }
    Ok(())
}

fn handle_connection(channel: NetChannel, cli: &CliFields, config: ProtocolConfig) -> Result<()> {
    channel.set_timeout(config.timeout())?;
    let mut evaluator = EvaluatorParty::new(ChannelTransport::new(channel), config);

    let bundle = evaluator.receive_bundle()?;
    let circ = bundle.circuit.clone();
    let inputs = read_bits(&cli.input, "evaluator", &circ, &circ.evaluator_inputs)?;
    let outputs = evaluator.evaluate(bundle, &inputs)?;
    println!("{}: output {}", circ.id, format_bits(&outputs));
    Ok(())
}

fn run_evaluator(cli: &CliFields, config: &ProtocolConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.address)
        .with_context(|| format!("Failed to listen on {}", config.address))?;
    info!(address = %config.address, "listening");

    thread::scope(|s| loop {
        let (channel, peer) = match NetChannel::accept(&listener) {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "accept failed");
                continue;
            }
        };
        info!(%peer, "new run");
        let config = config.clone();
        s.spawn(move || {
            if let Err(e) = handle_connection(channel, cli, config) {
                error!(%peer, error = ?e, "run failed");
            }
        });
    })
}

fn main() -> Result<()> {
    let cli = CliFields::from_args();
    let config = load_config(&cli)?;
    init_tracing(&config)?;

    match config.party {
        Party::Garbler => run_garbler(&cli, &config),
        Party::Evaluator => run_evaluator(&cli, &config),
    }
}
