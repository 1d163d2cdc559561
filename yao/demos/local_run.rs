use std::thread;

use circuit::CircuitFile;
use crypto_core::local_channel_pair;
use yao::{ChannelTransport, EvaluatorParty, GarblerParty, Party, ProtocolConfig};

fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|b| (*b as u8).to_string()).collect()
}

// Both parties in one process, over a local socket pair.
// cargo run --example local_run
pub fn main() {
    tracing_subscriber::fmt().compact().init();

    let file = CircuitFile::load("circuit/circuit_files/json/basic.json").unwrap();
    let circ = file.circuit("GT2").unwrap();
    let (a, b) = local_channel_pair().unwrap();

    // x = 2, y = 1, least significant bit first
    let x = vec![false, true];
    let y = vec![true, false];

    let circ_g = circ.clone();
    let handle = thread::spawn(move || {
        let mut garbler = GarblerParty::new(
            ChannelTransport::new(a),
            ProtocolConfig::new(Party::Garbler),
        );
        garbler.run(&circ_g, &x).unwrap()
    });

    let mut evaluator = EvaluatorParty::new(
        ChannelTransport::new(b),
        ProtocolConfig::new(Party::Evaluator),
    );
    let res = evaluator.run(&y).unwrap();
    let shared = handle.join().unwrap();

    println!("=============================");
    println!("Compute {} with Yao's protocol\n", circ.id);
    println!("The evaluator got: {}", format_bits(&res));
    println!("The garbler got: {}", shared.map(|r| format_bits(&r)).unwrap_or_default());
}
