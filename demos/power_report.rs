use std::io::Read;

use ac_phasor::io::{circuit_from_str, write_phasors_csv};
use ac_phasor::prelude::*;

const DEFAULT_CIRCUIT: &str = r#"{
    "topology": "mixed",
    "branches": [
        { "components": [ { "kind": "resistor", "resistance": 10.0 } ] },
        { "components": [
            { "kind": "resistor", "resistance": 6.0 },
            { "kind": "known_impedance", "rectangular": "0+8j" }
        ] }
    ],
    "source": { "magnitude": 127.0, "waveform": "rms", "frequency": 60.0 }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Reads a circuit document from stdin when one is piped in.
    let mut input = String::new();
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        std::io::stdin().read_to_string(&mut input)?;
    }
    let text = if input.trim().is_empty() { DEFAULT_CIRCUIT } else { input.as_str() };

    let circuit = circuit_from_str(text)?;
    let result = solve(&circuit);
    print!("{result}");
    if result.calc_ok {
        println!(
            "peak source amplitude for waveform plots: {:.4} V",
            circuit.source.peak_amplitude()
        );
        write_phasors_csv(std::io::stdout().lock(), &result.phasors())?;
    }
    Ok(())
}
