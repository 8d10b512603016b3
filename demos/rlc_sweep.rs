use ac_phasor::circuits::{Circuit, Component, Source};
use ac_phasor::config::Thresholds;
use ac_phasor::io::write_bode_csv;
use ac_phasor::sweep::{bode_frequencies, frequency_sweep};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Series RLC network, resonant near 5 kHz.
    let circuit = Circuit::series(
        [
            Component::resistor(50.0),   // 50 Ω
            Component::inductor(1e-3),   // 1 mH
            Component::capacitor(1e-6),  // 1 µF
        ],
        Source::rms(1.0, 5.0e3),
    );

    let points = frequency_sweep(&circuit, bode_frequencies(circuit.source.frequency));
    write_bode_csv(std::io::stdout().lock(), &points, &Thresholds::default())
}
