//! JSON persistence of circuit descriptions.
//!
//! The on-disk document maps the data model field for field, with the topology
//! stored as a free-text tag:
//!
//! ```json
//! {
//!   "topology": "mixed",
//!   "branches": [ { "components": [ { "kind": "resistor", "resistance": 10.0 } ] } ],
//!   "source": { "magnitude": 127.0, "waveform": "rms", "frequency": 60.0 }
//! }
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::circuits::component::Component;
use crate::circuits::network::{Branch, Circuit, Source, Topology};
use crate::errors::CircuitError;

/// Errors raised while loading or saving a circuit description.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Document is not valid JSON or does not match the schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Document decoded but describes an invalid circuit.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Serialized form of a [`Circuit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitDocument {
    /// Topology tag: `series`, `parallel` or `mixed` (case-insensitive).
    pub topology: String,
    /// Components of a Series or Parallel circuit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    /// Branches of a Mixed circuit; empty branches are kept.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Branch>,
    /// Driving source.
    pub source: Source,
}

impl From<&Circuit> for CircuitDocument {
    fn from(circuit: &Circuit) -> Self {
        let (components, branches) = match &circuit.topology {
            Topology::Series(c) | Topology::Parallel(c) => (c.clone(), Vec::new()),
            Topology::Mixed(b) => (Vec::new(), b.clone()),
        };
        Self {
            topology: circuit.kind().to_string(),
            components,
            branches,
            source: circuit.source,
        }
    }
}

impl TryFrom<CircuitDocument> for Circuit {
    type Error = CircuitError;

    fn try_from(doc: CircuitDocument) -> Result<Self, Self::Error> {
        Self::from_tag(&doc.topology, doc.components, doc.branches, doc.source)
    }
}

/// Reads a circuit description from JSON.
pub fn load_circuit<R: Read>(reader: R) -> Result<Circuit, PersistenceError> {
    let doc: CircuitDocument = serde_json::from_reader(reader)?;
    let circuit = Circuit::try_from(doc)?;
    tracing::debug!(topology = %circuit.kind(), "loaded circuit description");
    Ok(circuit)
}

/// Reads a circuit description from a JSON string.
pub fn circuit_from_str(text: &str) -> Result<Circuit, PersistenceError> {
    load_circuit(text.as_bytes())
}

/// Writes `circuit` as pretty-printed JSON.
pub fn save_circuit<W: Write>(writer: W, circuit: &Circuit) -> Result<(), PersistenceError> {
    serde_json::to_writer_pretty(writer, &CircuitDocument::from(circuit))?;
    Ok(())
}
