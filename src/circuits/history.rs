//! Incremental network construction.
//!
//! Groups (series chains such as [`Branch::rlc`]) are attached one at a time to
//! the network built so far, either in series or in parallel with all of it.
//! [`build_history`] records the equivalent impedance after every step.

use std::fmt;

use crate::config::Thresholds;
use crate::errors::{CircuitError, ElementLocation};
use crate::math::{format_polar, CScalar, Scalar};

use super::network::{parallel_impedance, series_impedance, Branch};
use super::resolve::resolve_with;

/// How a new group is attached to the network built so far.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connection {
    /// In series with the existing network.
    Series,
    /// Across the existing network.
    Parallel,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Series => "series",
            Self::Parallel => "parallel",
        })
    }
}

/// One construction step.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    /// Index of the group in the input sequence.
    pub group: usize,
    /// Connection used, `None` for the group that starts the network.
    pub connection: Option<Connection>,
    /// Series impedance of the group alone.
    pub group_impedance: CScalar,
    /// Equivalent impedance of the whole network after this step.
    pub total_impedance: CScalar,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connection = self
            .connection
            .map_or_else(|| String::from("start"), |c| c.to_string());
        write!(
            f,
            "G{} ({connection}): Z_group={} Z_total={}",
            self.group + 1,
            format_polar(self.group_impedance),
            format_polar(self.total_impedance)
        )
    }
}

/// Attaches `groups` in order at `frequency_hz` and returns the equivalent
/// impedance after each one. Empty groups are skipped; the connection of the
/// first non-empty group is ignored.
pub fn build_history<'a, I>(
    groups: I,
    frequency_hz: Scalar,
    thresholds: &Thresholds,
) -> Result<Vec<HistoryEntry>, CircuitError>
where
    I: IntoIterator<Item = (Connection, &'a Branch)>,
{
    let mut history: Vec<HistoryEntry> = Vec::new();
    for (group, (connection, branch)) in groups.into_iter().enumerate() {
        if branch.is_empty() {
            tracing::debug!(group = group + 1, "skipping empty group");
            continue;
        }
        let impedances = branch
            .components
            .iter()
            .enumerate()
            .map(|(i, component)| {
                resolve_with(component, frequency_hz, thresholds)
                    .map(|resolved| resolved.impedance)
                    .map_err(|err| CircuitError::at(ElementLocation::in_branch(group, i), err))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let group_impedance = series_impedance(impedances);

        let entry = match history.last() {
            None => HistoryEntry {
                group,
                connection: None,
                group_impedance,
                total_impedance: group_impedance,
            },
            Some(previous) => {
                let total_impedance = match connection {
                    Connection::Series => series_impedance([previous.total_impedance, group_impedance]),
                    Connection::Parallel => {
                        parallel_impedance([previous.total_impedance, group_impedance], thresholds)
                    }
                };
                HistoryEntry {
                    group,
                    connection: Some(connection),
                    group_impedance,
                    total_impedance,
                }
            }
        };
        tracing::debug!(%entry, "attached group");
        history.push(entry);
    }
    Ok(history)
}
