//! Port observations collected during a probe run.

use provcheck_common::PortObservation;

use crate::domain::policy;

/// Observed state of one port, tagged with the package under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
    pub is_open: bool,
    pub package_label: String,
}

/// Port → record map that remembers insertion order.
///
/// Evaluation walks the entries in the order they were recorded, so a
/// deterministic probe sequence yields a deterministic violation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortProbeResult {
    entries: Vec<(u16, ProbeRecord)>,
}

impl PortProbeResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probe outcome. Recording a port twice keeps its original
    /// position and replaces the record.
    pub fn record(&mut self, port: u16, is_open: bool, package_label: &str) {
        let record = ProbeRecord {
            is_open,
            package_label: package_label.to_string(),
        };
        match self.entries.iter_mut().find(|(p, _)| *p == port) {
            Some((_, existing)) => *existing = record,
            None => self.entries.push((port, record)),
        }
    }

    #[must_use]
    pub fn get(&self, port: u16) -> Option<&ProbeRecord> {
        self.entries
            .iter()
            .find_map(|(p, record)| (*p == port).then_some(record))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &ProbeRecord)> {
        self.entries.iter().map(|(port, record)| (*port, record))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to the report representation, classifying each port.
    #[must_use]
    pub fn to_observations(&self) -> Vec<PortObservation> {
        self.iter()
            .map(|(port, record)| PortObservation {
                port,
                direction: policy::classify(port),
                is_open: record.is_open,
                package: record.package_label.clone(),
            })
            .collect()
    }
}
