use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::Result;

/// Loss and accuracy of one completed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Mean of the per-batch total losses.
    pub loss: f64,
    /// Evaluation accuracy in percent.
    pub accuracy: f64,
}

/// Append-only record of a training run, one entry per epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> History {
        History::default()
    }

    pub fn push(&mut self, loss: f64, accuracy: f64) {
        self.entries.push(HistoryEntry { loss, accuracy });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn losses(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.loss).collect()
    }

    pub fn accuracies(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.accuracy).collect()
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        debug!(path, epochs = self.entries.len(), "saved history");
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<History> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_epochs_in_order() {
        let mut history = History::new();
        history.push(0.9, 55.0);
        history.push(0.4, 81.5);
        assert_eq!(history.losses(), vec![0.9, 0.4]);
        assert_eq!(history.accuracies(), vec![55.0, 81.5]);
        assert_eq!(history.last().map(|e| e.accuracy), Some(81.5));
    }

    #[test]
    fn survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.json");
        let path = path.to_str().unwrap();

        let mut history = History::new();
        history.push(1.25, 40.0);
        history.push(0.5, 90.0);
        history.save_json(path).unwrap();

        assert_eq!(History::load_json(path).unwrap(), history);
    }
}
