//! Case files: the JSON document handed from the perception stage to the
//! numeric core (objects + timeline events for one piece of footage).

use forensic_core::types::{TimelineEvent, TrackedObject};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Everything the core needs about one analysed video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseFile {
    pub name: String,
    /// Length of the footage in seconds
    pub duration: f64,
    pub objects: Vec<TrackedObject>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

/// Save a case file as pretty-printed JSON.
pub fn save_case(case: &CaseFile, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, case)?;
    Ok(())
}

/// Load a case file from JSON.
pub fn load_case(path: &Path) -> anyhow::Result<CaseFile> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let case: CaseFile = serde_json::from_reader(reader)?;
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{Scenario, ScenarioKind};

    #[test]
    fn save_then_load_preserves_case() {
        let case = Scenario::build(ScenarioKind::RearEnd, 11).case_file();
        let path = std::env::temp_dir().join(format!("case_{}.json", std::process::id()));
        save_case(&case, &path).unwrap();
        let loaded = load_case(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.name, case.name);
        assert_eq!(loaded.duration, case.duration);
        assert_eq!(loaded.events, case.events);
        let ids = |c: &CaseFile| c.objects.iter().map(|o| o.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&loaded), ids(&case));
        for (a, b) in loaded.objects.iter().zip(&case.objects) {
            assert_eq!(a.profile().len(), b.profile().len());
            assert!((a.avg_confidence - b.avg_confidence).abs() < 1e-12);
        }
    }

    #[test]
    fn events_default_to_empty() {
        let json = r#"{"name":"bare","duration":4.0,"objects":[]}"#;
        let case: CaseFile = serde_json::from_str(json).unwrap();
        assert!(case.events.is_empty());
    }
}
