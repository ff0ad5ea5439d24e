// crates/mutant-lab-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Shared fakes for slot stores, synthesizers, and log capture.
// Purpose: Keep integration suites focused on behavior instead of setup.
// ============================================================================

#![allow(dead_code, reason = "Each suite uses a different subset of helpers.")]

use std::cell::RefCell;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use mutant_lab_core::CreatureDetails;
use mutant_lab_core::CreatureImage;
use mutant_lab_core::SlotStore;
use mutant_lab_core::StoreError;
use mutant_lab_core::SynthesisError;
use mutant_lab_core::SynthesisRecord;
use mutant_lab_core::SynthesisRequest;
use mutant_lab_core::Synthesizer;

// ============================================================================
// SECTION: Stores
// ============================================================================

/// Store whose reads and writes always fail; counts removals.
#[derive(Debug, Default)]
pub struct BrokenStore {
    pub removals: Mutex<usize>,
}

impl SlotStore for BrokenStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        *self.removals.lock().unwrap() += 1;
        Ok(())
    }
}

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Builds a record for a creature called `name`.
pub fn creature(name: &str) -> SynthesisRecord {
    SynthesisRecord {
        details: CreatureDetails {
            name: name.to_string(),
            description: format!("{name} prowls the containment wing."),
            abilities: vec!["Regeneration".to_string()],
            weaknesses: vec!["Salt".to_string()],
            habitat: "Sublevel 4".to_string(),
            danger_level: 70,
            simulated_hp: 1200,
            attack_pattern: "Lunges from the vents.".to_string(),
            on_hit_effect: "Target is slowed.".to_string(),
            image_prompt: format!("photorealistic {name} in a containment cell"),
        },
        image: CreatureImage {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        },
    }
}

/// Synthesizer replaying queued outcomes and recording requests.
#[derive(Debug, Default)]
pub struct ScriptedSynthesizer {
    pub outcomes: RefCell<Vec<Result<SynthesisRecord, SynthesisError>>>,
    pub requests: RefCell<Vec<SynthesisRequest>>,
}

impl ScriptedSynthesizer {
    pub fn new(outcomes: Vec<Result<SynthesisRecord, SynthesisError>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl Synthesizer for ScriptedSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisRecord, SynthesisError> {
        self.requests.borrow_mut().push(request.clone());
        let mut outcomes = self.outcomes.borrow_mut();
        if outcomes.is_empty() {
            return Err(SynthesisError::Transport("no scripted outcome".to_string()));
        }
        outcomes.remove(0)
    }
}

// ============================================================================
// SECTION: Log Capture
// ============================================================================

/// In-memory writer collecting formatted log output.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that writes into the returned buffer.
pub fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}
