// crates/mutant-lab-core/src/runtime/lab.rs
// ============================================================================
// Module: Lab Session
// Description: Hosting layer for the current inventory, selection, and synthesis.
// Purpose: Apply user actions and synthesis results, persisting after each change.
// Dependencies: tracing, crate::{core, interfaces, runtime::persistence}
// ============================================================================

//! ## Overview
//! A [`Lab`] is one play session. It owns the current [`Inventory`] value,
//! the active display language, the selection tray, and the synthesis guard.
//! Every change to the inventory is written through the codec.
//!
//! Synthesis is split in two so callers can run the backend wherever they
//! like: [`Lab::begin_synthesis`] issues a [`SynthesisTicket`] and
//! [`Lab::complete_synthesis`] folds the outcome back in. Each ticket carries
//! a serial unique within the session and only the outstanding serial is
//! honored, so a redeemed ticket or one that predates [`Lab::reset`] is
//! discarded.
//!
//! ## Invariants
//! - At most one synthesis is in flight.
//! - The selection holds at most [`MAX_SELECTION`] distinct inventory ids.
//! - A stale ticket never mutates the inventory or the selection.
//! - Highlights name the ids from the latest insert only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use thiserror::Error;

use crate::core::catalog::BuiltinCatalog;
use crate::core::catalog::ElementTranslations;
use crate::core::catalog::STARTER_ELEMENT_IDS;
use crate::core::element::Element;
use crate::core::identifiers::ElementId;
use crate::core::inventory::Insertion;
use crate::core::inventory::Inventory;
use crate::core::inventory::InventoryError;
use crate::core::language::Language;
use crate::core::synthesis::ExperimentType;
use crate::core::synthesis::Gender;
use crate::core::synthesis::SynthesisError;
use crate::core::synthesis::SynthesisRecord;
use crate::core::synthesis::SynthesisRequest;
use crate::interfaces::SlotStore;
use crate::interfaces::Synthesizer;
use crate::runtime::persistence::InventoryCodec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of selected elements.
pub const MAX_SELECTION: usize = 8;
/// Minimum number of selected elements required to synthesize.
pub const MIN_SELECTION: usize = 2;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors from starting a synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabError {
    /// Too few elements are selected.
    #[error("select at least {MIN_SELECTION} elements to synthesize ({selected} selected)")]
    SelectionTooSmall {
        /// Number of selected elements.
        selected: usize,
    },
    /// Another synthesis is still outstanding.
    #[error("a synthesis is already in progress")]
    SynthesisInFlight,
}

/// Proof of a started synthesis, redeemed once by [`Lab::complete_synthesis`].
#[derive(Debug, PartialEq, Eq)]
pub struct SynthesisTicket {
    /// Serial the lab issued the ticket under.
    pub(crate) serial: u64,
    /// Request to hand to the synthesizer.
    pub(crate) request: SynthesisRequest,
}

impl SynthesisTicket {
    /// Returns the synthesis request.
    #[must_use]
    pub const fn request(&self) -> &SynthesisRequest {
        &self.request
    }

    /// Returns the serial the ticket was issued under.
    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }
}

/// Outcome of redeeming a synthesis ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The creature was folded into the inventory.
    Applied {
        /// The full synthesis record, for display.
        record: Box<SynthesisRecord>,
        /// Id of the new or matched element.
        id: ElementId,
        /// True when a new element was appended.
        is_new: bool,
    },
    /// The synthesis failed; inventory and selection are unchanged.
    Failed(SynthesisError),
    /// The ticket was already redeemed or predates a reset, and was ignored.
    Discarded,
}

// ============================================================================
// SECTION: Lab
// ============================================================================

/// One play session over a persisted inventory.
#[derive(Debug)]
pub struct Lab<S, T = BuiltinCatalog> {
    /// Persistence codec.
    codec: InventoryCodec<S>,
    /// Translation source for built-in elements.
    catalog: T,
    /// Current inventory.
    inventory: Inventory,
    /// Active display language.
    language: Language,
    /// Serial for the next ticket.
    next_serial: u64,
    /// Serial of the outstanding ticket, if any.
    outstanding: Option<u64>,
    /// Selected element ids, in selection order.
    selection: Vec<ElementId>,
    /// Ids from the latest insert, cleared when toggled.
    highlighted: Vec<ElementId>,
    /// Last stamp issued for a user-authored element.
    last_stamp: u64,
}

impl<S: SlotStore> Lab<S> {
    /// Opens a session with the built-in catalog.
    ///
    /// Loads the saved inventory (or seeds a fresh one), relabels it for
    /// `language`, and saves the result.
    #[must_use]
    pub fn open(codec: InventoryCodec<S>, language: Language) -> Self {
        Self::open_with_catalog(codec, BuiltinCatalog, language)
    }
}

impl<S, T> Lab<S, T>
where
    S: SlotStore,
    T: ElementTranslations,
{
    /// Opens a session with a custom translation source.
    #[must_use]
    pub fn open_with_catalog(codec: InventoryCodec<S>, catalog: T, language: Language) -> Self {
        let inventory = match codec.load() {
            Some(saved) => saved.relabel(language, &catalog).into_owned(),
            None => Inventory::seed_with(STARTER_ELEMENT_IDS, &catalog, language),
        };
        codec.save(&inventory);
        tracing::debug!(
            slot = codec.slot_key(),
            elements = inventory.len(),
            language = %language,
            "lab session opened"
        );
        Self {
            codec,
            catalog,
            inventory,
            language,
            next_serial: 0,
            outstanding: None,
            selection: Vec::new(),
            highlighted: Vec::new(),
            last_stamp: 0,
        }
    }

    /// Returns the current inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Returns the active display language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Returns the persistence codec.
    #[must_use]
    pub const fn codec(&self) -> &InventoryCodec<S> {
        &self.codec
    }

    /// Returns selected ids in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Returns true when `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selection.contains(id)
    }

    /// Returns true when `id` came from the latest insert.
    #[must_use]
    pub fn is_highlighted(&self, id: &ElementId) -> bool {
        self.highlighted.contains(id)
    }

    /// Returns true while a synthesis is outstanding.
    #[must_use]
    pub const fn is_synthesizing(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Returns elements sorted for display, optionally filtered by name.
    #[must_use]
    pub fn display_order(&self, filter: Option<&str>) -> Vec<&Element> {
        self.inventory.display_order(self.language, filter)
    }

    /// Switches the display language and relabels built-in elements.
    ///
    /// Outstanding tickets stay valid.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        let relabeled = match self.inventory.relabel(language, &self.catalog) {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        if let Some(next) = relabeled {
            self.inventory = next;
            self.codec.save(&self.inventory);
        }
    }

    /// Adds a user-authored element and highlights it.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError`] when the name is blank, too long, or
    /// already used. The inventory is unchanged on error.
    pub fn create_element(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<ElementId, InventoryError> {
        let stamp = now_millis().max(self.last_stamp.saturating_add(1));
        let (next, id) = self.inventory.insert_user_element(name, description, stamp)?;
        self.last_stamp = stamp;
        self.inventory = next;
        self.codec.save(&self.inventory);
        self.highlighted = vec![id.clone()];
        Ok(id)
    }

    /// Toggles `id` in the selection.
    ///
    /// Returns false when the toggle was ignored: a synthesis is in flight,
    /// the id is not in the inventory, or the tray is full.
    pub fn toggle_selection(&mut self, id: &ElementId) -> bool {
        if self.is_synthesizing() || !self.inventory.contains(id) {
            return false;
        }
        self.highlighted.retain(|highlighted| highlighted != id);
        if let Some(index) = self.selection.iter().position(|selected| selected == id) {
            self.selection.remove(index);
            return true;
        }
        if self.selection.len() >= MAX_SELECTION {
            return false;
        }
        self.selection.push(id.clone());
        true
    }

    /// Empties the selection tray.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Starts a synthesis from the current selection and clears highlights.
    ///
    /// # Errors
    ///
    /// Returns [`LabError::SynthesisInFlight`] when a ticket is outstanding
    /// and [`LabError::SelectionTooSmall`] when fewer than
    /// [`MIN_SELECTION`] elements are selected.
    pub fn begin_synthesis(
        &mut self,
        experiment: ExperimentType,
        gender: Gender,
    ) -> Result<SynthesisTicket, LabError> {
        if self.is_synthesizing() {
            return Err(LabError::SynthesisInFlight);
        }
        if self.selection.len() < MIN_SELECTION {
            return Err(LabError::SelectionTooSmall {
                selected: self.selection.len(),
            });
        }
        let element_names = self
            .selection
            .iter()
            .filter_map(|id| self.inventory.get(id))
            .map(|element| element.name.clone())
            .collect();
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        self.outstanding = Some(serial);
        self.highlighted.clear();
        Ok(SynthesisTicket {
            serial,
            request: SynthesisRequest {
                element_names,
                experiment,
                gender,
                language: self.language,
            },
        })
    }

    /// Folds a synthesis outcome back into the session.
    ///
    /// Success inserts the creature, clears the selection, and highlights the
    /// resulting id. Failure leaves inventory and selection as they were.
    /// Tickets other than the outstanding one are discarded.
    pub fn complete_synthesis(
        &mut self,
        ticket: SynthesisTicket,
        outcome: Result<SynthesisRecord, SynthesisError>,
    ) -> Completion {
        if self.outstanding != Some(ticket.serial) {
            tracing::info!(
                ticket = ticket.serial,
                in_flight = self.outstanding.is_some(),
                "discarding stale synthesis completion"
            );
            return Completion::Discarded;
        }
        self.outstanding = None;
        let record = match outcome {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    elements = ticket.request.element_names.len(),
                    experiment = %ticket.request.experiment,
                    error = %err,
                    "synthesis failed"
                );
                return Completion::Failed(err);
            }
        };

        let Insertion {
            inventory,
            id,
            is_new,
        } = self
            .inventory
            .insert_synthesized_element(&record.details.name, &record.details.description);
        let inserted = match inventory {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        if let Some(next) = inserted {
            self.inventory = next;
            self.codec.save(&self.inventory);
        }
        self.selection.clear();
        self.highlighted = vec![id.clone()];
        Completion::Applied {
            record: Box::new(record),
            id,
            is_new,
        }
    }

    /// Runs a synthesis to completion with `synthesizer`.
    ///
    /// # Errors
    ///
    /// Returns [`LabError`] when the synthesis cannot start; backend failures
    /// are reported as [`Completion::Failed`].
    pub fn combine<Y>(
        &mut self,
        synthesizer: &Y,
        experiment: ExperimentType,
        gender: Gender,
    ) -> Result<Completion, LabError>
    where
        Y: Synthesizer + ?Sized,
    {
        let ticket = self.begin_synthesis(experiment, gender)?;
        let outcome = synthesizer.synthesize(ticket.request());
        Ok(self.complete_synthesis(ticket, outcome))
    }

    /// Discards all progress and reseeds the inventory.
    ///
    /// Clears the slot, the selection and highlights, releases the synthesis
    /// guard, and invalidates outstanding tickets.
    pub fn reset(&mut self) {
        self.outstanding = None;
        self.selection.clear();
        self.highlighted.clear();
        self.codec.clear();
        self.inventory = Inventory::seed_with(STARTER_ELEMENT_IDS, &self.catalog, self.language);
        self.codec.save(&self.inventory);
        tracing::info!(elements = self.inventory.len(), "lab reset to starter inventory");
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch, or zero when the clock is before it.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
