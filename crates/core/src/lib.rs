//! `astrovault-core` -- pure domain layer of the submission engine.
//!
//! Holds everything that needs no I/O: the wizard step sequence and its
//! gating state machine, per-step form payloads and validity predicates,
//! the linkable entity records with their schemas, and the flattening of a
//! finished wizard into the multipart submission payload. Networked
//! concerns (the platform client, the entity stores, the orchestrator)
//! build on top of this crate.

pub mod entity;
pub mod error;
pub mod forms;
pub mod payload;
pub mod snapshot;
pub mod steps;
pub mod types;
pub mod validators;
