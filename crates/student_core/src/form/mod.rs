//! Student form binding and validation.
//!
//! # Responsibility
//! - Hold raw submissions (text fields and file attachments).
//! - Validate them against the fixed student field set.
//! - Thread the requesting context into caller-supplied extra rules.
//!
//! # Invariants
//! - A submission that fails validation never reaches persistence.
//! - Submitted values are kept unchanged for re-rendering.

pub mod student_form;
