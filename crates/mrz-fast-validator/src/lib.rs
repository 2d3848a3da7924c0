//! Post-OCR line validation: turn raw recognizer output into a clean MRZ.
//!
//! OCR of a camera frame produces the MRZ lines surrounded by noise (document
//! headers, border artifacts, half-recognized guilloche). Two filtering
//! strategies cover the noise profiles seen in practice; both are total
//! functions that return an empty [`MrzResult`] rather than failing.

mod extract;

pub use extract::{MrzExtractor, Strategy};
