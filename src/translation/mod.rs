/*!
 * Batch translation of German word lists.
 *
 * This module turns pasted text into looked-up vocabulary rows. It is split
 * into several submodules:
 *
 * - `input`: Splitting pasted text and separating noun articles
 * - `tagger`: Part-of-speech tags for rows entered without an article
 * - `batch`: Sequential lookups with progress, cancellation and a failure report
 */

// Re-export main types for easier usage
pub use self::batch::{BatchHandle, BatchOptions, BatchReport, BatchRow, BatchTranslator, OutputColumns};
pub use self::input::{classify, classify_line, split_bulk_input};
pub use self::tagger::{HeuristicTagger, PosTagger, infer_missing_types};

// Submodules
pub mod batch;
pub mod input;
pub mod tagger;
