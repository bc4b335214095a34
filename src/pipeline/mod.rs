//! Pipeline stages for PDF-to-quiz generation.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! can be tested on its own and the I/O-bound ones can be swapped for fakes.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ bound ──▶ llm ──▶ parse ──▶ normalize
//! (HTTP)    (pdfium)    (chars)   (chat)  (JSON)    (Question)
//! ```
//!
//! 1. [`fetch`]:   download the document with a timeout and size cap
//! 2. [`extract`]: pull the text layer; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`bound`]:   cut the text to the configured character limit
//! 4. [`llm`]:     one chat call per request, bounded by a timeout
//! 5. [`parse`]:   recover the JSON array from loosely formatted output
//! 6. [`normalize`]: fold model field variants into canonical questions
//!
//! [`retry`] wraps the two network stages.

pub mod bound;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod normalize;
pub mod parse;
pub mod retry;
