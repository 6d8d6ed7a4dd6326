//! docintake - document intake, PII redaction, and summarization for
//! security/IT documentation review.
//!
//! An upload flows through format-specific extraction (a structural pass
//! first, an OCR pass second), regex-driven PII masking tuned per
//! format, and two calls to an external generative model that produce a
//! description and a bulleted key-findings list.

pub mod cli;
pub mod config;
pub mod extract;
pub mod findings;
pub mod llm;
pub mod ocr;
pub mod redact;
pub mod server;
pub mod services;
pub mod utils;
