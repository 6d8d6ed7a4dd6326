//! PII masking rule sets.
//!
//! Masking is a pure text transform. A rule set is an explicit ordered
//! list of (label, pattern) pairs applied as global replacements with
//! `<LABEL>` tokens; a keyed map would not do, because application order
//! matters. Rule sets are curated so that no placeholder emitted by an
//! earlier rule is re-matched by a later pattern, which keeps masking
//! idempotent.
//!
//! Two rule sets cover the flat-text formats:
//!
//! - [`TABULAR_RULES`] masks whole spreadsheet cells, accepting false
//!   positives in exchange for never leaking a field.
//! - [`DOCUMENT_RULES`] masks inside flowing PDF text, leaving the
//!   surrounding prose intact.
//!
//! Slide content gets the line-oriented, context-preserving treatment in
//! [`mask_slide_text`] instead.

mod slides;

pub use slides::mask_slide_text;

use std::sync::LazyLock;

use regex::Regex;

/// A single masking rule: replacement label plus compiled pattern.
pub struct MaskRule {
    label: &'static str,
    pattern: Regex,
}

impl MaskRule {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

/// An ordered collection of masking rules for one document format.
pub struct RuleSet {
    name: &'static str,
    rules: Vec<MaskRule>,
}

impl RuleSet {
    /// Apply every rule in declaration order.
    ///
    /// Empty input comes back unchanged, and unmatched text always passes
    /// through, so masking cannot fail.
    pub fn mask(&self, text: &str) -> String {
        if text.is_empty() {
            return text.to_string();
        }
        let mut masked = text.to_string();
        for rule in &self.rules {
            let token = format!("<{}>", rule.label);
            masked = rule.pattern.replace_all(&masked, token.as_str()).into_owned();
        }
        masked
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Rules for fully tabular content (spreadsheet cells).
pub static TABULAR_RULES: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    name: "tabular",
    rules: vec![
        MaskRule::new("EMPLOYEE_ID", r"(?i)\bEMP\d+\b"),
        MaskRule::new("EMAIL", r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
        MaskRule::new("TOKEN_SERIAL", r"(?i)\bHT-\d+-[A-Z]+\b"),
        MaskRule::new(
            "FULL_NAME",
            r"(?i)\b(?:Mr|Mrs|Ms|Dr)\.?\s+[A-Z][a-z]+(?:\s[A-Z][a-z]+)+\b|\b[A-Z][a-z]+(?:\s[A-Z][a-z]+)+\b",
        ),
        MaskRule::new("CREDIT_CARD", r"\b(?:\d[ -]*?){13,16}\b"),
    ],
});

/// Rules for flowing document text (PDF extraction output).
pub static DOCUMENT_RULES: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    name: "document",
    rules: vec![
        MaskRule::new("EMAIL", r"(?i)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"),
        MaskRule::new(
            "PHONE",
            r"\b(?:\+?\d{1,3}[-.\s]?)?(?:\(?\d{3}\)?[-.\s]?)?\d{3}[-.\s]?\d{4}\b",
        ),
        MaskRule::new("IP", r"\b(?:\d{1,3}\.){3}\d{1,3}\b"),
        MaskRule::new("CREDIT_CARD", r"\b(?:\d[ -]*?){13,16}\b"),
        MaskRule::new("NAME_TITLE", r"(?i)\b(?:Mr|Mrs|Ms|Dr)\.?\s+[A-Z][a-z]+\b"),
        MaskRule::new("TOKEN_SERIAL", r"(?i)\bHT-\d+-[A-Z]+\b"),
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabular_masks_employee_id_and_email() {
        let masked = TABULAR_RULES.mask("EMP1234, Contact: john.doe@example.com");
        assert!(masked.contains("<EMPLOYEE_ID>"));
        assert!(masked.contains("<EMAIL>"));
        assert!(!masked.contains('@'));
        assert!(!masked.contains("1234"));
    }

    #[test]
    fn email_is_masked_regardless_of_case() {
        assert_eq!(TABULAR_RULES.mask("JOHN.DOE@EXAMPLE.COM"), "<EMAIL>");
        assert_eq!(TABULAR_RULES.mask("john.doe@example.com"), "<EMAIL>");
    }

    #[test]
    fn tabular_masks_token_serial_and_card() {
        let masked = TABULAR_RULES.mask("HT-9920-ABQ issued, card 4111 1111 1111 1111");
        assert!(masked.contains("<TOKEN_SERIAL>"));
        assert!(masked.contains("<CREDIT_CARD>"));
        assert!(!masked.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn tabular_masks_titled_names() {
        // Case-insensitive matching extends the run across the trailing
        // lowercase word; whole-field masking accepts that.
        let masked = TABULAR_RULES.mask("Dr. John Smith attended");
        assert_eq!(masked, "<FULL_NAME>");
    }

    #[test]
    fn tabular_full_name_matching_is_case_insensitive() {
        // Whole-field masking accepts this class of false positive.
        assert_eq!(TABULAR_RULES.mask("john doe"), "<FULL_NAME>");
    }

    #[test]
    fn document_masks_ip_and_phone() {
        let masked = DOCUMENT_RULES.mask("Host 10.0.0.1, desk line 555-123-4567");
        assert!(masked.contains("<IP>"));
        assert!(masked.contains("<PHONE>"));
    }

    #[test]
    fn document_masks_name_title_and_serial() {
        let masked = DOCUMENT_RULES.mask("Issued to Mr. Reyes, serial HT-4451-KL");
        assert!(masked.contains("<NAME_TITLE>"));
        assert!(masked.contains("<TOKEN_SERIAL>"));
    }

    #[test]
    fn masking_is_idempotent() {
        let samples = [
            "EMP1234 john.doe@example.com HT-1-AB Dr. Jane Roe 4111 1111 1111 1111",
            "Reach ops@corp.example or 10.1.2.3, desk (555) 123-4567, Mr. Lee",
            "",
            "nothing sensitive here",
        ];
        for sample in samples {
            for rules in [&*TABULAR_RULES, &*DOCUMENT_RULES] {
                let once = rules.mask(sample);
                assert_eq!(rules.mask(&once), once, "{} rules on {:?}", rules.name(), sample);
            }
        }
    }

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(TABULAR_RULES.mask(""), "");
        assert_eq!(DOCUMENT_RULES.mask(""), "");
    }
}
