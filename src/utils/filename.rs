//! Filename handling for the upload staging area.

/// Reduce an uploaded filename to a safe staging key.
///
/// Only the final path component is kept. Whitespace becomes `_`,
/// anything outside `[A-Za-z0-9._-]` is dropped, and leading dots are
/// stripped so uploads cannot hide as dotfiles. Falls back to `upload`
/// when nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            cleaned.push(c);
        } else if c.is_whitespace() {
            cleaned.push('_');
        }
    }

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Lowercased extension of a filename, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\report.pdf"), "report.pdf");
    }

    #[test]
    fn sanitize_replaces_whitespace_and_drops_specials() {
        assert_eq!(sanitize_filename("my report (v2).pdf"), "my_report_v2.pdf");
    }

    #[test]
    fn sanitize_strips_leading_dots() {
        assert_eq!(sanitize_filename(".hidden.xlsx"), "hidden.xlsx");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename("???"), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("deck.pptx").as_deref(), Some("pptx"));
    }

    #[test]
    fn extension_missing() {
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}
