//! Filename-safe names derived from free text.

/// Upper bound on slug length
pub const MAX_SLUG_LEN: usize = 80;

const FALLBACK_STEM: &str = "event";

/// Convert a title to a filename-safe slug.
///
/// Output only contains `[a-z0-9-]`, is at most [`MAX_SLUG_LEN`] characters long,
/// never starts or ends with `-`, and slugifying it again returns it unchanged.
pub fn slugify(s: &str) -> String {
    let slug = ::slug::slugify(s);
    let truncated: String = slug.chars().take(MAX_SLUG_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Download filename for an event's calendar file: `<slug-of-title>.ics`
pub fn ics_filename(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{FALLBACK_STEM}.ics")
    } else {
        format!("{slug}.ics")
    }
}
