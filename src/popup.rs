use serde_json::Value;

const REGION_SEPARATOR: &str = "---------\n";

/// Plain-text popup for one token: its display form, then each analysis as
/// an indented attribute listing.
pub fn token_popup(form: Option<&str>, analyses: &[Value]) -> String {
    let mut popup = String::new();
    if let Some(form) = form {
        popup.push_str(form);
        popup.push('\n');
    }
    for (number, analysis) in analyses.iter().enumerate() {
        popup.push_str(&format!("Analysis #{}.\n", number + 1));
        if let Ok(listing) = serde_json::to_string_pretty(analysis) {
            popup.push_str(&listing);
        }
        popup.push_str(" \n");
    }
    popup
}

/// Popup for a region covering several tokens, ready to sit inside a
/// double-quoted attribute.
pub fn region_popup<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (Option<&'a str>, &'a [Value])>,
{
    let mut popup = String::from(REGION_SEPARATOR);
    for (form, analyses) in entries {
        popup.push_str(&token_popup(form, analyses));
    }
    escape_attribute(&popup)
}

/// Newlines become a literal `\n` and double quotes become single quotes.
pub fn escape_attribute(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '"' => escaped.push('\''),
            other => escaped.push(other),
        }
    }
    escaped
}
