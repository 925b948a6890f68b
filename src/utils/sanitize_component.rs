// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Turn user text (search queries, record names) into safe file names.

/// Basename used when nothing usable survives sanitizing.
const FALLBACK: &str = "inventory_export";

/// Device names Windows refuses as a basename, whatever the extension.
const RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Produce a filesystem-safe path component.
///
/// Unicode is transliterated to ASCII, anything outside `[A-Za-z0-9._-]`
/// becomes `_`, runs of `_` or `.` collapse to one, and trailing dots are
/// dropped. Reserved Windows device names get a trailing `_`.
pub fn sanitize_component(value: &str) -> String {
    let ascii = deunicode::deunicode(value);
    let mut out = String::with_capacity(ascii.len());

    for ch in ascii.chars() {
        let ch = match ch {
            c if c.is_ascii_alphanumeric() || c == '-' => c,
            '.' => '.',
            _ => '_',
        };
        if matches!(ch, '_' | '.') && out.ends_with(ch) {
            continue;
        }
        // "_." reads as a separator followed by an extension; keep the dot only.
        if ch == '.' && out.ends_with('_') {
            out.pop();
        }
        out.push(ch);
    }

    let trimmed = out.trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "_" {
        return FALLBACK.to_string();
    }

    let (base, ext) = match trimmed.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => (base, Some(ext)),
        _ => (trimmed, None),
    };
    if !RESERVED.contains(&base.to_ascii_uppercase().as_str()) {
        return trimmed.to_string();
    }
    match ext {
        Some(ext) => format!("{base}_.{ext}"),
        None => format!("{base}_"),
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_component;

    #[test]
    fn transliterates_and_collapses_separators() {
        assert_eq!(sanitize_component("Ångström rack 2025/11"), "Angstrom_rack_2025_11");
        assert_eq!(sanitize_component("Café (draft).json"), "Cafe_draft.json");
    }

    #[test]
    fn collapses_dots_and_trims_trailing_ones() {
        assert_eq!(sanitize_component("boxes..v1...json"), "boxes.v1.json");
        assert_eq!(sanitize_component("samples."), "samples");
    }

    #[test]
    fn guards_reserved_and_empty_names() {
        assert_eq!(sanitize_component("con"), "con_");
        assert_eq!(sanitize_component("NUL.json"), "NUL_.json");
        assert_eq!(sanitize_component("..."), "inventory_export");
        assert_eq!(sanitize_component(""), "inventory_export");
    }
}
