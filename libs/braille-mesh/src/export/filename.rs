use crate::spec::PlateMode;

const MAX_STEM_CHARS: usize = 20;
const FALLBACK_STEM: &str = "braille_card";

/// Suggested file name for a generated plate.
///
/// Built from the first non-blank line: its first 20 characters, minus
/// anything that is not a word character, whitespace or `-`, with runs of
/// whitespace and `-` collapsed to `_`.
///
/// # Example
///
/// ```rust
/// use braille_mesh::export::download_filename;
/// use braille_mesh::spec::PlateMode;
///
/// assert_eq!(
///     download_filename(&["", "Hello, World!"], PlateMode::Emboss),
///     "Hello_World_braille.stl"
/// );
/// assert_eq!(
///     download_filename(&["⠓⠊"], PlateMode::Counter),
///     "braille_card_counter_plate.stl"
/// );
/// ```
pub fn download_filename<S: AsRef<str>>(lines: &[S], mode: PlateMode) -> String {
    let stem = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .find(|line| !line.is_empty())
        .map(sanitize)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());

    let suffix = match mode {
        PlateMode::Emboss => "braille",
        PlateMode::Counter => "counter_plate",
    };
    format!("{stem}_{suffix}.stl")
}

fn sanitize(line: &str) -> String {
    let mut out = String::new();
    let mut pending_gap = false;
    for c in line.chars().take(MAX_STEM_CHARS) {
        if c.is_whitespace() || c == '-' {
            pending_gap = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_gap {
                out.push('_');
                pending_gap = false;
            }
            out.push(c);
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_word() {
        assert_eq!(download_filename(&["hello"], PlateMode::Emboss), "hello_braille.stl");
    }

    #[test]
    fn test_first_non_empty_line() {
        let lines = ["   ", "second line", "third"];
        assert_eq!(
            download_filename(&lines, PlateMode::Counter),
            "second_line_counter_plate.stl"
        );
    }

    #[test]
    fn test_truncates_to_twenty_chars() {
        let name = download_filename(&["abcdefghijklmnopqrstuvwxyz"], PlateMode::Emboss);
        assert_eq!(name, "abcdefghijklmnopqrst_braille.stl");
    }

    #[test]
    fn test_collapses_separators() {
        assert_eq!(sanitize("a - b\t\tc"), "a_b_c");
        assert_eq!(sanitize("--edge--"), "edge");
        assert_eq!(sanitize("x_y"), "x_y");
        assert_eq!(sanitize("semi;colon's"), "semicolons");
    }

    #[test]
    fn test_fallbacks() {
        let empty: [&str; 0] = [];
        assert_eq!(download_filename(&empty, PlateMode::Emboss), "braille_card_braille.stl");
        assert_eq!(download_filename(&["!!!"], PlateMode::Emboss), "braille_card_braille.stl");
    }
}
