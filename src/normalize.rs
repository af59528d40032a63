use unicode_normalization::UnicodeNormalization;

/// Check whether a character is one of the zero-width, format or
/// bidirectional-control characters that users paste in without noticing.
///
/// Covers U+200B–U+200F, U+FEFF, U+00AD, U+061C, U+180E, U+2060–U+2069
/// and U+202A–U+202E.
pub fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200F}'
            | '\u{FEFF}'
            | '\u{00AD}'
            | '\u{061C}'
            | '\u{180E}'
            | '\u{2060}'..='\u{2069}'
            | '\u{202A}'..='\u{202E}'
    )
}

/// ASCII and Latin-1 control range (0x00–0x1F, 0x7F–0x9F)
fn is_control(ch: char) -> bool {
    matches!(ch, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

/// Normalize text into a single clean line.
///
/// Applies compatibility decomposition (NFKD), drops invisible and control
/// characters, collapses whitespace runs into one space and trims both ends.
/// Control characters that are whitespace (tab, line breaks, NEL) become a
/// separator instead of vanishing, so `"Alice\tBob"` stays two words.
///
/// # Arguments
/// * `text` - Raw text, possibly spanning several lines
///
/// # Returns
/// * A string with no line breaks, no invisible characters and single spaces
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    // Stripping before decomposition keeps combining marks that were split by
    // an invisible character in canonical order, so the result is stable.
    let decomposed = text
        .chars()
        .filter(|&ch| !is_invisible(ch) && !(is_control(ch) && !ch.is_whitespace()))
        .nfkd();

    for ch in decomposed {
        if ch.is_whitespace() {
            pending_space = true;
        } else if is_invisible(ch) || is_control(ch) {
            continue;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }

    out
}

/// Clean a whole multi-line input buffer while keeping its line structure.
///
/// Same Unicode and invisible-character treatment as [`normalize`], but line
/// breaks (`\r\n`, `\r`, `\n`) are canonicalized to `\n` and preserved. Within
/// each line, runs of spaces and tabs collapse to one space and the line is
/// trimmed. Lines are never merged, so the n-th line of the result is the n-th
/// line of the input.
pub fn clean_input(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");

    unified
        .split('\n')
        .map(clean_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;

    let decomposed = line
        .chars()
        .filter(|&ch| !is_invisible(ch) && !(is_control(ch) && ch != '\t'))
        .nfkd();

    for ch in decomposed {
        match ch {
            ' ' | '\t' => pending_space = true,
            _ if is_invisible(ch) || is_control(ch) => {}
            _ => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(ch);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(normalize("  Alice   Bob  "), "Alice Bob");
        assert_eq!(normalize("Alice\n\nBob\r\nCarol"), "Alice Bob Carol");
        assert_eq!(normalize("Alice\tBob"), "Alice Bob");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
        assert_eq!(normalize("\u{200B}\u{FEFF}"), "");
    }

    #[test]
    fn test_strips_invisible_characters() {
        assert_eq!(normalize("Ali\u{200B}ce"), "Alice");
        assert_eq!(normalize("\u{FEFF}Bob\u{00AD}by"), "Bobby");
        assert_eq!(normalize("\u{202E}Carol\u{202C}"), "Carol");
        assert_eq!(normalize("Da\u{2066}ve\u{2069}"), "Dave");
        assert_eq!(normalize("E\u{061C}ve\u{180E}"), "Eve");
        assert_eq!(normalize("Fr\u{200E}an\u{200F}k"), "Frank");
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(normalize("Al\u{0001}ice"), "Alice");
        assert_eq!(normalize("Bob\u{007F}\u{0090}"), "Bob");
    }

    #[test]
    fn test_compatibility_forms_collapse() {
        // fullwidth letters and digits
        assert_eq!(normalize("ＡＢ ２１"), "AB 21");
        // ligature
        assert_eq!(normalize("\u{FB01}n"), "fin");
        // non-breaking space acts as a normal space
        assert_eq!(normalize("Alice\u{00A0}Bob"), "Alice Bob");
    }

    #[test]
    fn test_equivalent_names_share_a_key() {
        let precomposed = normalize("Jos\u{00E9}");
        let combining = normalize("Jose\u{0301}");
        assert_eq!(precomposed, combining);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "  1.  Alice\u{200B}  Bob 21 - 12 Carol\tDave ",
            "Jos\u{00E9} ＡＢ \u{FB01}",
            "a\u{0301}\u{200B}\u{0327}b",
            "\r\n\u{0085}x\u{00A0}\u{3000}y",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_clean_input_preserves_lines() {
        let input = "  Alice  Bob 21-12 Carol Dave  \r\n\r\n\tEve\t\tFrank 15-21 Alice Bob\rlast";
        let cleaned = clean_input(input);
        assert_eq!(
            cleaned,
            "Alice Bob 21-12 Carol Dave\n\nEve Frank 15-21 Alice Bob\nlast"
        );
    }

    #[test]
    fn test_clean_input_keeps_line_count() {
        let input = "\n\nAlice Bob 21-12 Carol Dave\n\n";
        let cleaned = clean_input(input);
        assert_eq!(cleaned.split('\n').count(), input.split('\n').count());
    }

    #[test]
    fn test_clean_input_strips_invisible() {
        assert_eq!(clean_input("Ali\u{200B}ce\u{000B}\nBo\u{FEFF}b"), "Alice\nBob");
    }
}
