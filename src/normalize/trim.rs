/// ASCII-trim: strip ASCII spaces and tabs from both ends.
///
/// Catalog cells and headers go through this and nothing else. No Unicode
/// whitespace is trimmed.
#[inline]
pub fn ascii_trim(input: &str) -> &str {
    input.trim_matches(is_ascii_blank)
}

/// Returns true if the char is an ASCII space or tab.
#[inline]
pub const fn is_ascii_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Returns true if the cell is empty after ASCII-trimming.
#[inline]
pub fn is_blank_cell(input: &str) -> bool {
    ascii_trim(input).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_spaces_and_tabs() {
        assert_eq!(ascii_trim("  2.5  "), "2.5");
        assert_eq!(ascii_trim("\tmg/L\t"), "mg/L");
        assert_eq!(ascii_trim(" \t avg * 0.1 \t "), "avg * 0.1");
    }

    #[test]
    fn preserves_inner_whitespace() {
        assert_eq!(ascii_trim("  Method A  "), "Method A");
    }

    #[test]
    fn no_unicode_trim() {
        let input = "\u{a0}x\u{a0}";
        assert_eq!(ascii_trim(input), input);
    }

    #[test]
    fn cr_lf_not_stripped() {
        assert_eq!(ascii_trim("\r\nx\r\n"), "\r\nx\r\n");
    }

    #[test]
    fn blank_cell_detection() {
        assert!(is_blank_cell(""));
        assert!(is_blank_cell("   "));
        assert!(is_blank_cell(" \t "));
        assert!(!is_blank_cell(" 0 "));
    }
}
