/// Convert a UTF-16 column offset (from LSP Position.character) to a byte
/// offset within the given line. The scanner works on byte offsets, not
/// UTF-16 code units.
pub fn utf16_column_to_byte_offset(line: &str, utf16_col: u32) -> usize {
    let mut utf16_count = 0;
    for (byte_idx, ch) in line.char_indices() {
        if utf16_count >= utf16_col as usize {
            return byte_idx;
        }
        utf16_count += ch.len_utf16();
    }
    line.len()
}

/// Convert a byte offset within a line to the UTF-16 column an LSP client
/// expects. Offsets past the end clamp to the line length.
pub fn byte_offset_to_utf16_column(line: &str, byte_offset: usize) -> u32 {
    line.char_indices()
        .take_while(|(idx, _)| *idx < byte_offset)
        .map(|(_, ch)| ch.len_utf16() as u32)
        .sum()
}

/// Length of a line in UTF-16 code units.
pub fn utf16_len(line: &str) -> u32 {
    line.chars().map(|ch| ch.len_utf16() as u32).sum()
}
