//! Conversions between 0-based (row, column) indexes and Excel-style references.
use regex::Regex;
use std::sync::LazyLock;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Z]+)\$?(\d+)$").expect("Hardcode regex pattern"));

/// Converts a 0-based column index to its letters (0 → "A", 27 → "AB").
pub fn col_to_name(col: usize) -> String {
    let mut col = col + 1;
    let mut name = String::new();
    while col > 0 {
        col -= 1;
        let digit = char::from_u32(65 + (col % 26) as u32).expect("Hardcode letters");
        col /= 26;
        name.insert(0, digit);
    }
    name
}

/// Converts 0-based row and column indexes to an Excel-style cell reference (e.g. "B12").
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_name(col), row + 1)
}

/// Converts column letters to a 0-based column index.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |index, letter| {
        let letter = letter.to_ascii_uppercase();
        letter
            .is_ascii_uppercase()
            .then(|| index * 26 + (letter as usize - 'A' as usize + 1))
    })
    .map(|index| index - 1)
}

/// Converts a 1-based row number to a 0-based row index.
pub fn row_to_index(number: &str) -> Option<usize> {
    number.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Parses an Excel-style cell reference ("B12", "$C$3") into 0-based (row, column) indexes.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.trim().to_ascii_uppercase();
    let captures = REFERENCE_PATTERN.captures(&reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(col_to_name(0), "A");
        assert_eq!(col_to_name(25), "Z");
        assert_eq!(col_to_name(26), "AA");
        assert_eq!(col_to_name(27), "AB");
        assert_eq!(col_to_name(701), "ZZ");
        assert_eq!(col_to_name(702), "AAA");
    }

    #[test]
    fn references_round_trip_through_indexes() {
        assert_eq!(index_to_reference(11, 1), "B12");
        assert_eq!(reference_to_index("B12"), Some((11, 1)));
        assert_eq!(reference_to_index("$ab$3"), Some((2, 27)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("B-1"), None);
    }
}
