use crate::index::{BoundaryIndex, RegionKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Open,
    Close,
}

/// Finds the raw-text positions where highlighter matches begin and end.
///
/// `markup` is the sentence text with `open`/`close` markers inserted around
/// matched substrings. Positions are codepoint offsets into the text with the
/// markers removed. Markers are taken as they come: an unbalanced or nested
/// marker is recorded like any other, and the renderer tolerates the result.
pub fn match_boundaries(markup: &str, open: &str, close: &str) -> BoundaryIndex {
    let mut index = BoundaryIndex::new();
    if open.is_empty() || close.is_empty() {
        return index;
    }

    // Longest marker first, so `</em>` is not mistaken for a shorter prefix.
    let mut markers = [
        (open, open.chars().count(), Side::Open),
        (close, close.chars().count(), Side::Close),
    ];
    markers.sort_by(|a, b| b.1.cmp(&a.1));

    let mut position = 0usize;
    let mut consumed = 0usize;
    let mut rest = markup;
    while let Some(next) = rest.chars().next() {
        let found = markers
            .iter()
            .find(|(marker, _, _)| rest.starts_with(marker));
        match found {
            Some(&(marker, width, side)) => {
                let raw = position - consumed;
                match side {
                    Side::Open => index.open(raw, RegionKey::Highlight),
                    Side::Close => index.close(raw, RegionKey::Highlight),
                }
                consumed += width;
                position += width;
                rest = &rest[marker.len()..];
            }
            None => {
                position += 1;
                rest = &rest[next.len_utf8()..];
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn positions(index: &BoundaryIndex, len: usize) -> (Vec<usize>, Vec<usize>) {
        let opens = (0..=len).filter(|&i| index.opens_at(i).is_some()).collect();
        let closes = (0..=len).filter(|&i| index.closes_at(i).is_some()).collect();
        (opens, closes)
    }

    #[test]
    fn plain_text_has_no_boundaries() {
        assert!(match_boundaries("cat sat on the mat", "<em>", "</em>").is_empty());
        assert!(match_boundaries("", "<em>", "</em>").is_empty());
    }

    #[test]
    fn single_match_maps_to_raw_offsets() {
        let index = match_boundaries("the <em>cat</em> sat", "<em>", "</em>");
        assert_eq!(positions(&index, 16), (vec![4], vec![7]));
        assert_eq!(
            index.opens_at(4),
            Some(&BTreeSet::from([RegionKey::Highlight]))
        );
    }

    #[test]
    fn adjacent_matches_do_not_overlap() {
        let index = match_boundaries("<m>a</m><m>b</m>", "<m>", "</m>");
        assert_eq!(positions(&index, 2), (vec![0, 1], vec![1, 2]));
    }

    #[test]
    fn match_at_end_of_text() {
        let index = match_boundaries("cat <em>sat</em>", "<em>", "</em>");
        assert_eq!(positions(&index, 7), (vec![4], vec![7]));
    }

    #[test]
    fn offsets_count_codepoints_not_bytes() {
        let index = match_boundaries("кот <em>сидит</em> тут", "<em>", "</em>");
        assert_eq!(positions(&index, 13), (vec![4], vec![9]));
    }

    #[test]
    fn several_matches_accumulate_marker_width() {
        let markup = "<em>a</em> b <em>c</em> d <em>e</em>";
        let index = match_boundaries(markup, "<em>", "</em>");
        assert_eq!(positions(&index, 9), (vec![0, 4, 8], vec![1, 5, 9]));
    }

    #[test]
    fn stray_close_marker_is_recorded_as_is() {
        let index = match_boundaries("ab</em>c", "<em>", "</em>");
        assert_eq!(positions(&index, 3), (vec![], vec![2]));
    }

    #[test]
    fn empty_markers_disable_scanning() {
        assert!(match_boundaries("<em>a</em>", "", "</em>").is_empty());
    }
}
