use serde::Serialize;

/// Page size of the watched-history listing
pub const WATCHED_PAGE_SIZE: usize = 10;

/// One window over an ordered sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Deterministic windowing over an ordered sequence.
///
/// Pure function of the sequence and the indices, no cursor state: as long
/// as the underlying sequence is append-only during the read, pagination is
/// stable under concurrent readers. An out-of-range page index yields an
/// empty slice, not an error.
pub fn page<T: Clone>(seq: &[T], page_index: usize, page_size: usize) -> Page<T> {
    if page_size == 0 {
        return Page {
            items: Vec::new(),
            has_prev: page_index > 0,
            has_next: false,
        };
    }

    let start = page_index.saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(seq.len());
    let items = if start < seq.len() {
        seq[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items,
        has_prev: page_index > 0,
        has_next: end < seq.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenated_pages_reconstruct_the_sequence() {
        let seq: Vec<u32> = (0..25).collect();
        let mut rebuilt = Vec::new();
        for index in 0..3 {
            rebuilt.extend(page(&seq, index, 10).items);
        }
        assert_eq!(rebuilt, seq);
    }

    #[test]
    fn flags_mark_first_and_last_pages_only() {
        let seq: Vec<u32> = (0..25).collect();

        let first = page(&seq, 0, 10);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let middle = page(&seq, 1, 10);
        assert!(middle.has_prev);
        assert!(middle.has_next);

        let last = page(&seq, 2, 10);
        assert_eq!(last.items, vec![20, 21, 22, 23, 24]);
        assert!(last.has_prev);
        assert!(!last.has_next);
    }

    #[test]
    fn exact_multiple_has_no_phantom_page() {
        let seq: Vec<u32> = (0..20).collect();
        let last = page(&seq, 1, 10);
        assert_eq!(last.items.len(), 10);
        assert!(!last.has_next);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let seq: Vec<u32> = (0..5).collect();
        let beyond = page(&seq, 7, 10);
        assert!(beyond.items.is_empty());
        assert!(beyond.has_prev);
        assert!(!beyond.has_next);
    }

    #[test]
    fn empty_sequence() {
        let page = page::<u32>(&[], 0, 10);
        assert!(page.items.is_empty());
        assert!(!page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn zero_page_size_is_always_empty() {
        let seq: Vec<u32> = (0..5).collect();
        let page = page(&seq, 0, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }
}
