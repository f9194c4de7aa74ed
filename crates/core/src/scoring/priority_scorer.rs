//! Review-queue ordering by stored priority score.

use std::cmp::Ordering;

use super::scoring_model::PriorityEntry;

/// Orders ingested items for manual review. Reads and sorts only; scores are
/// never recomputed here.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityScorer;

impl PriorityScorer {
    /// Highest priority first, unscored items last, ties by item id.
    pub fn rank(&self, mut entries: Vec<PriorityEntry>) -> Vec<PriorityEntry> {
        entries.sort_by(Self::compare);
        entries
    }

    /// The `n` entries that should be reviewed next.
    pub fn next_batch(&self, entries: Vec<PriorityEntry>, n: usize) -> Vec<PriorityEntry> {
        let mut ranked = self.rank(entries);
        ranked.truncate(n);
        ranked
    }

    fn compare(a: &PriorityEntry, b: &PriorityEntry) -> Ordering {
        match (a.priority_score, b.priority_score) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.item_id.cmp(&b.item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entry(id: &str, score: Option<Decimal>) -> PriorityEntry {
        PriorityEntry {
            item_id: id.to_string(),
            priority_score: score,
        }
    }

    fn ids(entries: &[PriorityEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.item_id.as_str()).collect()
    }

    #[test]
    fn test_rank_descending_with_unscored_last() {
        let ranked = PriorityScorer.rank(vec![
            entry("c", Some(dec!(10))),
            entry("x", None),
            entry("a", Some(dec!(80))),
            entry("b", Some(dec!(10))),
            entry("d", None),
        ]);
        assert_eq!(ids(&ranked), vec!["a", "b", "c", "d", "x"]);
    }

    #[test]
    fn test_next_batch() {
        let entries = vec![
            entry("a", Some(dec!(1))),
            entry("b", Some(dec!(3))),
            entry("c", Some(dec!(2))),
        ];
        assert_eq!(ids(&PriorityScorer.next_batch(entries.clone(), 2)), vec!["b", "c"]);
        assert_eq!(PriorityScorer.next_batch(entries, 10).len(), 3);
    }
}
