//! Hair to back-hair alignment table
//!
//! Back-hair variants are fewer than hair variants; each declares (via
//! the ordinal in its stable name) the hair index at which it becomes
//! active. The table is built once when both lists are known and maps
//! every hair index to a back-hair index in O(1).
//!
//! Invariants: entry 0 is 0 (the back-hair default), the mapping is
//! monotonic non-decreasing, and it is total over `[0, hair_len)`.
//! Hair indices beyond the last declared threshold repeat the last
//! back-hair variant; falling back to the default there would violate
//! monotonicity.

use log::warn;

use crate::entities::variant::VariantDescriptor;
use crate::error::VisageError;

/// Precomputed hair index -> back-hair index mapping
#[derive(Debug, Clone)]
pub struct AlignmentTable {
    table: Vec<usize>,
}

impl AlignmentTable {
    /// Build the table from the back-hair variant list.
    ///
    /// Thresholds are the descriptors' declared ordinals, clamped
    /// monotonic; the first variant is always active from hair index 0.
    pub fn build(hair_len: usize, backhair: &[VariantDescriptor]) -> Result<Self, VisageError> {
        if hair_len == 0 {
            return Err(VisageError::Alignment("empty hair variant list".into()));
        }
        if backhair.is_empty() {
            return Err(VisageError::Alignment("empty back-hair variant list".into()));
        }

        let mut thresholds = Vec::with_capacity(backhair.len());
        let mut previous = 0usize;
        for (j, variant) in backhair.iter().enumerate() {
            let declared = if j == 0 {
                // The default is active from the start regardless of encoding
                0
            } else {
                match variant.ordinal {
                    Some(ordinal) => ordinal as usize,
                    None => {
                        warn!(
                            "back-hair variant '{}' declares no threshold, reusing {}",
                            variant.name, previous
                        );
                        previous
                    }
                }
            };
            if declared < previous {
                warn!(
                    "back-hair threshold {} for '{}' is below its predecessor {}",
                    declared, variant.name, previous
                );
            }
            let threshold = declared.max(previous);
            thresholds.push(threshold);
            previous = threshold;
        }

        let mut table = Vec::with_capacity(hair_len);
        let mut active = 0usize;
        for hair_index in 0..hair_len {
            while active + 1 < thresholds.len() && hair_index >= thresholds[active + 1] {
                active += 1;
            }
            table.push(active);
        }

        Ok(Self { table })
    }

    /// Back-hair index for a hair index. Total over `[0, hair_len)`.
    pub fn lookup(&self, hair_index: usize) -> usize {
        let last = self.table.len() - 1;
        self.table[hair_index.min(last)]
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backhair(thresholds: &[u32]) -> Vec<VariantDescriptor> {
        thresholds
            .iter()
            .map(|t| {
                VariantDescriptor::new(format!("backhair_{:04}_v.svg", t), vec![], "ada")
            })
            .collect()
    }

    #[test]
    fn hair_zero_maps_to_the_default() {
        let table = AlignmentTable::build(8, &backhair(&[0, 3, 5])).unwrap();
        assert_eq!(table.lookup(0), 0);
    }

    #[test]
    fn table_is_total_and_monotonic() {
        let table = AlignmentTable::build(10, &backhair(&[0, 2, 6])).unwrap();
        assert_eq!(table.len(), 10);
        let mut previous = 0;
        for i in 0..10 {
            let mapped = table.lookup(i);
            assert!(mapped >= previous, "non-decreasing at {}", i);
            previous = mapped;
        }
    }

    #[test]
    fn thresholds_split_the_range() {
        let table = AlignmentTable::build(8, &backhair(&[0, 3, 5])).unwrap();
        assert_eq!(
            (0..8).map(|i| table.lookup(i)).collect::<Vec<_>>(),
            vec![0, 0, 0, 1, 1, 2, 2, 2]
        );
    }

    #[test]
    fn below_first_threshold_stays_default() {
        // Hair advancing 0 -> 1 with the next variant active from 4
        let table = AlignmentTable::build(6, &backhair(&[0, 4])).unwrap();
        assert_eq!(table.lookup(1), 0);
    }

    #[test]
    fn tail_repeats_the_last_variant() {
        let table = AlignmentTable::build(12, &backhair(&[0, 2, 4])).unwrap();
        for i in 4..12 {
            assert_eq!(table.lookup(i), 2);
        }
    }

    #[test]
    fn decreasing_thresholds_are_clamped() {
        let table = AlignmentTable::build(6, &backhair(&[0, 4, 2])).unwrap();
        // Variant 2's declared threshold 2 is clamped up to 4
        assert_eq!(
            (0..6).map(|i| table.lookup(i)).collect::<Vec<_>>(),
            vec![0, 0, 0, 0, 2, 2]
        );
    }

    #[test]
    fn empty_lists_are_rejected() {
        assert!(AlignmentTable::build(0, &backhair(&[0])).is_err());
        assert!(AlignmentTable::build(5, &[]).is_err());
    }
}
