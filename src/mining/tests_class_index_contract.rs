// =========================================================================
// FALSIFY-CI: Class index contract (terna mining)
//
// Five-Whys (contract backfill):
//   Why 1: every selection starts from this partition of the batch
//   Why 2: a dropped or duplicated position biases all downstream triplets
//   Why 3: shuffling happens at build time, where a bug is easy to hide
//   Why 4: background handling splits across build and query methods
//   Why 5: grouping by label was "obviously correct" (a loop and a map)
//
// References:
//   - Partition property: each position in exactly one class
// =========================================================================

use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// FALSIFY-CI-001: Classes partition the batch positions
#[test]
fn falsify_ci_001_partition() {
    let labels = [4, 2, 4, 4, 9, 2, 0, 9];
    let mut rng = StdRng::seed_from_u64(5);
    let index = ClassIndex::build(&labels, &mut rng);

    let mut seen = vec![0usize; labels.len()];
    for &label in index.class_labels() {
        for &pos in index.members(label).expect("label present") {
            seen[pos] += 1;
            assert_eq!(
                labels[pos], label,
                "FALSIFIED CI-001: position {pos} filed under label {label}"
            );
        }
    }
    for (pos, &count) in seen.iter().enumerate() {
        assert_eq!(
            count, 1,
            "FALSIFIED CI-001: position {pos} appears {count} times, expected 1"
        );
    }
}

/// FALSIFY-CI-002: Class order is first occurrence in the label sequence
#[test]
fn falsify_ci_002_first_occurrence_order() {
    let labels = [7, 3, 7, 1, 3, 7];
    let mut rng = StdRng::seed_from_u64(5);
    let index = ClassIndex::build(&labels, &mut rng);

    assert_eq!(
        index.class_labels(),
        &[7, 3, 1],
        "FALSIFIED CI-002: class order {:?}",
        index.class_labels()
    );
}

/// FALSIFY-CI-003: Background filtering leaves the partition intact
#[test]
fn falsify_ci_003_background_stays_in_partition() {
    let labels = [1, 0, 2, 0, 1, 0];
    let mut rng = StdRng::seed_from_u64(5);
    let index = ClassIndex::build(&labels, &mut rng);

    // Filtered from anchor/positive duty only.
    assert_eq!(
        index.foreground_labels(Some(0)),
        vec![1, 2],
        "FALSIFIED CI-003: foreground labels wrong"
    );
    // Still present in the partition, so its items stay visible as
    // potential negatives.
    let mut zeros = index.members(0).expect("label present").to_vec();
    zeros.sort_unstable();
    assert_eq!(
        zeros,
        vec![1, 3, 5],
        "FALSIFIED CI-003: background members lost from partition"
    );
}

/// FALSIFY-CI-004: Member lists are permutations of the label's positions
#[test]
fn falsify_ci_004_members_are_permutations() {
    let labels = [6, 6, 6, 6, 6, 6, 6, 6, 6, 6];
    let mut rng = StdRng::seed_from_u64(1234);
    let index = ClassIndex::build(&labels, &mut rng);

    let members = index.members(6).expect("label present");
    let mut sorted = members.to_vec();
    sorted.sort_unstable();
    assert_eq!(
        sorted,
        (0..10).collect::<Vec<usize>>(),
        "FALSIFIED CI-004: member list is not a permutation"
    );
}

mod class_index_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-CI-001-prop: Partition property for random label sequences
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        #[test]
        fn falsify_ci_001_prop_partition(
            labels in prop::collection::vec(-3..6i32, 0..40),
            seed in 0..1000u64,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let index = ClassIndex::build(&labels, &mut rng);

            let mut seen = vec![0usize; labels.len()];
            for &label in index.class_labels() {
                for &pos in index.members(label).expect("label present") {
                    seen[pos] += 1;
                    prop_assert_eq!(labels[pos], label);
                }
            }
            prop_assert!(
                seen.iter().all(|&c| c == 1),
                "FALSIFIED CI-001-prop: not a partition"
            );
            prop_assert_eq!(
                index.n_classes(),
                index.class_labels().len()
            );
        }
    }
}
