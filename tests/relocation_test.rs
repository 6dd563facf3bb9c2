//! Relocation properties checked against both strategies.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use relocation_bench::{
    generate_population, generate_relocation_batch, run_round, Distribution, Identity, Point,
    ReferenceMirror, RelocatableIndex, RelocationError, Strategy,
};

fn p3(x: f64, y: f64, z: f64) -> Point {
    Point::from([x, y, z])
}

fn identities(index: &dyn RelocatableIndex) -> BTreeSet<Identity> {
    index.entries().into_iter().map(|(_, id)| id).collect()
}

#[test]
fn test_collision_boundary() {
    for strategy in Strategy::ALL {
        let mut index = strategy.build(3);
        index.insert(p3(3.0, 3.0, 3.0), 7).unwrap();
        index.insert(p3(3.0, 3.0, 3.0), 9).unwrap();

        assert!(index
            .relocate(&p3(3.0, 3.0, 3.0), &p3(4.0, 3.0, 3.0), 7)
            .unwrap());

        assert_eq!(index.identities_at(&p3(3.0, 3.0, 3.0)), vec![9], "{}", strategy);
        assert_eq!(index.identities_at(&p3(4.0, 3.0, 3.0)), vec![7], "{}", strategy);
        assert_eq!(index.entry_count(), 2);
    }
}

#[test]
fn test_intra_batch_chaining_in_order() {
    for strategy in Strategy::ALL {
        let mut index = strategy.build(3);
        index.insert(p3(0.0, 0.0, 0.0), 5).unwrap();

        assert!(index.relocate(&p3(0.0, 0.0, 0.0), &p3(1.0, 0.0, 0.0), 5).unwrap());
        assert!(index.relocate(&p3(1.0, 0.0, 0.0), &p3(2.0, 0.0, 0.0), 5).unwrap());
        assert_eq!(index.entries(), vec![(p3(2.0, 0.0, 0.0), 5)]);
    }
}

#[test]
fn test_intra_batch_chaining_out_of_order() {
    for strategy in Strategy::ALL {
        let mut index = strategy.build(3);
        index.insert(p3(0.0, 0.0, 0.0), 5).unwrap();

        let second_first = index.relocate(&p3(1.0, 0.0, 0.0), &p3(2.0, 0.0, 0.0), 5);
        assert!(!matches!(second_first, Ok(true)), "{}", strategy);
    }
}

#[test]
fn test_out_of_order_bucketed_is_consistency_error() {
    let mut index = Strategy::Bucketed.build(3);
    index.insert(p3(0.0, 0.0, 0.0), 5).unwrap();

    let result = index.relocate(&p3(1.0, 0.0, 0.0), &p3(2.0, 0.0, 0.0), 5);
    assert!(matches!(result, Err(RelocationError::Consistency { id: 5, .. })));
}

#[test]
fn test_out_of_order_native_leaves_index_untouched() {
    let mut index = Strategy::Native.build(3);
    index.insert(p3(0.0, 0.0, 0.0), 5).unwrap();

    assert!(!index
        .relocate(&p3(1.0, 0.0, 0.0), &p3(2.0, 0.0, 0.0), 5)
        .unwrap());
    assert_eq!(index.entries(), vec![(p3(0.0, 0.0, 0.0), 5)]);
}

#[test]
fn test_noop_idempotence() {
    for strategy in Strategy::ALL {
        let mut index = strategy.build(3);
        index.insert(p3(1.0, 1.0, 1.0), 0).unwrap();
        index.insert(p3(1.0, 1.0, 1.0), 1).unwrap();
        index.insert(p3(2.0, 2.0, 2.0), 2).unwrap();
        let before = index.entries();
        let size = index.size();

        for _ in 0..3 {
            assert!(index.relocate(&p3(1.0, 1.0, 1.0), &p3(1.0, 1.0, 1.0), 1).unwrap());
        }
        assert_eq!(index.entries(), before);
        assert_eq!(index.size(), size);
    }
}

#[test]
fn test_empty_bucket_cleanup() {
    let mut index = Strategy::Bucketed.build(3);
    index.insert(p3(1.0, 1.0, 1.0), 0).unwrap();
    index.insert(p3(1.0, 1.0, 1.0), 1).unwrap();

    index.relocate(&p3(1.0, 1.0, 1.0), &p3(2.0, 2.0, 2.0), 0).unwrap();
    assert_eq!(index.size(), 2);

    index.relocate(&p3(1.0, 1.0, 1.0), &p3(2.0, 2.0, 2.0), 1).unwrap();
    assert!(index.identities_at(&p3(1.0, 1.0, 1.0)).is_empty());
    assert_eq!(index.size(), 1);
    assert_eq!(index.empty_buckets(), 0);
}

#[test]
fn test_zero_distance_round_trip() {
    for strategy in Strategy::ALL {
        let mut rng = StdRng::seed_from_u64(42);
        let points =
            generate_population(100, 3, Distribution::Cube, 0.0, 10_000.0, 0.1, &mut rng).unwrap();
        let distinct: BTreeSet<_> = points.iter().collect();
        assert_eq!(distinct.len(), 90);

        let mut index = strategy.build(3);
        for (i, p) in points.iter().enumerate() {
            index.insert(p.clone(), i as Identity).unwrap();
        }
        let mut mirror = ReferenceMirror::new(points);
        let before = index.entries();
        let size_before = index.size();

        let ops = generate_relocation_batch(50, &mirror, &[0.0], &mut rng);
        let report = run_round(index.as_mut(), &ops, &mut mirror, 100).unwrap();

        assert_eq!(report.succeeded, 50);
        assert!(report.is_clean());
        assert_eq!(index.size(), size_before);
        assert_eq!(index.entries(), before);
    }
}

#[test]
fn test_identity_preservation_over_rounds() {
    for strategy in Strategy::ALL {
        let mut rng = StdRng::seed_from_u64(7);
        let points =
            generate_population(300, 3, Distribution::Cluster, 0.0, 10_000.0, 0.1, &mut rng)
                .unwrap();
        let mut index = strategy.build(3);
        for (i, p) in points.iter().enumerate() {
            index.insert(p.clone(), i as Identity).unwrap();
        }
        let mut mirror = ReferenceMirror::new(points);
        let expected: BTreeSet<Identity> = (0..300).collect();

        for _ in 0..10 {
            let ops = generate_relocation_batch(200, &mirror, &[0.0, 1.0, 10.0], &mut rng);
            let report = run_round(index.as_mut(), &ops, &mut mirror, 300).unwrap();
            assert!(report.is_clean(), "{}: {:?}", strategy, report.anomalies);

            assert_eq!(identities(index.as_ref()), expected);
            assert_eq!(index.entries().len(), 300);
            for (id, p) in mirror.iter() {
                assert!(index.contains(p, id));
            }
        }
    }
}

#[test]
fn test_strategies_agree() {
    let mut rng = StdRng::seed_from_u64(99);
    let points =
        generate_population(150, 2, Distribution::Cube, 0.0, 100.0, 0.1, &mut rng).unwrap();
    let ops = generate_relocation_batch(
        400,
        &ReferenceMirror::new(points.clone()),
        &[0.0, 1.0, 10.0],
        &mut rng,
    );

    let mut results = Vec::new();
    for strategy in Strategy::ALL {
        let mut index = strategy.build(2);
        for (i, p) in points.iter().enumerate() {
            index.insert(p.clone(), i as Identity).unwrap();
        }
        let mut mirror = ReferenceMirror::new(points.clone());
        run_round(index.as_mut(), &ops, &mut mirror, 150).unwrap();
        results.push(index.entries());
    }
    assert_eq!(results[0], results[1]);
}
