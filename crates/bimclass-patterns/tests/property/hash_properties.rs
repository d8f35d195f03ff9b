use bimclass_core::models::{DimensionStats, DimensionSummary, PatternKey};
use bimclass_patterns::PatternHasher;
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = PatternKey> {
    (
        "[A-Za-z ]{1,12}",
        "[A-Za-z ]{1,12}",
        "[A-Za-z0-9x]{1,10}",
        "[A-Za-z]{1,8}",
        "[A-Za-z0-9 ]{1,10}",
    )
        .prop_map(|(category, family, element_type, material, location_type)| PatternKey {
            category,
            family,
            element_type,
            material,
            location_type,
        })
}

fn arb_summary() -> impl Strategy<Value = Option<DimensionSummary>> {
    proptest::option::of((0.0f64..10_000.0, 0.0f64..10_000.0, 1u64..1_000).prop_map(
        |(a, b, count)| {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            DimensionSummary {
                min,
                max,
                avg: (min + max) / 2.0,
                count,
            }
        },
    ))
}

fn arb_stats() -> impl Strategy<Value = DimensionStats> {
    (arb_summary(), arb_summary(), arb_summary()).prop_map(|(length, width, height)| {
        DimensionStats {
            length,
            width,
            height,
        }
    })
}

/// Snap to `precision` decimals, then add a tenth of the last kept unit.
fn jitter(stats: &DimensionStats, precision: u32) -> DimensionStats {
    let scale = 10f64.powi(precision as i32);
    map_values(stats, |v| (v * scale).round() / scale + 0.1 / scale)
}

fn map_values(stats: &DimensionStats, f: impl Fn(f64) -> f64) -> DimensionStats {
    let apply = |s: &Option<DimensionSummary>| {
        s.map(|s| DimensionSummary {
            min: f(s.min),
            max: f(s.max),
            avg: f(s.avg),
            count: s.count,
        })
    };
    DimensionStats {
        length: apply(&stats.length),
        width: apply(&stats.width),
        height: apply(&stats.height),
    }
}

fn snapped(stats: &DimensionStats, precision: u32) -> DimensionStats {
    let scale = 10f64.powi(precision as i32);
    map_values(stats, |v| (v * scale).round() / scale)
}

proptest! {
    #[test]
    fn hash_is_deterministic(key in arb_key(), stats in arb_stats()) {
        let hasher = PatternHasher::default();
        prop_assert_eq!(hasher.hash_parts(&key, &stats), hasher.hash_parts(&key.clone(), &stats.clone()));
    }

    #[test]
    fn equal_rounded_stats_hash_equal(key in arb_key(), stats in arb_stats()) {
        let hasher = PatternHasher::new(2);
        let base = snapped(&stats, 2);
        let noisy = jitter(&stats, 2);
        prop_assert_eq!(hasher.hash_parts(&key, &base), hasher.hash_parts(&key, &noisy));
    }

    #[test]
    fn element_count_does_not_affect_hash(key in arb_key(), stats in arb_stats(), count in 1u64..10_000) {
        let hasher = PatternHasher::default();
        let mut recounted = stats.clone();
        if let Some(s) = recounted.length.as_mut() {
            s.count = count;
        }
        prop_assert_eq!(hasher.hash_parts(&key, &stats), hasher.hash_parts(&key, &recounted));
    }

    #[test]
    fn changing_any_key_field_changes_hash(
        key in arb_key(),
        stats in arb_stats(),
        field in 0usize..5,
        suffix in "[a-z]{1,4}",
    ) {
        let hasher = PatternHasher::default();
        let mut changed = key.clone();
        let target = match field {
            0 => &mut changed.category,
            1 => &mut changed.family,
            2 => &mut changed.element_type,
            3 => &mut changed.material,
            _ => &mut changed.location_type,
        };
        target.push_str(&suffix);
        prop_assert_ne!(hasher.hash_parts(&key, &stats), hasher.hash_parts(&changed, &stats));
    }

    #[test]
    fn moving_a_boundary_between_fields_changes_hash(a in "[a-z]{2,8}", b in "[a-z]{1,8}") {
        let hasher = PatternHasher::default();
        let stats = DimensionStats::default();
        let left = PatternKey {
            category: a.clone(),
            family: b.clone(),
            element_type: "t".into(),
            material: "m".into(),
            location_type: "l".into(),
        };
        let split = a.len() - 1;
        let right = PatternKey {
            category: a[..split].to_string(),
            family: format!("{}{}", &a[split..], b),
            ..left.clone()
        };
        prop_assert_ne!(hasher.hash_parts(&left, &stats), hasher.hash_parts(&right, &stats));
    }
}
