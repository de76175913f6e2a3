use mvp_engine::variance::{gra, martingale};
use mvp_engine::{Axis, EngineConfig, Evaluator, Family, Point, Precision, Query};
use proptest::prelude::*;

fn double() -> Evaluator {
    Evaluator::new(EngineConfig::default().with_precision(Precision::Double)).unwrap()
}

#[test]
fn test_martingale_classic_registers() {
    let config = EngineConfig::default();
    let value = martingale(6.0, 0, 2.0, &config).unwrap();
    assert!((value - 6.0 * std::f64::consts::LN_2).abs() < 1e-14);
}

#[test]
fn test_fisher_information_limit() {
    let evaluator = Evaluator::default();
    let mut previous = f64::INFINITY;
    for exponent in 1..=6 {
        let b = 1.0 + 10f64.powi(-exponent);
        let distance = (evaluator.fisher_information(0, b) - 1.0).abs();
        assert!(distance < previous);
        previous = distance;
    }
    assert!(previous < 1e-9);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_fisher_information_positive(d in 0u32..60, b in 1.0001f64..5.0) {
        prop_assert!(Evaluator::default().fisher_information(d, b) > 0.0);
    }

    #[test]
    fn prop_gra_without_shape_is_register_width(
        q in 0.0f64..64.0,
        d in 0u32..30,
        b in 1.01f64..5.0,
    ) {
        let config = EngineConfig::default();
        prop_assert_eq!(gra(q, d, b, 0.0, &config).unwrap(), q + f64::from(d));
    }

    #[test]
    fn prop_base_search_reproduces_formula(
        family in prop_oneof![Just(Family::LOWER_BOUND), Just(Family::MARTINGALE)],
        q in 1.0f64..16.0,
        d in 0u32..6,
    ) {
        let evaluator = double();
        let optimum = evaluator.evaluate(family, &Query::new().q(q).d(d)).unwrap();
        let replayed = evaluator
            .mvp(family, &Point::new(Some(q), d, optimum.b(), None))
            .unwrap();
        prop_assert!((replayed.mvp() - optimum.mvp()).abs() <= 1e-9 * optimum.mvp());
    }

    #[test]
    fn prop_raising_search_cap_never_hurts(n in 0u32..12, b in 1.2f64..4.0) {
        let evaluator = double();
        let search = |max| {
            evaluator
                .evaluate(
                    Family::LOWER_BOUND,
                    &Query::new().q(6.0).b(b).d_axis(Axis::Search { min: 0, max }),
                )
                .unwrap()
                .mvp()
        };
        prop_assert!(search(n + 1) <= search(n));
    }

    #[test]
    fn prop_shape_search_beats_unit_shape(q in 1.0f64..12.0, d in 0u32..6, b in 1.1f64..4.0) {
        let evaluator = double();
        let optimum = evaluator
            .evaluate(Family::GRA, &Query::new().q(q).d(d).b(b))
            .unwrap();
        let baseline = gra(q, d, b, 1.0, evaluator.config()).unwrap();
        prop_assert!(optimum.mvp() <= baseline * (1.0 + 1e-12));
    }
}
