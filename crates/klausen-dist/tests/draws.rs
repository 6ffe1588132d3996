use klausen_core::{KlausenError, RngHandle};
use klausen_dist::{triangular_inverse_cdf, DistributionKind, DrawOptions, ParameterSpec, RawSpec};
use proptest::prelude::*;

fn spec(raw: RawSpec) -> ParameterSpec {
    ParameterSpec::from_raw(&raw).unwrap()
}

#[test]
fn draws_have_requested_length() {
    let mut rng = RngHandle::from_seed(1);
    for raw in [
        RawSpec::constant(1.0),
        RawSpec::normal(0.0, 1.0),
        RawSpec::lognormal(0.0, 0.5),
        RawSpec::uniform(0.0, 1.0),
        RawSpec::triangular(0.0, 0.5, 1.0),
        RawSpec::empirical(vec![1.0, 2.0]),
    ] {
        let spec = spec(raw);
        assert_eq!(spec.draw(17, &mut rng).unwrap().len(), 17);
        assert!(spec.draw(0, &mut rng).unwrap().is_empty());
    }
}

#[test]
fn same_seed_same_values() {
    let spec = spec(RawSpec::normal(2.0, 0.5));
    let a = spec.draw(64, &mut RngHandle::from_seed(99)).unwrap();
    let b = spec.draw(64, &mut RngHandle::from_seed(99)).unwrap();
    let c = spec.draw(64, &mut RngHandle::from_seed(100)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn constant_draws_repeat_the_value() {
    let values = spec(RawSpec::constant(3.5))
        .draw(10, &mut RngHandle::from_seed(0))
        .unwrap();
    assert!(values.iter().all(|v| *v == 3.5));
}

#[test]
fn empirical_bootstraps_from_population() {
    let population = vec![1.0, 5.0, 9.0];
    let values = spec(RawSpec::empirical(population.clone()))
        .draw(500, &mut RngHandle::from_seed(3))
        .unwrap();
    assert_eq!(values.len(), 500);
    assert!(values.iter().all(|v| population.contains(v)));
    for member in &population {
        assert!(values.contains(member), "{member} never drawn");
    }
}

#[test]
fn truncation_does_not_pile_mass_on_the_bound() {
    let values = spec(RawSpec::normal(0.0, 1.0).minimum(0.0))
        .draw(2_000, &mut RngHandle::from_seed(11))
        .unwrap();
    assert!(values.iter().all(|v| *v >= 0.0));
    let at_bound = values.iter().filter(|v| **v == 0.0).count();
    assert_eq!(at_bound, 0);
    // Half-normal mean is sqrt(2/pi) ~ 0.798.
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    assert!((mean - 0.798).abs() < 0.06, "mean {mean}");
}

#[test]
fn empty_truncation_window_fails_with_draw_error() {
    let spec = spec(RawSpec::normal(0.0, 1.0).minimum(50.0).maximum(50.5));
    let options = DrawOptions { max_attempts: 100 };
    let err = spec
        .draw_with(5, &mut RngHandle::from_seed(1), &options)
        .unwrap_err();
    match err {
        KlausenError::Draw(info) => {
            assert_eq!(info.code, "draw-rejection-exhausted");
            assert_eq!(info.context["max_attempts"], "100");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn triangular_inverse_cdf_hits_the_corners() {
    assert_eq!(triangular_inverse_cdf(0.8, 1.0, 1.2, 0.0), 0.8);
    assert!((triangular_inverse_cdf(0.8, 1.0, 1.2, 0.5) - 1.0).abs() < 1e-12);
    assert_eq!(triangular_inverse_cdf(2.0, 2.0, 2.0, 0.3), 2.0);
}

#[test]
fn triangular_mean_matches_closed_form() {
    let values = spec(RawSpec::triangular(0.0, 1.0, 5.0))
        .draw(5_000, &mut RngHandle::from_seed(21))
        .unwrap();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    assert!((mean - 2.0).abs() < 0.1, "mean {mean}");
}

fn bounded_specs() -> Vec<ParameterSpec> {
    vec![
        spec(RawSpec::triangular(0.8, 1.0, 1.2)),
        spec(RawSpec::uniform(-1.0, 3.0)),
        spec(RawSpec::normal(0.01, 0.003).minimum(0.005)),
        spec(RawSpec::normal(0.0, 2.0).minimum(-1.0).maximum(0.5)),
        spec(RawSpec::lognormal(0.0, 1.0).minimum(0.5).maximum(3.0)),
        spec(
            RawSpec::new(DistributionKind::Gamma)
                .shape(2.0)
                .scale(1.0)
                .maximum(4.0),
        ),
        spec(
            RawSpec::new(DistributionKind::Weibull)
                .shape(1.5)
                .minimum(0.2)
                .maximum(2.0),
        ),
        spec(
            RawSpec::new(DistributionKind::Beta)
                .loc(2.0)
                .shape(5.0)
                .minimum(10.0)
                .maximum(20.0),
        ),
        spec(RawSpec::new(DistributionKind::Beta).loc(2.0).shape(2.0).minimum(0.5)),
        spec(RawSpec::new(DistributionKind::Beta).loc(3.0).shape(1.5).maximum(0.25)),
    ]
}

proptest! {
    #[test]
    fn bounded_draws_stay_inside(seed in any::<u64>()) {
        let mut rng = RngHandle::from_seed(seed);
        for spec in bounded_specs() {
            let bounds = spec.bounds();
            let values = spec.draw(64, &mut rng).unwrap();
            for value in values {
                prop_assert!(bounds.contains(value), "{:?} drew {}", spec.kind(), value);
            }
        }
    }
}
