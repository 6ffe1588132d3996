use klausen::{Engine, KlausenError, RawSpec, Registry};

fn spec_error(result: Result<Engine, KlausenError>) -> String {
    match result {
        Err(KlausenError::Specification(info)) => info.code,
        Err(other) => panic!("expected specification error, got {other:?}"),
        Ok(_) => panic!("expected specification error, got an engine"),
    }
}

#[test]
fn one_bad_entry_rejects_the_whole_declaration() {
    let code = spec_error(Engine::declare([
        ("good", RawSpec::normal(1.0, 0.1)),
        ("bad", RawSpec::triangular(0.0, 5.0, 1.0)),
    ]));
    assert_eq!(code, "spec-loc-out-of-bounds");
}

#[test]
fn errors_name_the_offending_parameter() {
    let err = Registry::declare([("bad", RawSpec::uniform(3.0, 1.0))]).unwrap_err();
    assert_eq!(err.info().context["parameter"], "bad");
}

#[test]
fn duplicate_names_are_rejected() {
    let code = spec_error(Engine::declare([
        ("x", RawSpec::constant(1.0)),
        ("x", RawSpec::constant(2.0)),
    ]));
    assert_eq!(code, "spec-duplicate-name");
}

#[test]
fn empty_names_are_rejected() {
    let code = spec_error(Engine::declare([("", RawSpec::constant(1.0))]));
    assert_eq!(code, "spec-empty-name");
}

#[test]
fn malformed_specs_are_rejected() {
    let cases = vec![
        RawSpec::default(),
        RawSpec::new(klausen::DistributionKind::Normal).loc(1.0),
        RawSpec::uniform(1.0, 0.0),
        RawSpec::empirical(Vec::new()),
        RawSpec {
            uncertainty_type: Some(klausen::UncertaintyType::Id(42)),
            loc: Some(1.0),
            ..RawSpec::default()
        },
    ];
    for raw in cases {
        let code = spec_error(Engine::declare([("p", raw)]));
        assert!(code.starts_with("spec-"), "{code}");
    }
}

#[test]
fn declarations_can_be_borrowed() {
    let raw = RawSpec::normal(1.0, 0.2);
    let registry = Registry::declare([("a", &raw), ("b", &raw)]).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("a"), registry.get("b"));
}

#[test]
fn one_sided_beta_cannot_invert_its_support() {
    let code = spec_error(Engine::declare([(
        "b",
        RawSpec::new(klausen::DistributionKind::Beta)
            .loc(2.0)
            .shape(2.0)
            .minimum(2.0),
    )]));
    assert_eq!(code, "spec-bounds-inverted");
}

#[test]
fn overflowing_supports_fail_before_any_draw() {
    for raw in [
        RawSpec::uniform(-1e308, 1e308),
        RawSpec::triangular(-1e308, 0.0, 1e308),
    ] {
        assert_eq!(spec_error(Engine::declare([("wide", raw)])), "spec-non-finite");
    }
}

#[test]
fn directly_built_specs_are_checked_before_an_engine_exists() {
    let err = Registry::from_validated([(
        "e",
        klausen::ParameterSpec::new(klausen::Distribution::Empirical { sample: Vec::new() }),
    )])
    .unwrap_err();
    assert!(matches!(err, KlausenError::Specification(_)));
}
