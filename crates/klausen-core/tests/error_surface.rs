use klausen_core::errors::{ErrorInfo, KlausenError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("parameter", "a")
        .with_context("field", "scale")
}

#[test]
fn specification_error_surface() {
    let err = KlausenError::Specification(sample_info("spec-missing-field", "scale missing"));
    assert_eq!(err.info().code, "spec-missing-field");
    assert!(err.info().context.contains_key("parameter"));
}

#[test]
fn not_ready_error_surface() {
    let err = KlausenError::NotReady(sample_info("engine-not-ready", "no values"));
    assert_eq!(err.info().code, "engine-not-ready");
}

#[test]
fn unknown_parameter_error_surface() {
    let err = KlausenError::UnknownParameter(sample_info("engine-unknown-parameter", "missing"));
    assert_eq!(err.info().code, "engine-unknown-parameter");
}

#[test]
fn draw_error_surface() {
    let err = KlausenError::Draw(sample_info("draw-rejection-exhausted", "no mass"));
    assert_eq!(err.info().code, "draw-rejection-exhausted");
}

#[test]
fn with_context_keeps_family() {
    let err = KlausenError::specification("spec-bounds", "minimum above maximum")
        .with_context("parameter", "x");
    assert!(matches!(err, KlausenError::Specification(_)));
    assert_eq!(err.info().context.get("parameter").map(String::as_str), Some("x"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = KlausenError::Config(
        ErrorInfo::new("config-read", "cannot read file")
            .with_context("path", "params.yaml")
            .with_hint("check permissions"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("config error: cannot read file (code: config-read)"));
    assert!(rendered.contains("[path=params.yaml]"));
    assert!(rendered.ends_with("; hint: check permissions"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = KlausenError::NotReady(ErrorInfo::new("engine-not-ready", "no values"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "NotReady");
    assert_eq!(json["detail"]["code"], "engine-not-ready");
    let decoded: KlausenError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}
