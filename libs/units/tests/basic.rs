use mensura_units::{UnitResolver, UnitsConfig, EXPONENT_SCALE};

fn resolver() -> UnitResolver {
    UnitResolver::new(&UnitsConfig::default_units()).expect("default config builds")
}

#[test]
fn base_units_resolve_to_unit_vectors() {
    let resolver = resolver();
    let base_units: Vec<String> = resolver.dictionary().base_units().to_vec();
    for (ordinal, name) in base_units.iter().enumerate() {
        let info = resolver.resolve(name).unwrap();
        assert_eq!(info.factor(), 1.0, "{name}");
        assert_eq!(info.offset(), 0.0, "{name}");
        for (lane, &exponent) in info.exponents().iter().enumerate() {
            let expected = if lane == ordinal { EXPONENT_SCALE as i16 } else { 0 };
            assert_eq!(exponent, expected, "{name} lane {lane}");
        }
    }
}

#[test]
fn named_units_match_their_seed_expressions() {
    let resolver = resolver();
    for (name, expr) in [
        ("N", "kg*m/s^2"),
        ("Pa", "N/m^2"),
        ("J", "N*m"),
        ("W", "J/s"),
        ("min", "60*s"),
        ("in", "0.0254*m"),
        ("degC", "K + 273.15"),
    ] {
        assert_eq!(
            resolver.resolve(name).unwrap(),
            resolver.resolve(expr).unwrap(),
            "{name} vs {expr}"
        );
    }
}

#[test]
fn power_spellings_are_equivalent() {
    let resolver = resolver();
    let by_function = resolver.resolve("pow(m, 2)").unwrap();
    let by_caret = resolver.resolve("m^2").unwrap();
    let by_product = resolver.resolve("m*m").unwrap();
    assert_eq!(by_function, by_caret);
    assert_eq!(by_caret, by_product);
}

#[test]
fn multiplying_and_dividing_round_trips() {
    let resolver = resolver();
    let a = resolver.resolve("kg*m/s^2").unwrap();
    let round_tripped = resolver.resolve("(kg*m/s^2) * s / s").unwrap();
    assert_eq!(a, round_tripped);
}

#[test]
fn double_negation_is_the_identity() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve("-(-(kg))").unwrap(),
        resolver.resolve("kg").unwrap()
    );
    assert_eq!(
        resolver.resolve("--degF").unwrap(),
        resolver.resolve("degF").unwrap()
    );
}

#[test]
fn multiplication_and_addition_commute() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve("m*s").unwrap(),
        resolver.resolve("s*m").unwrap()
    );
    assert_eq!(
        resolver.resolve("m + 2").unwrap(),
        resolver.resolve("2 + m").unwrap()
    );
    assert_eq!(
        resolver.resolve("m + cm").unwrap(),
        resolver.resolve("cm + m").unwrap()
    );
}

#[test]
fn empty_expressions_find_no_variables() {
    let resolver = resolver();
    for expr in ["", " ", "   "] {
        let err = resolver.resolve(expr).unwrap_err();
        assert!(err.to_string().contains("No variables found"), "{expr:?}");
    }
}

#[test]
fn unmatched_parentheses_are_syntax_errors() {
    let resolver = resolver();
    let err = resolver.resolve("((m)").unwrap_err();
    assert!(err.to_string().contains("Missing right parenthesis"));

    let err = resolver.resolve("m)").unwrap_err();
    assert!(err
        .to_string()
        .contains("No matching left parenthesis or comma"));
}

#[test]
fn stray_commas_are_rejected() {
    let resolver = resolver();
    let err = resolver.resolve(",").unwrap_err();
    assert!(err
        .to_string()
        .contains("No matching left parenthesis or comma"));

    for expr in ["pow(2,,3)", "pow(,2)", "pow(m,2,)"] {
        let err = resolver.resolve(expr).unwrap_err();
        assert!(err.to_string().contains("Unexpected comma"), "{expr}");
    }
}

#[test]
fn doubled_star_is_not_an_operator() {
    let resolver = resolver();
    let err = resolver.resolve("2 ** 3").unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("Unrecognized unit expression '*'"),
        "{message}"
    );
    assert!(message.starts_with("2 ** 3:"), "{message}");
}

#[test]
fn signed_exponent_literals_stay_whole() {
    let resolver = resolver();
    assert_eq!(resolver.resolve("1e+3").unwrap().factor(), 1000.0);
    assert_eq!(resolver.resolve("1e-7").unwrap().factor(), 1e-7);
    let scaled = resolver.resolve("1.2345e+1 * m").unwrap();
    assert!((scaled.factor() - 12.345).abs() < 1e-12);
}

#[test]
fn fractional_exponents_obey_the_tolerance() {
    let resolver = resolver();
    let third = resolver.resolve("m^(1/3)").unwrap();
    assert!(third.commensurable(&resolver.resolve("m^0.334").unwrap()));
    assert!(!third.commensurable(&resolver.resolve("m^0.3").unwrap()));
}

#[test]
fn unknown_names_suggest_close_matches() {
    let resolver = resolver();
    let err = resolver.resolve("degc").unwrap_err();
    let message = err.to_string();
    assert!(
        message.starts_with("degc: Unrecognized unit expression 'degc' at position 0."),
        "{message}"
    );
    assert!(message.contains("Did you mean:"), "{message}");
    for expected in ["degC", "degF", "degR"] {
        assert!(message.contains(expected), "{message}");
    }
}

#[test]
fn variables_remaining_on_the_stack_is_an_error() {
    let resolver = resolver();
    let err = resolver.resolve("m s").unwrap_err();
    assert!(err.to_string().contains("Variables remain on stack"));
}

#[test]
fn missing_operands_name_the_operator() {
    let resolver = resolver();
    let err = resolver.resolve("m *").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Missing operand 2 for '*'"), "{message}");
}
