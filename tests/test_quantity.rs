use recipe_normalizer::parse_quantity;
use recipe_normalizer::quantity::parse_quantity_str;
use serde_json::json;

#[test]
fn test_fractions_and_mixed_numbers() {
    assert_eq!(parse_quantity(&json!("1/2")), Some(0.5));
    assert_eq!(parse_quantity(&json!("1 1/2")), Some(1.5));
    assert_eq!(parse_quantity(&json!("3/4 cup")), Some(0.75));
}

#[test]
fn test_vulgar_fractions() {
    assert_eq!(parse_quantity(&json!("½")), Some(0.5));
    assert_eq!(parse_quantity(&json!("1½")), Some(1.5));
    assert_eq!(parse_quantity(&json!("2 ¼ cups")), Some(2.25));
}

#[test]
fn test_unparseable_quantities() {
    assert_eq!(parse_quantity(&json!("1/0")), None);
    assert_eq!(parse_quantity(&json!("two")), None);
    assert_eq!(parse_quantity(&json!("")), None);
    assert_eq!(parse_quantity(&json!(null)), None);
    assert_eq!(parse_quantity(&json!(true)), None);
    assert_eq!(parse_quantity(&json!(["1"])), None);
}

#[test]
fn test_numbers_and_embedded_numbers() {
    assert_eq!(parse_quantity(&json!(3)), Some(3.0));
    assert_eq!(parse_quantity(&json!(0.25)), Some(0.25));
    assert_eq!(parse_quantity_str("about 200 g"), Some(200.0));
    assert_eq!(parse_quantity_str("1.5"), Some(1.5));
}
