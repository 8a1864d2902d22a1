//! Unit tests for the type algebra.

use super::types::Type;

fn all_concrete() -> Vec<Type> {
    vec![
        Type::Void,
        Type::Bool,
        Type::Num,
        Type::String,
        Type::Piece,
        Type::Cell,
        Type::Row,
        Type::Rank,
        Type::File,
        Type::Player,
        Type::array_of(Type::Num),
        Type::array_of(Type::array_of(Type::Bool)),
    ]
}

#[test]
fn test_equals_is_reflexive_and_symmetric() {
    let mut types = all_concrete();
    types.extend([Type::Generic, Type::GenericArray, Type::EmptyArray]);

    for a in &types {
        assert!(a.equals(a), "{} should equal itself", a);
        for b in &types {
            assert_eq!(a.equals(b), b.equals(a), "{} / {}", a, b);
        }
    }
}

#[test]
fn test_generic_equals_everything() {
    for ty in all_concrete() {
        assert!(Type::Generic.equals(&ty));
    }
}

#[test]
fn test_empty_array_equals_arrays_only() {
    assert!(Type::EmptyArray.equals(&Type::array_of(Type::Bool)));
    assert!(Type::array_of(Type::array_of(Type::Bool)).equals(&Type::EmptyArray));
    assert!(Type::EmptyArray.equals(&Type::GenericArray));
    assert!(!Type::EmptyArray.equals(&Type::Num));
    assert!(Type::array_of(Type::EmptyArray).equals(&Type::array_of(Type::array_of(Type::Cell))));
    assert!(!Type::array_of(Type::EmptyArray).equals(&Type::array_of(Type::Cell)));
}

#[test]
fn test_arrays_compare_elements() {
    assert!(Type::array_of(Type::Num).equals(&Type::array_of(Type::Num)));
    assert!(!Type::array_of(Type::Num).equals(&Type::array_of(Type::Bool)));
}

#[test]
fn test_merge_prefers_concrete() {
    let concrete = Type::array_of(Type::Num);
    for sentinel in [Type::Generic, Type::GenericArray, Type::EmptyArray] {
        assert_eq!(sentinel.merge_types(&concrete), concrete);
        assert_eq!(concrete.merge_types(&sentinel), concrete);
    }

    let nested = Type::array_of(Type::EmptyArray);
    let resolved = Type::array_of(Type::array_of(Type::Piece));
    assert_eq!(nested.merge_types(&resolved), resolved);
    assert_eq!(resolved.merge_types(&nested), resolved);
}

#[test]
fn test_arithmetic_with_coordinates() {
    assert_eq!(Type::Num.check_type_arithmetic(&Type::Num), Ok(Type::Num));
    assert_eq!(Type::Cell.check_type_arithmetic(&Type::Num), Ok(Type::Cell));
    assert_eq!(Type::Num.check_type_arithmetic(&Type::Row), Ok(Type::Row));
    assert_eq!(Type::File.check_type_arithmetic(&Type::File), Ok(Type::File));
    assert!(Type::Row.check_type_arithmetic(&Type::File).is_err());
    assert!(Type::Bool.check_type_arithmetic(&Type::Num).is_err());
    assert_eq!(Type::Generic.check_type_arithmetic(&Type::Rank), Ok(Type::Rank));
}

#[test]
fn test_order_and_equality() {
    assert_eq!(Type::Cell.check_type_order(&Type::Num), Ok(Type::Bool));
    assert!(Type::Cell.check_type_order(&Type::Row).is_err());

    assert_eq!(Type::Row.check_type_equality(&Type::Rank), Ok(Type::Bool));
    assert_eq!(
        Type::array_of(Type::Num).check_type_equality(&Type::EmptyArray),
        Ok(Type::Bool)
    );
    assert!(Type::Void.check_type_equality(&Type::Void).is_err());
    assert!(Type::Num.check_type_equality(&Type::String).is_err());
}

#[test]
fn test_in_and_concat() {
    assert_eq!(
        Type::Piece.check_type_in(&Type::array_of(Type::Piece)),
        Ok(Type::Bool)
    );
    assert!(Type::Piece.check_type_in(&Type::array_of(Type::Cell)).is_err());
    assert!(Type::Piece.check_type_in(&Type::Piece).is_err());
    assert_eq!(Type::Num.check_type_in(&Type::EmptyArray), Ok(Type::Bool));

    assert_eq!(
        Type::EmptyArray.check_type_concat(&Type::array_of(Type::Cell)),
        Ok(Type::array_of(Type::Cell))
    );
    assert_eq!(Type::String.check_type_concat(&Type::Num), Ok(Type::String));
    assert_eq!(Type::Generic.check_type_concat(&Type::Num), Ok(Type::Generic));
    assert!(Type::array_of(Type::Num)
        .check_type_concat(&Type::array_of(Type::Bool))
        .is_err());
}

#[test]
fn test_unary_checks() {
    assert_eq!(Type::Bool.check_type_unary_bool(), Ok(Type::Bool));
    assert!(Type::Num.check_type_unary_bool().is_err());
    assert_eq!(Type::Num.check_type_unary_arithmetic(), Ok(Type::Num));
    assert!(Type::Cell.check_type_unary_arithmetic().is_err());
}

#[test]
fn test_element_type() {
    assert_eq!(Type::array_of(Type::Cell).element_type(), Ok(Type::Cell));
    assert_eq!(Type::EmptyArray.element_type(), Ok(Type::Generic));
    assert!(Type::Num.element_type().is_err());
}

#[test]
fn test_parse_resource_types() {
    assert_eq!(Type::parse_resource("num"), Some(Type::Num));
    assert_eq!(Type::parse_resource("[piece]"), Some(Type::array_of(Type::Piece)));
    assert_eq!(
        Type::parse_resource("[[cell]]"),
        Some(Type::array_of(Type::array_of(Type::Cell)))
    );
    assert_eq!(Type::parse_resource("genericArray"), Some(Type::GenericArray));
    assert_eq!(Type::parse_resource("[num"), None);
    assert_eq!(Type::parse_resource("queen"), None);
}

#[test]
fn test_display() {
    assert_eq!(Type::Num.to_string(), "NUM");
    assert_eq!(Type::array_of(Type::array_of(Type::Row)).to_string(), "[[ROW]]");
}
