//! Tests for the error constants and category ranges

use wjit_error::{codes, Error, ErrorCategory};

#[test]
fn test_exhaustion_errors_are_distinct() {
    let oom = Error::out_of_memory("x");
    let overflow = Error::stack_overflow("x");
    assert_eq!(oom.category, ErrorCategory::Resource);
    assert_eq!(overflow.category, ErrorCategory::Runtime);
    assert_ne!(oom.code, overflow.code);
}

#[test]
fn test_codes_fall_in_category_ranges() {
    let cases = [
        (Error::stack_underflow("u"), 1000..2000),
        (Error::invalid_function_index("f"), 2000..3000),
        (Error::out_of_memory("m"), 3000..4000),
        (Error::memory_out_of_bounds("g"), 4000..5000),
        (Error::empty_code_segment("e"), 5000..6000),
        (Error::config_error("c"), 8000..9000),
    ];

    for (error, range) in cases {
        assert!(range.contains(&error.code), "{error} outside {range:?}");
    }
}

#[test]
fn test_error_is_std_error() {
    fn takes_std_error(_: &dyn std::error::Error) {}

    let error = Error::new(ErrorCategory::Memory, codes::MEMORY_OUT_OF_BOUNDS, "oob");
    takes_std_error(&error);
    assert_eq!(error.message, "oob");
}

#[test]
fn test_all_error_codes_are_unique() {
    use std::collections::HashSet;

    let all = [
        codes::STACK_UNDERFLOW,
        codes::STACK_OVERFLOW,
        codes::INVALID_FUNCTION_INDEX,
        codes::HOST_FUNCTION_ERROR,
        codes::OUT_OF_MEMORY,
        codes::MEMORY_OUT_OF_BOUNDS,
        codes::INVALID_ARGUMENT,
        codes::EMPTY_CODE_SEGMENT,
        codes::CONFIG_ERROR,
    ];

    let mut seen_codes = HashSet::new();
    for code in all {
        assert!(seen_codes.insert(code), "Duplicate error code: {}", code);
    }
}
