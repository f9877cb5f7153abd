//! Input validation tests
//!
//! Structural and line-specific checks of a raw grid against the variable
//! schema: one error per call, first violation wins.

use batchrun::schema::{VarType, Variable, VariableSchema};
use batchrun::table::RawGrid;
use batchrun::validate::{check_batch_inputs, ValidateError};
use pretty_assertions::assert_eq;

fn schema_ab() -> VariableSchema {
    VariableSchema::new(vec![
        Variable::new("a", "A", true, VarType::Text),
        Variable::new("b", "B", false, VarType::Text),
    ])
    .unwrap()
}

fn schema_single() -> VariableSchema {
    VariableSchema::new(vec![Variable::new("v", "V", false, VarType::Text)]).unwrap()
}

fn grid(rows: &[&[&str]]) -> RawGrid {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

#[test]
fn test_empty_upload_rejected() {
    assert_eq!(
        check_batch_inputs(&vec![], &schema_ab()),
        Err(ValidateError::EmptyUpload)
    );
}

#[test]
fn test_header_mismatch_beats_data_errors() {
    // One wrong header entry fails regardless of data-row content.
    let g = grid(&[&["A", "Wrong"], &["x", "y"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_ab()),
        Err(ValidateError::HeaderMismatch)
    );

    // Order matters, not just membership.
    let g = grid(&[&["B", "A"], &["x", "y"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_ab()),
        Err(ValidateError::HeaderMismatch)
    );

    // A short header is a mismatch too.
    let g = grid(&[&["A"], &["x", "y"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_ab()),
        Err(ValidateError::HeaderMismatch)
    );
}

#[test]
fn test_header_only_grid_has_no_rows() {
    let g = grid(&[&["A", "B"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_ab()),
        Err(ValidateError::NoDataRows)
    );
}

#[test]
fn test_required_field_line_reporting() {
    let g = grid(&[&["A", "B"], &["x", "y"], &["", "z"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_ab()),
        Err(ValidateError::MissingRequired {
            line: 2,
            column: "a".into()
        })
    );
}

#[test]
fn test_required_scan_is_row_major() {
    let schema = VariableSchema::new(vec![
        Variable::new("a", "A", true, VarType::Text),
        Variable::new("b", "B", true, VarType::Text),
    ])
    .unwrap();
    // Row 1 violates column b, row 2 violates column a; the first row's
    // violation wins even though a precedes b in the schema.
    let g = grid(&[&["A", "B"], &["x", ""], &["", "y"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema),
        Err(ValidateError::MissingRequired {
            line: 1,
            column: "b".into()
        })
    );
}

#[test]
fn test_interior_blank_row_rejected() {
    let g = grid(&[&["V"], &["1"], &[""], &["2"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_single()),
        Err(ValidateError::BlankLine { line: 2 })
    );
}

#[test]
fn test_trailing_blank_rows_stripped() {
    let g = grid(&[&["V"], &["1"], &["2"], &[""]]);
    let retained = check_batch_inputs(&g, &schema_single()).expect("trailing blank tolerated");
    assert_eq!(retained, vec![vec!["1".to_string()], vec!["2".to_string()]]);

    // A whole run of trailing blanks is stripped too.
    let g = grid(&[&["V"], &["1"], &[""], &[""]]);
    let retained = check_batch_inputs(&g, &schema_single()).expect("trailing run tolerated");
    assert_eq!(retained, vec![vec!["1".to_string()]]);
}

#[test]
fn test_all_blank_rows_leave_nothing_to_run() {
    let g = grid(&[&["V"], &[""], &[""]]);
    assert_eq!(
        check_batch_inputs(&g, &schema_single()),
        Err(ValidateError::NoDataRows)
    );
}

#[test]
fn test_blank_row_check_precedes_required_check() {
    let schema = VariableSchema::new(vec![
        Variable::new("a", "A", true, VarType::Text),
        Variable::new("b", "B", false, VarType::Text),
    ])
    .unwrap();
    // Row 1 is missing its required value and row 2 is an interior blank;
    // the blank-row rule fires first.
    let g = grid(&[&["A", "B"], &["", "y"], &["", ""], &["x", "z"]]);
    assert_eq!(
        check_batch_inputs(&g, &schema),
        Err(ValidateError::BlankLine { line: 2 })
    );
}

#[test]
fn test_valid_grid_returns_retained_rows() {
    let g = grid(&[&["A", "B"], &["x", ""], &["y", "z"], &["", ""]]);
    let retained = check_batch_inputs(&g, &schema_ab()).expect("grid is valid");
    assert_eq!(retained.len(), 2);
    assert_eq!(retained[0], vec!["x".to_string(), "".to_string()]);
}
