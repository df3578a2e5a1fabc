use rstest::rstest;
use spool_config::{MaterialKind, load_material_csv};
use std::fs;
use tempfile::tempdir;

fn write_csv(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("materials.csv");
    fs::write(&path, body).unwrap();
    (dir, path)
}

#[rstest]
fn loads_three_column_table() {
    let (_dir, path) = write_csv(
        "material,diameter_mm,grams_per_cm\npla,1.75,0.03\nabs,3.00,0.076\n",
    );
    let rows = load_material_csv(&path).expect("load");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].material, MaterialKind::Pla);
    assert_eq!(rows[1].grams_per_cm, 0.076);
    assert_eq!(rows[1].cm_per_gram, None);
}

#[rstest]
fn loads_optional_length_column() {
    let (_dir, path) = write_csv(
        "material,diameter_mm,grams_per_cm,cm_per_gram\nPLA, 1.75, 0.03, 33.0\n",
    );
    let rows = load_material_csv(&path).expect("load");
    assert_eq!(rows[0].cm_per_gram, Some(33.0));
}

#[rstest]
#[case("material,diameter,grams_per_cm\npla,1.75,0.03\n", "must have headers")]
#[case("grams_per_cm,material,diameter_mm\n0.03,pla,1.75\n", "must have headers")]
#[case("material,diameter_mm,grams_per_cm\npla,1.75,-0.03\n", "invalid CSV row 2")]
#[case("material,diameter_mm,grams_per_cm\nnylon,1.75,0.03\n", "invalid CSV row 2")]
#[case("material,diameter_mm,grams_per_cm\n", "has no rows")]
fn rejects_bad_tables(#[case] body: &str, #[case] needle: &str) {
    let (_dir, path) = write_csv(body);
    let err = load_material_csv(&path).expect_err("should fail");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}
