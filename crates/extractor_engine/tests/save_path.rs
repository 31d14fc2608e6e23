use std::path::PathBuf;

use extractor_engine::{MirrorTreeDeriver, SavePathDeriver};
use pretty_assertions::{assert_eq, assert_ne};

#[test]
fn bare_file_goes_directly_under_output_root() {
    let deriver = MirrorTreeDeriver::new(None, PathBuf::from("/out"));
    assert_eq!(deriver.derive("report.pdf"), PathBuf::from("/out/report.txt"));
}

#[test]
fn tree_below_input_root_is_mirrored() {
    let deriver = MirrorTreeDeriver::new(Some(PathBuf::from("/data")), PathBuf::from("/text"));
    assert_eq!(
        deriver.derive("/data/EPA/EPA-2020-01/attachment_1.pdf"),
        PathBuf::from("/text/EPA/EPA-2020-01/attachment_1.txt")
    );
}

#[test]
fn attachment_outside_input_root_keeps_its_whole_path() {
    let deriver = MirrorTreeDeriver::new(Some(PathBuf::from("/data")), PathBuf::from("/text"));
    assert_eq!(
        deriver.derive("/elsewhere/x/memo.pdf"),
        PathBuf::from("/text/elsewhere/x/memo.txt")
    );
}

#[test]
fn same_file_name_in_different_dockets_gets_distinct_outputs() {
    let deriver = MirrorTreeDeriver::new(None, PathBuf::from("./text"));
    let epa = deriver.derive("/data/EPA/EPA-2020-01/attachment_1.pdf");
    let fda = deriver.derive("/data/FDA/FDA-2021-07/attachment_1.pdf");

    assert_ne!(epa, fda);
    assert_eq!(epa, PathBuf::from("./text/data/EPA/EPA-2020-01/attachment_1.txt"));
    assert_eq!(fda, PathBuf::from("./text/data/FDA/FDA-2021-07/attachment_1.txt"));
}

#[test]
fn path_without_file_name_falls_back_to_untitled() {
    let deriver = MirrorTreeDeriver::new(None, PathBuf::from("/out"));
    assert_eq!(deriver.derive("/"), PathBuf::from("/out/untitled.txt"));
}

#[test]
fn parent_components_cannot_escape_output_root() {
    let deriver = MirrorTreeDeriver::new(Some(PathBuf::from("/data")), PathBuf::from("/text"));
    let derived = deriver.derive("/data/../../etc/passwd.pdf");
    assert!(derived.starts_with("/text"));
    assert_eq!(derived, PathBuf::from("/text/etc/passwd.txt"));
}

#[test]
fn derivation_is_deterministic() {
    let deriver = MirrorTreeDeriver::new(None, PathBuf::from("out"));
    assert_eq!(deriver.derive("a/b/c.somepdf"), deriver.derive("a/b/c.somepdf"));
    assert_eq!(deriver.derive("a/b/c.somepdf"), PathBuf::from("out/a/b/c.txt"));
}
