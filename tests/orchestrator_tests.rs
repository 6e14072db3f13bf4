//! Integration coverage for multi-trace orchestration, including the
//! file-based input path the CLI uses.

use std::fs;

use perfgate::{parse_document, run_all, GateConfig, Status};

fn write_doc(dir: &std::path::Path, name: &str, traces: &[(&str, &[f64])]) -> std::path::PathBuf {
    let entries: Vec<String> = traces
        .iter()
        .map(|(n, values)| {
            format!(
                r#"{{"name":"{n}","values":{}}}"#,
                serde_json::to_string(values).unwrap()
            )
        })
        .collect();
    let body = format!(r#"{{"traces":[{}]}}"#, entries.join(","));
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn reads_and_gates_traces_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = write_doc(
        dir.path(),
        "baseline.json",
        &[("checkout_latency", &[100.0; 12])],
    );
    let target_path = write_doc(
        dir.path(),
        "target.json",
        &[("checkout_latency", &[101.0; 12])],
    );

    let baseline_raw = fs::read_to_string(baseline_path).unwrap();
    let target_raw = fs::read_to_string(target_path).unwrap();

    let baseline = parse_document(&baseline_raw).unwrap();
    let target = parse_document(&target_raw).unwrap();
    let outcome = run_all(&baseline, &target, &GateConfig::default());

    assert_eq!(outcome.verdicts.len(), 1);
    assert_eq!(outcome.verdicts[0].name, "checkout_latency");
}

#[test]
fn missing_trace_on_one_side_never_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = write_doc(
        dir.path(),
        "baseline.json",
        &[("a", &[100.0; 12]), ("only_baseline", &[1.0; 12])],
    );
    let target_path = write_doc(dir.path(), "target.json", &[("a", &[100.0; 12])]);

    let baseline = parse_document(&fs::read_to_string(baseline_path).unwrap()).unwrap();
    let target = parse_document(&fs::read_to_string(target_path).unwrap()).unwrap();
    let outcome = run_all(&baseline, &target, &GateConfig::default());

    assert_eq!(outcome.missing, vec!["only_baseline".to_string()]);
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn malformed_document_is_rejected_before_gating() {
    let raw = "{not valid json";
    assert!(parse_document(raw).is_err());
}

#[test]
fn many_traces_are_gated_independently_and_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let baseline_path = write_doc(
        dir.path(),
        "baseline.json",
        &[
            ("zebra", &[100.0; 12]),
            ("alpha", &[100.0; 12]),
            ("middle", &[100.0; 12]),
        ],
    );
    let target_path = write_doc(
        dir.path(),
        "target.json",
        &[
            ("zebra", &[101.0; 12]),
            ("alpha", &[101.0; 12]),
            ("middle", &[101.0; 12]),
        ],
    );

    let baseline = parse_document(&fs::read_to_string(baseline_path).unwrap()).unwrap();
    let target = parse_document(&fs::read_to_string(target_path).unwrap()).unwrap();
    let outcome = run_all(&baseline, &target, &GateConfig::default());

    let names: Vec<&str> = outcome.verdicts.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "middle", "zebra"]);
    assert!(outcome.verdicts.iter().all(|v| v.result.status != Status::Fail));
}
