use std::collections::BTreeMap;
use std::fs;

use flowpack::manifest::{
    self, EdgeManifest, FlowManifest, JobManifest, ProjectManifest,
};
use flowpack::{archive, Error, JobNode};
use serde_json::{json, Value};

const MANIFEST_YAML: &str = r#"
project: nightly
description: Nightly pipelines
properties:
  PROJECT_NAME: nightly
flows:
  - name: ingest
    properties:
      FLOW_NAME: ingest
    jobs:
      - name: pull
        command: ./pull.sh
        params:
          retries: 10
      - name: load
        command: ./load.sh
    flows:
      - name: cleanup
        jobs:
          - name: sweep
            command: ./sweep.sh
    dependencies:
      - before: pull
        after: load
      - before: load
        after: cleanup
"#;

fn props(pairs: &[(&str, Value)]) -> Option<BTreeMap<String, Value>> {
    Some(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

#[test]
fn test_load_manifest_from_yaml() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nightly.yaml");
    fs::write(&path, MANIFEST_YAML).expect("write manifest");

    let loaded = manifest::load_project_manifest(&path).expect("load manifest");

    let expected = ProjectManifest {
        project: "nightly".to_string(),
        description: "Nightly pipelines".to_string(),
        properties: props(&[("PROJECT_NAME", json!("nightly"))]),
        flows: vec![FlowManifest {
            name: "ingest".to_string(),
            params: BTreeMap::new(),
            properties: props(&[("FLOW_NAME", json!("ingest"))]),
            jobs: vec![
                JobManifest {
                    name: "pull".to_string(),
                    command: "./pull.sh".to_string(),
                    params: [("retries".to_string(), json!(10))].into_iter().collect(),
                },
                JobManifest {
                    name: "load".to_string(),
                    command: "./load.sh".to_string(),
                    params: BTreeMap::new(),
                },
            ],
            flows: vec![FlowManifest {
                name: "cleanup".to_string(),
                params: BTreeMap::new(),
                properties: None,
                jobs: vec![JobManifest {
                    name: "sweep".to_string(),
                    command: "./sweep.sh".to_string(),
                    params: BTreeMap::new(),
                }],
                flows: vec![],
                dependencies: vec![],
            }],
            dependencies: vec![
                EdgeManifest { before: "pull".to_string(), after: "load".to_string() },
                EdgeManifest { before: "load".to_string(), after: "cleanup".to_string() },
            ],
        }],
    };

    assert_eq!(loaded, expected);
}

#[test]
fn test_assemble_builds_a_validated_graph() {
    let loaded: ProjectManifest = serde_yaml::from_str(MANIFEST_YAML).expect("parse manifest");
    let project = manifest::assemble(&loaded).expect("assemble");

    assert_eq!(project.name(), "nightly");
    assert_eq!(project.flow_count(), 1);

    let flow = project.get_flow("ingest").expect("ingest flow");
    // pull, load, the cleanup sub-flow and the finish job.
    assert_eq!(flow.job_count(), 4);

    let before_finish = flow.jobs_before_finish();
    assert_eq!(before_finish.len(), 1);
    assert_eq!(before_finish[0].name(), "cleanup");
    assert!(matches!(before_finish[0], JobNode::Flow(_)));

    let load = flow.job_text("load").expect("render load");
    assert!(load.contains("dependencies=pull"), "load.job was: {load}");

    let pull = flow.job_text("pull").expect("render pull");
    assert!(pull.contains("retries=10"), "pull.job was: {pull}");
}

#[test]
fn test_assembled_manifest_packs_end_to_end() {
    let loaded: ProjectManifest = serde_yaml::from_str(MANIFEST_YAML).expect("parse manifest");
    let project = manifest::assemble(&loaded).expect("assemble");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = archive::build(&project, dir.path(), false).expect("build archive");

    let file = std::fs::File::open(&path).expect("open archive");
    let archive = zip::ZipArchive::new(file).expect("read archive");
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "nightly/ingest/cleanup/cleanup.job",
            "nightly/ingest/cleanup/sweep.job",
            "nightly/ingest/flow_cleanup.job",
            "nightly/ingest/ingest.job",
            "nightly/ingest/ingest.properties",
            "nightly/ingest/load.job",
            "nightly/ingest/pull.job",
            "nightly/nightly.properties",
        ]
    );
}

#[test]
fn test_duplicate_job_in_manifest_surfaces_as_graph_error() {
    let yaml = r#"
project: p
flows:
  - name: f
    jobs:
      - { name: a, command: echo one }
      - { name: a, command: echo two }
"#;
    let loaded: ProjectManifest = serde_yaml::from_str(yaml).expect("parse manifest");
    let err = manifest::assemble(&loaded).expect_err("duplicate job name");
    assert!(matches!(err, Error::DuplicateJob { ref job, .. } if job == "a"));
}

#[test]
fn test_unknown_edge_endpoint_surfaces_as_graph_error() {
    let yaml = r#"
project: p
flows:
  - name: f
    jobs:
      - { name: a, command: echo a }
    dependencies:
      - { before: a, after: ghost }
"#;
    let loaded: ProjectManifest = serde_yaml::from_str(yaml).expect("parse manifest");
    let err = manifest::assemble(&loaded).expect_err("unknown dependency target");
    assert!(matches!(err, Error::JobNotFound { ref job, .. } if job == "ghost"));
}

#[test]
fn test_nested_property_values_are_rejected() {
    let yaml = r#"
project: p
properties:
  RETRY:
    max: 3
flows: []
"#;
    let loaded: ProjectManifest = serde_yaml::from_str(yaml).expect("parse manifest");
    let err = manifest::assemble(&loaded).expect_err("nested property value");
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_malformed_yaml_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "project: [unclosed").expect("write manifest");

    let err = manifest::load_project_manifest(&path).expect_err("malformed YAML");
    assert!(matches!(err, Error::Yaml(_)));
}
