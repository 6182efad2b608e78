use chrono::{Duration, Local};
use flowpack::web::AjaxClient;
use flowpack::{archive, Command, Flow, Project};

// End-to-end deploy against a running scheduler web server. Point
// FLOWPACK_HOST / FLOWPACK_USER / FLOWPACK_PASSWORD at a test instance and
// run with `cargo test -- --ignored`.
#[tokio::test]
#[ignore]
async fn test_deploy_and_schedule_round_trip() {
    let host = std::env::var("FLOWPACK_HOST").unwrap_or_else(|_| "http://localhost:8081".to_string());
    let user = std::env::var("FLOWPACK_USER").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("FLOWPACK_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let mut flow = Flow::new("smoke");
    flow.register(Command::new("hello", "echo hello")).expect("register hello");

    let mut project = Project::new("flowpack_smoke", "disposable smoke-test project");
    project.add_flow(flow).expect("add flow");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = archive::build(&project, dir.path(), true).expect("build archive");

    let client = AjaxClient::login(&host, &user, &password).await.expect("login");
    client
        .create_project(project.name(), project.description(), true)
        .await
        .expect("create project");
    let uploaded = client.upload_project(project.name(), &path).await.expect("upload");
    assert!(uploaded.get("version").is_some(), "upload response: {uploaded}");

    let flows = client.fetch_project_flows(project.name()).await.expect("fetch flows");
    let ids: Vec<&str> = flows["flows"]
        .as_array()
        .map(|list| list.iter().filter_map(|f| f["flowId"].as_str()).collect())
        .unwrap_or_default();
    assert!(ids.contains(&"smoke"), "project flows: {flows}");

    let start = (Local::now() + Duration::hours(1)).naive_local();
    let scheduled = client
        .schedule_flow(project.name(), "smoke", start, Some("1d"))
        .await
        .expect("schedule flow");
    assert_eq!(scheduled.get("status").and_then(|v| v.as_str()), Some("success"));
}
