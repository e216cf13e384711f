use httpmock::prelude::*;
use icpscan::core::export;
use icpscan::{BatchRunner, Category, QueryEngine, Retryer, TokenManager};
use std::time::Duration;
use tempfile::TempDir;

fn runner_for(server: &MockServer) -> BatchRunner<Retryer<QueryEngine<TokenManager>>> {
    let client = reqwest::Client::new();
    let token_manager = TokenManager::with_endpoint(client.clone(), server.url("/api/auth"));
    let engine = QueryEngine::with_endpoint(token_manager, client, server.url("/api/query"));
    let retryer = Retryer::with_policy(engine, 2, Duration::ZERO);
    BatchRunner::with_pause(retryer, Duration::ZERO)
}

fn auth_mock(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/api/auth");
        then.status(200).json_body(serde_json::json!({
            "code": 200,
            "msg": "操作成功",
            "params": {"bussiness": "tok", "sign": "sig", "expire": 300_000}
        }));
    })
}

fn query_mock(server: &MockServer, unit_name: &str, service_type: &str, list: serde_json::Value) {
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/query")
            .header("Token", "tok")
            .header("Sign", "sig")
            .json_body_partial(format!(
                r#"{{"unitName": "{}", "serviceType": "{}"}}"#,
                unit_name, service_type
            ));
        then.status(200).json_body(serde_json::json!({
            "code": 200,
            "msg": "ok",
            "params": {"list": list}
        }));
    });
}

#[tokio::test]
async fn test_end_to_end_batch_to_csv() {
    let server = MockServer::start();
    let auth = auth_mock(&server);

    query_mock(
        &server,
        "腾讯",
        "1",
        serde_json::json!([
            {"domain": "qq.com", "serviceName": "QQ", "unitName": "腾讯"},
            {"domain": "weixin.qq.com", "serviceName": "微信", "unitName": "腾讯"}
        ]),
    );
    query_mock(
        &server,
        "腾讯",
        "6",
        serde_json::json!([{"domain": "", "serviceName": "微信", "unitName": "腾讯"}]),
    );
    query_mock(&server, "空壳公司", "1", serde_json::json!([]));
    query_mock(&server, "空壳公司", "6", serde_json::json!([]));
    // This target always gets a non-token rejection and exhausts retries.
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/query")
            .json_body_partial(r#"{"unitName": "故障公司"}"#);
        then.status(200)
            .json_body(serde_json::json!({"code": 500, "msg": "系统繁忙"}));
    });

    let targets = vec![
        "腾讯".to_string(),
        "空壳公司".to_string(),
        "故障公司".to_string(),
    ];
    let categories = [Category::Website, Category::App];

    let mut runner = runner_for(&server);
    let report = runner.run(&targets, &categories).await;

    // One credential fetch serves the whole batch.
    auth.assert_hits(1);

    assert_eq!(report.table.len(), 3);
    assert_eq!(
        report.table["腾讯"].get(Category::Website),
        Some(&["qq.com".to_string(), "weixin.qq.com".to_string()][..])
    );
    assert_eq!(
        report.table["腾讯"].get(Category::App),
        Some(&["微信".to_string()][..])
    );
    assert!(report.table["空壳公司"].all_empty());
    assert!(report.failures.contains("故障公司"));
    assert!(!report.failures.contains("空壳公司"));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.csv");
    export::write_csv(&report, path.to_str().unwrap()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content
        .starts_with("OrgName,Website,App,MiniProgram,UnregisteredOrgName,FailedOrgName"));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    for record in reader.records() {
        let record = record.unwrap();
        match &record[0] {
            "腾讯" => {
                assert_eq!(&record[1], "qq.com,weixin.qq.com");
                assert_eq!(&record[2], "微信");
                assert_eq!(&record[4], "");
                assert_eq!(&record[5], "");
            }
            "空壳公司" => {
                assert_eq!(&record[1], "");
                assert_eq!(&record[4], "空壳公司");
                assert_eq!(&record[5], "");
            }
            "故障公司" => {
                assert_eq!(&record[4], "");
                assert_eq!(&record[5], "故障公司");
            }
            other => panic!("unexpected row: {}", other),
        }
    }
}

#[tokio::test]
async fn test_blocked_auth_fails_every_target_but_batch_completes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth");
        then.status(200).body("<html>Access Denied</html>");
    });

    let targets = vec!["X".to_string(), "Y".to_string()];
    let mut runner = runner_for(&server);
    let report = runner.run(&targets, &[Category::Website]).await;

    // Credential failures propagate per pair; the run still finishes with
    // a table entry for every target.
    assert_eq!(report.table.len(), 2);
    assert_eq!(report.failures.len(), 2);
    assert!(report.table.values().all(|o| o.all_empty()));
}

#[tokio::test]
async fn test_stale_token_recovery_spans_full_stack() {
    use icpscan::domain::ports::CredentialProvider;

    let server = MockServer::start();
    let client = reqwest::Client::new();

    // Seed the credential cache with a token the query API will reject.
    let mut first_auth = server.mock(|when, then| {
        when.method(POST).path("/api/auth");
        then.status(200).json_body(serde_json::json!({
            "code": 200,
            "msg": "操作成功",
            "params": {"bussiness": "expired", "sign": "sig", "expire": 300_000}
        }));
    });
    let mut token_manager = TokenManager::with_endpoint(client.clone(), server.url("/api/auth"));
    token_manager.ensure().await.unwrap();
    first_auth.delete();

    // Refreshes from here on yield a token the query API accepts.
    server.mock(|when, then| {
        when.method(POST).path("/api/auth");
        then.status(200).json_body(serde_json::json!({
            "code": 200,
            "msg": "操作成功",
            "params": {"bussiness": "valid", "sign": "sig", "expire": 300_000}
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/query").header("Token", "expired");
        then.status(200)
            .json_body(serde_json::json!({"code": 401, "msg": "token失效"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/query").header("Token", "valid");
        then.status(200).json_body(serde_json::json!({
            "code": 200,
            "msg": "ok",
            "params": {"list": [{"domain": "x.com", "serviceName": "X"}]}
        }));
    });

    let engine = QueryEngine::with_endpoint(token_manager, client, server.url("/api/query"));
    let retryer = Retryer::with_policy(engine, 2, Duration::ZERO);
    let mut runner = BatchRunner::with_pause(retryer, Duration::ZERO);

    let targets = vec!["X".to_string()];
    let report = runner.run(&targets, &[Category::Website]).await;

    assert!(report.failures.is_empty());
    assert_eq!(
        report.table["X"].get(Category::Website),
        Some(&["x.com".to_string()][..])
    );
}
