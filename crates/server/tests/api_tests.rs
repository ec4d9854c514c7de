use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use server::config::Settings;
use server::{create_router, state::AppState};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_with(settings: impl FnOnce(&mut Settings)) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = db::create_pool(&db_url).await.expect("Failed to create pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    let mut config = Settings {
        database_url: db_url,
        fake_runs: true,
        export_dir: temp_dir.path().join("exports"),
        ..Default::default()
    };
    settings(&mut config);

    let app = create_router(AppState::new(pool, config));
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, temp_dir)
}

async fn setup_test_server() -> (TestServer, TempDir) {
    setup_with(|_| {}).await
}

async fn create_campaign(server: &TestServer, title: &str) -> String {
    let response = server
        .post("/api/campaigns")
        .json(&json!({
            "title": title,
            "client": "Grant Burge",
            "market": "Australia",
            "category": "Wine"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

async fn post_brief(server: &TestServer, id: &str, parsed: Value) -> Value {
    let response = server
        .post(&format!("/api/campaigns/{}/brief", id))
        .json(&json!({
            "rawText": "Drive rosé sales over summer.",
            "parsedJson": parsed
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

fn assert_error(body: &Value, code: &str) {
    assert_eq!(body["error"]["code"], code, "unexpected body: {}", body);
    assert!(body["error"]["message"].is_string());
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["fake_runs"], true);
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server.get("/api/openapi.json").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["paths"]["/api/campaigns/{id}/create/run"].is_object());
    }
}

mod campaigns_crud {
    use super::*;

    #[tokio::test]
    async fn test_create_campaign_returns_201_created() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .post("/api/campaigns")
            .json(&json!({"title": "Summer Sizzle", "client": "Grant Burge"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["title"], "Summer Sizzle");
        assert_eq!(body["status"], "DRAFT");
        assert_eq!(body["mode"], "CREATE");
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn test_list_get_update_delete() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "First").await;
        create_campaign(&server, "Second").await;

        let list: Value = server.get("/api/campaigns").await.json();
        assert_eq!(list.as_array().unwrap().len(), 2);

        let fetched: Value = server.get(&format!("/api/campaigns/{}", id)).await.json();
        assert_eq!(fetched["title"], "First");

        let response = server
            .patch(&format!("/api/campaigns/{}", id))
            .json(&json!({"title": "Renamed", "status": "REVIEW"}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["title"], "Renamed");
        assert_eq!(updated["status"], "REVIEW");
        assert_eq!(updated["client"], "Grant Burge");

        server
            .delete(&format!("/api/campaigns/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/campaigns/{}", id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_empty_title_is_validation_error() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .post("/api/campaigns")
            .json(&json!({"title": "   "}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_error(&body, "validation_error");
        assert_eq!(body["error"]["details"][0]["field"], "title");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .post("/api/campaigns")
            .text("{\"title\": ")
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_error(&body, "validation_error");
        assert_eq!(body["error"]["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_unknown_campaign_is_404_envelope() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .get("/api/campaigns/00000000-0000-0000-0000-000000000000")
            .await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_error(&body, "not_found");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_bad_uuid_is_validation_error() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server.get("/api/campaigns/not-a-uuid").await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"]["details"][0]["field"], "path");
    }
}

mod briefs {
    use super::*;

    #[tokio::test]
    async fn test_brief_without_idea_is_create_mode() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;

        let body = post_brief(&server, &id, json!({"brand": "Grant Burge"})).await;

        assert_eq!(body["classification"]["mode"], "CREATE");
        assert_eq!(
            body["classification"]["missing"],
            json!(["hook", "mechanic", "prize"])
        );
        let campaign: Value = server.get(&format!("/api/campaigns/{}", id)).await.json();
        assert_eq!(campaign["mode"], "CREATE");
        assert_eq!(campaign["status"], "BRIEFED");
    }

    #[tokio::test]
    async fn test_brief_with_full_idea_is_evaluate_mode() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;

        let body = post_brief(
            &server,
            &id,
            json!({
                "hook": "Taste the summer",
                "mechanic": "Buy a bottle and enter online",
                "prize": "Trip to the Barossa"
            }),
        )
        .await;

        assert_eq!(body["classification"]["mode"], "EVALUATE");
        let campaign: Value = server.get(&format!("/api/campaigns/{}", id)).await.json();
        assert_eq!(campaign["mode"], "EVALUATION");

        let brief: Value = server.get(&format!("/api/campaigns/{}/brief", id)).await.json();
        assert_eq!(brief["raw_text"], "Drive rosé sales over summer.");
    }

    #[tokio::test]
    async fn test_brief_for_missing_campaign_is_404() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .post("/api/campaigns/00000000-0000-0000-0000-000000000000/brief")
            .json(&json!({"rawText": "x"}))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_variants_keep_and_clear_spark() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        server
            .post(&format!("/api/campaigns/{}/brief", id))
            .json(&json!({"rawText": "x", "assets": {"__spark": {"seed": 1}, "logo": "a.png"}}))
            .await
            .assert_status_ok();

        let response = server
            .put(&format!("/api/campaigns/{}/brief/variants", id))
            .json(&json!({"variants": [{"name": "Cellar Door"}]}))
            .await;
        response.assert_status_ok();
        let brief: Value = response.json();
        assert_eq!(brief["assets"]["variants"][0]["name"], "Cellar Door");
        assert_eq!(brief["assets"]["__spark"], json!({"seed": 1}));
        assert_eq!(brief["assets"]["logo"], "a.png");

        let response = server
            .put(&format!("/api/campaigns/{}/brief/variants", id))
            .json(&json!({"variants": [], "__spark": null}))
            .await;
        let brief: Value = response.json();
        assert!(brief["assets"].get("__spark").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_variant_names_rejected() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({})).await;

        let response = server
            .put(&format!("/api/campaigns/{}/brief/variants", id))
            .json(&json!({"variants": [{"name": "A"}, {"name": "a"}]}))
            .await;

        response.assert_status_bad_request();
        assert_error(&response.json(), "validation_error");
    }

    #[tokio::test]
    async fn test_exceptions_round_trip_and_rules() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({"totalWinners": 500})).await;

        let response = server
            .put(&format!("/api/campaigns/{}/exceptions", id))
            .json(&json!({"exceptions": ["No alcohol imagery", "  "]}))
            .await;
        response.assert_status_ok();

        let body: Value = server
            .get(&format!("/api/campaigns/{}/exceptions", id))
            .await
            .json();
        assert_eq!(body["exceptions"], json!(["No alcohol imagery"]));

        let rules: Value = server.get(&format!("/api/campaigns/{}/rules", id)).await.json();
        assert_eq!(rules["rules"]["market"], "AU");
        assert_eq!(rules["rules"]["heuristics"]["breadthStrong"], true);
        assert_eq!(rules["classification"]["mode"], "CREATE");
    }
}

mod phases {
    use super::*;

    #[tokio::test]
    async fn test_fake_framing_run_records_output() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({})).await;

        let response = server
            .post(&format!("/api/campaigns/{}/framing/run", id))
            .await;

        response.assert_status_ok();
        let outcome: Value = response.json();
        assert_eq!(outcome["run"]["status"], "COMPLETE");
        assert_eq!(outcome["outputs"][0]["type"], "framingNarrative");

        let latest = server
            .get(&format!("/api/campaigns/{}/outputs/latest/framingNarrative", id))
            .await;
        latest.assert_status_ok();

        let runs: Value = server
            .get(&format!("/api/campaigns/{}/phase-runs", id))
            .await
            .json();
        assert_eq!(runs[0]["label"], "framing");

        let messages: Value = server
            .get(&format!("/api/campaigns/{}/agent-messages", id))
            .await
            .json();
        assert_eq!(messages[0]["agent"], "CLARA");

        let campaign: Value = server.get(&format!("/api/campaigns/{}", id)).await.json();
        assert_eq!(campaign["status"], "REVIEW");
    }

    #[tokio::test]
    async fn test_run_without_brief_is_404() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;

        let response = server
            .post(&format!("/api/campaigns/{}/framing/run", id))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_latest_output_missing_is_404() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;

        let response = server
            .get(&format!("/api/campaigns/{}/outputs/latest/judgeVerdict", id))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_create_then_judge() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({"totalWinners": 200})).await;

        let response = server.post(&format!("/api/campaigns/{}/judge/run", id)).await;
        response.assert_status_bad_request();

        server
            .post(&format!("/api/campaigns/{}/create/run", id))
            .await
            .assert_status_ok();

        let routes: Value = server
            .get(&format!("/api/campaigns/{}/idea-routes", id))
            .await
            .json();
        assert_eq!(routes[0]["route"]["name"], "Fake Route");
        assert!(routes[0]["score"]["total"].is_number());

        let response = server.post(&format!("/api/campaigns/{}/judge/run", id)).await;
        response.assert_status_ok();

        let outputs: Value = server
            .get(&format!("/api/campaigns/{}/outputs", id))
            .add_query_param("type", "judgeVerdict")
            .await
            .json();
        assert_eq!(outputs.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_opinion_validates_agent() {
        let (server, _temp_dir) = setup_test_server().await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({})).await;

        let response = server
            .post(&format!("/api/campaigns/{}/opinion/run", id))
            .json(&json!({"agent": "nobody"}))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"]["details"][0]["field"], "agent");

        let response = server
            .post(&format!("/api/campaigns/{}/opinion/run", id))
            .json(&json!({"agent": "bruce", "question": "Too slow?"}))
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_provider_run_through_gateway() {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "## Frame\nShoppers want a reason."}}]
            })))
            .mount(&provider)
            .await;

        let uri = provider.uri();
        let (server, _temp_dir) = setup_with(|s| {
            s.fake_runs = false;
            s.openai_api_key = "test-key".to_string();
            s.openai_base_url = uri;
        })
        .await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({})).await;

        let response = server
            .post(&format!("/api/campaigns/{}/framing/run", id))
            .await;

        response.assert_status_ok();
        let outcome: Value = response.json();
        assert_eq!(outcome["outputs"][0]["content"], "## Frame\nShoppers want a reason.");
        assert!(outcome["outputs"][0]["params"]["html"]
            .as_str()
            .unwrap()
            .contains("<h2>Frame</h2>"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_502_and_marks_failed() {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "upstream exploded"}
            })))
            .mount(&provider)
            .await;

        let uri = provider.uri();
        let (server, _temp_dir) = setup_with(|s| {
            s.fake_runs = false;
            s.openai_api_key = "test-key".to_string();
            s.openai_base_url = uri;
        })
        .await;
        let id = create_campaign(&server, "Summer Sizzle").await;
        post_brief(&server, &id, json!({})).await;

        let response = server
            .post(&format!("/api/campaigns/{}/framing/run", id))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        assert_error(&response.json(), "llm_error");

        let campaign: Value = server.get(&format!("/api/campaigns/{}", id)).await.json();
        assert_eq!(campaign["status"], "FAILED");
        let runs: Value = server
            .get(&format!("/api/campaigns/{}/phase-runs", id))
            .await
            .json();
        assert_eq!(runs[0]["status"], "FAILED");
    }
}

mod reference {
    use super::*;

    #[tokio::test]
    async fn test_founder_notes_filter() {
        let (server, _temp_dir) = setup_test_server().await;

        server
            .post("/api/founder-notes")
            .json(&json!({"market": "Australia", "title": "AU", "body": "Permits first."}))
            .await
            .assert_status_ok();
        server
            .post("/api/founder-notes")
            .json(&json!({"market": "NZ", "title": "NZ", "body": "Smaller pools."}))
            .await
            .assert_status_ok();

        let notes: Value = server
            .get("/api/founder-notes")
            .add_query_param("market", "AU")
            .await
            .json();
        let titles: Vec<&str> = notes
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["AU"]);
    }

    #[tokio::test]
    async fn test_benchmark_and_playbook_upsert() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .put("/api/benchmarks")
            .json(&json!({
                "market": "australia",
                "category": "Wine",
                "median_winners": 250,
                "median_prize_pool": 50000.0,
                "typical_duration_weeks": 6
            }))
            .await;
        response.assert_status_ok();
        let stored: Value = response.json();
        assert_eq!(stored["market"], "AU");

        server
            .put("/api/playbook-snippets")
            .json(&json!({"key": "permits", "title": "Permits", "body": "Check NSW.", "tags": ["AU"]}))
            .await
            .assert_status_ok();

        let benchmarks: Value = server.get("/api/benchmarks").await.json();
        assert_eq!(benchmarks.as_array().unwrap().len(), 1);
        let snippets: Value = server.get("/api/playbook-snippets").await.json();
        assert_eq!(snippets[0]["key"], "permits");
    }

    #[tokio::test]
    async fn test_benchmark_requires_market() {
        let (server, _temp_dir) = setup_test_server().await;

        let response = server
            .put("/api/benchmarks")
            .json(&json!({"market": "", "category": "Wine"}))
            .await;

        response.assert_status_bad_request();
    }
}

mod tools {
    use super::*;

    #[tokio::test]
    async fn test_text_helpers() {
        let (server, _temp_dir) = setup_test_server().await;

        let body: Value = server
            .post("/api/tools/markdown")
            .json(&json!({"text": "- a\n- b"}))
            .await
            .json();
        assert_eq!(body["html"], "<ul><li>a</li><li>b</li></ul>");

        let body: Value = server
            .post("/api/tools/market-code")
            .json(&json!({"text": "Australia"}))
            .await
            .json();
        assert_eq!(body["code"], "AU");

        let body: Value = server
            .post("/api/tools/polish")
            .json(&json!({"text": "Grant Brueg"}))
            .await
            .json();
        assert!(body["text"].as_str().unwrap().contains("Grant Burge"));
    }
}
