// Integration tests for the HTTP server
//
// Each test builds the router around scripted randomness, a temporary
// progress file, an in-memory PONS cache and mockito upstreams.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use vocab_quiz::corpus::{Corpus, NounRecord, SentenceRecord, VerbRecord};
use vocab_quiz::dictionary::{GrammarSiteClient, PonsCache, PonsClient};
use vocab_quiz::generators::ExampleGenerator;
use vocab_quiz::metrics::Metrics;
use vocab_quiz::progress::ProgressStore;
use vocab_quiz::providers::{OpenAIProvider, RetryPolicy};
use vocab_quiz::quiz::ScriptedChooser;
use vocab_quiz::server::{create_router, AppState};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

struct TestApp {
    router: Router,
    upstream: ServerGuard,
    _dir: TempDir,
}

impl TestApp {
    async fn new(corpus: Corpus) -> Self {
        Self::build(corpus, Some("secret"), false).await
    }

    async fn build(corpus: Corpus, pons_key: Option<&str>, with_llm: bool) -> Self {
        let upstream = Server::new_async().await;
        let dir = TempDir::new().expect("failed to create temp dir");

        let pons = PonsClient::new(
            pons_key.map(String::from),
            upstream.url(),
            PonsCache::in_memory().expect("failed to open cache"),
        )
        .expect("failed to create PONS client");
        let grammar = GrammarSiteClient::new(&upstream.url()).expect("failed to create grammar client");

        let examples = with_llm.then(|| {
            let provider = OpenAIProvider::new("llm-key".into(), &upstream.url(), "gpt-3.5-turbo")
                .expect("failed to create provider")
                .with_retry_policy(RetryPolicy::immediate(1));
            Arc::new(ExampleGenerator::new(Arc::new(provider), "gpt-3.5-turbo", 0.7))
        });

        let state = AppState {
            corpus: Arc::new(corpus),
            chooser: Arc::new(ScriptedChooser::new([0])),
            progress: Arc::new(ProgressStore::new(dir.path().join("quiz_progress.json"))),
            pons: Arc::new(pons),
            grammar: Arc::new(grammar),
            examples,
            metrics: Arc::new(Metrics::new().expect("failed to create metrics")),
        };

        Self {
            router: create_router(state, None, 64 * 1024),
            upstream,
            _dir: dir,
        }
    }

    async fn send(&self, req: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(req).await.expect("oneshot failed")
    }

    async fn get(&self, path: &str) -> axum::response::Response {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(req).await
    }

    async fn post_json(&self, path: &str, body: &str) -> axum::response::Response {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        self.send(req).await
    }
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not valid JSON")
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

fn gehen() -> VerbRecord {
    VerbRecord::new("to go", "gehen")
        .with_perfect("gegangen")
        .with_person_forms(["gehe", "gehst", "geht", "geht", "geht", "gehen", "geht"])
}

fn haus() -> NounRecord {
    NounRecord {
        singular: "Haus".into(),
        gender: "n".into(),
        article: "das".into(),
        full_word: "das Haus".into(),
        plural: "Häuser".into(),
        meaning: "house".into(),
        example: "Das Haus ist alt.".into(),
    }
}

fn sample_corpus() -> Corpus {
    Corpus::new(
        vec![gehen()],
        vec![
            SentenceRecord::new("The weather is nice", "Das Wetter ist schön"),
            SentenceRecord::new("I go to school every day", "Ich gehe jeden Tag zur Schule"),
        ],
        vec![haus()],
    )
}

// ---------------------------------------------------------------------------
// Quiz endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_corpus_counts() {
    let app = TestApp::new(sample_corpus()).await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"status": "ok", "verbs": 1, "sentences": 2, "nouns": 1})
    );
}

#[tokio::test]
async fn test_verb_quiz_returns_blanked_sentence() {
    let app = TestApp::new(sample_corpus()).await;

    let resp = app.get("/api/verb-quiz/next").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["verb"]["infinitive"], "gehen");
    assert_eq!(json["has_perfect_form"], true);
    assert_eq!(json["sentence"]["blanked_sentence"], "ich ____ jeden tag zur schule");
    assert_eq!(json["sentence"]["correct_form"], "gehe");
    assert_eq!(json["sentence"]["sentence_index"], 1);
}

#[tokio::test]
async fn test_verb_quiz_without_matching_sentence() {
    let corpus = Corpus::new(
        vec![gehen()],
        vec![SentenceRecord::new("The weather is nice", "Das Wetter ist schön")],
        vec![],
    );
    let app = TestApp::new(corpus).await;

    let json = body_json(app.get("/api/verb-quiz/next").await).await;
    assert_eq!(json["verb"]["meaning"], "to go");
    assert!(json["sentence"].is_null());
}

#[tokio::test]
async fn test_verb_quiz_with_no_verbs() {
    let app = TestApp::new(Corpus::default()).await;

    let json = body_json(app.get("/api/verb-quiz/next").await).await;
    assert_eq!(json, json!({"error": "No verbs available"}));
}

#[tokio::test]
async fn test_nouns_and_sentences_lists() {
    let app = TestApp::new(sample_corpus()).await;

    let nouns = body_json(app.get("/api/noun-quiz/nouns").await).await;
    assert_eq!(nouns.as_array().map(Vec::len), Some(1));
    assert_eq!(nouns[0]["full_word"], "das Haus");

    let sentences = body_json(app.get("/api/quiz/sentences").await).await;
    assert_eq!(sentences.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_metrics_count_served_quizzes() {
    let app = TestApp::new(sample_corpus()).await;
    app.get("/api/verb-quiz/next").await;

    let resp = app.get("/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = body_text(resp).await;
    assert!(text.contains(r#"vocab_quiz_verb_quizzes_total{sentence="found"} 1"#));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new(sample_corpus()).await;

    let resp = app.get("/api/does-not-exist").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "Not found");
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_progress_round_trip() {
    let app = TestApp::new(sample_corpus()).await;

    assert_eq!(body_json(app.get("/api/quiz/progress").await).await, json!({}));

    let resp = app
        .post_json("/api/quiz/progress", r#"{"date": "2024-05-01", "correct": 3, "total": 5}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"success": true}));

    assert_eq!(
        body_json(app.get("/api/quiz/progress").await).await,
        json!({"2024-05-01": {"correct": 3, "total": 5}})
    );
}

#[tokio::test]
async fn test_progress_rejects_incomplete_data() {
    let app = TestApp::new(sample_corpus()).await;

    let resp = app
        .post_json("/api/quiz/progress", r#"{"date": "2024-05-01", "correct": 3}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({"error": "Invalid data"}));

    let resp = app.post_json("/api/quiz/progress", "not json").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// PONS
// ---------------------------------------------------------------------------

const PONS_BODY: &str = r#"[{"hits": [{"roms": [{"arabs": [{"translations": [
    {"source": "Haus", "target": "house"}
]}]}]}]}]"#;

fn pons_query(word: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("q".into(), word.into()),
        Matcher::UrlEncoded("l".into(), "deen".into()),
    ])
}

#[tokio::test]
async fn test_pons_lookup_is_cached_after_first_call() {
    let mut app = TestApp::new(sample_corpus()).await;
    let mock = app
        .upstream
        .mock("GET", "/v1/dictionary")
        .match_query(pons_query("Haus"))
        .match_header("x-secret", "secret")
        .with_status(200)
        .with_body(PONS_BODY)
        .expect(1)
        .create_async()
        .await;

    let first = body_json(app.get("/api/dict/pons?word=Haus").await).await;
    assert_eq!(first["is_cached"], false);
    let result: Value = serde_json::from_str(first["result"].as_str().unwrap()).unwrap();
    assert_eq!(result["translations"][0]["target"], "house");

    let second = body_json(app.get("/api/dict/pons?word=Haus").await).await;
    assert_eq!(second["is_cached"], true);
    assert_eq!(second["result"], first["result"]);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_pons_quota_exhausted_without_cache() {
    let mut app = TestApp::new(sample_corpus()).await;
    app.upstream
        .mock("GET", "/v1/dictionary")
        .match_query(pons_query("Tisch"))
        .with_status(429)
        .create_async()
        .await;

    let json = body_json(app.get("/api/dict/pons?word=Tisch").await).await;
    let result: Value = serde_json::from_str(json["result"].as_str().unwrap()).unwrap();
    assert_eq!(result["error"], "API quota reached, no cached result available");
    assert_eq!(result["translations"], json!([]));
}

#[tokio::test]
async fn test_pons_other_status_is_reported() {
    let mut app = TestApp::new(sample_corpus()).await;
    app.upstream
        .mock("GET", "/v1/dictionary")
        .match_query(pons_query("Tisch"))
        .with_status(503)
        .create_async()
        .await;

    let json = body_json(app.get("/api/dict/pons?word=Tisch").await).await;
    let result: Value = serde_json::from_str(json["result"].as_str().unwrap()).unwrap();
    assert_eq!(result["error"], "API error: 503");
}

#[tokio::test]
async fn test_pons_without_key_reports_error() {
    let app = TestApp::build(sample_corpus(), None, false).await;

    let json = body_json(app.get("/api/dict/pons?word=Haus").await).await;
    let result: Value = serde_json::from_str(json["result"].as_str().unwrap()).unwrap();
    assert!(result["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_pons_requires_word() {
    let app = TestApp::new(sample_corpus()).await;

    let resp = app.get("/api/dict/pons?word=").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.get("/api/dict/pons").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Grammar site lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_lookup_scrapes_grammar_page() {
    let mut app = TestApp::new(sample_corpus()).await;
    app.upstream
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded("w".into(), "Haus".into()))
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(
            r#"<table><tr><th title="Nominativ">Nom.</th><td>das</td><td>Haus</td></tr></table>
               <span lang="en"><b>house</b>, <i>home</i></span>
               <h2>Beispiele</h2>
               <ul><li>Das Haus ist alt.<br><span>The house is old.</span></li></ul>"#,
        )
        .create_async()
        .await;

    let resp = app.get("/api/lookup?word=Haus").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["word"], "Haus");
    assert_eq!(json["article"], "das");
    assert_eq!(json["translation"], "house, home");
    assert_eq!(json["pons"], json!({}));
    assert_eq!(
        json["beispiele_list"],
        json!([{"de": "Das Haus ist alt.", "en": "The house is old."}])
    );
    assert!(json["verb_image_url"]
        .as_str()
        .unwrap()
        .ends_with("/deklination/substantive/Haus.png"));
}

#[tokio::test]
async fn test_lookup_upstream_failure_is_bad_gateway() {
    let mut app = TestApp::new(sample_corpus()).await;
    app.upstream
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let resp = app.get("/api/lookup?word=Haus").await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(resp).await["error"].is_string());
}

// ---------------------------------------------------------------------------
// Example generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_examples_disabled_without_key() {
    let app = TestApp::new(sample_corpus()).await;

    let json = body_json(app.get("/api/genai/examples?word=Haus").await).await;
    assert!(json["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_examples_from_llm() {
    let mut app = TestApp::build(sample_corpus(), Some("secret"), true).await;
    let content = r#"[{"de": "Das Haus ist groß.", "en": "The house is big."}]"#;
    app.upstream
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer llm-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "model": "gpt-3.5-turbo",
                "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let json = body_json(app.get("/api/genai/examples?word=Haus").await).await;
    assert_eq!(
        json,
        json!({"examples": [{"de": "Das Haus ist groß.", "en": "The house is big."}]})
    );
}

#[tokio::test]
async fn test_examples_llm_failure_is_reported() {
    let mut app = TestApp::build(sample_corpus(), Some("secret"), true).await;
    app.upstream
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body("unauthorized")
        .create_async()
        .await;

    let resp = app.get("/api/genai/examples?word=Haus").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await["error"].as_str().unwrap().contains("401"));
}
