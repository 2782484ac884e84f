// tests/api_tests.rs

use examportal::{
    config::Config,
    routes,
    services::{identity::IdentityClient, storage::StorageClient},
    state::AppState,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

struct TestApp {
    address: String,
    pool: SqlitePool,
}

/// Helper function to spawn the app on a random port for testing.
///
/// Runs against an in-memory SQLite database; the single-connection
/// pool is shared with the test so rows can be seeded directly. The
/// identity and storage URLs point nowhere, routes that call out to
/// them are covered in upload_tests.rs.
async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        rust_log: "error".to_string(),
        identity_api_url: "http://127.0.0.1:9".to_string(),
        identity_secret_key: "test_secret".to_string(),
        storage_api_url: "http://127.0.0.1:9".to_string(),
        storage_service_key: "test_key".to_string(),
        storage_bucket: "documents".to_string(),
        allowed_origins: vec!["http://localhost:3000".to_string()],
    };

    let state = AppState {
        pool: pool.clone(),
        identity: IdentityClient::new(&config),
        storage: StorageClient::new(&config),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, pool }
}

/// Inserts a user row directly; signup goes through the identity
/// provider and is exercised separately.
async fn seed_user(pool: &SqlitePool, email: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (external_auth_id, email, name, profile_image, created_at)
        VALUES (?, ?, ?, NULL, ?)
        RETURNING id
        "#,
    )
    .bind(format!("acct_{}", email))
    .bind(email)
    .bind("Test Student")
    .bind(chrono::Utc::now())
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

async fn create_category(client: &reqwest::Client, address: &str, name: &str) -> i64 {
    let response = client
        .post(&format!("{}/api/categories", address))
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_exam(client: &reqwest::Client, address: &str, name: &str, category_id: i64) -> i64 {
    let response = client
        .post(&format!("{}/api/exams", address))
        .json(&serde_json::json!({ "name": name, "categoryId": category_id }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_series(
    client: &reqwest::Client,
    address: &str,
    category_id: i64,
    exam_id: i64,
) -> serde_json::Value {
    let response = client
        .post(&format!("{}/api/test-series", address))
        .json(&serde_json::json!({
            "subject": "History",
            "examName": "Mock Test 1",
            "duration": 90,
            "passingMarks": 6,
            "categoryId": category_id,
            "examId": exam_id
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

async fn add_question(
    client: &reqwest::Client,
    address: &str,
    series_id: i64,
    text: &str,
    correct: &str,
    marks: i64,
) -> serde_json::Value {
    let response = client
        .post(&format!("{}/api/test-series/{}/questions", address, series_id))
        .json(&serde_json::json!({
            "question": text,
            "correctAnswer": correct,
            "options": ["A", "B", "C", "D"],
            "marks": marks
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn root_responds_and_unknown_path_is_404() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let root = client
        .get(&format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let missing = client
        .get(&format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(root.status().as_u16(), 200);
    assert_eq!(root.text().await.unwrap(), "Backend is Connected!");
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn category_crud_works() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: create
    let id = create_category(&client, &app.address, "Engineering").await;

    // Assert: listed
    let listed: Vec<serde_json::Value> = client
        .get(&format!("{}/api/categories", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().any(|c| c["name"] == "Engineering"));

    // Act: rename
    let renamed = client
        .put(&format!("{}/api/categories/{}", app.address, id))
        .json(&serde_json::json!({ "name": "Engineering Services" }))
        .send()
        .await
        .unwrap();
    assert_eq!(renamed.status().as_u16(), 200);
    let renamed: serde_json::Value = renamed.json().await.unwrap();
    assert_eq!(renamed["name"], "Engineering Services");

    // Act: delete
    let deleted = client
        .delete(&format!("{}/api/categories/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
    let deleted: serde_json::Value = deleted.json().await.unwrap();
    assert_eq!(deleted["message"], "Category deleted");

    // Assert: gone
    let missing = client
        .put(&format!("{}/api/categories/{}", app.address, id))
        .json(&serde_json::json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn category_with_empty_name_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/categories", app.address))
        .json(&serde_json::json!({ "name": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn category_delete_refused_while_referenced() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Banking").await;
    let exam_id = create_exam(&client, &app.address, "IBPS PO", category_id).await;

    // Act: delete while an exam still points at the category
    let blocked = client
        .delete(&format!("{}/api/categories/{}", app.address, category_id))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(blocked.status().as_u16(), 409);

    // Act: remove the exam, then retry
    let exam_gone = client
        .delete(&format!("{}/api/exams/{}", app.address, exam_id))
        .send()
        .await
        .unwrap();
    assert_eq!(exam_gone.status().as_u16(), 200);

    let allowed = client
        .delete(&format!("{}/api/categories/{}", app.address, category_id))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status().as_u16(), 200);
}

#[tokio::test]
async fn exam_requires_existing_category() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/exams", app.address))
        .json(&serde_json::json!({ "name": "SSC CGL", "categoryId": 9999 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn exam_listing_resolves_category_name() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Railways").await;
    create_exam(&client, &app.address, "RRB NTPC", category_id).await;

    // Act
    let exams: Vec<serde_json::Value> = client
        .get(&format!("{}/api/exams", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    let exam = exams.iter().find(|e| e["name"] == "RRB NTPC").unwrap();
    assert_eq!(exam["categoryName"], "Railways");
}

#[tokio::test]
async fn exam_delete_refused_while_series_reference_it() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Defence").await;
    let exam_id = create_exam(&client, &app.address, "NDA", category_id).await;
    let series = create_series(&client, &app.address, category_id, exam_id).await;

    // Act
    let blocked = client
        .delete(&format!("{}/api/exams/{}", app.address, exam_id))
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status().as_u16(), 409);

    // Series deletion is always allowed; afterwards the exam is free.
    let series_gone = client
        .delete(&format!("{}/api/test-series/{}", app.address, series["id"].as_i64().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(series_gone.status().as_u16(), 200);

    let allowed = client
        .delete(&format!("{}/api/exams/{}", app.address, exam_id))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status().as_u16(), 200);
}

#[tokio::test]
async fn new_series_starts_with_no_questions() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Teaching").await;
    let exam_id = create_exam(&client, &app.address, "CTET", category_id).await;

    // Act
    let series = create_series(&client, &app.address, category_id, exam_id).await;

    // Assert: derived aggregates start at zero regardless of input
    assert_eq!(series["numberOfQuestions"], 0);
    assert_eq!(series["totalMarks"], 0);
    assert_eq!(series["questions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn question_lifecycle_maintains_aggregates() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Insurance").await;
    let exam_id = create_exam(&client, &app.address, "LIC AAO", category_id).await;
    let series = create_series(&client, &app.address, category_id, exam_id).await;
    let series_id = series["id"].as_i64().unwrap();

    // Act: add three questions worth 2, 3 and 5 marks
    add_question(&client, &app.address, series_id, "Q1", "A", 2).await;
    add_question(&client, &app.address, series_id, "Q2", "B", 3).await;
    let after_adds = add_question(&client, &app.address, series_id, "Q3", "C", 5).await;

    // Assert: totals derived from the embedded list
    assert_eq!(after_adds["numberOfQuestions"], 3);
    assert_eq!(after_adds["totalMarks"], 10);

    // Act: raising one question's marks recomputes the full sum
    let updated = client
        .put(&format!("{}/api/test-series/{}/questions/2", app.address, series_id))
        .json(&serde_json::json!({ "marks": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);

    let fetched: serde_json::Value = client
        .get(&format!("{}/api/test-series/{}", app.address, series_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["totalMarks"], 11);

    // Act: deleting a question drops its marks from the total
    let removed = client
        .delete(&format!("{}/api/test-series/{}/questions/1", app.address, series_id))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status().as_u16(), 200);

    // Assert: question ids are never reused after a delete
    let after_readd = add_question(&client, &app.address, series_id, "Q4", "D", 1).await;
    assert_eq!(after_readd["numberOfQuestions"], 3);
    assert_eq!(after_readd["totalMarks"], 10);
    let ids: Vec<i64> = after_readd["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3, 4]);
}

#[tokio::test]
async fn question_with_empty_options_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "State Exams").await;
    let exam_id = create_exam(&client, &app.address, "UPPSC", category_id).await;
    let series = create_series(&client, &app.address, category_id, exam_id).await;

    let response = client
        .post(&format!(
            "{}/api/test-series/{}/questions",
            app.address,
            series["id"].as_i64().unwrap()
        ))
        .json(&serde_json::json!({
            "question": "Pick one",
            "correctAnswer": "A",
            "options": [],
            "marks": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn missing_question_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Judiciary").await;
    let exam_id = create_exam(&client, &app.address, "PCS J", category_id).await;
    let series = create_series(&client, &app.address, category_id, exam_id).await;
    let series_id = series["id"].as_i64().unwrap();

    let response = client
        .get(&format!("{}/api/test-series/{}/questions/42", app.address, series_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn series_listing_embeds_category_and_exam() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Civil Services").await;
    let exam_id = create_exam(&client, &app.address, "UPSC CSE", category_id).await;
    create_series(&client, &app.address, category_id, exam_id).await;

    // Act
    let listed: Vec<serde_json::Value> = client
        .get(&format!("{}/api/test-series", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    let summary = listed.iter().find(|s| s["examName"] == "Mock Test 1").unwrap();
    assert_eq!(summary["categoryName"], "Civil Services");
    assert_eq!(summary["exam"]["name"], "UPSC CSE");
    // Summaries never carry the embedded question list.
    assert!(summary.get("questions").is_none());
}

#[tokio::test]
async fn series_update_changes_metadata_only() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Medical").await;
    let exam_id = create_exam(&client, &app.address, "NEET", category_id).await;
    let series = create_series(&client, &app.address, category_id, exam_id).await;
    let series_id = series["id"].as_i64().unwrap();
    add_question(&client, &app.address, series_id, "Q1", "A", 5).await;

    // Act
    let response = client
        .put(&format!("{}/api/test-series/{}", app.address, series_id))
        .json(&serde_json::json!({ "subject": "Biology", "duration": 120 }))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["subject"], "Biology");
    assert_eq!(updated["duration"], 120);
    assert_eq!(updated["totalMarks"], 5);
    assert_eq!(updated["numberOfQuestions"], 1);
}

#[tokio::test]
async fn invalid_series_payload_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let category_id = create_category(&client, &app.address, "Law").await;
    let exam_id = create_exam(&client, &app.address, "CLAT", category_id).await;

    let response = client
        .post(&format!("{}/api/test-series", app.address))
        .json(&serde_json::json!({
            "subject": "",
            "examName": "Mock",
            "duration": 0,
            "passingMarks": 5,
            "categoryId": category_id,
            "examId": exam_id
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn student_listing_paginates() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    for i in 0..3 {
        seed_user(&app.pool, &format!("student{}@example.com", i)).await;
    }

    // Act
    let page: serde_json::Value = client
        .get(&format!("{}/api/user/students/list?page=2&limit=2", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["totalStudents"], 3);
    assert_eq!(page["students"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn student_listing_tolerates_out_of_range_pages() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    for i in 0..3 {
        seed_user(&app.pool, &format!("edge{}@example.com", i)).await;
    }

    // Act: a page number at the far end of i64
    let response = client
        .get(&format!(
            "{}/api/user/students/list?page=9223372036854775807&limit=10",
            app.address
        ))
        .send()
        .await
        .unwrap();

    // Assert: an empty page, not a dropped connection
    assert_eq!(response.status().as_u16(), 200);
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["totalStudents"], 3);
    assert_eq!(page["students"].as_array().unwrap().len(), 0);

    // Page 0 clamps to the first page
    let page: serde_json::Value = client
        .get(&format!("{}/api/user/students/list?page=0&limit=2", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["students"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn user_update_rejects_duplicate_email() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    seed_user(&app.pool, "first@example.com").await;
    let second = seed_user(&app.pool, "second@example.com").await;

    // Act: steal the first user's email
    let conflict = client
        .put(&format!("{}/api/user/{}", app.address, second))
        .json(&serde_json::json!({ "email": "first@example.com" }))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(conflict.status().as_u16(), 409);

    // Act: a plain rename still works
    let renamed = client
        .put(&format!("{}/api/user/{}", app.address, second))
        .json(&serde_json::json!({ "name": "Renamed Student" }))
        .send()
        .await
        .unwrap();
    assert_eq!(renamed.status().as_u16(), 200);
    let renamed: serde_json::Value = renamed.json().await.unwrap();
    assert_eq!(renamed["name"], "Renamed Student");
}

#[tokio::test]
async fn user_delete_works() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let id = seed_user(&app.pool, "leaver@example.com").await;

    // Act
    let response = client
        .delete(&format!("{}/api/user/{}", app.address, id))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["user"]["email"], "leaver@example.com");

    let again = client
        .delete(&format!("{}/api/user/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 404);
}
