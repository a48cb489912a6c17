use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use quiz_manager::utils::logging;
use quiz_manager::{App, AppResult, Config, QuestionGenerator, QuizError};
use serde_json::Value;
use tower::ServiceExt;

/// 模拟 LLM：返回夹杂说明文字的 5 道 DevOps 题目，可配置前几次调用失败，或第一次调用一直不返回
struct FakeGenerator {
    failures_left: AtomicUsize,
    stall_first: AtomicBool,
    calls: AtomicUsize,
}

impl FakeGenerator {
    fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicUsize::new(failures),
            stall_first: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    fn stalling() -> Arc<Self> {
        let generator = Self::new(0);
        generator.stall_first.store(true, Ordering::SeqCst);
        generator
    }
}

#[async_trait]
impl QuestionGenerator for FakeGenerator {
    async fn generate(&self, topic: &str, difficulty: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(topic, "DevOps");
        assert_eq!(difficulty, "easy");

        if self.stall_first.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(QuizError::generation_unavailable("fake-model", "请求超时 (30 秒)"));
        }

        let questions: Vec<Value> = (1..=5)
            .map(|i| {
                serde_json::json!({
                    "question": format!("DevOps question {}", i),
                    "options": [
                        format!("A. first {}", i),
                        format!("B. second {}", i),
                        format!("C. third {}", i),
                        format!("D. fourth {}", i),
                    ],
                    "answer": format!("B. second {}", i),
                })
            })
            .collect();

        Ok(format!(
            "Here are 5 easy questions about {}:\n{}\nLet me know if you need more.",
            topic,
            serde_json::to_string_pretty(&questions).unwrap()
        ))
    }
}

fn test_app(generator: Arc<FakeGenerator>) -> Router {
    logging::init(false);
    App::with_generator(Config::default(), generator).router()
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    location: Option<String>,
    body: Value,
}

fn request(method: &str, uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, cookie: Option<&str>, form: &str) -> Reply {
    let response = app.clone().oneshot(request(method, uri, cookie, form)).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    Reply {
        status,
        cookie,
        location,
        body,
    }
}

#[tokio::test]
async fn test_devops_quiz_all_correct_scores_five_of_five() {
    let generator = FakeGenerator::new(0);
    let app = test_app(generator.clone());

    let reply = send(&app, "GET", "/", None, "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["view"], "home");
    let cookie = reply.cookie.expect("首页应设置会话 cookie");

    let reply = send(&app, "POST", "/quiz", Some(&cookie), "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["view"], "question");
    assert_eq!(reply.body["question_index"], 1);
    assert_eq!(reply.body["question_count"], 5);
    assert_eq!(reply.body["text"], "DevOps question 1");
    assert_eq!(reply.body["topic"], "DevOps");
    assert_eq!(reply.body["difficulty"], "easy");
    assert_eq!(reply.body["options"].as_array().unwrap().len(), 4);
    assert!(reply.body.get("answer").is_none());

    for i in 1..=4 {
        let form = format!("selectedOption=B.+second+{}", i);
        let reply = send(&app, "POST", "/quiz", Some(&cookie), &form).await;
        assert_eq!(reply.body["view"], "question");
        assert_eq!(reply.body["question_index"], i + 1);
        assert_eq!(reply.body["score"], i);
    }

    let reply = send(&app, "POST", "/quiz", Some(&cookie), "selectedOption=B.+second+5").await;
    assert_eq!(reply.body["view"], "result");
    assert_eq!(reply.body["score"], 5);
    assert_eq!(reply.body["question_count"], 5);
    assert_eq!(reply.body["grade"], "perfect");
    assert_eq!(reply.body["message"], "Congrats🙂! You passed: 100.0%. ⭐️⭐️⭐️⭐️⭐️");

    // 结束后再提交也不会出现新题目或改变得分
    let reply = send(&app, "POST", "/quiz", Some(&cookie), "selectedOption=B.+second+5").await;
    assert_eq!(reply.body["view"], "result");
    assert_eq!(reply.body["score"], 5);

    let reply = send(&app, "GET", "/result", Some(&cookie), "").await;
    assert_eq!(reply.body["view"], "result");
    assert_eq!(reply.body["score"], 5);

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_option_labels_from_legacy_form_are_scored() {
    let app = test_app(FakeGenerator::new(0));

    let reply = send(&app, "POST", "/quiz", None, "topic=DevOps&difficulty=easy").await;
    let cookie = reply.cookie.expect("应设置会话 cookie");

    let answers = ["B", "A", "B", "Z", "B"];
    let mut last = Value::Null;
    for label in answers {
        last = send(&app, "POST", "/quiz", Some(&cookie), &format!("QuestionOptions={}", label))
            .await
            .body;
    }

    assert_eq!(last["view"], "result");
    assert_eq!(last["score"], 3);
    assert_eq!(last["grade"], "fail");
    assert_eq!(last["message"], "Sorry🙁! You failed: 60.0%.");
}

#[tokio::test]
async fn test_generation_failure_returns_home_and_allows_retry() {
    let generator = FakeGenerator::new(1);
    let app = test_app(generator.clone());

    let reply = send(&app, "POST", "/quiz", None, "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.body["view"], "home");
    assert!(reply.body["message"].as_str().unwrap().contains("try again"));
    let cookie = reply.cookie.expect("失败时也应设置会话 cookie");

    // 没有留下半开始的测验：再次提交会重新生成
    let reply = send(&app, "POST", "/quiz", Some(&cookie), "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["view"], "question");
    assert_eq!(reply.body["question_index"], 1);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_home_resets_attempt() {
    let app = test_app(FakeGenerator::new(0));

    let reply = send(&app, "POST", "/quiz", None, "topic=DevOps&difficulty=easy").await;
    let cookie = reply.cookie.unwrap();

    send(&app, "GET", "/", Some(&cookie), "").await;

    let reply = send(&app, "POST", "/quiz", Some(&cookie), "selectedOption=B.+second+1").await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["view"], "home");

    let reply = send(&app, "GET", "/result", Some(&cookie), "").await;
    assert_eq!(reply.body["view"], "home");
}

#[tokio::test]
async fn test_start_form_mid_quiz_begins_new_attempt() {
    let generator = FakeGenerator::new(0);
    let app = test_app(generator.clone());

    let reply = send(&app, "POST", "/quiz", None, "topic=DevOps&difficulty=easy").await;
    let cookie = reply.cookie.unwrap();
    send(&app, "POST", "/quiz", Some(&cookie), "selectedOption=B.+second+1").await;

    let reply = send(&app, "POST", "/", Some(&cookie), "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);

    let reply = send(&app, "POST", "/quiz", Some(&cookie), "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.body["view"], "question");
    assert_eq!(reply.body["question_index"], 1);
    assert_eq!(reply.body["score"], 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_abandoned_request_does_not_lock_session() {
    let generator = FakeGenerator::stalling();
    let app = test_app(generator.clone());

    let cookie = send(&app, "GET", "/", None, "").await.cookie.unwrap();

    // 客户端在生成过程中断开：处理请求的 future 被丢弃
    let pending = app
        .clone()
        .oneshot(request("POST", "/quiz", Some(&cookie), "topic=DevOps&difficulty=easy"));
    assert!(tokio::time::timeout(Duration::from_millis(100), pending).await.is_err());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let reply = send(&app, "GET", "/", Some(&cookie), "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["view"], "home");

    let reply = send(&app, "POST", "/quiz", Some(&cookie), "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["view"], "question");
    assert_eq!(reply.body["question_index"], 1);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_start_form_redirects_only_with_topic() {
    let app = test_app(FakeGenerator::new(0));

    let reply = send(&app, "POST", "/", None, "topic=DevOps&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/quiz"));

    let reply = send(&app, "POST", "/", None, "topic=&difficulty=easy").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["view"], "home");
    assert_eq!(reply.body["message"], "Please enter a topic to start the quiz.");

    let reply = send(&app, "GET", "/quiz", None, "").await;
    assert_eq!(reply.body["view"], "home");

    let reply = send(&app, "GET", "/health", None, "").await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_generation_with_configured_llm() {
    logging::init(true);

    let config = Config::load().expect("加载配置失败");
    let flow = quiz_manager::QuizFlow::new(Arc::new(quiz_manager::LlmService::new(&config)));

    let questions = flow
        .load_question_set("DevOps", "easy")
        .await
        .expect("生成题目失败");

    assert_eq!(questions.len(), config.question_count);
}
