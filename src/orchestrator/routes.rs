//! HTTP 路由
//!
//! 每个请求从存储中取出会话，交给流程层处理，再放回存储。

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::QuizError;
use crate::infrastructure::SessionStore;
use crate::orchestrator::views::QuizView;
use crate::workflow::{QuizFlow, Submission};

/// 会话 cookie 名称
pub const SESSION_COOKIE: &str = "quiz_session";

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<QuizFlow>,
    pub store: SessionStore,
}

/// 首页表单
#[derive(Debug, Default, Deserialize)]
pub struct StartForm {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// 答题表单
#[derive(Debug, Default, Deserialize)]
pub struct QuizForm {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, rename = "selectedOption", alias = "QuestionOptions")]
    pub selected_option: Option<String>,
}

impl From<QuizForm> for Submission {
    fn from(form: QuizForm) -> Self {
        Submission {
            topic: form.topic,
            difficulty: form.difficulty,
            selected_option: form.selected_option,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home).post(start))
        .route("/quiz", get(quiz_home).post(quiz_step))
        .route("/result", get(result))
        .route("/health", get(health))
        .with_state(state)
}

/// 首页：放弃当前测验，下一次提交会重新生成题目
async fn home(State(state): State<AppState>, jar: CookieJar) -> Response {
    let jar = match reset_session(&state, jar) {
        Ok(jar) => jar,
        Err(response) => return response,
    };
    (jar, Json(QuizView::home())).into_response()
}

/// 首页表单提交：放弃当前测验，主题不为空则进入答题页
async fn start(State(state): State<AppState>, jar: CookieJar, Form(form): Form<StartForm>) -> Response {
    let jar = match reset_session(&state, jar) {
        Ok(jar) => jar,
        Err(response) => return response,
    };

    let has_topic = form.topic.as_deref().map(str::trim).is_some_and(|t| !t.is_empty());
    if has_topic {
        (jar, Redirect::to("/quiz")).into_response()
    } else {
        (jar, Json(QuizView::from(&QuizError::MissingTopic))).into_response()
    }
}

async fn quiz_home() -> Json<QuizView> {
    Json(QuizView::home())
}

/// 答题：开始测验或前进一步
async fn quiz_step(State(state): State<AppState>, jar: CookieJar, Form(form): Form<QuizForm>) -> Response {
    let lease = match state.store.checkout(session_id(&jar)) {
        Ok(lease) => lease,
        Err(e) => return error_response(jar, &e),
    };

    let submission = Submission::from(form);
    let (session, outcome) = state.flow.run(lease.session(), &submission).await;

    let jar = jar.add(session_cookie(session.id()));
    lease.checkin(session);

    match outcome {
        Ok(outcome) => (jar, Json(QuizView::from(outcome))).into_response(),
        Err(e) => error_response(jar, &e),
    }
}

/// 结果页
async fn result(State(state): State<AppState>, jar: CookieJar) -> Response {
    let lease = match state.store.checkout(session_id(&jar)) {
        Ok(lease) => lease,
        Err(e) => return error_response(jar, &e),
    };
    let session = lease.session();

    let view = match session.result() {
        Some(result) => QuizView::Result(result.clone()),
        None => QuizView::home_with_message("No finished quiz yet. Please start a new quiz."),
    };

    let jar = jar.add(session_cookie(session.id()));
    lease.checkin(session);

    (jar, Json(view)).into_response()
}

async fn health() -> &'static str {
    "ok"
}

/// 把会话重置为未开始，返回带会话 cookie 的 jar
fn reset_session(state: &AppState, jar: CookieJar) -> Result<CookieJar, Response> {
    let lease = match state.store.checkout(session_id(&jar)) {
        Ok(lease) => lease,
        Err(e) => return Err(error_response(jar, &e)),
    };
    let session = lease.session().reset();
    let jar = jar.add(session_cookie(session.id()));
    lease.checkin(session);
    Ok(jar)
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn status_for(err: &QuizError) -> StatusCode {
    match err {
        QuizError::GenerationUnavailable { .. }
        | QuizError::MalformedGenerationOutput { .. }
        | QuizError::InvalidQuestionRecord { .. } => StatusCode::BAD_GATEWAY,
        QuizError::MissingTopic => StatusCode::UNPROCESSABLE_ENTITY,
        QuizError::SessionBusy => StatusCode::CONFLICT,
        QuizError::DivisionUndefined => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(jar: CookieJar, err: &QuizError) -> Response {
    warn!("请求失败: {}", err);
    (status_for(err), jar, Json(QuizView::from(err))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            status_for(&QuizError::generation_unavailable("m", "timeout")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&QuizError::malformed("no array")), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&QuizError::invalid_record(1, "bad")), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&QuizError::MissingTopic), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(&QuizError::SessionBusy), StatusCode::CONFLICT);
        assert_eq!(status_for(&QuizError::DivisionUndefined), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_legacy_option_field_name() {
        let form: QuizForm = parse_form("QuestionOptions=B");
        assert_eq!(form.selected_option.as_deref(), Some("B"));

        let form: QuizForm = parse_form("selectedOption=C.+Jenkins&topic=DevOps");
        assert_eq!(form.selected_option.as_deref(), Some("C. Jenkins"));
        assert_eq!(form.topic.as_deref(), Some("DevOps"));
    }

    /// 通过 axum 的 Form 提取器解析表单
    fn parse_form(body: &str) -> QuizForm {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::Request;

        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let Form(form) = tokio_test::block_on(Form::<QuizForm>::from_request(request, &())).unwrap();
        form
    }
}
