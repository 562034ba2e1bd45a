//! The `/api/translate` proxy: holds the API key so the browser never sees
//! it, forwards requests upstream and normalizes failures into a stable JSON
//! error shape.

use std::time::Duration;

use actix_web::{
  HttpResponse,
  get,
  post,
  web,
};
use serde::{
  Deserialize,
  Serialize,
};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ProxyState {
  http:     reqwest::Client,
  upstream: String,
  api_key:  String,
}

impl ProxyState {
  pub fn new(upstream: String, api_key: String) -> anyhow::Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(UPSTREAM_TIMEOUT)
      .build()?;
    Ok(Self {
      http,
      upstream,
      api_key,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
  #[serde(default)]
  text:        Vec<String>,
  source_lang: Option<String>,
  target_lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
  text:        &'a [String],
  source_lang: &'a str,
  target_lang: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct UpstreamResponse {
  translations: Vec<Translation>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Translation {
  text: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
  error:   &'static str,
  message: String,
}

fn error_response(status: actix_web::http::StatusCode, message: String) -> HttpResponse {
  HttpResponse::build(status).json(ErrorBody {
    error: "Translation failed",
    message,
  })
}

#[get("/health")]
pub async fn health() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[post("/api/translate")]
pub async fn translate(
  state: web::Data<ProxyState>,
  body: web::Json<TranslateRequest>,
) -> HttpResponse {
  if body.text.is_empty() || body.text.iter().all(|t| t.trim().is_empty()) {
    return HttpResponse::BadRequest().json(ErrorBody {
      error:   "Translation failed",
      message: "Text is required".to_string(),
    });
  }

  let payload = UpstreamRequest {
    text:        &body.text,
    source_lang: body.source_lang.as_deref().unwrap_or("EN"),
    target_lang: body.target_lang.as_deref().unwrap_or("JA"),
  };

  let response = state
    .http
    .post(&state.upstream)
    .header(
      "Authorization",
      format!("DeepL-Auth-Key {}", state.api_key),
    )
    .json(&payload)
    .send()
    .await;

  let response = match response {
    Ok(response) => response,
    Err(err) => {
      log::error!("upstream request failed: {err}");
      return error_response(
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        err.to_string(),
      );
    },
  };

  let status = response.status();
  if !status.is_success() {
    let message = response.text().await.unwrap_or_default();
    log::error!("upstream returned {status}: {message}");
    let status = actix_web::http::StatusCode::from_u16(status.as_u16())
      .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    return error_response(status, message);
  }

  match response.json::<UpstreamResponse>().await {
    Ok(translated) if !translated.translations.is_empty() => {
      HttpResponse::Ok().json(translated)
    },
    Ok(_) => {
      log::error!("upstream returned no translations");
      error_response(
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        "No translation received".to_string(),
      )
    },
    Err(err) => {
      log::error!("failed to decode upstream response: {err}");
      error_response(
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        err.to_string(),
      )
    },
  }
}

#[cfg(test)]
mod tests {
  use actix_web::{
    App,
    test,
  };

  use super::*;

  fn test_state() -> web::Data<ProxyState> {
    // Points at an unroutable upstream; only used by paths that fail before
    // or while contacting it.
    web::Data::new(ProxyState::new("http://127.0.0.1:1/translate".to_string(), "test-key".to_string()).unwrap())
  }

  #[actix_web::test]
  async fn health_reports_ok() {
    let app = test::init_service(App::new().service(health)).await;
    let response = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(response.status().is_success());
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "ok");
  }

  #[actix_web::test]
  async fn empty_text_is_a_bad_request() {
    let app = test::init_service(App::new().app_data(test_state()).service(translate)).await;
    let request = test::TestRequest::post()
      .uri("/api/translate")
      .set_json(serde_json::json!({ "text": ["   "] }))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Translation failed");
  }

  #[actix_web::test]
  async fn unreachable_upstream_maps_to_500() {
    let app = test::init_service(App::new().app_data(test_state()).service(translate)).await;
    let request = test::TestRequest::post()
      .uri("/api/translate")
      .set_json(serde_json::json!({
        "text": ["smile"],
        "source_lang": "EN",
        "target_lang": "JA",
      }))
      .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 500);
  }
}
