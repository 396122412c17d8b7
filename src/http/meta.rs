//! Service metadata routes.

use super::dto::HealthResponse;
use axum::{Json, response::Html};

const LANDING_PAGE: &str = "<!DOCTYPE html>
<html>
  <head><title>Taskboard</title></head>
  <body>
    <h1>Taskboard</h1>
    <p>Project and task planning API. A task's deadline never exceeds its project's deadline.</p>
    <ul>
      <li><code>/projects</code></li>
      <li><code>/tasks</code></li>
      <li><code>/tasks/deadlines</code></li>
      <li><code>/health</code></li>
    </ul>
  </body>
</html>
";

pub(super) async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_owned(),
    })
}
