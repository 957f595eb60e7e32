use actix_web::{web, HttpResponse};

use crate::metrics::FileserverHits;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<FileserverHits>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>
"#,
            hits.get()
        ))
}

/// GET /api/reset
///
/// Zero the file server hit counter. Stored data is untouched.
pub async fn reset_metrics(hits: web::Data<FileserverHits>) -> HttpResponse {
    hits.reset();
    tracing::info!("File server hit counter reset");

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Hits: {}", hits.get()))
}
