use actix_web::HttpResponse;

use crate::response::ApiResponse;

pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(ApiResponse::new(200, "OK", "Health check passed"))
}
