//! HTTP route handlers
//!
//! Thin plumbing over the service layer: trigger a sync, list the mapping
//! table, fetch a metrics report, and the redirect route itself. Error
//! mapping: cooldown and sync failures answer 503, resolver misses 404, a
//! metrics request without a `url` 403.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::warn;

use crate::errors::ShortenerError;
use crate::services::{MetricsService, RedirectService, StatisticsService, SyncService};

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsQuery {
    pub url: Option<String>,
}

pub async fn trigger_sync(sync: web::Data<Arc<SyncService>>) -> impl Responder {
    match sync.sync().await {
        Ok(()) => HttpResponse::Ok().body("Done"),
        Err(ShortenerError::Cooldown(_)) => HttpResponse::ServiceUnavailable()
            .body("Too many requests in a short period"),
        Err(e) => {
            warn!("On-demand sync failed: {}", e);
            HttpResponse::ServiceUnavailable()
                .body(format!("An error has occurred ({})", e.error_type()))
        }
    }
}

pub async fn url_list(metrics: web::Data<Arc<MetricsService>>) -> impl Responder {
    match metrics.get_url_list().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            warn!("Failed to list url mappings: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// `url` may arrive in the JSON body or the query string; the body wins.
pub async fn metrics(
    query: web::Query<MetricsQuery>,
    body: Option<web::Json<MetricsQuery>>,
    metrics: web::Data<Arc<MetricsService>>,
) -> impl Responder {
    let url = body
        .and_then(|b| b.into_inner().url)
        .or_else(|| query.into_inner().url);

    let Some(url) = url else {
        return HttpResponse::Forbidden().finish();
    };

    match metrics.get_metrics(&url).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            warn!("Failed to build metrics for \"{}\": {}", url, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn handle_redirect(
    path: web::Path<String>,
    req: HttpRequest,
    redirect: web::Data<Arc<RedirectService>>,
    statistics: web::Data<Arc<StatisticsService>>,
) -> impl Responder {
    let token = path.into_inner();

    let target = match redirect.get_url(&token).await {
        Ok(target) => target,
        Err(ShortenerError::NotFound(_)) => return not_found().await,
        Err(e) => {
            warn!("Lookup for \"{}\" failed: {}", token, e);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = statistics.update_url_statistics(&token, user_agent).await {
        warn!("Failed to record statistics for \"{}\": {}", token, e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
        .insert_header(("Location", target))
        .finish()
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .insert_header(("Cache-Control", "public, max-age=60"))
        .body("Not Found")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/v2/sync").route(web::get().to(trigger_sync)))
        .service(web::resource("/api/v2/url_list").route(web::get().to(url_list)))
        .service(
            web::resource("/api/v2/metrics")
                .route(web::get().to(metrics))
                .route(web::post().to(metrics)),
        )
        .service(web::resource("/favicon.ico").route(web::get().to(not_found)))
        .service(web::resource("/robots.txt").route(web::get().to(not_found)))
        .service(web::resource("/{token:.+}").route(web::get().to(handle_redirect)));
}
