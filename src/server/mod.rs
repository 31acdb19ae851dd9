//! Thin HTTP boundaries around the generation core. Enabled by the `server`
//! feature.

use crate::{
    bedrock::{SketchClient, VisionClient},
    config::Config,
    models::{GenerationRequest, UploadRequest},
};
use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;

pub async fn run(config: Config) -> std::io::Result<()> {
    let port = config.port.unwrap_or(8080);

    let client = SketchClient::new(config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(client);

    log::info!("sketchgen server listening on http://127.0.0.1:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/api/models", web::get().to(list_models))
            .route("/api/upload", web::post().to(upload))
            .route("/api/generate", web::post().to(generate))
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}

async fn list_models() -> HttpResponse {
    HttpResponse::Ok().json(VisionClient::supported_models())
}

async fn upload(
    state: web::Data<SketchClient>,
    body: web::Json<UploadRequest>,
) -> HttpResponse {
    match state.register_upload(body.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::error!("upload failed: {}", e);
            HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))
        }
    }
}

/// Streams the final sanitized (and possibly repaired) component source back
/// as a single text/plain chunk.
async fn generate(
    state: web::Data<SketchClient>,
    body: web::Json<GenerationRequest>,
) -> HttpResponse {
    match state.generate_component(body.into_inner()).await {
        Ok(response) => {
            let (tx, rx) = tokio::sync::mpsc::channel::<
                std::result::Result<web::Bytes, actix_web::Error>,
            >(1);

            tokio::spawn(async move {
                let _ = tx.send(Ok(web::Bytes::from(response.code))).await;
            });

            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .insert_header(("Cache-Control", "no-cache"))
                .streaming(ReceiverStream::new(rx))
        }
        Err(e) => {
            log::error!("generation failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}
