use crate::{
    config::Config,
    error::{Result, TryOnError},
    logger,
    models::{TryOnRequest, TryOnResponse},
    tryon::TryOnService,
};
use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{Method, StatusCode},
    middleware::{DefaultHeaders, Logger},
    web, App, HttpResponse, HttpServer, ResponseError,
};

impl ResponseError for TryOnError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(TryOnError::status_code(self)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(TryOnResponse::failure(self.to_string()))
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("✅ Provador is up and ready!")
}

async fn try_on(
    service: web::Data<TryOnService>,
    body: web::Json<TryOnRequest>,
) -> std::result::Result<HttpResponse, TryOnError> {
    let artifact = service.handle_try_on(body.person(), body.garment()).await?;
    let response = HttpResponse::Ok().json(TryOnResponse::image(artifact.data_url()));
    artifact.retain();
    Ok(response)
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

/// JSON extractor settings: size limit, and parse failures rendered in the
/// same `{ success, message }` shape as every other error.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let too_large = matches!(
                err,
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. }
            );
            let (mut builder, message) = if too_large {
                (
                    HttpResponse::PayloadTooLarge(),
                    format!("Request body too large: {}", err),
                )
            } else {
                (
                    HttpResponse::BadRequest(),
                    format!("Invalid request body: {}", err),
                )
            };
            log::warn!("{}", message);
            let response = builder.json(TryOnResponse::failure(message));
            InternalError::from_response(err, response).into()
        })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health)).service(
        web::resource("/tryon")
            .route(web::post().to(try_on))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

pub async fn run(config: &Config, service: TryOnService) -> Result<()> {
    let data = web::Data::new(service);
    let body_limit = config.max_body_bytes();

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        config.port,
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors_headers())
            .wrap(Logger::new("%r %s %b %Dms"))
            .app_data(data.clone())
            .app_data(json_config(body_limit))
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
