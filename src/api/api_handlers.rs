use std::collections::HashMap;

use actix_web::http::header::{ContentDisposition, ContentType};
use actix_web::{HttpResponse, Responder, ResponseError, web};
use tracing::{debug, warn};

use crate::api::api_objects::{ApiError, AppContext, ClustersResponse};
use crate::api::views::{CSV_FILE_NAME, Outcome, render_dashboard};
use crate::prediction::features::FeatureRecord;

pub async fn handle_index(app_data: web::Data<AppContext>) -> impl Responder {
    let page = render_dashboard(&app_data.labels, &FeatureRecord::default(), None);
    HttpResponse::Ok().content_type(ContentType::html()).body(page)
}

/// Reads the form as raw fields so an unparseable value still gets the dashboard back with an
/// error banner naming the field.
pub async fn handle_predict_form(
    form: web::Form<HashMap<String, String>>,
    app_data: web::Data<AppContext>,
) -> impl Responder {
    let parsed = FeatureRecord::from_form_fields(&form).map_err(ApiError::from);
    let record = parsed.as_ref().copied().unwrap_or_default();
    match parsed.and_then(|record| app_data.predict(&record)) {
        Ok(result) => {
            let page = render_dashboard(&app_data.labels, &record, Some(Outcome::Prediction(&result)));
            HttpResponse::Ok().content_type(ContentType::html()).body(page)
        }
        Err(e) => {
            warn!("Rejected dashboard submission: {}", e);
            let page = render_dashboard(&app_data.labels, &record, Some(Outcome::Error(e.to_string())));
            HttpResponse::build(e.status_code())
                .content_type(ContentType::html())
                .body(page)
        }
    }
}

pub async fn handle_download_csv(
    form: web::Form<FeatureRecord>,
    app_data: web::Data<AppContext>,
) -> Result<HttpResponse, ApiError> {
    let result = app_data.predict(&form.into_inner())?;
    let csv = result.coordinates.to_csv()?;
    debug!("Exporting {} bytes of PCA coordinates", csv.len());
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition::attachment(CSV_FILE_NAME))
        .body(csv))
}

pub async fn handle_api_predict(
    record: web::Json<FeatureRecord>,
    app_data: web::Data<AppContext>,
) -> Result<HttpResponse, ApiError> {
    let result = app_data.predict(&record.into_inner())?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn handle_api_clusters(app_data: web::Data<AppContext>) -> impl Responder {
    HttpResponse::Ok().json(ClustersResponse {
        clusters: app_data.labels.entries(),
    })
}

pub async fn handle_health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Registers every route. Payload errors are reported through `ApiError` so JSON callers get
/// a JSON body.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .route("/", web::get().to(handle_index))
    .route("/predict", web::post().to(handle_predict_form))
    .route(&format!("/{CSV_FILE_NAME}"), web::post().to(handle_download_csv))
    .route("/api/predict", web::post().to(handle_api_predict))
    .route("/api/clusters", web::get().to(handle_api_clusters))
    .route("/health", web::get().to(handle_health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use crate::model_artifacts::{ArtifactPaths, ModelArtifacts};
    use crate::prediction::cluster_labels::ClusterLabelTable;

    fn context() -> web::Data<AppContext> {
        let paths = ArtifactPaths::in_dir("models", "scaler.json", "pca.json", "kmeans_model.json");
        let artifacts = ModelArtifacts::load(&paths).unwrap();
        web::Data::new(AppContext::new(artifacts, ClusterLabelTable::default()))
    }

    const DEFAULT_FORM: &str = "avg_quantity=45.0&avg_price=1750.0&avg_pnl=200.0&pnl_volatility=1500.0&num_trades=20.0&buy_sell_ratio=1.5&win_rate=0.7";

    #[actix_web::test]
    async fn test_index_renders_form() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("Enter Trading Metrics"));
        assert!(page.contains("Predict Cluster"));
    }

    #[actix_web::test]
    async fn test_form_submit_with_defaults() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/predict")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(DEFAULT_FORM)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(page.contains("Predicted Cluster: 3 — Balanced Trader"));
        assert!(page.contains("<th>PCA 1</th><th>PCA 2</th>"));
    }

    #[actix_web::test]
    async fn test_form_submit_out_of_range_shows_error() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/predict")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(DEFAULT_FORM.replace("win_rate=0.7", "win_rate=1.5"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(page.contains("win_rate must be between 0 and 1, got 1.5"));
        assert!(!page.contains("Predicted Cluster:"));
    }

    #[actix_web::test]
    async fn test_form_submit_unparseable_value_shows_error_page() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        for (bad, expected) in [
            ("avg_quantity=abc", "avg_quantity must be a number, got &quot;abc&quot;"),
            ("avg_quantity=", "avg_quantity is required"),
        ] {
            let req = test::TestRequest::post()
                .uri("/predict")
                .insert_header(ContentType::form_url_encoded())
                .set_payload(DEFAULT_FORM.replace("avg_quantity=45.0", bad))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(resp.headers().get("content-type").unwrap(), "text/html; charset=utf-8");
            let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
            assert!(page.contains(r#"<div class="error">"#), "{bad}");
            assert!(page.contains(expected), "{bad}");
            assert!(page.contains("Enter Trading Metrics"));
        }
    }

    #[actix_web::test]
    async fn test_win_rate_edges_are_accepted() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        for win_rate in ["win_rate=0.0", "win_rate=1.0"] {
            let req = test::TestRequest::post()
                .uri("/predict")
                .insert_header(ContentType::form_url_encoded())
                .set_payload(DEFAULT_FORM.replace("win_rate=0.7", win_rate))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{win_rate} rejected");
        }
    }

    #[actix_web::test]
    async fn test_csv_download_matches_rendered_table() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/pca_coords.csv")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(DEFAULT_FORM)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("content-type").unwrap(), "text/csv");
        let disposition = resp.headers().get("content-disposition").unwrap().to_str().unwrap();
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains("pca_coords.csv"));
        let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "PCA 1,PCA 2");

        let req = test::TestRequest::post()
            .uri("/predict")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(DEFAULT_FORM)
            .to_request();
        let page = String::from_utf8(
            test::read_body(test::call_service(&app, req).await).await.to_vec(),
        )
        .unwrap();
        let cells: Vec<&str> = lines[1].split(',').collect();
        assert!(page.contains(&format!("<td>{}</td><td>{}</td>", cells[0], cells[1])));

        let req = test::TestRequest::post()
            .uri("/pca_coords.csv")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(DEFAULT_FORM)
            .to_request();
        let again = test::read_body(test::call_service(&app, req).await).await;
        assert_eq!(again.as_ref(), csv.as_bytes());
    }

    #[actix_web::test]
    async fn test_api_predict() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(FeatureRecord::default())
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["cluster_id"], 3);
        assert_eq!(resp["cluster_label"], "Balanced Trader");
        assert!(resp["coordinates"]["PCA 1"].is_f64());
        assert!(resp["coordinates"]["PCA 2"].is_f64());
    }

    #[actix_web::test]
    async fn test_api_predict_rejects_missing_field() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({"avg_quantity": 45.0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Malformed request"));
    }

    #[actix_web::test]
    async fn test_api_clusters() {
        let app = test::init_service(App::new().app_data(context()).configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/api/clusters").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["clusters"].as_array().unwrap().len(), 4);
        assert_eq!(resp["clusters"][1]["label"], "High-Frequency Trader");
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
