// Integration tests for Exhibitor Match

use actix_web::{test, web, App};
use async_trait::async_trait;
use exhibitor_match::core::{Matcher, SessionState};
use exhibitor_match::models::{Industry, RawExhibitor, ReasonCode};
use exhibitor_match::routes::{configure_routes, AppState};
use exhibitor_match::services::{
    CacheManager, CatalogSource, EventxError, ExhibitorCatalog, InMemorySavedMatchRepository,
    IndustryTaxonomy, MatchmakingService, PersistencePolicy, PreferenceSelection,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

struct EventCatalog {
    exhibitors: Vec<Value>,
}

#[async_trait]
impl ExhibitorCatalog for EventCatalog {
    async fn get_exhibitors(&self) -> Result<Vec<RawExhibitor>, EventxError> {
        Ok(self
            .exhibitors
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect())
    }
}

#[async_trait]
impl IndustryTaxonomy for EventCatalog {
    async fn get_industries(&self) -> Result<Vec<Industry>, EventxError> {
        Ok(vec![
            Industry { id: "1".into(), name: "Construction".into(), localized_name: Some("البناء".into()) },
            Industry { id: "2".into(), name: "Energy".into(), localized_name: None },
        ])
    }
}

/// Catalog that is always down
struct Offline;

#[async_trait]
impl ExhibitorCatalog for Offline {
    async fn get_exhibitors(&self) -> Result<Vec<RawExhibitor>, EventxError> {
        Err(EventxError::ApiError("503".into()))
    }
}

#[async_trait]
impl IndustryTaxonomy for Offline {
    async fn get_industries(&self) -> Result<Vec<Industry>, EventxError> {
        Err(EventxError::ApiError("503".into()))
    }
}

fn event_catalog(count: usize) -> Arc<EventCatalog> {
    let mut exhibitors = vec![json!({
        "id": 1000,
        "en_name": "BuildTech Solutions",
        "form3_data_entry": {
            "company_industries": [{ "name": "Construction Materials" }],
            "country": "Libya"
        },
        "is_partner": 0,
        "teamCount": 1
    })];
    exhibitors.extend((0..count).map(|i| {
        json!({
            "id": i,
            "en_name": format!("Exhibitor {}", i),
            "industries": ["Construction"],
            "event_user": { "silver_sponsorship": i % 3 == 0 }
        })
    }));
    Arc::new(EventCatalog { exhibitors })
}

fn service_with<C>(upstream: Arc<C>) -> Arc<MatchmakingService>
where
    C: ExhibitorCatalog + IndustryTaxonomy + 'static,
{
    let catalog = CatalogSource::new(
        upstream.clone(),
        upstream,
        Arc::new(CacheManager::in_memory(100, 300)),
        11,
    );
    Arc::new(MatchmakingService::new(
        Matcher::default(),
        catalog,
        Arc::new(InMemorySavedMatchRepository::new()),
        Duration::from_secs(600),
        PersistencePolicy::default(),
    ))
}

fn libya_construction() -> PreferenceSelection {
    PreferenceSelection {
        industry_ids: vec!["1".into()],
        country: Some("Libya".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_integration_end_to_end_matching() {
    let service = service_with(event_catalog(25));

    service.set_preferences("visitor", libya_construction()).await.unwrap();
    let snapshot = service.generate("visitor").await.unwrap();

    assert_eq!(snapshot.state, SessionState::ResultsReady);
    assert_eq!(snapshot.matches.len(), 20);

    let top = &snapshot.matches[0];
    assert_eq!(top.exhibitor_id, "1000");
    assert_eq!(top.score, 60);
    assert_eq!(top.reasons, vec![ReasonCode::Sector, ReasonCode::Country]);
    assert_eq!(top.name.as_deref(), Some("BuildTech Solutions"));

    // silver sponsors (55) ahead of plain sector matches (40), input order within ties
    assert_eq!(snapshot.matches[1].exhibitor_id, "0");
    assert_eq!(snapshot.matches[2].exhibitor_id, "3");
    assert!(snapshot.matches.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_integration_save_is_idempotent() {
    let service = service_with(event_catalog(3));
    service.set_preferences("visitor", libya_construction()).await.unwrap();
    service.generate("visitor").await.unwrap();

    let first = service.save("visitor", "1000").await.unwrap();
    let second = service.save("visitor", "1000").await.unwrap();

    let first = first.saved_match.unwrap();
    let second = second.saved_match.unwrap();
    assert_eq!(first.id, second.id);

    let saved = service.list_saved("visitor").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].exhibitor_id, "1000");
    assert!(service.list_saved("someone-else").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_integration_dismiss_then_refresh() {
    let service = service_with(event_catalog(4));
    service.set_preferences("visitor", libya_construction()).await.unwrap();
    let generated = service.generate("visitor").await.unwrap();

    let dismissed = service.dismiss("visitor", "2").await.unwrap();
    assert_eq!(dismissed.matches.len(), generated.matches.len() - 1);

    let refreshed = service.refresh("visitor").await.unwrap();
    assert_eq!(refreshed.matches.len(), generated.matches.len());
    assert!(refreshed.matches.iter().any(|m| m.exhibitor_id == "2"));
}

#[tokio::test]
async fn test_integration_offline_catalog_degrades_to_empty() {
    let service = service_with(Arc::new(Offline));

    service
        .set_preferences(
            "visitor",
            PreferenceSelection {
                industries: vec!["Energy".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let snapshot = service.generate("visitor").await.unwrap();

    assert_eq!(snapshot.state, SessionState::ResultsReady);
    assert!(snapshot.matches.is_empty());
    assert!(service.industries().await.is_empty());
}

#[actix_web::test]
async fn test_http_workflow() {
    let state = AppState { service: service_with(event_catalog(5)) };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    // dismiss before generate is a caller bug
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/dismiss")
        .set_json(json!({ "userId": "v1", "exhibitorId": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 409);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/preferences")
        .set_json(json!({ "userId": "v1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "v1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/preferences")
        .set_json(json!({ "userId": "v1", "industryIds": ["1"], "country": "Libya" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/generate")
        .set_json(json!({ "userId": "v1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "RESULTS_READY");
    assert_eq!(body["totalResults"], 6);
    assert_eq!(body["matches"][0]["exhibitorId"], "1000");
    assert_eq!(body["matches"][0]["reasons"], json!(["SECTOR", "COUNTRY"]));

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/save")
            .set_json(json!({ "userId": "v1", "exhibitorId": "1000" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["persisted"], true);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/matches/saved?userId=v1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["savedMatches"][0]["status"], "SAVED");

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/save")
        .set_json(json!({ "userId": "", "exhibitorId": "1000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_http_industries_and_health() {
    let state = AppState { service: service_with(event_catalog(0)) };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/industries").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["industries"][0]["name"], "Construction");
    assert_eq!(body["industries"][0]["localizedName"], "البناء");

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}
