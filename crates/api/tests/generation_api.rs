//! Integration tests for panel, page and character image generation.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, post, post_json, put_json};
use panelsmith_core::model::ImageQuality;
use serde_json::{json, Value};

fn mira() -> Value {
    json!({"id": "char-mira", "name": "Mira", "description": "A pilot", "imageUrl": "mira-ref", "type": "generate"})
}

fn prior(scene: &str, image: &str) -> Value {
    json!({"scene": scene, "image": image})
}

// ---------------------------------------------------------------------------
// Single panel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_panel_content_is_rejected_before_any_call() {
    let test = common::build_test_app().await;

    let response = post_json(
        test.router(),
        "/api/v1/generate-panel",
        json!({"content": "   ", "characters": [mira()]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(test.analyzer.calls(), 0);
    assert!(test.generator.calls().is_empty());
}

#[tokio::test]
async fn generate_panel_uses_references_and_last_two_prior_panels() {
    let test = common::build_test_app().await;
    test.analyzer.detect(&["mira", "Stranger"]);

    let response = post_json(
        test.router(),
        "/api/v1/generate-panel",
        json!({
            "content": "Mira lands the plane",
            "characters": [mira()],
            "previousPanels": [prior("one", "p1"), prior("two", "p2"), prior("three", "p3")],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["imageUrl"], "image-1");
    assert_eq!(json["detectedCharacters"], json!(["mira", "Stranger"]));
    assert_eq!(json["matchedCharacters"], json!(["Mira"]));
    assert_eq!(json["sceneInfo"]["scene_description"], "Mira lands the plane");

    let calls = test.generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].quality, ImageQuality::High);
    assert_eq!(calls[0].images, vec!["mira-ref", "p2", "p3"]);
    assert!(calls[0].text.contains("Panel 2 ago: \"two\""));
    assert!(calls[0].text.contains("Panel 1 ago: \"three\""));
    assert!(!calls[0].text.contains("\"one\""));
}

#[tokio::test]
async fn v2_uses_prior_panel_only_when_image_and_scene_are_given() {
    let test = common::build_test_app().await;

    let response = post_json(
        test.router(),
        "/api/v1/generate-panel-v2",
        json!({
            "content": "The storm hits",
            "previousPanelImage": "prev-img",
            "previousPanelScene": "Clouds gather",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        test.router(),
        "/api/v1/generate-panel-v2",
        json!({"content": "The storm hits", "previousPanelImage": "prev-img"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = test.generator.calls();
    assert_eq!(calls[0].images, vec!["prev-img"]);
    assert!(calls[0].text.contains("Panel 1 ago: \"Clouds gather\""));
    assert!(calls[1].images.is_empty());
    assert!(!calls[1].text.contains("Previous Context"));
}

#[tokio::test]
async fn upstream_failure_returns_502() {
    let test = common::build_test_app().await;
    test.generator.fail_on(1);

    let response = post_json(
        test.router(),
        "/api/v1/generate-panel",
        json!({"content": "A quiet harbour"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["error"], "Failed to generate image");
}

// ---------------------------------------------------------------------------
// Character image
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_character_uses_character_quality() {
    let test = common::build_test_app().await;

    let response = post_json(
        test.router(),
        "/api/v1/generate-character",
        json!({"prompt": "A tall pilot with red hair"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["imageUrl"], "image-1");

    let calls = test.generator.calls();
    assert_eq!(calls[0].quality, ImageQuality::Low);
    assert_eq!(calls[0].text, "A tall pilot with red hair");

    let response = post_json(test.router(), "/api/v1/generate-character", json!({"prompt": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test.generator.calls().len(), 1);
}

// ---------------------------------------------------------------------------
// Page sequence
// ---------------------------------------------------------------------------

/// Create a project with one page whose panels hold `contents`.
async fn page_with_contents(test: &common::TestApp, contents: &[&str]) -> (String, String) {
    let project = create_project(test.router(), "Sequence").await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let page = body_json(
        post_json(
            test.router(),
            &format!("/api/v1/projects/{project_id}/pages"),
            json!({"panelCount": contents.len()}),
        )
        .await,
    )
    .await;
    let page_id = page["id"].as_str().unwrap().to_string();

    for (index, content) in contents.iter().enumerate() {
        let response = put_json(
            test.router(),
            &format!("/api/v1/projects/{project_id}/pages/{page_id}/panels/panel-{index}"),
            json!({ "content": content }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    (project_id, page_id)
}

#[tokio::test]
async fn page_generation_commits_all_panels_in_order() {
    let test = common::build_test_app().await;
    let (project_id, page_id) = page_with_contents(&test, &["Dawn", "Noon", "Dusk"]).await;

    let response = post(
        test.router(),
        &format!("/api/v1/projects/{project_id}/pages/{page_id}/generate"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let panels = json["page"]["panels"].as_array().unwrap();
    assert_eq!(panels[0]["imageUrl"], "image-1");
    assert_eq!(panels[1]["imageUrl"], "image-2");
    assert_eq!(panels[2]["imageUrl"], "image-3");
    assert_eq!(json["panels"].as_array().unwrap().len(), 3);

    let calls = test.generator.calls();
    assert!(calls[0].images.is_empty());
    assert_eq!(calls[1].images, vec!["image-1"]);
    assert_eq!(calls[2].images, vec!["image-1", "image-2"]);

    let stored = test.state.store.find_by_id(&project_id).await.unwrap();
    let page = stored.comic.page(&page_id).unwrap();
    assert!(page.panels.iter().all(|p| p.image.is_some()));
}

#[tokio::test]
async fn page_with_blank_panel_is_rejected_before_any_call() {
    let test = common::build_test_app().await;
    let (project_id, page_id) = page_with_contents(&test, &["Dawn", "  ", "Dusk"]).await;

    let response = post(
        test.router(),
        &format!("/api/v1/projects/{project_id}/pages/{page_id}/generate"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("panel 2"), "unexpected message: {message}");
    assert_eq!(test.analyzer.calls(), 0);
    assert!(test.generator.calls().is_empty());
}

#[tokio::test]
async fn failed_run_commits_nothing() {
    let test = common::build_test_app().await;
    let (project_id, page_id) = page_with_contents(&test, &["Dawn", "Noon", "Dusk"]).await;
    test.generator.fail_on(2);

    let response = post(
        test.router(),
        &format!("/api/v1/projects/{project_id}/pages/{page_id}/generate"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(test.generator.calls().len(), 2);

    let stored = test.state.store.find_by_id(&project_id).await.unwrap();
    let page = stored.comic.page(&page_id).unwrap();
    assert!(page.panels.iter().all(|p| p.image.is_none()));
    assert!(!test.state.in_flight.is_running(&project_id));
}

#[tokio::test]
async fn overlapping_run_is_rejected() {
    let test = common::build_test_app().await;
    let (project_id, page_id) = page_with_contents(&test, &["Dawn"]).await;

    let _guard = test.state.in_flight.try_acquire(&project_id).unwrap();
    let response = post(
        test.router(),
        &format!("/api/v1/projects/{project_id}/pages/{page_id}/generate"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(test.generator.calls().is_empty());
}
