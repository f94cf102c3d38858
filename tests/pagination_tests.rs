//! Cursor pagination across collection listings

mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use serde_json::Value;

use common::{ALICE_SUBJECT, ALICE_TOKEN, bearer, create_boat, next_path, test_server};

#[tokio::test]
async fn test_first_page_carries_count_and_next() {
    let server = test_server();
    for i in 0..7 {
        create_boat(&server, ALICE_TOKEN, &format!("Boat {i}"), false).await;
    }

    let response = server
        .get("/boats")
        .add_header(AUTHORIZATION, bearer(ALICE_TOKEN))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["count"], serde_json::json!(7));
    let next = body["next"].as_str().expect("next link present");
    assert!(next.contains("/boats?cursor="));
}

#[tokio::test]
async fn test_walking_next_links_visits_every_boat_once() {
    let server = test_server();
    let mut created = HashSet::new();
    for i in 0..12 {
        let entity = create_boat(&server, ALICE_TOKEN, &format!("Boat {i}"), false).await;
        created.insert(entity["id"].as_str().unwrap().to_string());
    }

    let mut seen = HashSet::new();
    let mut path = "/boats".to_string();
    loop {
        let response = server
            .get(&path)
            .add_header(AUTHORIZATION, bearer(ALICE_TOKEN))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<Value>();

        for item in body["items"].as_array().unwrap() {
            let id = item["id"].as_str().unwrap().to_string();
            assert!(seen.insert(id), "page overlap: an id appeared twice");
        }

        match next_path(&body) {
            Some(next) => path = next,
            None => break,
        }
    }

    assert_eq!(seen, created);
}

#[tokio::test]
async fn test_exact_page_boundary_has_no_next() {
    let server = test_server();
    for i in 0..5 {
        create_boat(&server, ALICE_TOKEN, &format!("Boat {i}"), false).await;
    }

    let response = server
        .get("/boats")
        .add_header(AUTHORIZATION, bearer(ALICE_TOKEN))
        .await;
    let body = response.json::<Value>();

    assert_eq!(body["items"].as_array().unwrap().len(), 5);
    assert!(body.get("next").is_none());
}

#[tokio::test]
async fn test_owner_listing_pages_through_the_nested_path() {
    let server = test_server();
    for i in 0..6 {
        create_boat(&server, ALICE_TOKEN, &format!("Boat {i}"), true).await;
    }

    let first = server.get(&format!("/owners/{ALICE_SUBJECT}/boats")).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let body = first.json::<Value>();

    assert_eq!(body["count"], serde_json::json!(6));
    let next = body["next"].as_str().expect("next link present");
    assert!(next.contains(&format!("/owners/{ALICE_SUBJECT}/boats?cursor=")));
    // per-item self links still point at the canonical collection
    assert!(body["items"][0]["self"].as_str().unwrap().contains("/boats/"));

    let second = server.get(&next_path(&body).unwrap()).await;
    assert_eq!(second.status_code(), StatusCode::OK);
    assert_eq!(second.json::<Value>()["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stale_cursor_is_rejected() {
    let server = test_server();
    create_boat(&server, ALICE_TOKEN, "Boat", false).await;

    let response = server
        .get("/boats?cursor=definitely-not-a-cursor")
        .add_header(AUTHORIZATION, bearer(ALICE_TOKEN))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
