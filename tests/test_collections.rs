mod common;

use common::{TestEnvironment, ACCESS_TOKEN};
use pretty_assertions::assert_eq;
use raindrop_client::client::{NewCollection, View};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_authorize_then_list_root_collections() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok1",
            "refresh_token": "ref1",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "items": [{ "_id": 1, "title": "Inbox", "count": 3, "view": "list" }],
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let authorize = env.client.authorization_url();
    assert!(authorize.as_str().starts_with(&env.url("/oauth/authorize?")));

    let credential = env
        .client
        .exchange_code("xyz", None)
        .await
        .expect("Token exchange should succeed");
    assert_eq!(credential.expires_in, Some(3600));

    let collections = env
        .client
        .get_root_collections(&credential.access_token, None)
        .await
        .expect("Listing root collections should succeed");

    assert!(collections.result);
    assert_eq!(collections.items.len(), 1);
    assert_eq!(collections.items[0].id, 1);
    assert_eq!(collections.items[0].title, "Inbox");
    assert!(collections.items[0].is_root());
}

#[tokio::test]
async fn test_get_child_collections() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections/childrens"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "items": [
                { "_id": 10, "title": "Rust", "parent": { "$id": 1 } },
                { "_id": 11, "title": "Go", "parent": { "$id": 1 } },
            ],
        })))
        .mount(&env.server)
        .await;

    let children = env
        .client
        .get_child_collections(ACCESS_TOKEN, None)
        .await
        .unwrap();

    let ids: Vec<i64> = children.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert!(children.items.iter().all(|c| c.parent_id() == Some(1)));
}

#[tokio::test]
async fn test_get_collection_by_id() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collection/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "item": { "_id": 42, "title": "Recipes", "public": true, "view": "masonry" },
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let response = env
        .client
        .get_collection(ACCESS_TOKEN, 42, None)
        .await
        .unwrap();

    let collection = response.item.expect("collection should be present");
    assert_eq!(collection.id, 42);
    assert!(collection.public);
    assert_eq!(collection.view, Some(View::Masonry));
}

#[tokio::test]
async fn test_get_missing_collection_is_application_failure() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collection/404"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "result": false,
            "errorMessage": "Collection not found",
        })))
        .mount(&env.server)
        .await;

    let response = env
        .client
        .get_collection(ACCESS_TOKEN, 404, None)
        .await
        .expect("result:false is returned, not raised");

    assert!(!response.result);
    assert!(response.item.is_none());
    assert_eq!(response.error_message.as_deref(), Some("Collection not found"));
}

#[tokio::test]
async fn test_create_root_collection_omits_parent() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/collection"))
        .and(body_json(json!({
            "title": "Inbox",
            "view": "list",
            "sort": 1,
            "public": false,
            "cover": ["https://example.com/c.png"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "item": { "_id": 5, "title": "Inbox" },
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let new = NewCollection::root("Inbox")
        .with_view(View::List)
        .with_sort(1)
        .with_public(false)
        .with_cover(vec!["https://example.com/c.png".to_string()]);

    let created = env
        .client
        .create_collection(ACCESS_TOKEN, &new, None)
        .await
        .unwrap();

    assert_eq!(created.item.unwrap().id, 5);

    let body: serde_json::Value = env.requests().await[0].body_json().unwrap();
    assert!(body.get("parent.$id").is_none());
}

#[tokio::test]
async fn test_create_child_collection_sends_parent_even_when_zero() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/collection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "item": { "_id": 6, "title": "Nested", "parent": { "$id": 0 } },
        })))
        .mount(&env.server)
        .await;

    for parent in [0i64, 17] {
        let new = NewCollection::child("Nested", parent);
        env.client
            .create_collection(ACCESS_TOKEN, &new, None)
            .await
            .unwrap();
    }

    let requests = env.requests().await;
    assert_eq!(requests.len(), 2);
    let first: serde_json::Value = requests[0].body_json().unwrap();
    let second: serde_json::Value = requests[1].body_json().unwrap();
    assert_eq!(first, json!({ "title": "Nested", "parent.$id": 0 }));
    assert_eq!(second, json!({ "title": "Nested", "parent.$id": 17 }));
}

#[tokio::test]
async fn test_unauthorized_is_status_error() {
    common::init_test_logging();
    let env = TestEnvironment::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/collections"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&env.server)
        .await;

    let err = env
        .client
        .get_root_collections("expired", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
}
