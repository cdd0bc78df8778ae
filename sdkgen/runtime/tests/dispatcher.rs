//! Dispatcher behaviour against a wiremock loopback server.

mod common;

use common::Customer;
use sdkgen_runtime::{Dispatcher, Gateway, MappingError, Nullable, SdkError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

async fn dispatcher(server: &MockServer) -> Dispatcher<Customer> {
    let gateway = Gateway::with_base_url(format!("{}/api", server.uri())).unwrap();
    Dispatcher::new(gateway)
}

/// Responds with the request body, like a backend that stores and returns it.
struct Echo;

impl Respond for Echo {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_bytes(request.body.clone())
    }
}

#[tokio::test]
async fn find_returns_ordered_instances_with_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers"))
        .and(query_param("filter", "{}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "A" },
            { "name": "B", "age": 30 }
        ])))
        .mount(&server)
        .await;

    let customers = dispatcher(&server).await.find("{}").await.unwrap();

    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].name, "A");
    assert_eq!(customers[0].age, Nullable::Absent);
    assert_eq!(customers[1].name, "B");
    assert_eq!(customers[1].age, Nullable::Value(30));
}

#[tokio::test]
async fn count_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 7 })))
        .mount(&server)
        .await;

    assert_eq!(dispatcher(&server).await.count("").await.unwrap(), 7);
}

#[tokio::test]
async fn count_with_unexpected_envelope_is_mapping_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": 7 })))
        .mount(&server)
        .await;

    let err = dispatcher(&server).await.count("").await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::Mapping(MappingError::UnexpectedEnvelope { .. })
    ));
}

#[tokio::test]
async fn exists_unwraps_boolean() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers/12/exists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "exists": true })))
        .mount(&server)
        .await;

    assert!(dispatcher(&server).await.exists("12").await.unwrap());
}

#[tokio::test]
async fn create_round_trips_through_echo() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Customers"))
        .respond_with(Echo)
        .mount(&server)
        .await;

    let customers = dispatcher(&server).await;
    for original in [
        Customer {
            name: "Ada".to_string(),
            age: Nullable::Value(36),
        },
        Customer {
            name: "Bob".to_string(),
            age: Nullable::Null,
        },
        Customer {
            name: "Cy".to_string(),
            age: Nullable::Absent,
        },
    ] {
        let echoed = customers.create(&original).await.unwrap();
        assert_eq!(echoed, original);
    }
}

#[tokio::test]
async fn update_attributes_sends_body_to_instance_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/Customers/5"))
        .and(body_json(json!({ "name": "Eve", "age": null })))
        .respond_with(Echo)
        .mount(&server)
        .await;

    let updated = dispatcher(&server)
        .await
        .update_attributes(
            "5",
            &Customer {
                name: "Eve".to_string(),
                age: Nullable::Null,
            },
        )
        .await
        .unwrap();
    assert!(updated.age.is_null());
}

#[tokio::test]
async fn find_one_maps_not_found_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers/findOne"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    assert_eq!(dispatcher(&server).await.find_one("{}").await.unwrap(), None);
}

#[tokio::test]
async fn find_one_returns_instance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Z", "age": null })))
        .mount(&server)
        .await;

    let found = dispatcher(&server).await.find_one("").await.unwrap().unwrap();
    assert_eq!(found.name, "Z");
    assert!(found.age.is_null());
}

#[tokio::test]
async fn delete_by_id_surfaces_non_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/Customers/9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = dispatcher(&server).await.delete_by_id("9").await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn update_all_passes_where_clause() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Customers/update"))
        .and(query_param("where", "{\"name\":\"A\"}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let data = Customer {
        name: "A2".to_string(),
        age: Nullable::Absent,
    };
    dispatcher(&server)
        .await
        .update_all("{\"name\":\"A\"}", &data)
        .await
        .unwrap();
}

#[tokio::test]
async fn find_by_id_rejects_wrong_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Customers/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let err = dispatcher(&server).await.find_by_id("1").await.unwrap_err();
    match err {
        SdkError::Request(e) => assert_eq!(e.status_code(), 0),
        other => panic!("expected a request error, got {other:?}"),
    }
}
