//! Model shapes the generator emits for nested and self-referencing entities.

use sdkgen_runtime::{Dispatcher, Gateway, Model, Nullable, Route, StandardRoutes, Verb};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `Node { name: string, parent: Node, sibling: Node? }` as generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Node {
    #[serde(default, deserialize_with = "sdkgen_runtime::convert::null_as_default")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Box<Node>>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    sibling: Nullable<Box<Node>>,
}

impl Model for Node {
    const NAME: &'static str = "Node";
    const ROUTES: StandardRoutes = StandardRoutes {
        create: Route::new(Verb::Post, "/Nodes"),
        upsert: Route::new(Verb::Put, "/Nodes"),
        exists: Route::new(Verb::Get, "/Nodes/:id/exists"),
        find_by_id: Route::new(Verb::Get, "/Nodes/:id"),
        find: Route::new(Verb::Get, "/Nodes"),
        find_one: Route::new(Verb::Get, "/Nodes/findOne"),
        update_all: Route::new(Verb::Post, "/Nodes/update"),
        delete_by_id: Route::new(Verb::Delete, "/Nodes/:id"),
        count: Route::new(Verb::Get, "/Nodes/count"),
        update_attributes: Route::new(Verb::Put, "/Nodes/:id"),
    };
}

#[test]
fn self_referencing_model_decodes_finite_chain() {
    let node: Node = serde_json::from_value(json!({
        "name": "a",
        "parent": { "name": "b", "parent": null },
        "sibling": null
    }))
    .unwrap();

    let parent = node.parent.as_deref().unwrap();
    assert_eq!(parent.name, "b");
    assert_eq!(parent.parent, None);
    assert!(parent.sibling.is_absent());
    assert!(node.sibling.is_null());
    assert_eq!(Node::default().parent, None);
}

#[test]
fn self_referencing_model_serializes_without_empty_parents() {
    let node = Node {
        name: "leaf".to_string(),
        parent: Some(Box::new(Node {
            name: "root".to_string(),
            ..Node::default()
        })),
        sibling: Nullable::Absent,
    };
    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        json!({ "name": "leaf", "parent": { "name": "root" } })
    );
}

#[tokio::test]
async fn identifiers_cannot_escape_their_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/Nodes/..%2FOrders%2F9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/Nodes/7%3Fx%3D1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "seven" })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Gateway::with_base_url(format!("{}/api", server.uri())).unwrap();
    let nodes: Dispatcher<Node> = Dispatcher::new(gateway);

    nodes.delete_by_id("../Orders/9").await.unwrap();
    let found = nodes.find_by_id("7?x=1").await.unwrap();
    assert_eq!(found.name, "seven");
}
