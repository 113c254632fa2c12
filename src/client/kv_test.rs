use tracing_test::traced_test;

use crate::test_utils::MockResponse;
use crate::test_utils::MockStore;
use crate::BlockingQueryOptions;
use crate::Client;
use crate::Error;
use crate::KeyValueOptions;

const LEADER_ENTRY: &str = r#"[{
    "LockIndex": 1,
    "Key": "service/web/leader",
    "Flags": 0,
    "Value": "bm9kZS0x",
    "Session": "adf4238a-882b-9ddc-4a9d-5b6758e4159e",
    "CreateIndex": 100,
    "ModifyIndex": 200
}]"#;

async fn client_for(store: &MockStore) -> Client {
    Client::new(store.config()).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_get_value_decodes_entry() {
    let store = MockStore::start(vec![MockResponse::ok(LEADER_ENTRY).with_index(200)]).await;
    let client = client_for(&store).await;

    let entry = client.kv().get_value("service/web/leader", None).await.unwrap().unwrap();

    assert_eq!(entry.value.as_deref(), Some("node-1"));
    assert_eq!(entry.lock_index, 1);
    assert_eq!(entry.session.as_deref(), Some("adf4238a-882b-9ddc-4a9d-5b6758e4159e"));
    assert_eq!(store.last_request().unwrap().path, "/v1/kv/service/web/leader");
}

#[tokio::test]
#[traced_test]
async fn test_get_value_of_missing_key_is_none() {
    let store = MockStore::start(vec![MockResponse::not_found().with_index(17)]).await;
    let client = client_for(&store).await;

    assert_eq!(client.kv().get_value("missing", None).await.unwrap(), None);
}

#[tokio::test]
#[traced_test]
async fn test_get_value_passes_blocking_options() {
    let store = MockStore::start(vec![MockResponse::ok(LEADER_ENTRY).with_index(201)]).await;
    let client = client_for(&store).await;

    let options = BlockingQueryOptions::new(200, "30s");
    client.kv().get_value("service/web/leader", Some(&options)).await.unwrap();

    let request = store.last_request().unwrap();
    assert_eq!(request.param("index").as_deref(), Some("200"));
    assert_eq!(request.param("wait").as_deref(), Some("30s"));
}

#[tokio::test]
#[traced_test]
async fn test_get_values_carries_index() {
    let body = r#"[
        {"Key": "app/a", "Value": "MQ==", "ModifyIndex": 4},
        {"Key": "app/b", "Value": null, "ModifyIndex": 5}
    ]"#;
    let store = MockStore::start(vec![MockResponse::ok(body).with_index(5)]).await;
    let client = client_for(&store).await;

    let list = client.kv().get_values("app", None).await.unwrap();

    assert_eq!(list.index, 5);
    assert_eq!(list.list.len(), 2);
    assert_eq!(list.list[0].value.as_deref(), Some("1"));
    assert_eq!(list.list[1].value, None);
    assert_eq!(store.last_request().unwrap().param("recurse").as_deref(), Some(""));
}

#[tokio::test]
#[traced_test]
async fn test_get_values_of_empty_prefix_is_empty_list() {
    let store = MockStore::start(vec![MockResponse::not_found().with_index(9)]).await;
    let client = client_for(&store).await;

    let list = client.kv().get_values("nothing/here", None).await.unwrap();
    assert_eq!(list.index, 9);
    assert!(list.list.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_get_keys() {
    let store = MockStore::start(vec![
        MockResponse::ok(r#"["app/a","app/b"]"#),
        MockResponse::not_found(),
    ])
    .await;
    let client = client_for(&store).await;

    assert_eq!(client.kv().get_keys("app", None).await.unwrap(), vec!["app/a", "app/b"]);
    assert!(client.kv().get_keys("none", None).await.unwrap().is_empty());
    assert_eq!(store.requests()[0].param("keys").as_deref(), Some(""));
}

#[tokio::test]
#[traced_test]
async fn test_put_value_with_options() {
    let store = MockStore::start(vec![MockResponse::ok("true\n")]).await;
    let client = client_for(&store).await;

    let options = KeyValueOptions {
        flags: 42,
        acquire_session: Some("sess-1".to_string()),
        cas_index: Some(0),
        ..KeyValueOptions::default()
    };
    assert!(client.kv().put_value("locks/db", "owner", Some(&options)).await.unwrap());

    let request = store.last_request().unwrap();
    assert_eq!(request.method.as_str(), "PUT");
    assert_eq!(request.path, "/v1/kv/locks/db");
    assert_eq!(request.param("flags").as_deref(), Some("42"));
    assert_eq!(request.param("acquire").as_deref(), Some("sess-1"));
    assert_eq!(request.param("cas").as_deref(), Some("0"));
    assert_eq!(request.param("release"), None);
    assert_eq!(&request.body[..], b"owner");
}

#[tokio::test]
#[traced_test]
async fn test_put_value_rejected_by_cas() {
    let store = MockStore::start(vec![MockResponse::ok("false")]).await;
    let client = client_for(&store).await;

    assert!(!client.kv().put_value("locks/db", "owner", None).await.unwrap());
}

#[tokio::test]
async fn test_put_value_requires_key() {
    let client = Client::builder().build().unwrap();
    let err = client.kv().put_value("", "v", None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
#[traced_test]
async fn test_delete_value_and_values() {
    let store = MockStore::start(vec![MockResponse::ok("true"), MockResponse::ok("true")]).await;
    let client = client_for(&store).await;

    client.kv().delete_value("app/a").await.unwrap();
    client.kv().delete_values("app").await.unwrap();

    let requests = store.requests();
    assert_eq!(requests[0].method.as_str(), "DELETE");
    assert_eq!(requests[0].param("recurse"), None);
    assert_eq!(requests[1].path, "/v1/kv/app");
    assert_eq!(requests[1].param("recurse").as_deref(), Some(""));
}
