

use bytes::Bytes;
use fixtures::MockStore;
use http::{
    Method, Request, StatusCode,
    header::{CONTENT_TYPE, LOCATION},
};
use http_body_util::StreamBody;
use hyper::body::Frame;
use tower::Service;

use crate::people::{
    PeopleApiDefaultStack,
    api::{
        Payload, PeopleRequest, PeopleResponse, StoreRequest, handler::PersonHandler,
        router::MAX_PAYLOAD_BYTES,
    },
    core::person::Person,
    error::PeopleError,
    infrastructure::config::PeopleConfig,
    init_people_api,
};

const API: &str = "/api/people";

fn router(store: MockStore) -> PeopleApiDefaultStack<MockStore> {
    init_people_api(PeopleConfig::default(), store)
}

#[tokio::test]
async fn integration_handle_not_found() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    let response = assert_status!(router, Method::GET, "/api/peple", "", StatusCode::NOT_FOUND);
    assert_eq!(
        fixtures::body_json(response).await["message"],
        "no route for GET /api/peple"
    );
    assert_status!(router, Method::PATCH, "/api/people/4711", "{}", StatusCode::NOT_FOUND);
    assert_status!(router, Method::DELETE, API, "", StatusCode::NOT_FOUND);
    assert_status!(router, Method::PUT, API, "{}", StatusCode::NOT_FOUND);
    assert_status!(router, Method::POST, "/api/people/4711", "{}", StatusCode::NOT_FOUND);
    assert_status!(router, Method::GET, "/api/people/4711/name", "", StatusCode::NOT_FOUND);
    assert!(store.requests().is_empty());
}

#[tokio::test]
async fn integration_handle_find_all() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let mut router = router(MockStore::with_people([
        Person::with_id("4711", "Name1"),
        Person::with_id("4712", "Name2"),
    ]));

    let response = assert_status!(router, Method::GET, API, "", StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(
        fixtures::body_json(response).await,
        serde_json::json!([
            { "id": "4711", "name": "Name1" },
            { "id": "4712", "name": "Name2" },
        ])
    );
}

#[tokio::test]
async fn integration_handle_find_all_empty() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let mut router = router(MockStore::default());

    let response = assert_status!(router, Method::GET, API, "", StatusCode::OK);
    assert_eq!(fixtures::body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn integration_handle_find_by_id() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let mut router = router(MockStore::with_people([Person::with_id("4711", "Name")]));

    let response = assert_status!(router, Method::GET, "/api/people/4711", "", StatusCode::OK);
    assert_person!(response, "4711", "Name");
}

#[tokio::test]
async fn integration_handle_find_by_id_not_found() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    let response =
        assert_status!(router, Method::GET, "/api/people/4711", "", StatusCode::NOT_FOUND);
    assert_eq!(
        fixtures::body_json(response).await,
        serde_json::json!({ "status": 404, "error": "Not Found", "message": "person not found" })
    );
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_delete_by_id() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Name")]);
    let mut router = router(store.clone());

    let response = assert_status!(router, Method::DELETE, "/api/people/4711", "", StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(fixtures::body_json(response).await, "successfully deleted!");
    assert_eq!(
        store.requests(),
        vec![
            StoreRequest::FindById("4711".to_string()),
            StoreRequest::Delete(Person::with_id("4711", "Name")),
        ]
    );
}

#[tokio::test]
async fn integration_handle_delete_by_id_not_found() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    assert_status!(router, Method::DELETE, "/api/people/4711", "", StatusCode::NOT_FOUND);
    assert_eq!(store.count("delete"), 0);
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_create() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default().saving_as(Person::with_id("4711", "Name"));
    let mut router = router(store.clone());

    let response =
        assert_status!(router, Method::POST, API, r#"{"name":"Name"}"#, StatusCode::CREATED);
    assert_eq!(response.headers()[LOCATION], "/api/people/4711");
    assert_person!(response, "4711", "Name");
    assert_eq!(store.saved(), vec![Person::new("Name")]);
}

#[tokio::test]
async fn integration_handle_create_assigns_location_from_saved_id() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let mut router = router(MockStore::default());

    let response =
        assert_status!(router, Method::POST, API, r#"{"name":"Name1"}"#, StatusCode::CREATED);
    assert_eq!(response.headers()[LOCATION], format!("{API}/4711"));
    assert_person!(response, "4711", "Name1");
}

#[tokio::test]
async fn integration_handle_create_bad_request() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    for body in ["", "null"] {
        let response = assert_status!(router, Method::POST, API, body, StatusCode::BAD_REQUEST);
        assert_eq!(fixtures::body_json(response).await["message"], "person must not be null");
    }
    assert_status!(router, Method::POST, API, "{\"name\":", StatusCode::BAD_REQUEST);
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_create_valid() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    for name in ["N", "Name", "0123456789"] {
        let store = MockStore::default().saving_as(Person::with_id("4711", name));
        let mut router = router(store.clone());
        let body = serde_json::json!({ "name": name }).to_string();

        let response = assert_status!(router, Method::POST, API, &body, StatusCode::CREATED);
        assert!(response.headers().contains_key(LOCATION));
        assert_person!(response, "4711", name);
        assert_eq!(store.saved(), vec![Person::new(name)]);
    }
}

#[tokio::test]
async fn integration_handle_create_invalid() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    for body in [r#"{"name":null}"#, r#"{"name":""}"#, r#"{"name":"00123456789"}"#, "{}"] {
        let store = MockStore::default();
        let mut router = router(store.clone());

        let response = assert_status!(router, Method::POST, API, body, StatusCode::BAD_REQUEST);
        let error = fixtures::body_json(response).await;
        assert!(error["message"].as_str().unwrap().contains("Name - "), "{error}");
        assert!(!error["violations"].as_array().unwrap().is_empty());
        assert_eq!(store.count("save"), 0);
    }
}

#[tokio::test]
async fn integration_handle_update() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Old")])
        .saving_as(Person::with_id("4711", "Name"));
    let mut router = router(store.clone());

    let response = assert_status!(
        router,
        Method::PUT,
        "/api/people/4711",
        r#"{"id":"4711","name":"Update"}"#,
        StatusCode::OK
    );
    assert_person!(response, "4711", "Name");
    assert_eq!(store.saved(), vec![Person::with_id("4711", "Update")]);
}

#[tokio::test]
async fn integration_handle_update_uses_path_id() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Old")]);
    let mut router = router(store.clone());

    let response = assert_status!(
        router,
        Method::PUT,
        "/api/people/4711",
        r#"{"id":"0815","name":"Update"}"#,
        StatusCode::OK
    );
    assert_person!(response, "4711", "Update");
    assert_eq!(store.saved(), vec![Person::with_id("4711", "Update")]);
}

#[tokio::test]
async fn integration_handle_update_not_found() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    assert_status!(
        router,
        Method::PUT,
        "/api/people/4711",
        r#"{"id":"4711","name":"Update"}"#,
        StatusCode::NOT_FOUND
    );
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_update_not_found_takes_precedence_over_bad_request() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    for body in ["", "null", r#"{"name":""}"#, r#"{"name":"00123456789"}"#, "{\"name\":"] {
        assert_status!(router, Method::PUT, "/api/people/4711", body, StatusCode::NOT_FOUND);
    }
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_update_valid() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    for name in ["N", "Name", "0123456789"] {
        let store = MockStore::with_people([Person::with_id("4711", "Old")]);
        let mut router = router(store.clone());
        let body = serde_json::json!({ "id": "4711", "name": name }).to_string();

        let response =
            assert_status!(router, Method::PUT, "/api/people/4711", &body, StatusCode::OK);
        assert_person!(response, "4711", name);
        assert_eq!(store.saved(), vec![Person::with_id("4711", name)]);
    }
}

#[tokio::test]
async fn integration_handle_update_invalid() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    for body in [
        "",
        r#"{"id":"4711","name":null}"#,
        r#"{"id":"4711","name":""}"#,
        r#"{"id":"4711","name":"00123456789"}"#,
    ] {
        let store = MockStore::with_people([Person::with_id("4711", "Old")]);
        let mut router = router(store.clone());

        assert_status!(router, Method::PUT, "/api/people/4711", body, StatusCode::BAD_REQUEST);
        assert_eq!(store.count("findById"), 1);
        assert_eq!(store.count("save"), 0);
    }
}

#[tokio::test]
async fn integration_handle_store_failure() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Old")])
        .failing_with(PeopleError::StoreFailure("connection refused".to_string()));
    let mut router = router(store);

    let response = assert_status!(
        router,
        Method::GET,
        "/api/people/4711",
        "",
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        fixtures::body_json(response).await["message"],
        "storage failure: connection refused"
    );
    assert_status!(router, Method::GET, API, "", StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn integration_handle_delete_store_failure() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Name")])
        .failing_on("delete", PeopleError::StoreFailure("write conflict".to_string()));
    let mut router = router(store.clone());

    let response = assert_status!(
        router,
        Method::DELETE,
        "/api/people/4711",
        "",
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(fixtures::body_json(response).await["message"], "storage failure: write conflict");
    assert_eq!(
        store.requests(),
        vec![
            StoreRequest::FindById("4711".to_string()),
            StoreRequest::Delete(Person::with_id("4711", "Name")),
        ]
    );
}

#[tokio::test]
async fn integration_handle_save_store_failure() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Old")])
        .failing_on("save", PeopleError::StoreFailure("disk full".to_string()));
    let mut router = router(store.clone());

    let response = assert_status!(
        router,
        Method::POST,
        API,
        r#"{"name":"Name"}"#,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(fixtures::body_json(response).await["message"], "storage failure: disk full");
    let response = assert_status!(
        router,
        Method::PUT,
        "/api/people/4711",
        r#"{"name":"Update"}"#,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert!(!response.headers().contains_key(LOCATION));
    assert_eq!(store.count("save"), 2);
}

#[tokio::test]
async fn integration_handle_find_all_stream_failure() {
    use http_body_util::BodyExt;

    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Name")])
        .streaming_failure(PeopleError::StoreFailure("cursor lost".to_string()));
    let mut router = router(store);

    let response = assert_status!(router, Method::GET, API, "", StatusCode::OK);
    assert_eq!(
        response.into_body().collect().await.err(),
        Some(PeopleError::StoreFailure("cursor lost".to_string()))
    );
}

#[tokio::test]
async fn integration_handle_create_rejects_unaddressable_id() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default();
    let mut router = router(store.clone());

    assert_status!(
        router,
        Method::POST,
        API,
        r#"{"id":"a\nb","name":"Name"}"#,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_oversized_payload() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Old")]);
    let mut router = router(store.clone());
    let body = format!(r#"{{"name":"{}"}}"#, "x".repeat(MAX_PAYLOAD_BYTES));

    assert_status!(router, Method::POST, API, &body, StatusCode::BAD_REQUEST);
    assert_status!(router, Method::PUT, "/api/people/4711", &body, StatusCode::BAD_REQUEST);
    assert_status!(router, Method::PUT, "/api/people/0815", &body, StatusCode::NOT_FOUND);
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handle_unreadable_body_keeps_not_found_precedence() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::with_people([Person::with_id("4711", "Old")]);
    let mut router = router(store.clone());
    let broken = || {
        let frames = futures::stream::iter(vec![Err::<Frame<Bytes>, _>(std::io::Error::other(
            "connection reset",
        ))]);
        StreamBody::new(frames)
    };

    for (uri, status) in
        [("/api/people/0815", StatusCode::NOT_FOUND), ("/api/people/4711", StatusCode::BAD_REQUEST)]
    {
        let request = Request::builder().method(Method::PUT).uri(uri).body(broken()).unwrap();
        let response = router.call(request).await.unwrap();
        assert_eq!(response.status(), status, "PUT {uri}");
    }
    assert_eq!(store.count("save"), 0);
}

#[tokio::test]
async fn integration_handler_short_circuits_on_failure() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default()
        .failing_with(PeopleError::StoreFailure("connection refused".to_string()));
    let mut handler = PersonHandler::new(store.clone(), PeopleConfig::default());

    assert_eq!(
        handler
            .call(PeopleRequest::Update {
                id: "4711".to_string(),
                payload: Payload::from_person(&Person::new("Update")).unwrap(),
            })
            .await
            .unwrap_err(),
        PeopleError::StoreFailure("connection refused".to_string())
    );
    assert_eq!(store.requests(), vec![StoreRequest::FindById("4711".to_string())]);
}

#[tokio::test]
async fn integration_handler_rejects_store_without_ids() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let store = MockStore::default().saving_as(Person::new("Name"));
    let mut handler = PersonHandler::new(store, PeopleConfig::default());

    assert_eq!(
        handler
            .call(PeopleRequest::Create(Payload::new(r#"{"name":"Name"}"#)))
            .await
            .unwrap_err(),
        PeopleError::InternalPeopleError
    );
}

#[tokio::test]
async fn integration_custom_api_base() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let config = PeopleConfig::new("/v2/persons/").unwrap();
    let mut router = init_people_api(config, MockStore::default());

    let response = assert_status!(
        router,
        Method::POST,
        "/v2/persons",
        r#"{"name":"Name"}"#,
        StatusCode::CREATED
    );
    assert_eq!(response.headers()[LOCATION], "/v2/persons/4711");
    assert_status!(router, Method::GET, API, "", StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn integration_handler_response_variants() {
    #[cfg(feature = "people_tracing")]
    crate::people_tracing::init();
    let mut handler = PersonHandler::new(
        MockStore::with_people([Person::with_id("4711", "Name")]),
        PeopleConfig::default(),
    );

    assert!(matches!(
        handler.call(PeopleRequest::FindById("4711".to_string())).await.unwrap(),
        PeopleResponse::Found(person) if person == Person::with_id("4711", "Name")
    ));
    assert!(matches!(
        handler.call(PeopleRequest::Create(Payload::empty())).await.unwrap_err(),
        PeopleError::MissingPerson
    ));
}
