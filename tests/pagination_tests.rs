//! Integration tests for the pagination engine.
//!
//! These tests walk mock JSON:API collections to verify sequential,
//! parallel, and streaming traversal, termination conditions, and the
//! same-page loop guard.

use futures::StreamExt;
use pco_api::clients::HttpClient;
use pco_api::pagination::{PageOptions, Paginator};
use pco_api::{AuthConfig, PcoConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HttpClient {
    let config = PcoConfig::builder()
        .auth(AuthConfig::oauth("test-token").unwrap())
        .base_url(base_url)
        .build()
        .unwrap();
    HttpClient::new(config)
}

fn people(ids: &[u32]) -> Vec<serde_json::Value> {
    ids.iter()
        .map(|id| {
            serde_json::json!({
                "type": "Person",
                "id": id.to_string(),
                "attributes": {"first_name": format!("Person {id}")}
            })
        })
        .collect()
}

fn page_body(
    ids: &[u32],
    total_count: u64,
    next: Option<String>,
) -> serde_json::Value {
    serde_json::json!({
        "data": people(ids),
        "links": {"self": "ignored", "next": next},
        "meta": {"total_count": total_count, "count": ids.len()}
    })
}

fn two_per_page() -> PageOptions {
    PageOptions {
        per_page: 2,
        max_pages: None,
        max_concurrency: 5,
    }
}

#[tokio::test]
async fn test_sequential_walk_collects_every_page() {
    let mock_server = MockServer::start().await;
    let next = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[3, 4], 4, None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 4, Some(next))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let set = Paginator::new(&client)
        .get_all_pages("/people/v2/people", Vec::new(), two_per_page())
        .await
        .unwrap();

    assert_eq!(set.pages_fetched, 2);
    assert_eq!(set.total_count, 4);
    let ids: Vec<&str> = set.data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_progress_callback_fires_per_page() {
    let mock_server = MockServer::start().await;
    let next = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[3], 3, None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 3, Some(next))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let mut progress: Vec<(u32, u64)> = Vec::new();
    let set = Paginator::new(&client)
        .get_all_pages_observed("/people/v2/people", Vec::new(), two_per_page(), |pages, total| {
            progress.push((pages, total));
        })
        .await
        .unwrap();

    assert_eq!(set.data.len(), 3);
    assert_eq!(progress, vec![(1, 3), (2, 3)]);
}

#[tokio::test]
async fn test_max_pages_stops_the_walk() {
    let mock_server = MockServer::start().await;
    let next2 = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());
    let next4 = format!("{}/people/v2/people?offset=4&per_page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&[3, 4], 100, Some(next4))),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 100, Some(next2))),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let options = PageOptions {
        max_pages: Some(2),
        ..two_per_page()
    };
    let set = Paginator::new(&client)
        .get_all_pages("/people/v2/people", Vec::new(), options)
        .await
        .unwrap();

    assert_eq!(set.pages_fetched, 2);
    assert_eq!(set.data.len(), 4);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_same_page_loop_detected_and_stopped() {
    let mock_server = MockServer::start().await;
    // The server keeps pointing at offset=2 forever.
    let next = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&[3, 4], 100, Some(next.clone()))),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 100, Some(next))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let set = Paginator::new(&client)
        .get_all_pages("/people/v2/people", Vec::new(), two_per_page())
        .await
        .unwrap();

    assert_eq!(set.pages_fetched, 2);
    assert_eq!(set.data.len(), 4);
}

#[tokio::test]
async fn test_empty_collection_is_a_valid_single_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[], 0, None)))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let set = Paginator::new(&client)
        .get_all_pages("/people/v2/people", Vec::new(), two_per_page())
        .await
        .unwrap();

    assert_eq!(set.pages_fetched, 1);
    assert_eq!(set.total_count, 0);
    assert!(set.data.is_empty());
}

#[tokio::test]
async fn test_parallel_walk_preserves_page_order() {
    let mock_server = MockServer::start().await;
    let next = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());

    // Five pages of two, so two permits are contended and later pages can
    // settle before earlier ones.
    for (offset, ids) in [
        ("2", [3_u32, 4]),
        ("4", [5, 6]),
        ("6", [7, 8]),
        ("8", [9, 10]),
    ] {
        Mock::given(method("GET"))
            .and(path("/people/v2/people"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&ids, 10, None)))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 10, Some(next))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let options = PageOptions {
        max_concurrency: 2,
        ..two_per_page()
    };
    let set = Paginator::new(&client)
        .get_all_pages_parallel("/people/v2/people", Vec::new(), options)
        .await
        .unwrap();

    assert_eq!(set.pages_fetched, 5);
    assert_eq!(set.total_count, 10);
    let ids: Vec<&str> = set.data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]
    );
}

#[tokio::test]
async fn test_get_page_requests_the_right_offset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[3, 4], 4, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let document = Paginator::new(&client)
        .get_page("/people/v2/people", Vec::new(), 2, two_per_page())
        .await
        .unwrap();

    let resources = document.into_resources();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].id, "3");
}

#[tokio::test]
async fn test_stream_is_lazy_and_stops_when_dropped() {
    let mock_server = MockServer::start().await;
    let next = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[3, 4], 4, None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 4, Some(next))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let paginator = Paginator::new(&client);

    {
        let mut stream =
            Box::pin(paginator.stream_pages("/people/v2/people", Vec::new(), two_per_page()));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 2);
        // Dropping the stream here abandons the remaining pages.
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_stream_yields_every_page_then_ends() {
    let mock_server = MockServer::start().await;
    let next = format!("{}/people/v2/people?offset=2&per_page=2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[3], 3, None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/v2/people"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[1, 2], 3, Some(next))))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let paginator = Paginator::new(&client);
    let stream = paginator.stream_pages("/people/v2/people", Vec::new(), two_per_page());

    let pages: Vec<_> = stream.collect().await;
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].as_ref().unwrap().len(), 2);
    assert_eq!(pages[1].as_ref().unwrap().len(), 1);
}
