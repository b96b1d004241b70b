//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the search API and the calendar
//! widget and run full crawls against it with zero request delay.

use rental_harvest::config::Config;
use rental_harvest::crawler::{crawl, Coordinator};
use rental_harvest::{CalendarError, FetchError, HarvestError, Listing};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ZIP: &str = "10001";

/// Creates a test configuration pointing every endpoint at the mock server
fn create_test_config(base_url: &str, listings_path: &str) -> Config {
    let mut config = Config::default();
    config.crawler.min_delay_secs = 0;
    config.crawler.max_jitter_secs = 0;
    config.crawler.calendar_months = vec![4, 5];
    config.crawler.calendar_year = 2014;
    config.endpoints.search_url = format!("{}/api/search", base_url);
    config.endpoints.search_referer = format!("{}/s/", base_url);
    config.endpoints.calendar_url = format!("{}/calendar/", base_url);
    config.output.listings_path = listings_path.to_string();
    config
}

/// Search page body with the given ids and reported total
fn search_page(ids: &[&str], total: u64) -> Value {
    let listings: Vec<Value> = ids
        .iter()
        .map(|id| json!({"listing": {"id": id, "price": 100, "room_type": "Private room"}}))
        .collect();
    json!({"listings_count": total, "listings": listings})
}

/// Widget with a trailing bleed-through group: 30 in-month days, then 1..=3
fn calendar_widget() -> String {
    let cells: String = (1..=30)
        .map(|d| format!(r#"<td class="available"><span>{}</span></td>"#, d))
        .chain((1..=3).map(|d| format!(r#"<td class="unavailable"><span>{}</span></td>"#, d)))
        .collect();
    format!("<div class=\"calendar\"><table><tr>{}</tr></table></div>", cells)
}

async fn mount_search_page(server: &MockServer, offset: u64, body: Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_calendars(server: &MockServer, calls: u64) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/calendar/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(calendar_widget()))
        .expect(calls)
        .mount(server)
        .await;
}

fn ids(listings: &[Listing]) -> Vec<String> {
    listings.iter().map(|l| l.id.to_string()).collect()
}

async fn run(config: Config) -> Result<Vec<Listing>, HarvestError> {
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    coordinator.run(ZIP).await
}

#[tokio::test]
async fn test_two_pages_with_duplicate() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&["A", "B"], 3), 1).await;
    mount_search_page(&mock_server, 2, search_page(&["B", "C"], 3), 1).await;
    // Count meets total after the second page
    mount_search_page(&mock_server, 4, search_page(&["D"], 3), 0).await;
    // Three listings, two months each
    mount_calendars(&mock_server, 6).await;

    let mut config = create_test_config(&mock_server.uri(), "unused.json");
    config.crawler.page_size = 2;
    let listings = run(config).await.expect("Crawl failed");

    assert_eq!(ids(&listings), vec!["A", "B", "C"]);
    for listing in &listings {
        let calendar = listing.calendar.as_ref().expect("calendar attached");
        assert_eq!(calendar.len(), 60);
        assert_eq!(calendar.available_days(), 60);
        assert_eq!(listing.price, Some(json!(100)));
        assert_eq!(listing.beds, None);
    }
}

#[tokio::test]
async fn test_duplicate_within_one_page() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&["A", "A", "B"], 2), 1).await;
    mount_calendars(&mock_server, 4).await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    let listings = run(config).await.expect("Crawl failed");

    assert_eq!(ids(&listings), vec!["A", "B"]);
}

#[tokio::test]
async fn test_empty_first_page() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&[], 50), 1).await;
    mount_search_page(&mock_server, 20, search_page(&["A"], 50), 0).await;
    mount_calendars(&mock_server, 0).await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    let listings = run(config).await.expect("Crawl failed");

    assert!(listings.is_empty());
}

#[tokio::test]
async fn test_shrinking_total_stops_crawl() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&["A", "B"], 40), 1).await;
    // Upstream now reports fewer listings than already collected
    mount_search_page(&mock_server, 20, search_page(&["C"], 2), 1).await;
    mount_search_page(&mock_server, 40, search_page(&["D"], 2), 0).await;
    mount_calendars(&mock_server, 6).await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    let listings = run(config).await.expect("Crawl failed");

    assert_eq!(ids(&listings), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_offset_reaching_total_stops_crawl() {
    let mock_server = MockServer::start().await;

    // Every page repeats the same listing, so only the offset can end the crawl
    mount_search_page(&mock_server, 0, search_page(&["A"], 30), 1).await;
    mount_search_page(&mock_server, 20, search_page(&["A"], 30), 1).await;
    mount_search_page(&mock_server, 40, search_page(&["A"], 30), 0).await;
    mount_calendars(&mock_server, 2).await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    let listings = run(config).await.expect("Crawl failed");

    assert_eq!(ids(&listings), vec!["A"]);
}

#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let page_url = format!(
        "{}/api/search?location={}&number_of_guests=1&offset=0&guests=1&items_per_page=20",
        base_url, ZIP
    );

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(header("referer", format!("{}/s/{}", base_url, ZIP).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(&["A"], 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendar/A"))
        .and(query_param("cal_year", "2014"))
        .and(query_param("currency", "USD"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("referer", page_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(calendar_widget()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "unused.json");
    let listings = run(config).await.expect("Crawl failed");
    assert_eq!(listings.len(), 1);
}

#[tokio::test]
async fn test_session_cookies_follow_last_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_page(&["A"], 1))
                .insert_header("set-cookie", "sid=page; Path=/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // April must carry the search page cookie and hands out a new one
    Mock::given(method("GET"))
        .and(path("/calendar/A"))
        .and(query_param("cal_month", "4"))
        .and(header("cookie", "sid=page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(calendar_widget())
                .insert_header("set-cookie", "other=cal4; Path=/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // May sees only April's cookie: the jar is replaced, not merged
    Mock::given(method("GET"))
        .and(path("/calendar/A"))
        .and(query_param("cal_month", "5"))
        .and(header("cookie", "other=cal4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(calendar_widget()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let listings = coordinator.run(ZIP).await.expect("Crawl failed");

    assert_eq!(listings.len(), 1);
    assert_eq!(coordinator.fetcher().request_count(), 3);
    // The last response set no cookie
    assert!(coordinator.fetcher().session().is_empty());
}

#[tokio::test]
async fn test_malformed_search_page_aborts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Please slow down</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_calendars(&mock_server, 0).await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    match run(config).await {
        Err(HarvestError::MalformedPage { payload, .. }) => {
            assert!(payload.contains("Please slow down"));
        }
        other => panic!("expected malformed page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_calendar_aborts() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&["A", "B"], 2), 1).await;
    Mock::given(method("GET"))
        .and(path("/calendar/A"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table><tr><td class="available"><span>32</span></td></tr></table>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    // The crawl stops before the second listing
    Mock::given(method("GET"))
        .and(path("/calendar/B"))
        .respond_with(ResponseTemplate::new(200).set_body_string(calendar_widget()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    match run(config).await {
        Err(HarvestError::Calendar {
            listing,
            month,
            source,
            ..
        }) => {
            assert_eq!(listing, "A");
            assert_eq!(month, 4);
            assert_eq!(source, CalendarError::DayOutOfRange { cell: 0, day: 32 });
        }
        other => panic!("expected calendar error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "unused.json");
    match run(config).await {
        Err(HarvestError::Fetch(FetchError::Status { status, .. })) => assert_eq!(status, 503),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_crawl_writes_dataset() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&["A", "B"], 2), 1).await;
    mount_calendars(&mock_server, 4).await;

    let dir = tempfile::TempDir::new().unwrap();
    let output_path = dir.path().join("listings.json");
    let config = create_test_config(&mock_server.uri(), output_path.to_str().unwrap());

    let listings = crawl(config, ZIP).await.expect("Crawl failed");
    assert_eq!(listings.len(), 2);

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    let records = written.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "A");
    assert_eq!(records[1]["id"], "B");
    assert!(records[0]["bedrooms"].is_null());
    assert_eq!(records[0]["calendar"]["2014-04-30"], true);
    assert_eq!(records[0]["calendar"]["2014-05-01"], true);
    assert_eq!(records[0]["calendar"].as_object().unwrap().len(), 60);
}

#[tokio::test]
async fn test_failed_crawl_writes_nothing() {
    let mock_server = MockServer::start().await;

    mount_search_page(&mock_server, 0, search_page(&["A"], 1), 1).await;
    Mock::given(method("GET"))
        .and(path("/calendar/A"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let output_path = dir.path().join("listings.json");
    let config = create_test_config(&mock_server.uri(), output_path.to_str().unwrap());

    assert!(crawl(config, ZIP).await.is_err());
    assert!(!output_path.exists());
}
