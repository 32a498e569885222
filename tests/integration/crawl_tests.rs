//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the gallery and run the full
//! crawl cycle end-to-end against it, writing into a temporary directory.

use tempfile::TempDir;
use wallpaper_harvest::config::{Config, DelayConfig};
use wallpaper_harvest::crawler::{crawl, CrawlRequest};
use wallpaper_harvest::CrawlError;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock gallery
fn create_test_config(base_url: &str, download_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.delays = DelayConfig::none();
    config.output.download_dir = download_dir.display().to_string();
    config
}

fn listing_html(items: &[(&str, &str)], next_pages: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|(id, title)| {
            format!(
                r#"<li><a href="/tupian/{id}.html" target="_blank"><img src="/uploads/thumb/{id}.jpg" alt="{title}" /><b>{title}</b></a></li>"#
            )
        })
        .collect();
    let pager: String = next_pages
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<a href="{}">{}</a>"#, href, i + 2))
        .collect();
    format!(
        r#"<html><head><title>listing</title></head><body>
<div id="main"><div class="slist"><ul class="clearfix">{}</ul></div>
<div class="page"><b>1</b>{}</div></div></body></html>"#,
        items, pager
    )
}

fn detail_html(id: &str, title: &str, width: u32, height: u32) -> String {
    format!(
        r#"<html><body><div class="photo-pic"><a href="" id="img"><img src="/uploads/allimg/{id}.jpg" data-pic="/uploads/allimg/{id}.jpg" alt="{title}" title="{title}" width="{width}" height="{height}"></a></div></body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

/// Mounts the home page every new session visits first
async fn mount_home(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html("<html><body>home</body></html>".to_string())
                .insert_header("set-cookie", "PHPSESSID=abc123; Path=/"),
        )
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, title: &str, width: u32, height: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/tupian/{}.html", id)))
        .respond_with(html(detail_html(id, title, width, height)))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, id: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/uploads/allimg/{}.jpg", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(format!("jpeg:{}", id).into_bytes(), "image/jpeg"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_category_crawl_downloads_wallpapers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/4kfengjing/"))
        .respond_with(html(listing_html(
            &[
                ("1700100001", "Lake Dawn"),
                ("1700100002", "Tall Tower"),
                ("1700100003", "Desert Dunes"),
            ],
            &[],
        )))
        .mount(&server)
        .await;

    mount_detail(&server, "1700100001", "Lake Dawn", 3840, 2160).await;
    mount_detail(&server, "1700100002", "Tall Tower", 1080, 1920).await;
    mount_detail(&server, "1700100003", "Desert Dunes", 2560, 1440).await;
    mount_image(&server, "1700100001", 1).await;
    mount_image(&server, "1700100002", 0).await;
    mount_image(&server, "1700100003", 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kfengjing"), None::<&str>, 3);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.skipped_filtered, 1);
    assert_eq!(summary.skipped_duplicate, 0);
    assert_eq!(summary.fetch_errors, 0);
    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.pages_processed, 1);

    let lake = std::fs::read(dir.path().join("Lake_Dawn_100001.jpg")).unwrap();
    assert_eq!(lake, b"jpeg:1700100001");
    assert!(dir.path().join("Desert_Dunes_100003.jpg").exists());
    assert!(!dir.path().join("Tall_Tower_100002.jpg").exists());
}

#[tokio::test]
async fn test_image_request_carries_session_headers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/4kdongman/"))
        .respond_with(html(listing_html(&[("1700100001", "Night City")], &[])))
        .mount(&server)
        .await;
    mount_detail(&server, "1700100001", "Night City", 2560, 1440).await;

    Mock::given(method("GET"))
        .and(path("/uploads/allimg/1700100001.jpg"))
        .and(header("cookie", "PHPSESSID=abc123"))
        .and(header(
            "referer",
            format!("{}/tupian/1700100001.html", server.uri()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"jpeg".to_vec(), "image/jpeg"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kdongman"), None::<&str>, 1);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.downloaded, 1);
}

#[tokio::test]
async fn test_existing_file_is_not_downloaded_again() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/4kfengjing/"))
        .respond_with(html(listing_html(
            &[("1700100001", "Lake Dawn"), ("1700100002", "Quiet Forest")],
            &[],
        )))
        .mount(&server)
        .await;
    mount_detail(&server, "1700100001", "Lake Dawn", 3840, 2160).await;
    mount_detail(&server, "1700100002", "Quiet Forest", 3840, 2160).await;
    mount_image(&server, "1700100001", 0).await;
    mount_image(&server, "1700100002", 1).await;

    std::fs::write(dir.path().join("Lake_Dawn_100001.jpg"), b"earlier run").unwrap();

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kfengjing"), None::<&str>, 1);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.skipped_duplicate, 1);
    assert_eq!(summary.downloaded, 1);
    let kept = std::fs::read(dir.path().join("Lake_Dawn_100001.jpg")).unwrap();
    assert_eq!(kept, b"earlier run");
}

#[tokio::test]
async fn test_failed_image_download_is_recorded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/4kfengjing/"))
        .respond_with(html(listing_html(
            &[("1700100001", "Lake Dawn"), ("1700100002", "Quiet Forest")],
            &[],
        )))
        .mount(&server)
        .await;
    mount_detail(&server, "1700100001", "Lake Dawn", 3840, 2160).await;
    mount_detail(&server, "1700100002", "Quiet Forest", 3840, 2160).await;
    Mock::given(method("GET"))
        .and(path("/uploads/allimg/1700100001.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_image(&server, "1700100002", 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kfengjing"), None::<&str>, 1);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.fetch_errors, 1);
    assert_eq!(summary.downloaded, 1);
    assert!(!dir.path().join("Lake_Dawn_100001.jpg").exists());
    assert!(!dir.path().join("Lake_Dawn_100001.jpg.part").exists());
}

#[tokio::test]
async fn test_category_pagination() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/4kqiche/"))
        .respond_with(html(listing_html(
            &[("1700100001", "Silver Coupe")],
            &["/4kqiche/index_2.html", "/4kqiche/index_3.html"],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/4kqiche/index_2.html"))
        .respond_with(html(listing_html(
            &[("1700200001", "Blue Roadster")],
            &["/4kqiche/index_3.html"],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/4kqiche/index_3.html"))
        .respond_with(html(listing_html(&[("1700300001", "Green Truck")], &[])))
        .expect(0)
        .mount(&server)
        .await;

    mount_detail(&server, "1700100001", "Silver Coupe", 3840, 2160).await;
    mount_detail(&server, "1700200001", "Blue Roadster", 3840, 2160).await;
    mount_image(&server, "1700100001", 1).await;
    mount_image(&server, "1700200001", 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kqiche"), None::<&str>, 2);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.downloaded, 2);
    assert!(dir.path().join("Silver_Coupe_100001.jpg").exists());
}

#[tokio::test]
async fn test_search_flow_follows_search_id() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/e/search/index.php"))
        .respond_with(html("<form></form>".to_string()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/e/search/index.php"))
        .and(body_string_contains("keyboard=%D4%AD%C9%F1&show=title&tempid=1"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/e/search/result/?searchid=42"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/e/search/result/"))
        .and(query_param("searchid", "42"))
        .respond_with(html(listing_html(
            &[("1700100001", "Mountain Sunrise")],
            &["/e/search/result/index.php?page=1&searchid=42"],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/e/search/result/index.php"))
        .and(query_param("page", "2"))
        .and(query_param("searchid", "42"))
        .respond_with(html(listing_html(&[("1700200001", "River Bend")], &[])))
        .expect(1)
        .mount(&server)
        .await;

    mount_detail(&server, "1700100001", "Mountain Sunrise", 2560, 1440).await;
    mount_detail(&server, "1700200001", "River Bend", 2560, 1440).await;
    mount_image(&server, "1700100001", 1).await;
    mount_image(&server, "1700200001", 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(None::<&str>, Some("原神"), 2);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.downloaded, 2);
    assert!(dir.path().join("Mountain_Sunrise_100001.jpg").exists());
    assert!(dir.path().join("River_Bend_200001.jpg").exists());
}

#[tokio::test]
async fn test_gbk_listing_is_decoded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    let page = listing_html(&[("1700100001", "雪山风景")], &[])
        .replace("<head>", r#"<head><meta charset="gbk">"#);
    let (gbk, _, _) = encoding_rs::GBK.encode(&page);
    Mock::given(method("GET"))
        .and(path("/4kfengjing/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(gbk.into_owned(), "text/html"))
        .mount(&server)
        .await;
    mount_detail(&server, "1700100001", "雪山风景", 3840, 2160).await;
    mount_image(&server, "1700100001", 1).await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kfengjing"), None::<&str>, 1);
    let summary = crawl(&config, &request).await.expect("crawl failed");

    assert_eq!(summary.downloaded, 1);
    assert!(dir.path().join("雪山风景_100001.jpg").exists());
}

#[tokio::test]
async fn test_empty_listing_is_empty_result() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_home(&server).await;

    Mock::given(method("GET"))
        .and(path("/4kmeinv/"))
        .respond_with(html(listing_html(&[], &[])))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let request = CrawlRequest::new(Some("4kmeinv"), None::<&str>, 3);
    let result = crawl(&config, &request).await;

    assert!(matches!(result, Err(CrawlError::EmptyResult)));
}

#[tokio::test]
async fn test_blank_request_touches_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let download_dir = dir.path().join("never-created");

    let config = create_test_config(&server.uri(), &download_dir);
    let request = CrawlRequest::new(Some("   "), Some(""), 3);
    let result = crawl(&config, &request).await;

    assert!(matches!(result, Err(CrawlError::InvalidRequest(_))));
    assert!(!download_dir.exists());
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}
