//! `run_pipeline` end to end over a fake page and transport

mod common;

use common::{FakeElement, FakePage, FakeTransport, Reply, create_test_dir, fast_config};
use kodegen_tools_imagescrape::{
    NetworkObserver, ObservedResponse, SourceKind, load_metadata, run_pipeline,
};
use std::sync::Arc;

const URL: &str = "https://shop.example.com/collections/cases";

fn storefront() -> FakePage {
    FakePage::new()
        .with_images(vec![
            FakeElement::img(&[("src", "/img/front.jpg"), ("alt", "iPhone 15")]),
            FakeElement::img(&[("data-src", "/img/lava.jpg"), ("alt", "Lava")]),
            FakeElement::img(&[("src", "/img/site-logo.png")]),
        ])
        .with(
            r#"select[name*="brand"]"#,
            vec![FakeElement::select(
                &[("name", "brand")],
                vec![FakeElement::option("Apple", "Apple")],
            )],
        )
}

fn observer_with(urls: &[(&str, &str)]) -> NetworkObserver {
    let observer = NetworkObserver::new();
    for (url, content_type) in urls {
        observer.observe(&ObservedResponse {
            url: (*url).to_string(),
            content_type: (*content_type).to_string(),
            status: 200,
        });
    }
    observer
}

#[tokio::test]
async fn test_pipeline_downloads_relevant_images_and_writes_metadata() {
    let dir = create_test_dir().expect("temp dir");
    let config = fast_config(dir.path(), URL);
    let observer = observer_with(&[
        ("https://cdn.example.com/banner.png", "image/png"),
        ("https://shop.example.com/app.js", "application/javascript"),
    ]);
    let transport = Arc::new(FakeTransport::new(Reply::jpeg(b"jpeg")).script(
        "https://shop.example.com/img/lava.jpg",
        vec![Reply::Status(404), Reply::Status(404), Reply::Status(404)],
    ));

    let metadata = run_pipeline(&storefront(), &observer, &config, transport.clone())
        .await
        .expect("pipeline succeeds");

    assert_eq!(metadata.source_url, URL);
    assert_eq!(metadata.total_images_found, 4);
    assert_eq!(metadata.phone_images_count, 1);
    assert_eq!(metadata.design_images_count, 1);
    assert_eq!(metadata.other_images_count, 1);
    assert_eq!(metadata.images_downloaded, 1);
    assert_eq!(metadata.images_failed, 1);
    assert_eq!(metadata.brands_models.brands.len(), 1);

    let names: Vec<_> = metadata.images.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["front.jpg", "lava.jpg"]);
    assert!(dir.path().join("front.jpg").exists());
    assert!(!dir.path().join("lava.jpg").exists());
    assert_eq!(transport.request_count("https://cdn.example.com/banner.png"), 0);

    let saved = load_metadata(&config.metadata_path())
        .await
        .expect("metadata.json readable");
    assert_eq!(saved.total_images_found, 4);
    assert_eq!(saved.images_downloaded, 1);
    assert_eq!(saved.images.len(), 2);
    assert_eq!(saved.images[0].candidate.source_kind, SourceKind::Dom);
}

#[tokio::test]
async fn test_everything_excluded_falls_back_to_all_images() {
    let dir = create_test_dir().expect("temp dir");
    let config = fast_config(dir.path(), URL);
    let page = FakePage::new().with_images(vec![
        FakeElement::img(&[("src", "/img/logo.png")]),
        FakeElement::img(&[("src", "/img/cart-icon.png")]),
    ]);
    let transport = Arc::new(FakeTransport::new(Reply::Ok {
        content_type: "image/png",
        body: b"png".to_vec(),
    }));

    let metadata = run_pipeline(&page, &NetworkObserver::new(), &config, transport)
        .await
        .expect("pipeline succeeds");

    assert_eq!(metadata.total_images_found, 2);
    assert_eq!(metadata.phone_images_count, 0);
    assert_eq!(metadata.images_downloaded, 2);
    assert!(dir.path().join("logo.png").exists());
    assert!(dir.path().join("cart-icon.png").exists());
}

#[tokio::test]
async fn test_empty_page_still_writes_metadata() {
    let dir = create_test_dir().expect("temp dir");
    let config = fast_config(dir.path(), URL);
    let transport = Arc::new(FakeTransport::new(Reply::jpeg(b"unused")));

    let metadata = run_pipeline(&FakePage::new(), &NetworkObserver::new(), &config, transport.clone())
        .await
        .expect("pipeline succeeds");

    assert_eq!(metadata.total_images_found, 0);
    assert!(metadata.images.is_empty());
    assert!(transport.requests.lock().is_empty());
    assert!(config.metadata_path().exists());
}

#[tokio::test]
async fn test_rerun_overwrites_metadata() {
    let dir = create_test_dir().expect("temp dir");
    let config = fast_config(dir.path(), URL);

    run_pipeline(
        &storefront(),
        &NetworkObserver::new(),
        &config,
        Arc::new(FakeTransport::new(Reply::jpeg(b"first"))),
    )
    .await
    .expect("first run");
    run_pipeline(
        &FakePage::new(),
        &NetworkObserver::new(),
        &config,
        Arc::new(FakeTransport::new(Reply::jpeg(b"second"))),
    )
    .await
    .expect("second run");

    let saved = load_metadata(&config.metadata_path()).await.expect("readable");
    assert_eq!(saved.total_images_found, 0);
    assert!(saved.images.is_empty());
}
