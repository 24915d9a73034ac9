//! UI asset serving: files from the static dir, SPA fallback to index.html.

mod common;

use std::fs;

fn write_assets(dir: &std::path::Path) {
    fs::write(dir.join("index.html"), "<html>fabric console</html>").unwrap();
    fs::write(dir.join("app.js"), "console.log('ready');").unwrap();
}

#[tokio::test]
async fn static_files_are_served_from_the_asset_dir() {
    let assets = tempfile::tempdir().unwrap();
    write_assets(assets.path());

    let mut config = common::test_config(None, None);
    config.static_dir = assets.path().to_path_buf();
    let (addr, _ctx) = common::spawn_gateway(config).await;

    let resp = common::client()
        .get(format!("http://{addr}/app.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "console.log('ready');");
}

#[tokio::test]
async fn unknown_page_routes_fall_back_to_index() {
    let assets = tempfile::tempdir().unwrap();
    write_assets(assets.path());

    let mut config = common::test_config(None, None);
    config.static_dir = assets.path().to_path_buf();
    let (addr, _ctx) = common::spawn_gateway(config).await;

    // Client-side routed page: the server answers with the SPA shell.
    let resp = common::client()
        .get(format!("http://{addr}/some/client/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "<html>fabric console</html>");
}
