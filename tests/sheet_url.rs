use mockito::{Matcher, Server};
use tally::{
    session::refresh_sheet,
    sheet::{csv_export_url, fetch_sheet},
    state::{Action, AppState, reduce},
};

#[test]
fn pubhtml_links_become_csv_exports() {
    assert_eq!(
        csv_export_url("https://docs.google.com/spreadsheets/d/e/abc/pubhtml"),
        "https://docs.google.com/spreadsheets/d/e/abc/pub?output=csv"
    );
}

#[test]
fn other_links_get_the_query_parameter() {
    assert_eq!(
        csv_export_url(" https://example.com/sheet "),
        "https://example.com/sheet?output=csv"
    );
    assert_eq!(
        csv_export_url("https://example.com/pub?gid=0"),
        "https://example.com/pub?gid=0&output=csv"
    );
}

#[tokio::test]
async fn blank_url_is_rejected_before_any_request() {
    let err = fetch_sheet(&client(), "  ").await.expect_err("blank url");
    assert!(err.to_string().contains("No spreadsheet URL"));
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build http client")
}

#[tokio::test]
async fn fetch_downloads_the_csv_export() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/sheet")
        .match_query(Matcher::UrlEncoded("output".into(), "csv".into()))
        .with_status(200)
        .with_body("Họ tên,Bài làm\nNguyễn Văn An,42\n")
        .create_async()
        .await;

    let text = fetch_sheet(&client(), &format!("{}/sheet", server.url()))
        .await
        .expect("fetch sheet");

    assert!(text.contains("Nguyễn Văn An,42"));
    mock.assert_async().await;
}

#[tokio::test]
async fn refused_download_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/private")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let err = fetch_sheet(&client(), &format!("{}/private", server.url()))
        .await
        .expect_err("forbidden sheet");
    assert!(err.to_string().contains("refused"));
}

#[tokio::test]
async fn refresh_keeps_state_and_reports_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let state = [
        Action::SetSheetData("pasted by hand".into()),
        Action::SetSheetUrl(format!("{}/gone", server.url())),
    ]
    .into_iter()
    .fold(AppState::default(), |acc, action| reduce(&acc, action));

    let next = refresh_sheet(&client(), &state).await;

    assert!(!next.is_fetching());
    assert_eq!(next.input().sheet_data(), "pasted by hand");
    assert!(next.last_error().is_some_and(|e| e.contains("dán thủ công")));
}
