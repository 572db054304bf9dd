mod common;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use common::*;
use fb_graph_client::{
    BinaryAttachment, Connection, FacebookClient, FacebookClientConfig, FacebookError,
    InsightsQuery, Parameter, Period,
    types::{FacebookType, NamedFacebookType, Page, Post},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path, query_param},
};

#[tokio::test]
async fn test_fetch_object() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path(format!("/{PAGE_ID}")))
        .and(query_param("access_token", ACCESS_TOKEN))
        .and(query_param("format", "json"))
        .and(query_param("fields", "id,name,fan_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": PAGE_ID,
            "name": "Ron Paul",
            "fan_count": 512
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page: Page = client
        .fetch_object(PAGE_ID, &[Parameter::new("fields", "id,name,fan_count")])
        .await?;

    assert_eq!(page.name.as_deref(), Some("Ron Paul"));
    assert_eq!(page.fan_count, Some(512));
    Ok(())
}

#[tokio::test]
async fn test_fetch_objects() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("ids", "btaylor,arjun"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "btaylor": {"id": "220439", "name": "Bret Taylor"},
            "arjun": {"id": "7901103", "name": "Arjun Banker"}
        })))
        .mount(&mock_server)
        .await;

    let users: HashMap<String, NamedFacebookType> =
        client.fetch_objects(&["BTaylor", " arjun "], &[]).await?;

    assert_eq!(users["btaylor"].name.as_deref(), Some("Bret Taylor"));
    assert_eq!(users["arjun"].id.as_deref(), Some("7901103"));
    Ok(())
}

#[tokio::test]
async fn test_fetch_connection_and_follow_next_page() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);
    let next_url = format!(
        "{}/me/feed?access_token={ACCESS_TOKEN}&limit=1&until=1271791668",
        mock_server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .and(query_param("limit", "1"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "1_1",
                "message": "first",
                "created_time": "2010-04-20T19:07:48+0000"
            }],
            "paging": {"next": next_url}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/feed"))
        .and(query_param("until", "1271791668"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1_0", "message": "second"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let first: Connection<Post> = client
        .fetch_connection("me/feed", &[Parameter::new("limit", "1")])
        .await?;
    assert_eq!(first.data()[0].message.as_deref(), Some("first"));
    assert!(first.has_next());

    let second: Connection<Post> = client
        .fetch_connection_page(first.next_page_url().unwrap())
        .await?;
    assert_eq!(second.data()[0].message.as_deref(), Some("second"));
    assert!(!second.has_next());
    Ok(())
}

#[tokio::test]
async fn test_publish_and_delete() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/me/feed"))
        .and(body_string_contains("message=Hello+from+Rust"))
        .and(body_string_contains("access_token=EAAD-test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1_99"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1_99"))
        .and(body_string_contains("method=delete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let published: FacebookType = client
        .publish("me/feed", &[Parameter::new("message", "Hello from Rust")])
        .await?;
    let id = published.id.unwrap();
    assert_eq!(id, "1_99");

    assert!(client.delete_object(&id).await?);
    Ok(())
}

#[tokio::test]
async fn test_publish_photo_as_multipart() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/me/photos"))
        .and(query_param("message", "My cat"))
        .and(query_param("access_token", ACCESS_TOKEN))
        .and(body_string_contains("filename=\"cat.png\""))
        .and(body_string_contains("not-really-a-png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "photo_1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let attachment =
        BinaryAttachment::new("cat.png", b"not-really-a-png".to_vec()).with_content_type("image/png");
    let published: FacebookType = client
        .publish_with_attachment("me/photos", &[Parameter::new("message", "My cat")], &attachment)
        .await?;

    assert_eq!(published.id.as_deref(), Some("photo_1"));
    Ok(())
}

#[tokio::test]
async fn test_execute_query_on_legacy_endpoint() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/method/fql.query"))
        .and(body_string_contains("query=SELECT+uid%2C+name+FROM+user"))
        .and(body_string_contains("format=json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "name": "Ann"},
            {"id": "2", "name": "Bob"}
        ])))
        .mount(&mock_server)
        .await;

    let users: Vec<NamedFacebookType> = client
        .execute_query("SELECT uid, name FROM user WHERE uid IN (1, 2)", &[])
        .await?;

    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name.as_deref(), Some("Bob"));
    Ok(())
}

#[tokio::test]
async fn test_insights_by_metric_by_date() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/method/fql.multiquery"))
        .and(body_string_contains("queries="))
        .and(body_string_contains("end_time%3D1284620400"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "0", "fql_result_set": [
                {"metric": "page_active_users", "value": 582},
                {"metric": "page_tab_views_login_top_unique", "value": {"wall": 30, "info": 11}}
            ]}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = InsightsQuery::builder()
        .page_object_id(PAGE_ID)
        .metrics(vec![
            "page_active_users".to_string(),
            "page_tab_views_login_top_unique".to_string(),
        ])
        .period(Period::Day)
        .period_end_dates(vec![Utc.with_ymd_and_hms(2010, 9, 16, 18, 0, 0).unwrap()])
        .build();

    let by_metric = client.insights_by_metric_by_date(&query).await?;
    let end = Utc.timestamp_opt(1_284_620_400, 0).unwrap();

    assert_eq!(by_metric["page_active_users"][&end], json!(582));
    assert_eq!(
        by_metric["page_tab_views_login_top_unique"][&end]["wall"],
        json!(30)
    );
    Ok(())
}

#[tokio::test]
async fn test_graph_error_is_typed() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"type": "OAuthException", "message": "Error validating access token."}
        })))
        .mount(&mock_server)
        .await;

    let err = client
        .fetch_object::<NamedFacebookType>("me", &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FacebookError::graph("OAuthException", "Error validating access token.")
    );
    Ok(())
}

#[tokio::test]
async fn test_legacy_error_on_success_status() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("POST"))
        .and(path("/method/fql.query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_code": 601,
            "error_msg": "Parser error: unexpected end of query."
        })))
        .mount(&mock_server)
        .await;

    let err = client
        .execute_query::<NamedFacebookType>("SELECT", &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FacebookError::response_status(601, "Parser error: unexpected end of query.")
    );
    Ok(())
}

#[tokio::test]
async fn test_http_error_statuses_are_not_retried() -> Result<()> {
    let mock_server = MockServer::start().await;
    let config = FacebookClientConfig {
        retry_attempts: 3,
        ..config_for(&mock_server)
    };
    let client = FacebookClient::with_config(config)?;

    Mock::given(method("POST"))
        .and(path("/me/feed"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client
        .publish::<FacebookType>("me/feed", &[Parameter::new("message", "once")])
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(!err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_bare_500_is_a_network_error() -> Result<()> {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&mock_server)
        .await;

    let err = client
        .fetch_object::<NamedFacebookType>("me", &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FacebookError::Network {
            status: Some(500),
            ..
        }
    ));
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() -> Result<()> {
    // Grab a free port and release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let config = FacebookClientConfig::builder()
        .auth(fb_graph_client::AuthStrategy::access_token(ACCESS_TOKEN))
        .graph_endpoint_url(format!("http://127.0.0.1:{port}"))
        .build();

    let client = FacebookClient::with_config(config)?;
    let err = client
        .fetch_object::<NamedFacebookType>("me", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, FacebookError::Network { status: None, .. }));
    assert!(err.is_retryable());
    Ok(())
}
