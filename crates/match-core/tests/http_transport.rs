use anyhow::Result;
use match_core::{ApiKey, ClientConfig, ClientError, HttpTransport, RiotClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Result<RiotClient> {
    let config = ClientConfig {
        base_url: Some(server.uri()),
        ..ClientConfig::default()
    };
    Ok(RiotClient::with_transport(
        ApiKey::new("RGAPI-test"),
        config,
        HttpTransport::new()?,
    ))
}

#[tokio::test]
async fn fetches_match_with_key_in_query() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lol/match/v5/matches/BR1_42"))
        .and(query_param("api_key", "RGAPI-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"matchId": "BR1_42"},
            "info": {"participants": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server)?;
    let body = client.match_stats("BR1_42").await?;
    assert_eq!(body["metadata"]["matchId"], "BR1_42");
    assert_eq!(client.gate().usage().0.count, 1);
    Ok(())
}

#[tokio::test]
async fn ids_route_keeps_its_query() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lol/match/v5/matches/by-puuid/p-9/ids"))
        .and(query_param("type", "ranked"))
        .and(query_param("start", "10"))
        .and(query_param("count", "3"))
        .and(query_param("api_key", "RGAPI-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["A", "B", "C"])))
        .mount(&server)
        .await;

    let mut client = client_for(&server)?;
    let ids = client
        .user_match_ids(match_core::UserRef::Puuid("p-9"), 10, 3)
        .await?;
    assert_eq!(ids, vec!["A", "B", "C"]);
    Ok(())
}

#[tokio::test]
async fn server_quota_error_is_reported_and_counted() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let mut client = client_for(&server)?;
    let err = client.user_info("Some Guy").await.unwrap_err();
    match err {
        ClientError::Status { status, url } => {
            assert_eq!(status, 429);
            assert!(!url.contains("RGAPI-test"));
        }
        other => panic!("unexpected error: {other}"),
    }
    let (short, long) = client.gate().usage();
    assert_eq!((short.count, long.count), (1, 1));
    Ok(())
}
