//! Request engine, batch lookup and pagination tests against a mock server

use mockito::{Matcher, Server, ServerGuard};
use pmospotify::{
    Error, PageDirection, PageParams, PlayableItem, SpotifyClient, Token, TokenKind,
};

fn client_for(server: &ServerGuard) -> SpotifyClient {
    SpotifyClient::builder("client_id", "client_secret")
        .api_base(server.url())
        .accounts_base(server.url())
        .build()
        .expect("client builds")
}

async fn with_app_token(client: &SpotifyClient) {
    client
        .token_cache()
        .install_token(Token::new("app-token", TokenKind::AccessOnly, 3600, None, None))
        .await;
}

async fn with_user_token(client: &SpotifyClient) {
    client
        .token_cache()
        .install_token(Token::new(
            "user-token",
            TokenKind::UserAuthorized,
            3600,
            None,
            None,
        ))
        .await;
}

#[tokio::test]
async fn batch_lookup_joins_ids_and_preserves_null_slots() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_app_token(&client).await;

    let mock = server
        .mock("GET", "/albums")
        .match_query(Matcher::UrlEncoded(
            "ids".into(),
            "41MnTivkwTO3UUJ8DrqEJJ,unknown".into(),
        ))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"albums":[{"id":"41MnTivkwTO3UUJ8DrqEJJ","name":"The Battle Of Los Angeles"},null]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let albums = client
        .get_albums(&["41MnTivkwTO3UUJ8DrqEJJ", "unknown"], None)
        .await?
        .into_result()?;

    // One slot per requested id, unknown ids as None
    assert_eq!(albums.len(), 2);
    assert_eq!(
        albums[0].as_ref().map(|a| a.name.as_str()),
        Some("The Battle Of Los Angeles")
    );
    assert!(albums[1].is_none());

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn multi_segment_lookup_resolves_nested_path() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_app_token(&client).await;

    let mock = server
        .mock("GET", "/artists/43ZHCT0cAZBISjO8DG9PnE/albums")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("market".into(), "FR".into()),
            Matcher::UrlEncoded("include_groups".into(), "album,single".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"href":"h","items":[{"id":"a1","name":"Elvis Presley"}],"limit":10,"offset":0,"total":1}"#,
        )
        .create_async()
        .await;

    let page = client
        .get_artist_albums(
            "43ZHCT0cAZBISjO8DG9PnE",
            &[pmospotify::AlbumGroup::Album, pmospotify::AlbumGroup::Single],
            Some("FR"),
            PageParams::with_limit(10),
        )
        .await?
        .into_result()?;

    assert_eq!(page.items.len(), 1);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn next_link_is_dereferenced_verbatim() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_app_token(&client).await;

    // The continuation link is opaque to the navigator; this one carries
    // server-side state (the market filter) that offset arithmetic alone
    // would lose
    let next_url = format!(
        "{}/continuations/album-tracks?offset=20&limit=20&market=FR",
        server.url()
    );

    let first_page_mock = server
        .mock("GET", "/albums/4aawyAB9vmqN3uQ7FjRGTy/tracks")
        .match_query(Matcher::UrlEncoded("limit".into(), "20".into()))
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"href":"h","items":[{{"id":"t1","name":"One"}}],"limit":20,"offset":0,"total":21,"next":"{}"}}"#,
            next_url
        ))
        .expect(1)
        .create_async()
        .await;

    // The continuation must hit the stored URL exactly as the server
    // supplied it, with no locally recomputed offset
    let next_page_mock = server
        .mock("GET", "/continuations/album-tracks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), "20".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("market".into(), "FR".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"href":"h2","items":[{"id":"t21","name":"TwentyOne"}],"limit":20,"offset":20,"total":21}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let page = client
        .get_album_tracks(
            "4aawyAB9vmqN3uQ7FjRGTy",
            None,
            PageParams::with_limit(20),
        )
        .await?
        .into_result()?;
    assert_eq!(page.next.as_deref(), Some(next_url.as_str()));

    let next = client
        .page(&page, PageDirection::Next)
        .await?
        .into_result()?
        .expect("a next page");
    assert_eq!(next.items[0].id, "t21");

    // The last page has no next link: navigation stops without a request
    let exhausted = client.page(&next, PageDirection::Next).await?.into_result()?;
    assert!(exhausted.is_none());

    first_page_mock.assert_async().await;
    next_page_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn cursor_paging_navigates_forward_only() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_user_token(&client).await;

    let next_url = format!(
        "{}/continuations/following?type=artist&after=0aV6DOiouImYTqrR5YlIqx",
        server.url()
    );

    let first_mock = server
        .mock("GET", "/me/following")
        .match_query(Matcher::UrlEncoded("type".into(), "artist".into()))
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"artists":{{"href":"h","items":[{{"id":"0aV6DOiouImYTqrR5YlIqx","name":"Steven Wilson"}}],"limit":20,"next":"{}","cursors":{{"after":"0aV6DOiouImYTqrR5YlIqx"}},"total":2}}}}"#,
            next_url
        ))
        .expect(1)
        .create_async()
        .await;

    let second_mock = server
        .mock("GET", "/continuations/following")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "artist".into()),
            Matcher::UrlEncoded("after".into(), "0aV6DOiouImYTqrR5YlIqx".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"artists":{"href":"h2","items":[{"id":"1","name":"Porcupine Tree"}],"limit":20,"cursors":{},"total":2}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let page = client
        .current_user_followed_artists(&Default::default())
        .await?
        .into_result()?;
    assert_eq!(page.cursors.as_ref().and_then(|c| c.after.as_deref()), Some("0aV6DOiouImYTqrR5YlIqx"));

    let next = client
        .cursor_page(&page, PageDirection::Next)
        .await?
        .into_result()?
        .expect("a next page");
    assert_eq!(next.items[0].name, "Porcupine Tree");

    // Cursor paging has no backward link
    let previous = client
        .cursor_page(&page, PageDirection::Previous)
        .await?
        .into_result()?;
    assert!(previous.is_none());

    first_mock.assert_async().await;
    second_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn provider_errors_come_back_as_data_not_errors() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_app_token(&client).await;

    let mock = server
        .mock("GET", "/albums/nonexistent")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"status":404,"message":"non existing id"}}"#)
        .expect(2)
        .create_async()
        .await;

    let outcome = client.get_album("nonexistent", None).await?;
    let err = outcome.error().expect("an error verdict");
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "non existing id");

    // The raising accessor turns the verdict into Error::Api
    assert!(matches!(
        client.get_album("nonexistent", None).await?.into_result(),
        Err(Error::Api(_))
    ));

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn playlist_items_discriminate_tracks_from_episodes() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_app_token(&client).await;

    let mock = server
        .mock("GET", "/playlists/3cEYpjA9oz9GiPac4AsH4n/tracks")
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"href":"h","items":[
                {"added_at":"2020-01-01T00:00:00Z","track":{"type":"track","id":"t1","name":"A Song"}},
                {"added_at":"2020-01-02T00:00:00Z","track":{"type":"episode","id":"e1","name":"An Episode"}},
                {"track":null}
            ],"limit":100,"offset":0,"total":3}"#,
        )
        .create_async()
        .await;

    let page = client
        .get_playlist_items("3cEYpjA9oz9GiPac4AsH4n", None, None, Default::default())
        .await?
        .into_result()?;

    assert_eq!(page.items.len(), 3);
    assert!(matches!(
        page.items[0].track,
        Some(PlayableItem::Track(ref t)) if t.name == "A Song"
    ));
    assert!(matches!(
        page.items[1].track,
        Some(PlayableItem::Episode(ref e)) if e.name == "An Episode"
    ));
    assert!(page.items[2].track.is_none());

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn search_returns_one_paging_per_requested_type() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_app_token(&client).await;

    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Muse".into()),
            Matcher::UrlEncoded("type".into(), "album,track".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "albums":{"href":"h","items":[{"id":"a1","name":"Absolution"}],"limit":20,"offset":0,"total":1},
                "tracks":{"href":"h","items":[{"id":"t1","name":"Hysteria"}],"limit":20,"offset":0,"total":1}
            }"#,
        )
        .create_async()
        .await;

    let results = client
        .search(
            "Muse",
            &[pmospotify::SearchType::Album, pmospotify::SearchType::Track],
            None,
            Default::default(),
        )
        .await?
        .into_result()?;

    assert_eq!(results.albums.as_ref().map(|p| p.items.len()), Some(1));
    assert_eq!(results.tracks.as_ref().map(|p| p.items.len()), Some(1));
    assert!(results.artists.is_none());

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn library_writes_send_ids_in_one_request() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_user_token(&client).await;

    let save_mock = server
        .mock("PUT", "/me/tracks")
        .match_query(Matcher::UrlEncoded("ids".into(), "t1,t2".into()))
        .match_header("authorization", "Bearer user-token")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let outcome = client.save_tracks(&["t1", "t2"]).await?;
    assert!(outcome.is_success());

    save_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn playback_start_sends_offset_body() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    with_user_token(&client).await;

    let play_mock = server
        .mock("PUT", "/me/player/play")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "context_uri": "spotify:album:4aawyAB9vmqN3uQ7FjRGTy",
            "offset": { "position": 5 }
        })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let outcome = client
        .start_playback(
            Some("spotify:album:4aawyAB9vmqN3uQ7FjRGTy"),
            None,
            Some(pmospotify::PlayOffset::Position(5)),
            None,
        )
        .await?;
    assert!(outcome.is_success());

    play_mock.assert_async().await;
    Ok(())
}
