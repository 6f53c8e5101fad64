#[allow(dead_code)]
mod common;

use diskdrop_core::net::messages::{ClientMessage, ServerMessage};
use diskdrop_server::config::{LobbyConfig, ServerConfig};

use common::{TestClient, TestServer};

/// Connect two clients, ready both, and drain the round preamble.
/// Returns the clients with player 1 holding the turn prompt consumed.
async fn start_round(server: &TestServer) -> (TestClient, TestClient) {
    let mut p1 = TestClient::connect(server.addr).await;
    assert_eq!(p1.read_msg().await, ServerMessage::Connected { player_id: 1 });
    let mut p2 = TestClient::connect(server.addr).await;
    assert_eq!(p2.read_msg().await, ServerMessage::Connected { player_id: 2 });

    p1.send(&ClientMessage::Ready).await;
    p2.send(&ClientMessage::Ready).await;

    assert_eq!(
        p1.read_msg().await,
        ServerMessage::GameStart {
            player_id: 1,
            columns: 7,
            rows: 6
        }
    );
    assert_eq!(
        p2.read_msg().await,
        ServerMessage::GameStart {
            player_id: 2,
            columns: 7,
            rows: 6
        }
    );
    assert_eq!(p1.read_msg().await, ServerMessage::TakeTurn);
    (p1, p2)
}

#[tokio::test]
async fn two_players_play_a_round_to_a_win() {
    let server = TestServer::new().await;
    let (mut p1, mut p2) = start_round(&server).await;

    // p1 builds columns 0..=3 along the bottom, p2 stacks in 6
    for col in 0..3u8 {
        p1.send(&ClientMessage::Turn { column: col }).await;
        let update = ServerMessage::Update {
            player_id: 1,
            column: col,
            row: 0,
        };
        assert_eq!(p1.read_msg().await, update);
        assert_eq!(p2.read_msg().await, update);
        assert_eq!(p2.read_msg().await, ServerMessage::TakeTurn);

        p2.send(&ClientMessage::Turn { column: 6 }).await;
        let update = ServerMessage::Update {
            player_id: 2,
            column: 6,
            row: col,
        };
        assert_eq!(p1.read_msg().await, update);
        assert_eq!(p2.read_msg().await, update);
        assert_eq!(p1.read_msg().await, ServerMessage::TakeTurn);
    }

    p1.send(&ClientMessage::Turn { column: 3 }).await;
    let update = ServerMessage::Update {
        player_id: 1,
        column: 3,
        row: 0,
    };
    assert_eq!(p1.read_msg().await, update);
    assert_eq!(p2.read_msg().await, update);
    assert_eq!(p1.read_msg().await, ServerMessage::GameEnd { winner: 1 });
    assert_eq!(p2.read_msg().await, ServerMessage::GameEnd { winner: 1 });
}

#[tokio::test]
async fn out_of_turn_move_rejected_only_to_sender() {
    let server = TestServer::new().await;
    let (mut p1, mut p2) = start_round(&server).await;

    p2.send(&ClientMessage::Turn { column: 0 }).await;
    match p2.read_msg().await {
        ServerMessage::TurnResult { result, column } => {
            assert_eq!(result, diskdrop_core::game::TurnResult::WrongPlayer);
            assert_eq!(column, 0);
        },
        other => panic!("expected TurnResult, got: {other:?}"),
    }
    assert!(p1.try_read_msg(100).await.is_none());
}

#[tokio::test]
async fn client_refused_when_lobby_cap_reached() {
    let config = ServerConfig {
        lobby: LobbyConfig {
            keep_open: true,
            max_lobbies: 1,
        },
        ..ServerConfig::default()
    };
    let server = TestServer::from_config(config).await;

    let mut p1 = TestClient::connect(server.addr).await;
    assert_eq!(p1.read_msg().await, ServerMessage::Connected { player_id: 1 });
    let mut p2 = TestClient::connect(server.addr).await;
    assert_eq!(p2.read_msg().await, ServerMessage::Connected { player_id: 2 });

    // the only lobby is full, so a third client is turned away
    let mut p3 = TestClient::connect(server.addr).await;
    assert_eq!(p3.read_msg().await, ServerMessage::Error);
    assert!(p3.try_read_msg(200).await.is_none());
}

#[tokio::test]
async fn spare_client_lands_in_a_second_lobby() {
    let server = TestServer::new().await;

    let mut p1 = TestClient::connect(server.addr).await;
    assert_eq!(p1.read_msg().await, ServerMessage::Connected { player_id: 1 });
    let mut p2 = TestClient::connect(server.addr).await;
    assert_eq!(p2.read_msg().await, ServerMessage::Connected { player_id: 2 });

    // first lobby full: this client opens a fresh lobby and is player 1 there
    let mut p3 = TestClient::connect(server.addr).await;
    assert_eq!(p3.read_msg().await, ServerMessage::Connected { player_id: 1 });
}

#[tokio::test]
async fn disconnect_mid_round_aborts_and_lobby_reopens() {
    let server = TestServer::new().await;
    let (mut p1, p2) = start_round(&server).await;

    drop(p2);
    assert_eq!(p1.read_msg().await, ServerMessage::GameEnd { winner: 0 });

    // the vacated seat is open again for a new client
    let mut p3 = TestClient::connect(server.addr).await;
    assert_eq!(p3.read_msg().await, ServerMessage::Connected { player_id: 2 });
}

#[tokio::test]
async fn lobby_plays_a_second_round_after_the_first() {
    let server = TestServer::new().await;
    let (mut p1, mut p2) = start_round(&server).await;

    for col in 0..3u8 {
        p1.send(&ClientMessage::Turn { column: col }).await;
        p1.read_msg().await;
        p2.read_msg().await;
        p2.read_msg().await; // TakeTurn
        p2.send(&ClientMessage::Turn { column: 6 }).await;
        p1.read_msg().await;
        p2.read_msg().await;
        p1.read_msg().await; // TakeTurn
    }
    p1.send(&ClientMessage::Turn { column: 3 }).await;
    p1.read_msg().await;
    p2.read_msg().await;
    assert_eq!(p1.read_msg().await, ServerMessage::GameEnd { winner: 1 });
    assert_eq!(p2.read_msg().await, ServerMessage::GameEnd { winner: 1 });

    // same seats, fresh board
    p1.send(&ClientMessage::Ready).await;
    p2.send(&ClientMessage::Ready).await;
    assert_eq!(
        p1.read_msg().await,
        ServerMessage::GameStart {
            player_id: 1,
            columns: 7,
            rows: 6
        }
    );
    assert_eq!(
        p2.read_msg().await,
        ServerMessage::GameStart {
            player_id: 2,
            columns: 7,
            rows: 6
        }
    );
    assert_eq!(p1.read_msg().await, ServerMessage::TakeTurn);
}
