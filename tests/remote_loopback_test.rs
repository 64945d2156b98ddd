use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use gridmatch::adapter::{serve_player, Message, MessageId, RemotePlayer, ServeOutcome};
use gridmatch::core::{Board, BoardSnapshot, GridBoard};
use gridmatch::engine::{FinishReason, GameMaster, MoveReply, Player, RandomPlayer};
use gridmatch::types::{BotIndex, Move};

const LAYOUT: &str = "\
#######
#0...1#
#2...3#
#######";

fn listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn snapshot() -> BoardSnapshot {
    GridBoard::from_layout_str(LAYOUT, 2).unwrap().snapshot()
}

/// Blocking peer standing in for a player process.
struct FakePeer {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl FakePeer {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        Self {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: stream,
        }
    }

    /// Next message, or `None` on EOF.
    fn recv(&mut self) -> Option<Message> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).expect("read timed out");
        if n == 0 {
            return None;
        }
        Some(Message::from_line(&line).expect("engine sent an invalid message"))
    }

    fn recv_query_id(&mut self) -> MessageId {
        match self.recv() {
            Some(Message::Query(q)) => {
                assert_eq!(q.method, "get_move");
                q.id
            }
            other => panic!("expected get_move query, got {other:?}"),
        }
    }

    fn send_raw(&mut self, value: Value) {
        let mut line = value.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).unwrap();
        self.writer.flush().unwrap();
    }

    fn respond(&mut self, id: &MessageId, result: Value) {
        self.send_raw(json!({"type": "response", "result": result, "id": id}));
    }
}

#[test]
fn test_handshake_notifications_and_move() {
    let (listener, addr) = listener();
    let peer = thread::spawn(move || {
        let mut peer = FakePeer::connect(addr);
        let ids = peer.recv();
        let initial = peer.recv();
        let query = peer.recv();
        let Some(Message::Query(q)) = &query else {
            panic!("expected query, got {query:?}");
        };
        peer.respond(&q.id, json!("south"));
        (ids, initial, query)
    });

    let mut player = RemotePlayer::accept(&listener, Duration::from_secs(2)).unwrap();
    let snap = snapshot();
    player.set_bot_ids(&[0, 2]);
    player.set_initial(&snap);
    assert_eq!(player.get_move(0, &snap), MoveReply::Move(Move::South));

    let (ids, initial, query) = peer.join().unwrap();
    assert_eq!(ids, Some(Message::notification("set_bot_ids", json!([0, 2]))));

    let Some(Message::Notification(initial)) = initial else {
        panic!("expected set_initial notification");
    };
    assert_eq!(initial.method, "set_initial");
    assert_eq!(initial.params["width"], 7);
    assert_eq!(initial.params["teams"], json!([[0, 2], [1, 3]]));

    let Some(Message::Query(query)) = query else {
        unreachable!()
    };
    assert_eq!(query.params["bot"], 0);
    assert_eq!(query.params["board"]["bots"][0]["x"], 1);
}

#[test]
fn test_timeout_then_stale_reply_is_discarded() {
    let (listener, addr) = listener();
    let peer = thread::spawn(move || {
        let mut peer = FakePeer::connect(addr);
        let first = peer.recv_query_id();
        // Only answer once the engine has given up and asked again.
        let second = peer.recv_query_id();
        peer.respond(&first, json!("east"));
        peer.respond(&second, json!("west"));
        (first, second)
    });

    let mut player = RemotePlayer::accept(&listener, Duration::from_millis(200)).unwrap();
    let snap = snapshot();
    assert_eq!(player.get_move(0, &snap), MoveReply::Timeout);
    assert_eq!(
        player.get_move(0, &snap),
        MoveReply::Move(Move::West),
        "stale reply must not answer the newer query"
    );

    let (first, second) = peer.join().unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_error_and_garbage_replies_are_illegal_moves() {
    let (listener, addr) = listener();
    let peer = thread::spawn(move || {
        let mut peer = FakePeer::connect(addr);

        let id = peer.recv_query_id();
        peer.send_raw(json!({"type": "error", "error": "unsolicited", "id": null}));
        peer.send_raw(json!({"type": "error", "error": "cannot decide", "id": id}));

        let id = peer.recv_query_id();
        peer.respond(&id, json!(42));

        let id = peer.recv_query_id();
        peer.respond(&id, json!("jump"));

        // Legacy untagged reply.
        let id = peer.recv_query_id();
        peer.send_raw(json!({"result": "NORTH", "id": id}));
    });

    let mut player = RemotePlayer::accept(&listener, Duration::from_secs(2)).unwrap();
    let snap = snapshot();
    assert_eq!(player.get_move(0, &snap), MoveReply::IllegalMove);
    assert_eq!(player.get_move(0, &snap), MoveReply::IllegalMove);
    assert_eq!(player.get_move(0, &snap), MoveReply::IllegalMove);
    assert_eq!(player.get_move(0, &snap), MoveReply::Move(Move::North));
    peer.join().unwrap();
}

#[test]
fn test_closed_connection_is_a_lasting_disconnect() {
    let (listener, addr) = listener();
    let peer = thread::spawn(move || {
        let mut peer = FakePeer::connect(addr);
        peer.recv_query_id();
        // Dropping the peer closes the socket.
    });

    let mut player = RemotePlayer::accept(&listener, Duration::from_secs(2)).unwrap();
    let snap = snapshot();
    assert_eq!(player.get_move(1, &snap), MoveReply::Disconnected);
    peer.join().unwrap();

    assert!(player.is_disconnected());
    assert_eq!(player.get_move(1, &snap), MoveReply::Disconnected);
}

#[test]
fn test_finish_sends_exit() {
    let (listener, addr) = listener();
    let peer = thread::spawn(move || {
        let mut peer = FakePeer::connect(addr);
        let exit = peer.recv();
        let eof = peer.recv();
        (exit, eof)
    });

    let mut player = RemotePlayer::accept(&listener, Duration::from_secs(2)).unwrap();
    player.finish();
    drop(player);

    let (exit, eof) = peer.join().unwrap();
    assert_eq!(exit, Some(Message::notification("exit", Value::Null)));
    assert_eq!(eof, None);
}

/// Open `side` x `side` grid with bot 0 and bot 1 in the top corners.
fn open_layout(side: usize) -> String {
    let mut rows = vec![".".repeat(side); side];
    rows[0].replace_range(0..1, "0");
    rows[0].replace_range(side - 1..side, "1");
    rows.join("\n")
}

#[test]
fn test_player_that_never_reads_cannot_stall_the_engine() {
    let (listener, addr) = listener();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let peer = thread::spawn(move || {
        // Holds the socket open without ever reading from it.
        let stream = TcpStream::connect(addr).unwrap();
        let _ = release_rx.recv();
        drop(stream);
    });

    let (done_tx, done_rx) = mpsc::channel();
    let engine = thread::spawn(move || {
        let mut player = RemotePlayer::accept(&listener, Duration::from_millis(10)).unwrap();
        let snap = GridBoard::from_layout_str(&open_layout(300), 2)
            .unwrap()
            .snapshot();
        player.set_bot_ids(&[0]);
        player.set_initial(&snap);

        // Enough board traffic to fill the socket buffers several times over.
        let mut slowest = Duration::ZERO;
        for _ in 0..200 {
            let started = Instant::now();
            assert_eq!(player.get_move(0, &snap), MoveReply::Timeout);
            slowest = slowest.max(started.elapsed());
        }
        let started = Instant::now();
        player.finish();
        done_tx.send((slowest, started.elapsed())).unwrap();
    });

    let (slowest, finish_took) = done_rx
        .recv_timeout(Duration::from_secs(60))
        .expect("engine blocked on a player that never reads");
    release_tx.send(()).unwrap();
    engine.join().unwrap();
    peer.join().unwrap();

    assert!(slowest < Duration::from_secs(2), "slowest get_move took {slowest:?}");
    assert!(finish_took < Duration::from_secs(2), "finish took {finish_took:?}");
}

/// Plays normally for `moves` moves, then gives up.
struct Quitter {
    inner: RandomPlayer,
    moves: u32,
}

impl Player for Quitter {
    fn set_bot_ids(&mut self, ids: &[BotIndex]) {
        self.inner.set_bot_ids(ids);
    }
    fn set_initial(&mut self, board: &BoardSnapshot) {
        self.inner.set_initial(board);
    }
    fn get_move(&mut self, bot: BotIndex, board: &BoardSnapshot) -> MoveReply {
        if self.moves == 0 {
            return MoveReply::Disconnected;
        }
        self.moves -= 1;
        self.inner.get_move(bot, board)
    }
}

fn remote_match(
    game_time: u32,
    team1: impl Player + Send + 'static,
) -> (FinishReason, ServeOutcome, ServeOutcome) {
    let (listener, addr) = listener();
    let mut gm = GameMaster::new(GridBoard::from_layout_str(LAYOUT, 2).unwrap(), game_time, 1);

    let first = thread::spawn(move || serve_player(addr, RandomPlayer::new(11)).unwrap());
    let remote = RemotePlayer::accept(&listener, Duration::from_secs(2)).unwrap();
    gm.register_player(Box::new(remote)).unwrap();

    let second = thread::spawn(move || serve_player(addr, team1).unwrap());
    let remote = RemotePlayer::accept(&listener, Duration::from_secs(2)).unwrap();
    gm.register_player(Box::new(remote)).unwrap();

    let reason = gm.play().unwrap();
    // Players are finished; drop the proxies so their sockets close.
    drop(gm);
    (reason, first.join().unwrap(), second.join().unwrap())
}

#[test]
fn test_full_match_over_tcp() {
    let (reason, a, b) = remote_match(6, RandomPlayer::new(12));
    assert_eq!(reason, FinishReason::RoundsExhausted);
    assert_eq!(a, ServeOutcome::Exited);
    assert_eq!(b, ServeOutcome::Exited);
}

#[test]
fn test_remote_player_hanging_up_loses_the_match() {
    let quitter = Quitter {
        inner: RandomPlayer::new(12),
        moves: 3,
    };
    let (reason, a, b) = remote_match(20, quitter);
    assert_eq!(reason, FinishReason::TeamWon(0));
    assert_eq!(a, ServeOutcome::Exited);
    assert_eq!(b, ServeOutcome::HungUp);
}
