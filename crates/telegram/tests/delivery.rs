use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use common::{Error, Notifier};
use telegram_notify::TelegramNotifier;

struct CapturedRequest {
    request_line: String,
    body: String,
}

/// Serve exactly one request with the given status line and body, and hand
/// the captured request back over a channel.
fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let captured = read_request(&stream);
        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {status}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        let _ = tx.send(captured);
    });

    (base, rx)
}

fn read_request(stream: &TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if let Some(v) = lower.strip_prefix("content-length:") {
            content_length = v.trim().parse().unwrap();
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).unwrap();
    CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        body: String::from_utf8(body).unwrap(),
    }
}

#[test]
fn posts_form_fields_to_send_message() {
    let (base, rx) = serve_once("200 OK", r#"{"ok":true,"result":{}}"#);
    let notifier = TelegramNotifier::new("123:abc", "42", &base, Duration::from_secs(5)).unwrap();

    notifier.send("hello <b>world</b>").expect("delivery should succeed");

    let req = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(req.request_line, "POST /bot123:abc/sendMessage HTTP/1.1");
    assert!(req.body.contains("chat_id=42"), "body: {}", req.body);
    assert!(req.body.contains("parse_mode=HTML"), "body: {}", req.body);
    assert!(
        req.body.contains("text=hello+%3Cb%3Eworld%3C%2Fb%3E"),
        "body: {}",
        req.body
    );
}

#[test]
fn http_error_status_is_reported() {
    let (base, _rx) = serve_once(
        "400 Bad Request",
        r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
    );
    let notifier = TelegramNotifier::new("t", "nope", &base, Duration::from_secs(5)).unwrap();

    match notifier.send("x") {
        Err(Error::Telegram(msg)) => assert!(msg.contains("chat not found"), "got: {msg}"),
        other => panic!("expected Telegram error, got {other:?}"),
    }
}

#[test]
fn ok_false_body_is_reported() {
    let (base, _rx) = serve_once("200 OK", r#"{"ok":false,"description":"Forbidden"}"#);
    let notifier = TelegramNotifier::new("t", "1", &base, Duration::from_secs(5)).unwrap();

    assert!(matches!(notifier.send("x"), Err(Error::Telegram(_))));
}

#[test]
fn unresponsive_server_times_out() {
    // Bound but never accepted: the request is written, no response arrives.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let notifier = TelegramNotifier::new("t", "1", &base, Duration::from_millis(200)).unwrap();

    let started = Instant::now();
    let result = notifier.send("x");
    assert!(matches!(result, Err(Error::Http(_))), "got {result:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    drop(listener);
}

#[test]
fn refused_connection_is_an_http_error_without_token() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{port}");
    let notifier =
        TelegramNotifier::new("secret-token", "1", &base, Duration::from_secs(1)).unwrap();

    match notifier.send("x") {
        Err(Error::Http(msg)) => assert!(!msg.contains("secret-token"), "token leaked: {msg}"),
        other => panic!("expected HTTP error, got {other:?}"),
    }
}
