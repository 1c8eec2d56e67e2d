use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use actix_web::web;
use contact_relay::{config::Config, email_client::EmailClient, telemetry};
use once_cell::sync::Lazy;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

// 设置`TEST_LOG`时才输出日志
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        telemetry::init_subscriber(telemetry::get_subscriber("test", "debug", std::io::stdout));
    } else {
        telemetry::init_subscriber(telemetry::get_subscriber("test", "debug", std::io::sink));
    }
});

pub struct TestApp {
    pub address: String,
    pub smtp_server: MockSmtpServer,
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("failed to execute request.")
    }

    pub async fn post_contact_raw(&self, content_type: &str, body: &'static str) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/contact", &self.address))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(format!("{}{}", &self.address, path))
            .await
            .expect("failed to execute request.")
    }
}

pub async fn spawn_app() -> TestApp {
    let smtp_server = MockSmtpServer::start().await;
    let smtp_port = smtp_server.port;
    spawn_app_with_relay(smtp_server, smtp_port).await
}

/// SMTP端口上没有任何服务监听
pub async fn spawn_app_without_relay() -> TestApp {
    let smtp_server = MockSmtpServer::start().await;
    let closed_port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind a random port.");
        listener.local_addr().unwrap().port()
    };
    spawn_app_with_relay(smtp_server, closed_port).await
}

async fn spawn_app_with_relay(smtp_server: MockSmtpServer, smtp_port: u16) -> TestApp {
    Lazy::force(&TRACING);

    let mut config = contact_relay::config::config().expect("failed to read config.");
    point_at_mock_relay(&mut config, smtp_port);

    let listener =
        TcpListener::bind(format!("{}:0", &config.web.host)).expect("failed to bind web port.");
    // 获取绑定的随机端口
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://{}:{}", &config.web.host, port);

    let email_client = web::Data::new(
        EmailClient::from_config(&config.email_client).expect("failed to build email client."),
    );
    let server = contact_relay::run(listener, email_client).expect("failed to start server.");
    tokio::spawn(server);

    TestApp {
        address,
        smtp_server,
    }
}

fn point_at_mock_relay(config: &mut Config, smtp_port: u16) {
    let email_client = &mut config.email_client;
    email_client.smtp_host = "127.0.0.1".into();
    email_client.smtp_port = smtp_port;
    email_client.secure = false;
    email_client.username = None;
    email_client.password = None;
    email_client.timeout_milliseconds = 2_000;
}

pub fn valid_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "topic": "General",
        "message": "Hello",
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SmtpBehaviour {
    Accept,
    /// 收完DATA后返回554
    RejectData,
}

#[derive(Clone, Debug)]
pub struct ReceivedEmail {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: String,
}

#[derive(Default)]
struct SmtpState {
    connections: AtomicUsize,
    received: Mutex<Vec<ReceivedEmail>>,
    reject_data: Mutex<bool>,
}

/// 模拟SMTP中继，每个连接处理一次完整会话
pub struct MockSmtpServer {
    pub port: u16,
    state: Arc<SmtpState>,
}

impl MockSmtpServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock smtp port.");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(SmtpState::default());

        let accept_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accept_state.connections.fetch_add(1, Ordering::SeqCst);
                let state = accept_state.clone();
                tokio::spawn(async move {
                    let _ = handle_session(stream, state).await;
                });
            }
        });

        Self { port, state }
    }

    pub fn respond_with(&self, behaviour: SmtpBehaviour) {
        *self.state.reject_data.lock().unwrap() = behaviour == SmtpBehaviour::RejectData;
    }

    pub fn connection_count(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub fn received_emails(&self) -> Vec<ReceivedEmail> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn handle_session(stream: TcpStream, state: Arc<SmtpState>) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    writer.write_all(b"220 mock.smtp ESMTP ready\r\n").await?;

    let mut mail_from = String::new();
    let mut rcpt_to = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let command = line.trim_end().to_owned();
        let verb = command.to_ascii_uppercase();

        if verb.starts_with("EHLO") || verb.starts_with("HELO") {
            writer.write_all(b"250-mock.smtp\r\n250 8BITMIME\r\n").await?;
        } else if verb.starts_with("MAIL FROM:") {
            mail_from = angle_address(&command);
            writer.write_all(b"250 OK\r\n").await?;
        } else if verb.starts_with("RCPT TO:") {
            rcpt_to.push(angle_address(&command));
            writer.write_all(b"250 OK\r\n").await?;
        } else if verb == "DATA" {
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;
            let Some(data) = read_data(&mut reader).await? else {
                return Ok(());
            };
            let reject = *state.reject_data.lock().unwrap();
            if reject {
                writer.write_all(b"554 Transaction failed\r\n").await?;
            } else {
                state.received.lock().unwrap().push(ReceivedEmail {
                    mail_from: std::mem::take(&mut mail_from),
                    rcpt_to: std::mem::take(&mut rcpt_to),
                    data,
                });
                writer.write_all(b"250 OK queued\r\n").await?;
            }
        } else if verb == "QUIT" {
            writer.write_all(b"221 Bye\r\n").await?;
            return Ok(());
        } else if verb == "RSET" {
            mail_from.clear();
            rcpt_to.clear();
            writer.write_all(b"250 OK\r\n").await?;
        } else {
            writer.write_all(b"250 OK\r\n").await?;
        }
    }
}

async fn read_data(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
) -> std::io::Result<Option<String>> {
    let mut data = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        if line == ".\r\n" || line == ".\n" {
            return Ok(Some(data));
        }
        // dot-stuffing
        let content = line.strip_prefix('.').unwrap_or(&line);
        data.push_str(content);
    }
}

fn angle_address(command: &str) -> String {
    match (command.find('<'), command.find('>')) {
        (Some(start), Some(end)) if start < end => command[start + 1..end].to_owned(),
        _ => String::new(),
    }
}
