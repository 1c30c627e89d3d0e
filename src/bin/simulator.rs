use clap::{App, Arg};
use drs_validator::registry::{CommandRegistry, DeviceRole};
use drs_validator::transport::{DEFAULT_READ_BUFFER, DRS_PORT};
use drs_validator::frame::encode_hex;
use drs_validator::MockResponseStore;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let default_port = DRS_PORT.to_string();
    let matches = App::new("drs-simulator")
        .version("0.1.0")
        .about("📡 Offline DRS unit answering Santone frames with canned responses")
        .arg(
            Arg::with_name("bind")
                .short("b")
                .long("bind")
                .value_name("ADDR")
                .help("Address to listen on")
                .takes_value(true)
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("TCP port")
                .takes_value(true)
                .default_value(&default_port),
        )
        .arg(
            Arg::with_name("role")
                .short("r")
                .long("role")
                .value_name("ROLE")
                .help("Device role to impersonate")
                .takes_value(true)
                .possible_values(&["master", "remote"])
                .default_value("master"),
        )
        .get_matches();

    let bind = matches.value_of("bind").unwrap_or("127.0.0.1");
    let port = matches.value_of("port").unwrap_or_default().parse::<u16>()?;
    let role = matches
        .value_of("role")
        .and_then(DeviceRole::parse)
        .ok_or("role must be 'master' or 'remote'")?;

    println!("📡 DRS Unit Simulator ({})", role);
    println!("=========================");

    let listener = TcpListener::bind((bind, port)).await?;
    info!("🌐 Listening on {}:{} as {}", bind, port, role);

    let store = MockResponseStore::global();
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, &store, role).await {
                        warn!("Client {} error: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// One request frame per connection, as a real unit behaves.
async fn handle_client(
    mut stream: TcpStream,
    store: &MockResponseStore,
    role: DeviceRole,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buffer = [0u8; DEFAULT_READ_BUFFER];
    let n = stream.read(&mut buffer).await?;
    if n == 0 {
        return Ok(());
    }

    let request = &buffer[..n];
    info!("📨 RX {}", encode_hex(request));

    match store.answer_request(CommandRegistry::global(), role, request) {
        Some(reply) => {
            stream.write_all(&reply).await?;
            stream.flush().await?;
            info!("📤 TX {}", encode_hex(&reply));
        }
        None => warn!("No canned answer for {}", encode_hex(request)),
    }
    Ok(())
}
