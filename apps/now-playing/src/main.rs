use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunebox_api_client::ApiClient;
use tunebox_shared_config::ServerConfig;
use tunebox_sync_client::{ActionKind, SyncClient, SyncEvent, SyncOptions};

mod dispatch;
mod display;

use dispatch::HttpActionDispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; logs go to stderr so they cannot tear the
    // status line on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunebox_now_playing=info,tunebox_sync_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Connecting to TuneBox server at {}:{}",
        config.host,
        config.port
    );

    let api = ApiClient::new(config.http_base())?;
    let options = SyncOptions::default();
    let client = SyncClient::with_dispatcher(
        config.ws_url(),
        options,
        Arc::new(HttpActionDispatcher::new(api)),
    );

    let mut events = client.subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut redraw = tokio::time::interval(options.redraw_interval);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    println!("Commands: play, stop, queue, quit");

    loop {
        tokio::select! {
            event = events.next_event() => match event {
                Some(SyncEvent::ActionFailed { action, reason }) => {
                    tracing::warn!(%action, reason = %reason, "action failed");
                }
                // Any state change redraws; the library logs the
                // connection lifecycle itself
                Some(_) => render(&client),
                None => break,
            },
            _ = redraw.tick() => render(&client),
            line = input.next_line() => match line? {
                Some(command) => {
                    if !handle_command(&client, command.trim()) {
                        break;
                    }
                    render(&client);
                }
                None => break,
            },
        }
    }

    events.unsubscribe();
    println!();
    Ok(())
}

/// Apply one typed command; returns false when the user asked to quit
fn handle_command(client: &SyncClient, command: &str) -> bool {
    match command {
        "" => {}
        "play" => client.request_action(ActionKind::Play),
        "stop" => client.request_action(ActionKind::Stop),
        "queue" => print_queue(client),
        "quit" | "q" | "exit" => return false,
        other => println!("unknown command {other:?}, try: play, stop, queue, quit"),
    }
    true
}

fn print_queue(client: &SyncClient) {
    match client.queue() {
        Some(queue) if !queue.is_empty() => {
            for (position, entry) in queue.entries.iter().enumerate() {
                match entry.duration {
                    Some(ms) => println!(
                        "{:>3}. {} - {} ({})",
                        position + 1,
                        entry.artist,
                        entry.title,
                        display::format_clock(ms as f64 / 1000.0),
                    ),
                    None => println!("{:>3}. {} - {}", position + 1, entry.artist, entry.title),
                }
            }
        }
        Some(_) => println!("queue is empty"),
        None => println!("queue not received yet"),
    }
}

fn render(client: &SyncClient) {
    let line = display::status_line(
        client.phase(),
        client.playback().as_ref(),
        client.progress().as_ref(),
    );
    // \r rewinds to column zero, ESC[K erases the stale tail
    print!("\r{line}\x1b[K");
    let _ = std::io::stdout().flush();
}
