//! Praise chat - compliment chatbot backed by Gemini
//!
//! `serve` runs the `POST /api/chat` endpoint in front of the upstream model.
//! `ask` plays the chat widget from a terminal: it calls a running server and
//! falls back to an offline compliment when the server can't deliver one.

mod api;
mod client;
mod config;
mod fallback;
mod llm;
mod prompt;
mod retry;

use api::{create_router, AppState};
use clap::Parser;
use client::{BotReply, ChatSession, ResilientRequester};
use config::{AskArgs, Cli, Command, ServeArgs};
use llm::GeminiConnector;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Ask(args) => ask(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "praise_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let api_key = args.api_key_source();
    if api_key.resolve().is_none() {
        tracing::warn!(
            var = %args.api_key_env,
            "Upstream API key not set; chat requests will return a configuration error until it is"
        );
    }

    let connector = Arc::new(GeminiConnector::new(&args.api_base, &args.model)?);
    tracing::info!(
        model = %args.model,
        max_attempts = args.max_attempts,
        retry_base_ms = args.retry_base_ms,
        "Upstream client configured"
    );

    let state = AppState::new(connector, api_key, args.retry_config());

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state).layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("Praise chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn ask(args: AskArgs) -> Result<(), Box<dyn Error>> {
    // Plain stderr logging so stdout carries only the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "praise_chat=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let requester = ResilientRequester::new(&args.server)?.with_retry_delay(args.retry_delay());
    let mut session = ChatSession::new(requester);
    let message = args.message();

    let Some(reply) = session.respond(&message).await else {
        return Err("message is empty".into());
    };
    print_reply(&reply);

    if reply.retry_offered() && args.retry {
        let retried = session.retry(message.trim()).await;
        print_reply(&retried);
    }

    Ok(())
}

fn print_reply(reply: &BotReply) {
    println!("{}", reply.text);
    if let Some(note) = reply.note() {
        println!("  ({note})");
    }
    if let Some(follow_up) = reply.follow_up {
        println!("{follow_up}");
    }
}
