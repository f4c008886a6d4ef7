use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use transcript::SrtWriter;
use transcription_gateway::{engine::build_transcriber, observability::init_tracing, routes::app, AppState, ArtifactPaths, Config};

const WORKER_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();

	let config = Config::parse();
	config.validate().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

	init_tracing(&config);

	info!(
		host = %config.host,
		port = config.port,
		engine = ?config.engine,
		uploads = %config.uploads_dir.display(),
		results = %config.results_dir.display(),
		"🎯 Starting transcription gateway"
	);

	ArtifactPaths::new(config.uploads_dir.clone(), config.results_dir.clone()).provision().await?;

	let transcriber = build_transcriber(&config)?;
	let config = Arc::new(config);
	let shutdown_token = CancellationToken::new();

	let (state, worker) = AppState::build(config.clone(), transcriber, Arc::new(SrtWriter::new()), shutdown_token.clone());
	let worker_handle = worker.spawn();

	let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
	info!("🚀 Listening on {}", listener.local_addr()?);

	let signal_token = shutdown_token.clone();
	tokio::spawn(async move {
		wait_for_shutdown_signal().await;
		info!("🛑 Shutdown signal received (SIGTERM/SIGINT)");
		signal_token.cancel();
	});

	let server_token = shutdown_token.clone();
	axum::serve(listener, app(state))
		.with_graceful_shutdown(async move {
			server_token.cancelled().await;
		})
		.await?;
	info!("Server stopped");

	// The token is already cancelled here unless serve returned on its own
	shutdown_token.cancel();

	match tokio::time::timeout(Duration::from_secs(WORKER_SHUTDOWN_TIMEOUT_SECS), worker_handle).await {
		Ok(Ok(())) => info!("✅ Worker drained"),
		Ok(Err(e)) => error!(error = %e, "❌ Worker task ended abnormally"),
		Err(_) => {
			// A running transcription cannot be interrupted; the OS reclaims its thread
			warn!("⚠️ Worker still busy after {}s, exiting without waiting", WORKER_SHUTDOWN_TIMEOUT_SECS);
			std::process::exit(0);
		}
	}

	info!("Shutdown complete");
	Ok(())
}

async fn wait_for_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!(error = %e, "Failed to install Ctrl+C handler");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				error!(error = %e, "Failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}
