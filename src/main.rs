use std::{
    io::{self, Write},
    process,
    sync::Arc,
    time::Duration,
};

use askama::Template;
use postdeck::{
    application::{error::AppError, manager::PostManager},
    config::{self, RenderArgs, Settings},
    domain::posts::PostFilter,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        rest::RestPostsApi,
        telemetry,
    },
    presentation::views::posts_page,
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Render(args) => run_render(settings, args).await,
    }
}

fn build_manager(settings: &Settings) -> Result<Arc<PostManager>, AppError> {
    let api = RestPostsApi::new(settings.remote.base_url.clone(), settings.remote.timeout)?;
    info!(
        base_url = %api.base_url(),
        user_agent = RestPostsApi::user_agent(),
        "remote post resource configured"
    );
    Ok(Arc::new(PostManager::new(
        Arc::new(api),
        settings.cache.capacity,
    )))
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let manager = build_manager(&settings)?;

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    // Pages render Loading until this first fetch lands.
    let mounting = manager.clone();
    tokio::spawn(async move { mounting.mount().await });

    let router = http::build_router(HttpState {
        manager,
        render_wait: settings.server.render_wait,
    });

    let stopping = Arc::new(Notify::new());
    let signal = stopping.clone();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            signal.notify_one();
        },
    );

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        () = drain_deadline(&stopping, settings.server.graceful_shutdown) => {
            warn!(
                seconds = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn drain_deadline(stopping: &Notify, grace: Duration) {
    stopping.notified().await;
    tokio::time::sleep(grace).await;
}

async fn run_render(settings: Settings, args: RenderArgs) -> Result<(), AppError> {
    let manager = build_manager(&settings)?;
    manager
        .show(PostFilter::from_input(args.user_id.as_deref()))
        .await;

    let html = posts_page(&manager.snapshot())
        .render()
        .map_err(|err| AppError::unexpected(format!("failed to render page: {err}")))?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(html.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    Ok(())
}
