use std::{process, sync::Arc, time::Duration};

use parlance::{
    application::{
        analytics::AnalyticsService,
        error::AppError,
        notes::{NoteService, NoteServiceOptions},
        repos::{NotesRepo, NotesWriteRepo},
    },
    cache::{CacheConfig, NoteCache},
    config,
    infra::{
        cache::build_cache_store,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
        translator::build_translator,
    },
};
use sqlx::postgres::PgPool;
use tokio::sync::oneshot;
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

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
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
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_api_state(repositories, &settings)?;
    serve_http(&settings, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    info!(target: "parlance::migrate", "migrations applied");
    Ok(())
}

async fn connect_pool(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let pool = connect_pool(settings).await?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApiState, AppError> {
    let notes_repo: Arc<dyn NotesRepo> = repositories.clone();
    let notes_write_repo: Arc<dyn NotesWriteRepo> = repositories;

    let cache_config = CacheConfig::from(&settings.cache);
    let store = build_cache_store(&settings.cache).map_err(AppError::from)?;
    let cache = NoteCache::new(store, cache_config);

    let translator = build_translator(&settings.translation).map_err(AppError::from)?;

    let max_upload_bytes = usize::try_from(settings.uploads.max_file_bytes.get())
        .map_err(|_| InfraError::configuration("uploads.max_file_bytes exceeds usize"))?;
    let options = NoteServiceOptions {
        translation_timeout: settings.translation.timeout,
        max_upload_bytes,
    };

    let notes = Arc::new(NoteService::new(
        notes_repo.clone(),
        notes_write_repo,
        cache.clone(),
        translator,
        options,
    ));
    let analytics = Arc::new(AnalyticsService::new(notes_repo, cache));

    Ok(ApiState { notes, analytics })
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target: "parlance::server",
        addr = %settings.server.addr,
        "listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = stop_rx.await;
        },
    );
    let mut server = tokio::spawn(async move { server.await });

    let signal = tokio::select! {
        joined = &mut server => return flatten_server_result(joined),
        signal = tokio::signal::ctrl_c() => signal,
    };

    if let Err(err) = signal {
        warn!(target: "parlance::server", error = %err, "failed to listen for ctrl-c");
        return flatten_server_result(server.await);
    }
    info!(target: "parlance::server", "shutdown requested");
    let _ = stop_tx.send(());

    drain(server, settings.server.graceful_shutdown).await
}

async fn drain(
    server: tokio::task::JoinHandle<std::io::Result<()>>,
    grace: Duration,
) -> Result<(), AppError> {
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            warn!(
                target: "parlance::server",
                grace_secs = grace.as_secs(),
                "graceful shutdown deadline elapsed; dropping open connections"
            );
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}
