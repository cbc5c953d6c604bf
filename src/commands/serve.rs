use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::{
    ServeArgs,
    build::{BuildResult, Builder, ChangeKind, FileWatcher, PathClassifier, WatchEvent, WatchPaths},
    config::Config,
};

/// Endpoint templates subscribe to when `dev.live_reload` is set.
pub const LIVE_RELOAD_PATH: &str = "/_landfall/live-reload";

/// SSE handler for live reload notifications.
async fn live_reload_handler(
    State(tx): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = tx.subscribe();
    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(_) => {
                    yield Ok(Event::default().event("reload").data("reload"));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    // Missed some messages; the browser only needs the latest
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let (config, base_path, config_path) = super::load_config(args.config_file.as_deref())?;

    // Create broadcast channel for live reload
    let (reload_tx, _) = broadcast::channel::<()>(16);

    // The first build must succeed; later failures only get logged
    println!("Building site...");
    let result = do_build(&config, &base_path)?;
    println!(
        "Built {} documents, {} static files",
        result.documents, result.static_files
    );

    let _watcher_handle = if args.watch {
        let resolved = config.paths.resolve(&base_path);
        let canonical = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
        let watch_paths = WatchPaths {
            content_dir: canonical(&resolved.content),
            templates_dir: canonical(&resolved.templates),
            static_dir: canonical(&resolved.r#static),
            config_path: canonical(&config_path),
            output_dir: canonical(&resolved.output),
        };
        let classifier = PathClassifier::new(watch_paths.clone());

        match FileWatcher::new(&config.dev.watch, &watch_paths, classifier) {
            Ok(watcher) => {
                println!("Watching for changes...");
                let watcher_reload_tx = reload_tx.clone();
                let mut rebuild_config = config.clone();
                let rebuild_base = base_path.clone();

                // One blocking task handles every change in order, so two
                // builds never run at the same time
                Some(tokio::task::spawn_blocking(move || {
                    while let Some(event) = watcher.recv() {
                        match event {
                            WatchEvent::FilesChanged(changes) => {
                                log::info!("detected {} change(s), rebuilding", changes.len());
                                for change in &changes {
                                    match change.path() {
                                        Some(path) => log::debug!("  changed: {}", path.display()),
                                        None => log::debug!("  changed: config"),
                                    }
                                }

                                if changes.contains(&ChangeKind::Config) {
                                    match Config::load_from_file(&config_path) {
                                        Ok(reloaded) => rebuild_config = reloaded,
                                        Err(e) => {
                                            log::error!("config reload failed: {e}");
                                            continue;
                                        }
                                    }
                                }

                                match do_build(&rebuild_config, &rebuild_base) {
                                    Ok(result) => {
                                        println!(
                                            "Rebuilt {} documents, {} static files",
                                            result.documents, result.static_files
                                        );
                                        let _ = watcher_reload_tx.send(());
                                    }
                                    Err(e) => log::error!("rebuild failed: {e:#}"),
                                }
                            }
                            WatchEvent::Error(e) => {
                                log::warn!("watch error: {e}");
                            }
                        }
                    }
                }))
            }
            Err(e) => {
                log::warn!("failed to start file watcher: {e}");
                None
            }
        }
    } else {
        None
    };

    let serve_dir = ServeDir::new(&result.output_dir).append_index_html_on_directories(true);

    let app = Router::new()
        .route(LIVE_RELOAD_PATH, get(live_reload_handler))
        .with_state(reload_tx)
        .fallback_service(serve_dir);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    println!("\nServing site at {}", url);
    println!("Press Ctrl+C to stop\n");

    if args.open
        && let Err(e) = open::that(&url)
    {
        log::warn!("failed to open browser: {e}");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run one full generation with dev-mode template flags set.
fn do_build(config: &Config, base_path: &Path) -> Result<BuildResult, anyhow::Error> {
    let builder = Builder::new(config, base_path).with_dev_mode(true, config.dev.live_reload);
    Ok(builder.build()?)
}
