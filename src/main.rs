use color_eyre::eyre::eyre;
use satunes::{
    browse::MediaBrowser,
    config::Config,
    context::AppContext,
    event::CatalogEvent,
    playback::{ChannelEngine, PlayerCommand},
    util::log::initialize_logging,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> color_eyre::Result<()> {
    setup()?;

    let mut config = Config::from_env();
    if let Some(root) = std::env::args().nth(1) {
        config.library_root = PathBuf::from(root);
    }

    let (engine, commands) = ChannelEngine::new();
    let player = tokio::spawn(async move {
        while let Ok(cmd) = commands.recv_async().await {
            match cmd {
                PlayerCommand::SetQueue(queue) => {
                    info!("Engine queue set to {} tracks", queue.len())
                }
                PlayerCommand::Play(music) => info!("Engine playing {}", music.path.display()),
                other => info!("Engine command: {other:?}"),
            }
        }
    });

    let mut ctx = AppContext::new(config, Arc::new(engine));
    let catalog_events = ctx.catalog.subscribe();
    let generation = ctx.start_scan();

    loop {
        match catalog_events.recv_async().await? {
            CatalogEvent::Loaded {
                generation: g,
                musics,
                warnings,
            } if g == generation => {
                println!("Loaded {musics} tracks ({warnings} skipped)");
                break;
            }
            CatalogEvent::ScanFailed {
                generation: g,
                reason,
            } if g == generation => {
                ctx.shutdown();
                return Err(eyre!(reason));
            }
            _ => {}
        }
    }

    for warning in ctx.catalog.warnings().iter() {
        warn!("{warning}");
    }
    print_tree(&ctx.browser, ctx.browser.root(), 0);

    if ctx.config.shuffle_on_load && !ctx.catalog.snapshot().is_empty() {
        ctx.navigator.shuffle_all()?;
        if let Some(music) = ctx.playback.current_music() {
            println!("Now playing: {}", music.title);
        }
    }

    ctx.shutdown();
    drop(ctx);
    player.await?;
    Ok(())
}

fn print_tree(browser: &MediaBrowser, id: &str, depth: usize) {
    let Some(children) = browser.children(id) else {
        return;
    };
    for item in children {
        println!("{}{} [{}]", "  ".repeat(depth), item.title, item.id);
        if (item.browsable && depth == 0) || item.id.starts_with("folders/") {
            print_tree(browser, &item.id, depth + 1);
        }
    }
}

fn setup() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    initialize_logging()
}
