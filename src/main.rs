use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use letterbox_blend::{
    config::Config,
    error::{BlendError, SubmitError},
    models::{validate_pair, RankedResultSet, Tier},
    services::{BlendSession, HttpBackend, RevealScheduler, RevealState, TestBlendRequest},
    store::ResultStore,
};

#[derive(Parser, Debug)]
#[command(name = "letterbox-blend", about = "Blend two Letterboxd profiles into one watchlist")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blend two profiles (handles or profile URLs)
    Blend { first: String, second: String },
    /// Preview the reveal with the service's pre-generated recommendations
    Mock,
    /// Blend two users from data saved on the service
    TestBlend {
        #[arg(long, default_value = "rbaveje")]
        user1: String,
        #[arg(long, default_value = "vihaanbinges")]
        user2: String,
    },
    /// Check that the service is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "letterbox_blend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let backend = HttpBackend::from_config(&config)?;
    let session = BlendSession::new(Arc::new(backend), ResultStore::new());

    let outcome = match args.command {
        Command::Health => {
            let health = session.health().await?;
            println!(
                "{} ({})",
                health.status,
                health.version.as_deref().unwrap_or("unknown version")
            );
            return Ok(());
        }
        Command::Blend { first, second } => match validate_pair(&first, &second) {
            Ok(request) => session.submit_blend(&request).await,
            Err(errors) => {
                if let Some(message) = &errors.first {
                    eprintln!("first profile: {}", message);
                }
                if let Some(message) = &errors.second {
                    eprintln!("second profile: {}", message);
                }
                return Err(errors.into());
            }
        },
        Command::Mock => session.submit_mock_blend().await,
        Command::TestBlend { user1, user2 } => {
            let request = TestBlendRequest {
                user1_name: user1,
                user2_name: user2,
            };
            session.submit_test_blend(&request).await
        }
    };

    if let Err(e) = outcome {
        report(&e);
        return Err(e.into());
    }

    let scheduler = RevealScheduler::from_config(&config);
    let mut reveal = scheduler.mount(session.store()).await;

    if reveal.state() == RevealState::Complete {
        println!("No recommendations for this pair.");
        return Ok(());
    }

    loop {
        tokio::select! {
            transition = reveal.next_transition() => match transition {
                Some(RevealState::Revealing(n)) if n > 0 => print_item(reveal.results(), n - 1),
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                reveal.teardown();
                println!("\nStopped after {} of {}.", reveal.visible_count(), reveal.total());
                break;
            }
        }
    }

    Ok(())
}

fn print_item(results: &RankedResultSet, rank: usize) {
    let Some(item) = results.get(rank) else {
        return;
    };

    let marker = match Tier::of(rank) {
        Tier::A => "***",
        Tier::B => "** ",
        Tier::C => "*  ",
        Tier::D => "   ",
    };
    let year = item.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    let score = item
        .combined_score
        .map(|s| format!("  score {:.2}", s))
        .unwrap_or_default();

    println!("{} {:>2}. {}{}{}", marker, rank + 1, item.title, year, score);
    if !item.display_cast().is_empty() {
        println!("        {}", item.display_cast().join(", "));
    }
}

fn report(error: &SubmitError) {
    match error {
        SubmitError::Blend(BlendError::BudgetExhausted { hint, resets_at }) => {
            eprintln!("{} (resets {})", hint, resets_at.format("%Y-%m-%d %H:%M UTC"));
        }
        SubmitError::Blend(BlendError::Network(_)) => {
            eprintln!("Could not reach the blend service. Check your connection and try again.");
        }
        other => eprintln!("{}", other),
    }
}
