use std::sync::Arc;

use onboarding_notifier::config::Config;
use onboarding_notifier::error::NotifyError;
use onboarding_notifier::mailer::SmtpMailer;
use onboarding_notifier::notifier::{Mode, Notifier};
use onboarding_notifier::store::GraphQlStore;

/// Parse the invocation mode from command-line arguments.
///
/// Accepts `periodic`, `direct <onboarding-id>`, or a single JSON event
/// argument (`{"type":"periodic"}` / `{"type":"direct","onboardingId":...}`)
/// as produced by the upstream scheduler.
fn parse_mode(args: &[String]) -> Result<Mode, NotifyError> {
    match args {
        [one] if one.trim_start().starts_with('{') => serde_json::from_str(one)
            .map_err(|e| NotifyError::InvalidEvent(format!("bad JSON event: {e}"))),
        [one] if one == "periodic" => Ok(Mode::Periodic),
        [a, id] if a == "direct" => Ok(Mode::Direct {
            onboarding_id: id.clone(),
        }),
        _ => Err(NotifyError::InvalidEvent(
            "expected `periodic`, `direct <onboarding-id>`, or a JSON event".into(),
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_mode(&args)?;

    let config = Config::from_env()?;
    let store = Arc::new(GraphQlStore::new(
        config.graphql_endpoint.clone(),
        config.graphql_api_key.clone(),
    ));
    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));

    let notifier = Notifier::new(store, mailer, config.page_limit);
    let summary = notifier.run(&mode).await?;

    println!("Emails processed successfully: {summary}");
    Ok(())
}
