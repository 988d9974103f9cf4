use anyhow::{bail, Context};
use homecare_client::config::{get_config, init_config};
use homecare_client::models::certificate::CertificateState;
use homecare_client::services::export_service::{ExportService, FileRenderer};
use homecare_client::HomecareClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  homecare-client attempt <attempt-id>
  homecare-client certificate <attempt-id> <out-dir>";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        let message = match e.downcast_ref::<homecare_client::error::Error>() {
            Some(err) => err.user_message(),
            None => format!("{:#}", e),
        };
        tracing::error!(error = ?e, "Command failed");
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    if !matches!(args.as_slice(), ["attempt", _] | ["certificate", _, _]) {
        bail!(USAGE);
    }

    init_config()?;
    let config = get_config()?;
    info!(base_url = %config.api_base_url, "Configuration loaded");
    let client = HomecareClient::new(config.clone())?;

    match args.as_slice() {
        ["attempt", attempt_id] => show_attempt(&client, attempt_id).await,
        ["certificate", attempt_id, out_dir] => export_certificate(&client, attempt_id, out_dir).await,
        _ => bail!(USAGE),
    }
}

async fn show_attempt(client: &HomecareClient, attempt_id: &str) -> anyhow::Result<()> {
    let mut session = client.exam_session();
    session.resume(attempt_id).await?;

    let title = session.exam().map(|e| e.title.clone()).unwrap_or_default();
    println!("Exam:     {}", title);
    match session.result() {
        Some(result) => {
            println!("Status:   {:?}", result.status);
            println!("Score:    {}% ({:?})", result.score, result.score_source);
            println!("Passed:   {}", if result.passed { "yes" } else { "no" });
        }
        None => {
            println!(
                "Status:   in progress ({}/{} answered)",
                session.answered_count(),
                session.questions().len()
            );
            if let Some(left) = session.time_remaining(homecare_client::utils::time::now()) {
                println!(
                    "Time left: {}",
                    homecare_client::utils::time::format_countdown(left)
                );
            }
            return Ok(());
        }
    }

    match session.certificate_state() {
        CertificateState::NotEligible => println!("Certificate: not eligible"),
        CertificateState::Generating => println!("Certificate: generating"),
        CertificateState::Issued(cert) => {
            println!("Certificate: {} ({:?})", cert.certificate_number, cert.status)
        }
    }
    Ok(())
}

async fn export_certificate(client: &HomecareClient, attempt_id: &str, out_dir: &str) -> anyhow::Result<()> {
    let cert = match client.certificate_service.find_for_attempt(attempt_id).await? {
        Some(cert) => cert,
        None => {
            let mut session = client.exam_session();
            session.resume(attempt_id).await?;
            match session.await_certificate().await? {
                CertificateState::Issued(cert) => cert,
                CertificateState::Generating => {
                    bail!("The certificate for attempt {} is still being generated", attempt_id)
                }
                CertificateState::NotEligible => {
                    bail!("Attempt {} has not earned a certificate", attempt_id)
                }
            }
        }
    };

    let renderer = FileRenderer::new(out_dir);
    ExportService::export(&cert, &renderer)
        .with_context(|| format!("Failed to export certificate {}", cert.certificate_number))?;
    println!("{}", renderer.path_for(&cert.certificate_number).display());
    Ok(())
}
