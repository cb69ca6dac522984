use std::sync::Arc;

use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;

use console::{Command, Console, Flow, HELP};
use doctor_cell::seed::sample_doctors;
use doctor_cell::{DoctorService, InMemoryDoctorRepository};
use patient_cell::seed::sample_patients;
use patient_cell::{InMemoryPatientRepository, PatientService};
use session_cell::{CalendarService, InMemorySessionStore, SessionWizard};
use shared_config::AppConfig;
use shared_utils::{Clock, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing; stdout belongs to the console
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting clinic session scheduler");

    // Load configuration
    let config = AppConfig::from_env();
    debug!("Loaded configuration: {:?}", config);

    let console = build_console(&config);

    println!("{}\n", HELP);
    println!("{}", console.render_snapshot().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let result = match Command::parse(&line) {
            Ok(command) => console.handle(command).await,
            Err(e) => Err(e),
        };

        match result {
            Ok((output, flow)) => {
                println!("{}", output);
                if flow == Flow::Quit {
                    break;
                }
            }
            Err(e) => println!("Error: {}", e.report()),
        }
    }

    info!("Scheduler stopped");
    Ok(())
}

fn build_console(config: &AppConfig) -> Console {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::from_config(config));
    let patient_repository = Arc::new(InMemoryPatientRepository::with_patients(sample_patients()));
    let doctor_repository = Arc::new(InMemoryDoctorRepository::with_doctors(sample_doctors()));
    let store = Arc::new(InMemorySessionStore::new(config));

    info!(
        "Seeded directory, submit delay {:?}, intake delay {:?}",
        config.submit_delay(),
        config.intake_delay()
    );

    Console {
        wizard: Arc::new(SessionWizard::new(
            patient_repository.clone(),
            store.clone(),
            clock.clone(),
        )),
        patients: PatientService::new(config, patient_repository, clock.clone()),
        doctors: DoctorService::new(doctor_repository),
        calendar: CalendarService::new(store),
        clock,
    }
}
