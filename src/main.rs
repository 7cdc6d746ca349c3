use actix_web::{App, HttpServer, web};
use clap::Parser;
use gollis_connect::application::ledger::PaymentGateways;
use gollis_connect::application::portal::{Backends, Portal};
use gollis_connect::config::{Cli, Command, ImportArgs, ServeArgs, Settings};
use gollis_connect::domain::ports::{
    SharedCourseStore, SharedGradeStore, SharedPaymentGateway, SharedPaymentStore,
};
use gollis_connect::domain::user::UserId;
use gollis_connect::error::PortalError;
use gollis_connect::infrastructure::gateway::StubGateway;
use gollis_connect::infrastructure::identity::InMemoryDirectory;
use gollis_connect::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryGradeStore, InMemoryPaymentStore,
};
use gollis_connect::infrastructure::notifier::LogNotifier;
#[cfg(feature = "storage-rocksdb")]
use gollis_connect::infrastructure::rocksdb::RocksDBStore;
use gollis_connect::infrastructure::seed::Seed;
use gollis_connect::interfaces::csv::gpa_writer::GpaWriter;
use gollis_connect::interfaces::csv::importer::import_grades;
use gollis_connect::interfaces::http::{AppState, configure};
use gollis_connect::telemetry::init_logger;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

struct Stores {
    courses: SharedCourseStore,
    grades: SharedGradeStore,
    payments: SharedPaymentStore,
}

fn in_memory_stores() -> Stores {
    Stores {
        courses: Arc::new(InMemoryCourseStore::new()),
        grades: Arc::new(InMemoryGradeStore::new()),
        payments: Arc::new(InMemoryPaymentStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_stores(db_path: &Path) -> Result<Stores> {
    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    info!(path = %db_path.display(), "using RocksDB storage");
    Ok(Stores {
        courses: Arc::new(store.clone()),
        grades: Arc::new(store.clone()),
        payments: Arc::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_stores(_db_path: &Path) -> Result<Stores> {
    eprintln!(
        "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(in_memory_stores())
}

async fn build_portal(settings: &Settings) -> Result<Portal> {
    let stores = match &settings.db_path {
        Some(db_path) => persistent_stores(db_path)?,
        None => in_memory_stores(),
    };

    let directory = InMemoryDirectory::new();
    if let Some(seed_path) = &settings.seed {
        Seed::from_path(seed_path)
            .into_diagnostic()?
            .apply(&directory, stores.courses.as_ref())
            .await
            .into_diagnostic()?;
    }

    let gateway: SharedPaymentGateway = Arc::new(StubGateway::new(settings.gateway));
    let backends = Backends {
        users: Arc::new(directory.clone()),
        identity: Arc::new(directory),
        courses: stores.courses,
        grades: stores.grades,
        payments: stores.payments,
        notifier: Arc::new(LogNotifier),
        gateways: PaymentGateways::uniform(gateway),
    };
    Ok(Portal::assemble(backends, settings.dispatch()))
}

async fn serve(portal: Portal, args: ServeArgs) -> Result<()> {
    let state = web::Data::new(AppState::new(portal));
    info!(host = %args.host, port = args.port, "starting HTTP server");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((args.host.as_str(), args.port))
        .into_diagnostic()?
        .run()
        .await
        .into_diagnostic()
}

async fn import(portal: Portal, args: ImportArgs) -> Result<()> {
    let submitter = portal
        .users
        .get(UserId(args.submitted_by))
        .await
        .into_diagnostic()?
        .ok_or_else(|| PortalError::not_found(format!("User {} not found", args.submitted_by)))
        .into_diagnostic()?;

    let file = File::open(&args.input).into_diagnostic()?;
    let report = import_grades(&portal, &submitter, file)
        .await
        .into_diagnostic()?;
    for rejected in &report.rejected {
        eprintln!(
            "Error importing grade on line {}: {}",
            rejected.line, rejected.error
        );
    }

    let stdout = io::stdout();
    let mut writer = GpaWriter::new(stdout.lock());
    writer
        .write_summary(report.gpas.iter().map(|(id, gpa)| (id.as_str(), *gpa)))
        .into_diagnostic()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.settings.log_format);

    let portal = build_portal(&cli.settings).await?;
    match cli.command {
        Command::Serve(args) => serve(portal, args).await,
        Command::ImportGrades(args) => import(portal, args).await,
    }
}
