#![allow(dead_code)]

use gollis_connect::application::ledger::PaymentGateways;
use gollis_connect::application::portal::{Backends, DispatchSettings, Portal};
use gollis_connect::domain::user::{User, UserId};
use gollis_connect::infrastructure::gateway::{GatewayPolicy, StubGateway};
use gollis_connect::infrastructure::identity::InMemoryDirectory;
use gollis_connect::infrastructure::in_memory::{
    InMemoryCourseStore, InMemoryGradeStore, InMemoryPaymentStore,
};
use gollis_connect::infrastructure::notifier::OutboxNotifier;
use gollis_connect::infrastructure::seed::Seed;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const SEED_PATH: &str = "tests/fixtures/seed.json";

pub const ADMIN_ID: &str = "00000000-0000-4000-8000-000000000001";
pub const FACULTY_ID: &str = "00000000-0000-4000-8000-000000000002";
pub const AMINA_ID: &str = "00000000-0000-4000-8000-000000000003";
pub const KHADAR_ID: &str = "00000000-0000-4000-8000-000000000004";

pub const ADMIN_TOKEN: &str = "admin-token";
pub const FACULTY_TOKEN: &str = "faculty-token";
pub const AMINA_TOKEN: &str = "amina-token";
pub const KHADAR_TOKEN: &str = "khadar-token";
pub const EXPIRED_TOKEN: &str = "expired-token";

pub fn user_id(raw: &str) -> UserId {
    UserId(Uuid::parse_str(raw).unwrap())
}

/// The portal over in-memory adapters, loaded with the fixture seed.
pub struct TestPortal {
    pub portal: Portal,
    pub outbox: OutboxNotifier,
    pub directory: InMemoryDirectory,
}

impl TestPortal {
    pub async fn new(policy: GatewayPolicy) -> Self {
        let directory = InMemoryDirectory::new();
        let courses = Arc::new(InMemoryCourseStore::new());
        Seed::from_path(SEED_PATH)
            .unwrap()
            .apply(&directory, courses.as_ref())
            .await
            .unwrap();

        let outbox = OutboxNotifier::new();
        let backends = Backends {
            users: Arc::new(directory.clone()),
            identity: Arc::new(directory.clone()),
            courses,
            grades: Arc::new(InMemoryGradeStore::new()),
            payments: Arc::new(InMemoryPaymentStore::new()),
            notifier: Arc::new(outbox.clone()),
            gateways: PaymentGateways::uniform(Arc::new(StubGateway::new(policy))),
        };
        let dispatch = DispatchSettings {
            max_attempts: 1,
            backoff: Duration::ZERO,
        };

        Self {
            portal: Portal::assemble(backends, dispatch),
            outbox,
            directory,
        }
    }

    pub async fn user(&self, raw_id: &str) -> User {
        self.portal.users.get(user_id(raw_id)).await.unwrap().unwrap()
    }
}

/// Writes a grade import file with the standard header.
pub fn write_grades_csv(path: &Path, rows: &[[&str; 5]]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["student_id", "course_code", "grade", "semester", "academic_year"])?;
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}
