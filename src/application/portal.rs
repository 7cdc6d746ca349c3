use super::catalog::CourseCatalog;
use super::ledger::{PaymentGateways, PaymentLedger};
use super::notify::NotificationDispatcher;
use super::records::AcademicRecords;
use crate::domain::ports::{
    SharedCourseStore, SharedGradeStore, SharedIdentityProvider, SharedNotifier,
    SharedPaymentStore, SharedUserDirectory,
};
use std::sync::Arc;
use std::time::Duration;

/// Every adapter the services depend on, constructed by the caller.
#[derive(Clone)]
pub struct Backends {
    pub users: SharedUserDirectory,
    pub identity: SharedIdentityProvider,
    pub courses: SharedCourseStore,
    pub grades: SharedGradeStore,
    pub payments: SharedPaymentStore,
    pub notifier: SharedNotifier,
    pub gateways: PaymentGateways,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

/// The wired application: one instance per process, shared across requests.
#[derive(Clone)]
pub struct Portal {
    pub catalog: Arc<CourseCatalog>,
    pub records: Arc<AcademicRecords>,
    pub ledger: Arc<PaymentLedger>,
    pub identity: SharedIdentityProvider,
    pub users: SharedUserDirectory,
}

impl Portal {
    pub fn assemble(backends: Backends, dispatch: DispatchSettings) -> Self {
        let notifications =
            NotificationDispatcher::new(backends.notifier, dispatch.max_attempts, dispatch.backoff);

        Self {
            catalog: Arc::new(CourseCatalog::new(
                backends.courses.clone(),
                backends.users.clone(),
            )),
            records: Arc::new(AcademicRecords::new(
                backends.users.clone(),
                backends.courses,
                backends.grades,
                notifications.clone(),
            )),
            ledger: Arc::new(PaymentLedger::new(
                backends.users.clone(),
                backends.payments,
                backends.gateways,
                notifications,
            )),
            identity: backends.identity,
            users: backends.users,
        }
    }
}
