//! Shared HTTP adapter state.

use crate::application::portal::Portal;
use std::ops::Deref;

/// Handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    portal: Portal,
}

impl AppState {
    pub fn new(portal: Portal) -> Self {
        Self { portal }
    }
}

impl Deref for AppState {
    type Target = Portal;

    fn deref(&self) -> &Portal {
        &self.portal
    }
}
