// Application state for HTTP handlers
use crate::domain::dashboard::DashboardView;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub view_rx: watch::Receiver<Arc<DashboardView>>,
}

impl AppState {
    pub fn current_view(&self) -> Arc<DashboardView> {
        self.view_rx.borrow().clone()
    }
}
