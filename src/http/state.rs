use std::sync::Arc;
use std::time::Duration;

use crate::MockToolServer;

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<MockToolServer>,
    pub request_timeout: Duration,
}
