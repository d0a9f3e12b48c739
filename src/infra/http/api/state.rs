use std::sync::Arc;

use crate::application::analytics::AnalyticsService;
use crate::application::notes::NoteService;

#[derive(Clone)]
pub struct ApiState {
    pub notes: Arc<NoteService>,
    pub analytics: Arc<AnalyticsService>,
}
