use std::sync::Arc;

use crate::application::perceptor_service::PerceptorService;

#[derive(Clone)]
pub struct AppState {
    pub hospital_service: Arc<PerceptorService>,
}

impl AppState {
    pub fn new(hospital_service: Arc<PerceptorService>) -> Self {
        Self { hospital_service }
    }
}
