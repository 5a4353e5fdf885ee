pub mod dto;
pub mod perceptor_service;
pub mod validation;

/// Key for the priority catalog.
pub const CATALOG_PRIORITY: &str = "priority";
/// Key for the situation catalog shown on the search form.
pub const CATALOG_SITUATION: &str = "situation";
/// Key for the specialty catalog.
pub const CATALOG_SPECIALTY: &str = "specialty";
/// Key for the activity catalog.
pub const CATALOG_ACTIVITY: &str = "activity";
/// Key for the line-of-business catalog.
pub const CATALOG_LINE: &str = "line";
