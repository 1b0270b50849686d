pub mod form_data;
pub mod location;
pub mod submission;
pub mod template;
