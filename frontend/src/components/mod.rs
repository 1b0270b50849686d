pub mod forms;
pub mod sync;
