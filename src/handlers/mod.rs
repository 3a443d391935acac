pub mod diet_handler;
pub mod form;

pub use diet_handler::DietDispatcher;
pub use form::{FieldChange, FormSession, FormView};
