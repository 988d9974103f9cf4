pub mod bmi;
pub mod fields;
pub mod record_form;
