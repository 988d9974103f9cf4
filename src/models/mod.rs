pub mod certificate;
pub mod exam;
pub mod exam_attempt;
pub mod health_record;
