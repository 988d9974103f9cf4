pub mod certificate_service;
pub mod exam_service;
pub mod export_service;
pub mod grading_service;
pub mod health_record_service;
