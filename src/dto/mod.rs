pub mod exam_dto;
pub mod health_record_dto;
