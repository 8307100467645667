pub mod inventory_dto;
pub mod module_dto;
pub mod reservation_dto;
pub mod topology_dto;
