//! Request and response shapes of the HTTP API

pub mod auth_dto;
pub mod fare_dto;
pub mod location_dto;
pub mod route_dto;
