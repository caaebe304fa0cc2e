//! Application layer.
//!
//! - `services.rs`: the operation facade over injected repositories
//! - `dto.rs`: request/response DTOs and their conversion into engine inputs
//! - `errors.rs`: one error type for every operation, with stable codes

pub mod dto;
pub mod errors;
pub mod services;
