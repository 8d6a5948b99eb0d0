//! Axum-Handler der HTTP-Schnittstelle

pub mod health;
pub mod images;
pub mod upload;
pub mod ws;
