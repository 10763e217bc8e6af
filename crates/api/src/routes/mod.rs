pub mod health;
pub mod solicitudes;
