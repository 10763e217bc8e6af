//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! any Postgres executor as the first argument: `&PgPool` for standalone
//! calls, `&mut *tx` when several writes must commit together.

pub mod bitacora_repo;
pub mod documento_repo;
pub mod estado_repo;
pub mod solicitud_repo;
pub mod tipo_usuario_repo;
pub mod user_repo;

pub use bitacora_repo::BitacoraRepo;
pub use documento_repo::DocumentoRepo;
pub use estado_repo::EstadoRepo;
pub use solicitud_repo::SolicitudRepo;
pub use tipo_usuario_repo::TipoUsuarioRepo;
pub use user_repo::UserRepo;
