//! Integration tests for the help-request repositories.
//!
//! Exercises the repository layer against a real database:
//! - Seeded status catalogue and deletion protection
//! - Conjunctive request filters
//! - Audit-log ordering and deleted authors
//! - Document cascades

use chrono::Datelike;
use solicitudes_core::filters::SolicitudFilter;
use solicitudes_db::models::bitacora::CreateBitacoraSolicitud;
use solicitudes_db::models::documento::CreateDocumentoSolicitud;
use solicitudes_db::models::solicitud::{CreateSolicitudAyuda, UpdateSolicitudAyuda};
use solicitudes_db::models::user::CreateUser;
use solicitudes_db::repositories::{
    BitacoraRepo, DocumentoRepo, EstadoRepo, SolicitudRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str, rut: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            rut: rut.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            apellido_materno: "Soto".to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
    .id
}

async fn new_solicitud(pool: &PgPool, titulo: &str, est_id: i64, solicitante_id: i64) -> i64 {
    SolicitudRepo::create(
        pool,
        &CreateSolicitudAyuda {
            sca_titulo: titulo.to_string(),
            sca_descripcion: "Descripción".to_string(),
            est_id,
            solicitante_id,
        },
    )
    .await
    .expect("request creation should succeed")
    .sca_id
}

async fn new_entry(pool: &PgPool, sca_id: i64, usuario_id: Option<i64>, text: &str) -> i64 {
    BitacoraRepo::create(
        pool,
        &CreateBitacoraSolicitud {
            sca_id,
            bsca_observacion: text.to_string(),
            usuario_id,
            bsca_usuario_actualizacion: usuario_id,
        },
    )
    .await
    .expect("log entry creation should succeed")
    .bsca_id
}

// ---------------------------------------------------------------------------
// Status catalogue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn seeded_statuses_include_annulled(pool: PgPool) {
    solicitudes_db::health_check(&pool).await.unwrap();

    let estados = EstadoRepo::list(&pool, false).await.unwrap();
    assert_eq!(estados.len(), 5);
    assert_eq!(estados[0].est_nombre, "Ingresada");

    let anulada = EstadoRepo::find_by_id(&pool, 5).await.unwrap().unwrap();
    assert_eq!(anulada.est_nombre, "Anulada");
    assert!(anulada.est_vigencia);
}

#[sqlx::test(migrations = "./migrations")]
async fn referenced_status_cannot_be_deleted(pool: PgPool) {
    let user = new_user(&pool, "ana@techo.cl", "12345678-5").await;
    new_solicitud(&pool, "Techo dañado", 1, user).await;

    let result = sqlx::query("DELETE FROM estados_solicitud WHERE est_id = 1")
        .execute(&pool)
        .await;

    let err = result.expect_err("deleting a referenced status must fail");
    let db_err = err.as_database_error().expect("should be a database error");
    assert_eq!(db_err.code().as_deref(), Some("23503"));
}

#[sqlx::test(migrations = "./migrations")]
async fn inactive_statuses_are_filtered_on_request(pool: PgPool) {
    sqlx::query("UPDATE estados_solicitud SET est_vigencia = false WHERE est_id = 4")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(EstadoRepo::list(&pool, false).await.unwrap().len(), 5);
    let vigentes = EstadoRepo::list(&pool, true).await.unwrap();
    assert_eq!(vigentes.len(), 4);
    assert!(vigentes.iter().all(|e| e.est_id != 4));
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn filters_are_conjunctive(pool: PgPool) {
    let user = new_user(&pool, "ana@techo.cl", "12345678-5").await;
    let other = new_user(&pool, "luis@techo.cl", "11111111-1").await;

    let current = new_solicitud(&pool, "Actual en estado 1", 1, user).await;
    let old = new_solicitud(&pool, "Antigua en estado 1", 1, user).await;
    let other_status = new_solicitud(&pool, "Actual en estado 2", 2, other).await;

    sqlx::query(
        "UPDATE solicitudes_ayuda SET sca_fecha_creacion = '2020-06-15T12:00:00Z' WHERE sca_id = $1",
    )
    .bind(old)
    .execute(&pool)
    .await
    .unwrap();

    let year = chrono::Utc::now().year();
    let filter = SolicitudFilter {
        estado_id: Some(1),
        year: Some(year),
        ..Default::default()
    };
    let rows = SolicitudRepo::list_filtered(&pool, &filter, "UTC").await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.sca_id).collect();
    assert_eq!(ids, vec![current]);

    let by_applicant = SolicitudFilter {
        solicitante_id: Some(other),
        ..Default::default()
    };
    let rows = SolicitudRepo::list_filtered(&pool, &by_applicant, "UTC").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sca_id, other_status);
    assert_eq!(rows[0].estado, "En revisión");
    assert_eq!(rows[0].solicitante_email, "luis@techo.cl");

    let june_2020 = SolicitudFilter {
        year: Some(2020),
        month: Some(6),
        day: Some(15),
        ..Default::default()
    };
    let rows = SolicitudRepo::list_filtered(&pool, &june_2020, "UTC").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sca_id, old);

    let all = SolicitudRepo::list_filtered(&pool, &SolicitudFilter::default(), "UTC")
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_applies_only_supplied_fields(pool: PgPool) {
    let user = new_user(&pool, "ana@techo.cl", "12345678-5").await;
    let sca_id = new_solicitud(&pool, "Techo dañado", 1, user).await;

    let updated = SolicitudRepo::update(
        &pool,
        sca_id,
        &UpdateSolicitudAyuda {
            est_id: Some(3),
            sca_usuario_actualizacion: Some(user),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("request should exist");

    assert_eq!(updated.est_id, 3);
    assert_eq!(updated.sca_titulo, "Techo dañado");
    assert_eq!(updated.sca_usuario_actualizacion, Some(user));
    assert!(updated.sca_fecha_actualizacion >= updated.sca_fecha_creacion);

    let missing = SolicitudRepo::update(&pool, 9_999, &UpdateSolicitudAyuda::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn log_is_newest_first_and_survives_author_deletion(pool: PgPool) {
    let owner = new_user(&pool, "ana@techo.cl", "12345678-5").await;
    let staff = new_user(&pool, "staff@techo.cl", "11111111-1").await;
    let sca_id = new_solicitud(&pool, "Techo dañado", 1, owner).await;

    let first = new_entry(&pool, sca_id, Some(owner), "").await;
    let second = new_entry(&pool, sca_id, Some(staff), "Visita agendada").await;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(staff)
        .execute(&pool)
        .await
        .unwrap();

    let entries = BitacoraRepo::list_by_solicitud(&pool, sca_id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].bsca_id, second);
    assert_eq!(entries[0].usuario_email, None);
    assert_eq!(entries[1].bsca_id, first);
    assert_eq!(entries[1].usuario_email.as_deref(), Some("ana@techo.cl"));

    assert_eq!(BitacoraRepo::count_by_solicitud(&pool, sca_id).await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn documents_follow_their_request_and_entry(pool: PgPool) {
    let owner = new_user(&pool, "ana@techo.cl", "12345678-5").await;
    let sca_id = new_solicitud(&pool, "Techo dañado", 1, owner).await;
    let other_id = new_solicitud(&pool, "Otra", 1, owner).await;
    let entry = new_entry(&pool, sca_id, Some(owner), "Adjunto foto").await;

    let doc = DocumentoRepo::create(
        &pool,
        &CreateDocumentoSolicitud {
            sca_id,
            bsca_id: Some(entry),
            doc_archivo: format!("solicitud_archivos/{sca_id}/foto.png"),
            doc_usuario_actualizacion: Some(owner),
        },
    )
    .await
    .unwrap();

    let by_entry = DocumentoRepo::list_by_bitacoras(&pool, &[entry]).await.unwrap();
    assert_eq!(by_entry.len(), 1);
    let by_request = DocumentoRepo::list_by_solicitudes(&pool, &[sca_id, other_id])
        .await
        .unwrap();
    assert_eq!(by_request.len(), 1);

    // Removing the entry keeps the document but detaches it.
    sqlx::query("DELETE FROM bitacoras_solicitud WHERE bsca_id = $1")
        .bind(entry)
        .execute(&pool)
        .await
        .unwrap();
    let detached = DocumentoRepo::find_by_id(&pool, doc.doc_id).await.unwrap().unwrap();
    assert_eq!(detached.bsca_id, None);

    assert!(DocumentoRepo::delete(&pool, doc.doc_id).await.unwrap());
    assert!(!DocumentoRepo::delete(&pool, doc.doc_id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn transaction_rollback_leaves_no_rows(pool: PgPool) {
    let owner = new_user(&pool, "ana@techo.cl", "12345678-5").await;

    let mut tx = pool.begin().await.unwrap();
    let sca_id = new_solicitud_tx(&mut tx, owner).await;
    BitacoraRepo::create(
        &mut *tx,
        &CreateBitacoraSolicitud {
            sca_id,
            bsca_observacion: String::new(),
            usuario_id: Some(owner),
            bsca_usuario_actualizacion: None,
        },
    )
    .await
    .unwrap();
    tx.rollback().await.unwrap();

    assert!(SolicitudRepo::find_by_id(&pool, sca_id).await.unwrap().is_none());
    assert_eq!(BitacoraRepo::count_by_solicitud(&pool, sca_id).await.unwrap(), 0);
}

async fn new_solicitud_tx(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, owner: i64) -> i64 {
    SolicitudRepo::create(
        &mut **tx,
        &CreateSolicitudAyuda {
            sca_titulo: "En transacción".to_string(),
            sca_descripcion: "x".to_string(),
            est_id: 1,
            solicitante_id: owner,
        },
    )
    .await
    .unwrap()
    .sca_id
}
