// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. O Trait que define um conjunto de papéis autorizados.
/// MASTER passa em qualquer guarda.
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts: lê o perfil injetado pelo
// auth_guard e compara o papel com o conjunto permitido.
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if user.role == UserRole::Master || T::allowed().contains(&user.role) {
            return Ok(RequireRole(PhantomData));
        }
        Err(AppError::Forbidden)
    }
}

// ---
// DEFINIÇÃO DOS CONJUNTOS DE PAPÉIS
// ---

/// Aprovar ou reprovar requisições enviadas.
pub struct CanApprove;
impl RoleSet for CanApprove {
    fn allowed() -> &'static [UserRole] {
        &[UserRole::Aprovador]
    }
}

/// Operações de almoxarifado: catálogo, entradas, atendimento, devolução.
pub struct CanOperateWarehouse;
impl RoleSet for CanOperateWarehouse {
    fn allowed() -> &'static [UserRole] {
        &[UserRole::Almoxarife]
    }
}

/// Ciclos de inventário e aplicação de ajustes.
pub struct CanAudit;
impl RoleSet for CanAudit {
    fn allowed() -> &'static [UserRole] {
        &[UserRole::Almoxarife, UserRole::Auditor]
    }
}

/// Administração de usuários.
pub struct CanManageUsers;
impl RoleSet for CanManageUsers {
    fn allowed() -> &'static [UserRole] {
        &[]
    }
}
