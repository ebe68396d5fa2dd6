// src/services/ledger.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ScheduleRepository,
    models::catalog::ScheduleSlot,
};

/// Ledger de disponibilidade: única porta de escrita em `booked_slots`.
///
/// Todas as operações recebem a conexão da transação ABERTA pelo orquestrador
/// (`&mut *tx`) — o ledger nunca abre nem commita transação própria. É isso
/// que garante que o decremento de vagas e a escrita da reserva entram (ou
/// caem) juntos.
#[derive(Clone)]
pub struct AvailabilityLedger {
    repo: ScheduleRepository,
}

impl AvailabilityLedger {
    pub fn new(repo: ScheduleRepository) -> Self {
        Self { repo }
    }

    /// Reserva `n` vagas no slot, sob lock de linha.
    /// Retorna o slot como estava antes do incremento (o preço base vem dele).
    pub async fn reserve(
        &self,
        conn: &mut PgConnection,
        schedule_id: Uuid,
        n: i32,
    ) -> Result<ScheduleSlot, AppError> {
        let slot = self
            .repo
            .get_slot_for_update(&mut *conn, schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;

        check_capacity(&slot, n)?;

        self.repo.add_booked_slots(&mut *conn, schedule_id, n).await?;
        Ok(slot)
    }

    /// Devolve `n` vagas (cancelamento ou rollback de orquestração).
    pub async fn release(
        &self,
        conn: &mut PgConnection,
        schedule_id: Uuid,
        n: i32,
    ) -> Result<(), AppError> {
        self.repo
            .release_booked_slots(&mut *conn, schedule_id, n)
            .await
    }

    /// Variante com sinal para atualização de participantes de uma reserva já
    /// confirmada. Delta positivo re-checa a capacidade exatamente como
    /// `reserve`; delta negativo devolve vagas. A linha do slot é sempre
    /// lockada, e retorna para o chamador reprecificar.
    pub async fn adjust(
        &self,
        conn: &mut PgConnection,
        schedule_id: Uuid,
        delta: i32,
    ) -> Result<ScheduleSlot, AppError> {
        let slot = self
            .repo
            .get_slot_for_update(&mut *conn, schedule_id)
            .await?
            .ok_or(AppError::ScheduleNotFound)?;

        if delta > 0 {
            check_capacity(&slot, delta)?;
            self.repo.add_booked_slots(&mut *conn, schedule_id, delta).await?;
        } else if delta < 0 {
            self.repo
                .release_booked_slots(&mut *conn, schedule_id, -delta)
                .await?;
        }
        Ok(slot)
    }
}

/// Regra de capacidade, separada para ser testável sem banco.
fn check_capacity(slot: &ScheduleSlot, n: i32) -> Result<(), AppError> {
    if !slot.is_available {
        return Err(AppError::SlotUnavailable);
    }
    let remaining = slot.remaining();
    if remaining < n {
        return Err(AppError::CapacityExceeded { remaining });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn slot(capacity: i32, booked: i32, available: bool) -> ScheduleSlot {
        ScheduleSlot {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: Utc::now(),
            price: Decimal::from(100),
            currency: "MAD".into(),
            capacity,
            booked_slots: booked,
            is_available: available,
        }
    }

    #[test]
    fn aceita_enquanto_ha_vagas() {
        assert!(check_capacity(&slot(10, 3, true), 7).is_ok());
        assert!(check_capacity(&slot(10, 10, true), 0).is_ok());
    }

    #[test]
    fn rejeita_acima_da_capacidade_informando_o_saldo() {
        match check_capacity(&slot(10, 8, true), 3) {
            Err(AppError::CapacityExceeded { remaining }) => assert_eq!(remaining, 2),
            other => panic!("esperado CapacityExceeded, veio {other:?}"),
        }
    }

    #[test]
    fn rejeita_slot_indisponivel_mesmo_com_vagas() {
        match check_capacity(&slot(10, 0, false), 1) {
            Err(AppError::SlotUnavailable) => {}
            other => panic!("esperado SlotUnavailable, veio {other:?}"),
        }
    }
}
