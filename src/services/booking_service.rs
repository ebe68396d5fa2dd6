// src/services/booking_service.rs

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, CatalogRepository, PaymentRepository, ScheduleRepository},
    models::{
        auth::AuthUser,
        booking::{Booking, BookingStatus},
        catalog::SlotAvailability,
        notification::{NotificationEvent, NotificationType},
        payment::Payment,
    },
    services::{
        ledger::AvailabilityLedger,
        notifier::Notifier,
        payment_service::PaymentGateway,
        pricing,
    },
};

/// Orquestrador de reservas: dono da máquina de estados do Booking.
///
/// Toda transição que toca a reserva E o slot roda numa única transação;
/// falha em qualquer passo desfaz tudo (nunca fica vaga decrementada sem
/// reserva correspondente, nem o contrário).
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    schedule_repo: ScheduleRepository,
    catalog_repo: CatalogRepository,
    payment_repo: PaymentRepository,
    ledger: AvailabilityLedger,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
}

impl BookingService {
    pub fn new(
        booking_repo: BookingRepository,
        schedule_repo: ScheduleRepository,
        catalog_repo: CatalogRepository,
        payment_repo: PaymentRepository,
        ledger: AvailabilityLedger,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Notifier,
    ) -> Self {
        Self {
            booking_repo,
            schedule_repo,
            catalog_repo,
            payment_repo,
            ledger,
            gateway,
            notifier,
        }
    }

    // ---
    // Leitura
    // ---

    pub async fn get_availability<'e, E>(
        &self,
        executor: E,
        listing_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<SlotAvailability>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Janela meio-aberta [00:00, 00:00 do dia seguinte) em UTC.
        let day_start: DateTime<Utc> = date.and_time(NaiveTime::MIN).and_utc();
        let day_end: DateTime<Utc> = day_start + chrono::Duration::days(1);
        self.schedule_repo
            .list_availability(executor, listing_id, day_start, day_end)
            .await
    }

    pub async fn get_reservation<'e, E>(
        &self,
        executor: E,
        caller: &AuthUser,
        booking_id: Uuid,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = self
            .booking_repo
            .get_booking(executor, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if booking.user_id != caller.id {
            return Err(AppError::Forbidden);
        }
        Ok(booking)
    }

    pub async fn list_reservations<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        status: Option<BookingStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        let bookings = self
            .booking_repo
            .list_by_user(executor, user_id, status, page, limit)
            .await?;
        let total = self
            .booking_repo
            .count_by_user(executor, user_id, status)
            .await?;
        Ok((bookings, total))
    }

    // ---
    // Criação: ∅ -> PENDING (ou direto CONFIRMED se o total der zero)
    // ---

    pub async fn create_reservation<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        schedule_id: Uuid,
        num_participants: i32,
    ) -> Result<Booking, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Reserva as vagas sob lock de linha. CapacityExceeded ou
        //    SlotUnavailable abortam aqui, sem nada persistido.
        let slot = self
            .ledger
            .reserve(&mut tx, schedule_id, num_participants)
            .await?;

        // 2. Preço determinístico, promoção do anúncio já considerada.
        let promotions = self
            .catalog_repo
            .get_promotions_for_listing(&mut *tx, slot.listing_id)
            .await?;
        let total_price =
            pricing::resolve_price(slot.price, num_participants, &promotions, Utc::now());

        // 3. Total zero confirma na própria criação, sem registro de
        //    pagamento. Caso contrário nasce PENDING.
        let status = if total_price.is_zero() {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        };

        let booking = self
            .booking_repo
            .create_booking(
                &mut *tx,
                user_id,
                slot.listing_id,
                schedule_id,
                num_participants,
                total_price,
                &slot.currency,
                status,
            )
            .await?;

        tx.commit().await?;

        if status == BookingStatus::Confirmed {
            self.notifier
                .dispatch(NotificationEvent {
                    kind: NotificationType::BookingConfirmed,
                    booking_id: booking.id,
                    title: "Reserva confirmada".to_string(),
                    message: "Sua reserva gratuita foi confirmada.".to_string(),
                    recipient_user_id: user_id,
                })
                .await;
        }

        Ok(booking)
    }

    // ---
    // PENDING -> AWAITING_PAYMENT
    //
    // Dois gatilhos para a mesma transição: aprovação do parceiro e checkout
    // direto pelo próprio usuário. A máquina de estados impede entrada dupla.
    // ---

    pub async fn approve_reservation<'e, E>(
        &self,
        executor: E,
        partner: &AuthUser,
        booking_id: Uuid,
    ) -> Result<(Booking, Payment), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.enter_awaiting_payment(executor, booking_id, |_booking, listing_partner| {
            if listing_partner != Some(partner.id) {
                return Err(AppError::Forbidden);
            }
            Ok(())
        })
        .await
    }

    pub async fn start_checkout<'e, E>(
        &self,
        executor: E,
        caller: &AuthUser,
        booking_id: Uuid,
    ) -> Result<(Booking, Payment), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        self.enter_awaiting_payment(executor, booking_id, |booking, _| {
            if booking.user_id != caller.id {
                return Err(AppError::Forbidden);
            }
            Ok(())
        })
        .await
    }

    async fn enter_awaiting_payment<'e, E, F>(
        &self,
        executor: E,
        booking_id: Uuid,
        authorize: F,
    ) -> Result<(Booking, Payment), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
        F: FnOnce(&Booking, Option<Uuid>) -> Result<(), AppError>,
    {
        let mut tx = executor.begin().await?;

        let booking = self
            .booking_repo
            .get_booking_for_update(&mut *tx, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        let listing_partner = self
            .catalog_repo
            .get_listing_partner(&mut *tx, booking.listing_id)
            .await?;
        authorize(&booking, listing_partner)?;

        if !booking.status.can_transition_to(BookingStatus::AwaitingPayment) {
            return Err(AppError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::AwaitingPayment,
            });
        }

        // Intenção criada no gateway ANTES do commit local. Se o commit
        // falhar, a intenção fica órfã no gateway: logamos alto e o erro
        // original sobe mesmo assim.
        let intent = self
            .gateway
            .create_intent(booking.total_price, &booking.currency)
            .await?;

        let result: Result<(Booking, Payment), AppError> = async {
            let payment = self
                .payment_repo
                .create_payment(
                    &mut *tx,
                    booking.id,
                    booking.user_id,
                    booking.total_price,
                    &booking.currency,
                    &intent.gateway,
                    &intent.transaction_id,
                )
                .await?;
            let booking = self
                .booking_repo
                .update_status(&mut *tx, booking.id, BookingStatus::AwaitingPayment)
                .await?;
            tx.commit().await?;
            Ok((booking, payment))
        }
        .await;

        let (booking, payment) = match result {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(
                    gateway_transaction_id = %intent.transaction_id,
                    "Compensação pendente: intenção de pagamento órfã no gateway ({err})"
                );
                return Err(err);
            }
        };

        self.notifier
            .dispatch(NotificationEvent {
                kind: NotificationType::BookingApprovedForPayment,
                booking_id: booking.id,
                title: "Reserva aguardando pagamento".to_string(),
                message: "Complete o pagamento para confirmar sua vaga.".to_string(),
                recipient_user_id: booking.user_id,
            })
            .await;

        Ok((booking, payment))
    }

    // ---
    // CONFIRMED -> CONFIRMED (mutação de participantes)
    // ---

    pub async fn update_participants<'e, E>(
        &self,
        executor: E,
        caller: &AuthUser,
        booking_id: Uuid,
        num_participants: i32,
    ) -> Result<Booking, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let booking = self
            .booking_repo
            .get_booking_for_update(&mut *tx, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if booking.user_id != caller.id {
            return Err(AppError::Forbidden);
        }
        // Só é legal mexer em participantes de reserva confirmada.
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::Confirmed,
            });
        }

        // Delta positivo re-checa capacidade sob o mesmo lock do reserve.
        let delta = num_participants - booking.num_participants;
        let slot = self.ledger.adjust(&mut tx, booking.schedule_id, delta).await?;

        let promotions = self
            .catalog_repo
            .get_promotions_for_listing(&mut *tx, slot.listing_id)
            .await?;
        let total_price =
            pricing::resolve_price(slot.price, num_participants, &promotions, Utc::now());

        let booking = self
            .booking_repo
            .update_participants(&mut *tx, booking_id, num_participants, total_price)
            .await?;

        tx.commit().await?;
        Ok(booking)
    }

    // ---
    // PENDING / AWAITING_PAYMENT / CONFIRMED -> CANCELLED
    // ---

    pub async fn cancel_reservation<'e, E>(
        &self,
        executor: E,
        caller: &AuthUser,
        booking_id: Uuid,
        as_partner: bool,
    ) -> Result<Booking, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let booking = self
            .booking_repo
            .get_booking_for_update(&mut *tx, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if as_partner {
            let listing_partner = self
                .catalog_repo
                .get_listing_partner(&mut *tx, booking.listing_id)
                .await?;
            if listing_partner != Some(caller.id) {
                return Err(AppError::Forbidden);
            }
        } else if booking.user_id != caller.id {
            return Err(AppError::Forbidden);
        }

        // Rejeita estados terminais sem nenhum efeito colateral.
        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(AppError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            });
        }

        // Simetria: devolve exatamente as vagas que a reserva detinha.
        self.ledger
            .release(&mut tx, booking.schedule_id, booking.num_participants)
            .await?;

        let booking = self
            .booking_repo
            .update_status(&mut *tx, booking_id, BookingStatus::Cancelled)
            .await?;

        tx.commit().await?;

        self.notifier
            .dispatch(NotificationEvent {
                kind: NotificationType::BookingCancelled,
                booking_id: booking.id,
                title: "Reserva cancelada".to_string(),
                message: if as_partner {
                    "Sua reserva foi cancelada pelo anfitrião.".to_string()
                } else {
                    "Sua reserva foi cancelada.".to_string()
                },
                recipient_user_id: booking.user_id,
            })
            .await;

        Ok(booking)
    }

    // ---
    // CONFIRMED -> COMPLETED
    //
    // Gatilho externo (tempo/rotina); nenhuma rota HTTP chama isto hoje.
    // ---

    pub async fn complete_booking<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
    ) -> Result<Booking, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let booking = self
            .booking_repo
            .get_booking_for_update(&mut *tx, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if !booking.status.can_transition_to(BookingStatus::Completed) {
            return Err(AppError::InvalidStateTransition {
                from: booking.status,
                to: BookingStatus::Completed,
            });
        }

        let booking = self
            .booking_repo
            .update_status(&mut *tx, booking_id, BookingStatus::Completed)
            .await?;
        tx.commit().await?;
        Ok(booking)
    }
}
