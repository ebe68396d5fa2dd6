// src/services/pricing.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::catalog::{Promotion, PromotionType};

/// Desconto por participante que uma promoção dá sobre o preço base.
/// Comparável entre os dois tipos, por ser sempre um valor em moeda.
fn discount_amount(promotion: &Promotion, base_price: Decimal) -> Decimal {
    match promotion.promotion_type {
        PromotionType::PercentageDiscount => {
            base_price * promotion.value / Decimal::ONE_HUNDRED
        }
        // Desconto fixo nunca passa do próprio preço (piso em zero).
        PromotionType::FixedAmountDiscount => promotion.value.min(base_price),
    }
}

fn is_eligible(promotion: &Promotion, now: DateTime<Utc>) -> bool {
    promotion.is_active && promotion.start_date <= now && now <= promotion.end_date
}

/// Seleciona no máximo UMA promoção: a de maior desconto por participante.
/// Empate decide por `created_at` mais antigo e, persistindo, pela ordem de
/// entrada — regra fixa, nada de ordem de iteração de mapa.
pub fn select_promotion<'a>(
    base_price: Decimal,
    promotions: &'a [Promotion],
    now: DateTime<Utc>,
) -> Option<&'a Promotion> {
    let mut best: Option<&Promotion> = None;
    let mut best_amount = Decimal::ZERO;

    for promotion in promotions.iter().filter(|p| is_eligible(p, now)) {
        let amount = discount_amount(promotion, base_price);
        let wins = match best {
            None => amount > Decimal::ZERO,
            Some(current) => {
                amount > best_amount
                    || (amount == best_amount && promotion.created_at < current.created_at)
            }
        };
        if wins {
            best = Some(promotion);
            best_amount = amount;
        }
    }

    best
}

/// Resolve o preço total de uma reserva. Função pura e determinística:
/// mesmas entradas, mesmo resultado, sem relógio implícito.
/// O preço unitário é arredondado a 2 casas antes de multiplicar, para não
/// acumular deriva de ponto flutuante por participante.
pub fn resolve_price(
    base_price: Decimal,
    participants: i32,
    promotions: &[Promotion],
    now: DateTime<Utc>,
) -> Decimal {
    let discount = select_promotion(base_price, promotions, now)
        .map(|p| discount_amount(p, base_price))
        .unwrap_or(Decimal::ZERO);

    let unit_price = (base_price - discount)
        .max(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    unit_price * Decimal::from(participants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn promo(
        kind: PromotionType,
        value: Decimal,
        active: bool,
        created_offset_secs: i64,
    ) -> Promotion {
        Promotion {
            id: Uuid::new_v4(),
            promotion_type: kind,
            value,
            is_active: active,
            start_date: now() - Duration::days(1),
            end_date: now() + Duration::days(1),
            created_at: now() - Duration::days(30) + Duration::seconds(created_offset_secs),
        }
    }

    #[test]
    fn sem_promocao_multiplica_o_preco_base() {
        let total = resolve_price(Decimal::new(10000, 2), 3, &[], now());
        assert_eq!(total, Decimal::new(30000, 2));
    }

    #[test]
    fn desconto_percentual_de_dez_por_cento() {
        let promos = vec![promo(
            PromotionType::PercentageDiscount,
            Decimal::from(10),
            true,
            0,
        )];
        let total = resolve_price(Decimal::from(100), 2, &promos, now());
        assert_eq!(total, Decimal::new(18000, 2));
    }

    #[test]
    fn desconto_fixo_de_vinte() {
        let promos = vec![promo(
            PromotionType::FixedAmountDiscount,
            Decimal::from(20),
            true,
            0,
        )];
        let total = resolve_price(Decimal::from(100), 2, &promos, now());
        assert_eq!(total, Decimal::new(16000, 2));
    }

    #[test]
    fn desconto_fixo_maior_que_o_preco_tem_piso_em_zero() {
        let promos = vec![promo(
            PromotionType::FixedAmountDiscount,
            Decimal::from(500),
            true,
            0,
        )];
        let total = resolve_price(Decimal::from(100), 4, &promos, now());
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn escolhe_o_maior_desconto_entre_tipos_diferentes() {
        // 10% de 100 = 10 < desconto fixo de 25.
        let promos = vec![
            promo(PromotionType::PercentageDiscount, Decimal::from(10), true, 0),
            promo(PromotionType::FixedAmountDiscount, Decimal::from(25), true, 10),
        ];
        let total = resolve_price(Decimal::from(100), 1, &promos, now());
        assert_eq!(total, Decimal::from(75));

        let selected = select_promotion(Decimal::from(100), &promos, now()).unwrap();
        assert_eq!(selected.promotion_type, PromotionType::FixedAmountDiscount);
    }

    #[test]
    fn empate_decide_pela_promocao_mais_antiga() {
        // Ambas dão 20 de desconto por participante; vence a criada primeiro,
        // mesmo aparecendo depois na lista.
        let older = promo(PromotionType::FixedAmountDiscount, Decimal::from(20), true, 0);
        let newer = promo(PromotionType::PercentageDiscount, Decimal::from(20), true, 60);
        let older_id = older.id;

        let promos = vec![newer, older];
        let selected = select_promotion(Decimal::from(100), &promos, now()).unwrap();
        assert_eq!(selected.id, older_id);
        assert_eq!(resolve_price(Decimal::from(100), 1, &promos, now()), Decimal::from(80));
    }

    #[test]
    fn promocao_inativa_ou_fora_da_janela_e_ignorada() {
        let mut expired = promo(PromotionType::PercentageDiscount, Decimal::from(50), true, 0);
        expired.end_date = now() - Duration::hours(1);
        let inactive = promo(PromotionType::PercentageDiscount, Decimal::from(50), false, 0);

        let total = resolve_price(Decimal::from(100), 2, &[expired, inactive], now());
        assert_eq!(total, Decimal::from(200));
    }

    #[test]
    fn arredonda_o_preco_unitario_antes_de_multiplicar() {
        // 15% de 99.99: unitário 84.9915 -> 84.99; x3 = 254.97.
        let promos = vec![promo(
            PromotionType::PercentageDiscount,
            Decimal::from(15),
            true,
            0,
        )];
        let total = resolve_price(Decimal::new(9999, 2), 3, &promos, now());
        assert_eq!(total, Decimal::new(25497, 2));
    }
}
