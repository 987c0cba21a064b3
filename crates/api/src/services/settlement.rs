//! Purchase settlement.
//!
//! A payment is settled at most once: the purchase row and the balance
//! credit commit together, and the unique `payment_reference` turns every
//! replay into a no-op that returns the original purchase.

use domain::models::payment::MetadataError;
use domain::models::purchase::InvalidPackSize;
use domain::models::user::PinBalances;
use domain::models::{PaymentIntent, PaymentMetadata, PinPack, PinPurchase};
use metrics::counter;
use persistence::repositories::{PinPurchaseRepository, UserRepository};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::upkeep::UpkeepService;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    InvalidPack(#[from] InvalidPackSize),

    #[error("Invalid payment metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A settled purchase and the buyer's balances afterwards.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub purchase: PinPurchase,
    pub balances: PinBalances,
    /// False when the payment had already been settled.
    pub newly_settled: bool,
}

pub struct SettlementService {
    pool: PgPool,
    purchases: PinPurchaseRepository,
}

impl SettlementService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            purchases: PinPurchaseRepository::new(pool.clone()),
            pool,
        }
    }

    /// Credits `pack` to `user_id` for the payment `payment_reference`.
    pub async fn settle(
        &self,
        user_id: Uuid,
        pack: PinPack,
        payment_reference: &str,
    ) -> Result<Settlement, SettlementError> {
        let mut tx = self.pool.begin().await?;

        let inserted = PinPurchaseRepository::insert_if_absent(
            &mut *tx,
            user_id,
            pack.pack_type,
            pack.size,
            pack.price_cents,
            payment_reference,
        )
        .await?;

        let Some(purchase) = inserted else {
            let balances = UserRepository::balances(&mut *tx, user_id)
                .await?
                .ok_or(SettlementError::UserNotFound(user_id))?;
            tx.commit().await?;

            let existing = self
                .purchases
                .find_by_reference(payment_reference)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;

            info!(
                payment_reference,
                purchase_id = %existing.id,
                "Payment already settled"
            );
            return Ok(Settlement {
                purchase: existing.into(),
                balances: balances.into(),
                newly_settled: false,
            });
        };

        let balances =
            UserRepository::credit(&mut *tx, user_id, pack.pack_type.pin_type(), pack.size)
                .await?
                .ok_or(SettlementError::UserNotFound(user_id))?;

        tx.commit().await?;

        counter!("pin_purchases_settled_total", "pack_type" => pack.pack_type.as_str())
            .increment(1);
        info!(
            user_id = %user_id,
            purchase_id = %purchase.id,
            pack_type = %pack.pack_type,
            pack_size = pack.size,
            payment_reference,
            "Pin purchase settled"
        );

        UpkeepService::new(self.pool.clone()).run_inline().await;

        Ok(Settlement {
            purchase: purchase.into(),
            balances: balances.into(),
            newly_settled: true,
        })
    }

    /// Settles a succeeded payment intent from the purchase metadata it carries.
    pub async fn settle_intent(&self, intent: &PaymentIntent) -> Result<Settlement, SettlementError> {
        let metadata = PaymentMetadata::from_map(&intent.metadata)?;
        let pack = PinPack::lookup(metadata.pack_type, metadata.pack_size)?;
        self.settle(metadata.user_id, pack, &intent.id).await
    }
}
