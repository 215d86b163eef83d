use crate::{
    events::{
        ChainEvent,
        EventKind,
    },
    ledger::{
        Ledger,
        LedgerError,
        TxStatus,
    },
    tx::SignedTransaction,
    types::{
        Accessory,
        AccessoryKind,
        AccessoryListing,
        Address,
        GameBalance,
        ObjectId,
        Pet,
        PetListing,
        TxDigest,
    },
};
use reqwest::StatusCode;
use serde::Deserialize;
use std::{
    fmt,
    time::Duration,
};

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Ledger access through a hosted JSON gateway (fullnode + event index
/// behind one HTTP surface). Reads map 404 to `None`; confirmation waiting
/// polls until the gateway reports a terminal status.
#[derive(Clone)]
pub struct HttpLedger {
    base_url: String,
    http: reqwest::Client,
}

impl HttpLedger {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LedgerError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base_url, http })
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<Option<T>, LedgerError> {
        let res = self.http.get(&url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = Self::check_status(res).await?;
        Ok(Some(res.json().await?))
    }

    async fn get_required<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, LedgerError> {
        let res = self.http.get(&url).send().await?;
        let res = Self::check_status(res).await?;
        Ok(res.json().await?)
    }

    async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, LedgerError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res
            .text()
            .await
            .unwrap_or_else(|_| "<unavailable body>".to_string());
        Err(LedgerError::Gateway {
            status: status.as_u16(),
            body,
        })
    }
}

impl Ledger for HttpLedger {
    async fn submit(&self, tx: SignedTransaction) -> Result<TxDigest, LedgerError> {
        let url = format!("{}/v1/transactions", self.base_url);
        let res = self.http.post(&url).json(&tx).send().await?;
        let res = Self::check_status(res).await?;
        let dto: SubmitResponseDto = res.json().await?;
        Ok(dto.digest)
    }

    async fn wait_for_confirmation(
        &self,
        digest: &TxDigest,
    ) -> Result<TxStatus, LedgerError> {
        let url = format!("{}/v1/transactions/{}", self.base_url, digest);
        loop {
            let dto: TxStatusDto = self.get_required(url.clone()).await?;
            match dto.into_status() {
                Some(status) => return Ok(status),
                None => tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await,
            }
        }
    }

    async fn owned_pet(&self, owner: &Address) -> Result<Option<Pet>, LedgerError> {
        let url = format!("{}/v1/pets/by-owner/{}", self.base_url, owner);
        self.get_optional(url).await
    }

    async fn owned_accessories(
        &self,
        owner: &Address,
    ) -> Result<Vec<Accessory>, LedgerError> {
        let url = format!("{}/v1/accessories/by-owner/{}", self.base_url, owner);
        self.get_required(url).await
    }

    async fn equipped_accessories(
        &self,
        pet: &ObjectId,
    ) -> Result<Vec<(AccessoryKind, Accessory)>, LedgerError> {
        let url = format!("{}/v1/pets/{}/equipped", self.base_url, pet);
        let entries: Vec<EquippedEntryDto> = self.get_required(url).await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                AccessoryKind::from_wire(entry.kind).map(|kind| (kind, entry.accessory))
            })
            .collect())
    }

    async fn game_balance(&self) -> Result<GameBalance, LedgerError> {
        let url = format!("{}/v1/game-balance", self.base_url);
        self.get_required(url).await
    }

    async fn query_events(
        &self,
        kind: EventKind,
        limit: usize,
    ) -> Result<Vec<ChainEvent>, LedgerError> {
        let url = format!(
            "{}/v1/events?kind={}&limit={}",
            self.base_url,
            event_kind_path(kind),
            limit
        );
        self.get_required(url).await
    }

    async fn pet_listing(&self, id: &ObjectId) -> Result<Option<PetListing>, LedgerError> {
        let url = format!("{}/v1/listings/pets/{}", self.base_url, id);
        self.get_optional(url).await
    }

    async fn accessory_listing(
        &self,
        id: &ObjectId,
    ) -> Result<Option<AccessoryListing>, LedgerError> {
        let url = format!("{}/v1/listings/accessories/{}", self.base_url, id);
        self.get_optional(url).await
    }
}

fn event_kind_path(kind: EventKind) -> &'static str {
    match kind {
        EventKind::PetAdopted => "pet_adopted",
        EventKind::PetListed => "pet_listed",
        EventKind::PetListingCancelled => "pet_listing_cancelled",
        EventKind::AccessoryListed => "accessory_listed",
        EventKind::AccessoryListingCancelled => "accessory_listing_cancelled",
        EventKind::AccessorySold => "accessory_sold",
    }
}

#[derive(Deserialize)]
struct SubmitResponseDto {
    digest: TxDigest,
}

#[derive(Deserialize)]
struct TxStatusDto {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

impl TxStatusDto {
    /// `None` while the gateway still reports the transaction as pending.
    fn into_status(self) -> Option<TxStatus> {
        match self.status.as_str() {
            "success" => Some(TxStatus::Success),
            "failure" => Some(TxStatus::Failure {
                error: self
                    .error
                    .unwrap_or_else(|| "unspecified execution failure".to_string()),
            }),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct EquippedEntryDto {
    kind: u8,
    accessory: Accessory,
}

impl fmt::Display for HttpLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn tx_status_dto__maps_terminal_states() {
        let pending = TxStatusDto {
            status: "pending".into(),
            error: None,
        };
        assert_eq!(pending.into_status(), None);

        let success = TxStatusDto {
            status: "success".into(),
            error: None,
        };
        assert_eq!(success.into_status(), Some(TxStatus::Success));

        let failure = TxStatusDto {
            status: "failure".into(),
            error: Some("E_NOT_ENOUGH_COINS".into()),
        };
        assert_eq!(
            failure.into_status(),
            Some(TxStatus::Failure {
                error: "E_NOT_ENOUGH_COINS".into()
            })
        );
    }
}
