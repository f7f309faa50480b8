/// HTTP 저장소 클라이언트
/// 경매 서버의 REST 엔드포인트를 LotStore 로 감싼다. 서버가 같은 검증기를 다시 실행하므로
/// 마감 시각은 보내지 않는다.
// region:    --- Imports
use super::{BidReceipt, BidWrite, LotStore};
use crate::auction::model::{Bid, Lot};
use crate::bidding::commands::PlaceBidCommand;
use crate::error::{AuctionError, ErrorBody};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

// endregion: --- Imports

// region:    --- Http Store
#[derive(Clone)]
pub struct HttpLotStore {
    client: Client,
    base_url: String,
}

impl HttpLotStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AuctionError> {
        debug!("{:<12} --> GET {}", "HttpStore", path);
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }
}

/// 응답 디코딩. 서버가 보낸 에러는 원래 타입으로 복원한다.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AuctionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    match response.json::<ErrorBody>().await {
        Ok(body) => Err(body.detail),
        Err(_) => Err(AuctionError::TransientIo(format!(
            "unexpected response status {}",
            status
        ))),
    }
}

#[async_trait]
impl LotStore for HttpLotStore {
    async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError> {
        self.get("/lots").await
    }

    async fn fetch_lot(&self, lot_id: i64) -> Result<Lot, AuctionError> {
        self.get(&format!("/lots/{}", lot_id)).await
    }

    async fn fetch_bids(&self, lot_id: i64) -> Result<Vec<Bid>, AuctionError> {
        self.get(&format!("/lots/{}/bids", lot_id)).await
    }

    async fn conditional_bid(&self, write: BidWrite) -> Result<BidReceipt, AuctionError> {
        let path = format!("/lots/{}/bids", write.lot_id);
        debug!("{:<12} --> POST {}", "HttpStore", path);
        let cmd = PlaceBidCommand::from(write);
        let response = self.client.post(self.url(&path)).json(&cmd).send().await?;
        decode(response).await
    }
}

// endregion: --- Http Store
