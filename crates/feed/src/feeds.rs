//! Fee and price source adapters

use alloy_primitives::U256;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, trace};

use gas_core::{ChainId, FeeSnapshot, FetchError, FetchResult, PriceConfig};

/// One external network exposing current fee data
#[async_trait::async_trait]
pub trait FeeSource: Send + Sync {
    fn chain(&self) -> ChainId;
    async fn fetch_fee_data(&self) -> FetchResult<FeeSnapshot>;
}

/// One external service quoting the native asset in USD
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_usd_price(&self) -> FetchResult<f64>;
}

const GAS_PRICE_ID: u64 = 1;
const PRIORITY_FEE_ID: u64 = 2;

#[derive(Debug, Deserialize)]
struct RpcReply {
    id: Option<u64>,
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Fee source backed by a JSON-RPC endpoint.
///
/// Sends `eth_gasPrice` and `eth_maxPriorityFeePerGas` as one batch. Chains
/// that do not implement the priority fee method report a zero priority fee.
#[derive(Debug, Clone)]
pub struct JsonRpcFeeSource {
    chain: ChainId,
    url: String,
    client: reqwest::Client,
}

impl JsonRpcFeeSource {
    pub fn new(chain: ChainId, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            chain,
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_batch(&self) -> FetchResult<Vec<RpcReply>> {
        let batch = serde_json::json!([
            { "jsonrpc": "2.0", "id": GAS_PRICE_ID, "method": "eth_gasPrice", "params": [] },
            { "jsonrpc": "2.0", "id": PRIORITY_FEE_ID, "method": "eth_maxPriorityFeePerGas", "params": [] },
        ]);

        let response = self
            .client
            .post(&self.url)
            .json(&batch)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        trace!(chain = %self.chain, response = %text, "JSON-RPC response");

        serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

#[async_trait::async_trait]
impl FeeSource for JsonRpcFeeSource {
    fn chain(&self) -> ChainId {
        self.chain
    }

    async fn fetch_fee_data(&self) -> FetchResult<FeeSnapshot> {
        let replies = self.send_batch().await?;
        let reply = |id: u64| replies.iter().find(|r| r.id == Some(id));

        let gas_price_wei = match reply(GAS_PRICE_ID) {
            Some(RpcReply { error: Some(err), .. }) => {
                return Err(FetchError::Rpc {
                    code: err.code,
                    message: err.message.clone(),
                })
            }
            Some(RpcReply { result, .. }) => result.as_deref().map(parse_quantity).transpose()?,
            None => return Err(FetchError::Malformed("missing eth_gasPrice reply".to_string())),
        };

        let max_priority_fee_per_gas_wei = match reply(PRIORITY_FEE_ID) {
            Some(RpcReply { error: Some(err), .. }) => {
                debug!(chain = %self.chain, code = err.code, "eth_maxPriorityFeePerGas unavailable: {}", err.message);
                None
            }
            Some(RpcReply { result, .. }) => result.as_deref().map(parse_quantity).transpose()?,
            None => None,
        };

        Ok(FeeSnapshot {
            gas_price_wei,
            max_priority_fee_per_gas_wei,
        })
    }
}

/// Parse a JSON-RPC hex quantity such as `0x6fc23ac00`
pub fn parse_quantity(raw: &str) -> FetchResult<U256> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| FetchError::Malformed(format!("quantity without 0x prefix: {raw}")))?;

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| FetchError::Malformed(format!("bad quantity {raw}: {e}")))
}

/// USD price from the CoinGecko simple price API
#[derive(Debug, Clone)]
pub struct CoinGeckoPriceSource {
    config: PriceConfig,
    client: reqwest::Client,
}

impl CoinGeckoPriceSource {
    pub fn new(config: PriceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/simple/price", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl PriceSource for CoinGeckoPriceSource {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn fetch_usd_price(&self) -> FetchResult<f64> {
        let mut query = vec![
            ("ids", self.config.coin_id.as_str()),
            ("vs_currencies", "usd"),
        ];
        if let Some(key) = self.config.api_key.as_deref() {
            query.push(("x_cg_demo_api_key", key));
        }

        let response = self
            .client
            .get(self.endpoint())
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("HTTP {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        trace!(response = %text, "CoinGecko response");

        let data: HashMap<String, HashMap<String, f64>> =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))?;

        let price = data
            .get(&self.config.coin_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| {
                FetchError::Malformed(format!("no usd quote for {}", self.config.coin_id))
            })?;

        if !price.is_finite() || price < 0.0 {
            return Err(FetchError::Malformed(format!("invalid price {price}")));
        }

        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x6fc23ac00").unwrap(), U256::from(30_000_000_000u64));
        assert_eq!(parse_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x").unwrap(), U256::ZERO);
        assert!(parse_quantity("1234").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_json_rpc_fee_source() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("eth_gasPrice".to_string()),
                Matcher::Regex("eth_maxPriorityFeePerGas".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"jsonrpc":"2.0","id":2,"result":"0x77359400"},
                    {"jsonrpc":"2.0","id":1,"result":"0x6fc23ac00"}]"#,
            )
            .create_async()
            .await;

        let source = JsonRpcFeeSource::new(ChainId::Ethereum, server.url(), reqwest::Client::new());
        let snapshot = source.fetch_fee_data().await.unwrap();

        assert_eq!(snapshot.base_fee_gwei(), 30.0);
        assert_eq!(snapshot.priority_fee_gwei(), 2.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_priority_method_reads_as_zero() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"[{"jsonrpc":"2.0","id":1,"result":"0x3b9aca00"},
                    {"jsonrpc":"2.0","id":2,"error":{"code":-32601,"message":"method not found"}}]"#,
            )
            .create_async()
            .await;

        let source = JsonRpcFeeSource::new(ChainId::Polygon, server.url(), reqwest::Client::new());
        let snapshot = source.fetch_fee_data().await.unwrap();

        assert_eq!(snapshot.base_fee_gwei(), 1.0);
        assert_eq!(snapshot.max_priority_fee_per_gas_wei, None);
        assert_eq!(snapshot.priority_fee_gwei(), 0.0);
    }

    #[tokio::test]
    async fn test_gas_price_error_fails_fetch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"[{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"overloaded"}}]"#)
            .create_async()
            .await;

        let source = JsonRpcFeeSource::new(ChainId::Arbitrum, server.url(), reqwest::Client::new());
        let err = source.fetch_fee_data().await.unwrap_err();
        assert!(matches!(err, FetchError::Rpc { code: -32000, .. }));
    }

    #[tokio::test]
    async fn test_http_error_fails_fetch() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/").with_status(503).create_async().await;

        let source = JsonRpcFeeSource::new(ChainId::Ethereum, server.url(), reqwest::Client::new());
        assert!(matches!(
            source.fetch_fee_data().await,
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_fails_fetch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let source = JsonRpcFeeSource::new(ChainId::Ethereum, server.url(), reqwest::Client::new());
        assert!(matches!(
            source.fetch_fee_data().await,
            Err(FetchError::Malformed(_))
        ));
    }

    fn price_config(base_url: String) -> PriceConfig {
        PriceConfig {
            base_url,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_coingecko_price() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "ethereum".into()),
                Matcher::UrlEncoded("vs_currencies".into(), "usd".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"ethereum":{"usd":3412.55}}"#)
            .create_async()
            .await;

        let source = CoinGeckoPriceSource::new(price_config(server.url()), reqwest::Client::new());
        assert_eq!(source.fetch_usd_price().await.unwrap(), 3412.55);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_coingecko_missing_coin() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let source = CoinGeckoPriceSource::new(price_config(server.url()), reqwest::Client::new());
        assert!(matches!(
            source.fetch_usd_price().await,
            Err(FetchError::Malformed(_))
        ));
    }
}
